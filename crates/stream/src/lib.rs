//! Streaming transport for the chat client: posts a question, decodes the
//! chunked text answer and reports it as ordered events.

use std::sync::Arc;

mod decoder;
mod error;
mod event;
mod http;
mod transport;

pub use decoder::{AnswerDecoder, DecodedChunk, SENTINEL, Utf8ChunkDecoder};
pub use error::{StreamError, StreamResult};
pub use event::{
    AnswerEvent, AnswerEventStream, AnswerStreamHandle, AnswerWorker, StreamCanceller,
    answer_stream,
};
pub use http::{DEFAULT_BASE_URL, DEFAULT_STREAM_PATH, HttpTransport, TransportConfig};
pub use transport::{AnswerRequest, ChatTransport};

pub fn create_transport(config: TransportConfig) -> StreamResult<Arc<dyn ChatTransport>> {
    Ok(Arc::new(HttpTransport::new(config)?))
}
