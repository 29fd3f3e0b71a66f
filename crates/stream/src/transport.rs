use serde::Serialize;

use crate::error::StreamResult;
use crate::event::AnswerStreamHandle;

/// JSON body posted to the stream endpoint: `{"question": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRequest {
    pub question: String,
}

impl AnswerRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Source of streamed answers.
///
/// `open_stream` returns immediately; the network work happens in the
/// returned worker, which the caller must drive.
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;
    fn open_stream(&self, request: AnswerRequest) -> StreamResult<AnswerStreamHandle>;
}
