use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use snafu::{ResultExt, ensure};

use crate::error::{
    BuildClientSnafu, EmptyQuestionSnafu, MissingEndpointSnafu, ReadChunkSnafu, SendRequestSnafu,
    StreamResult,
};
use crate::event::{AnswerStreamHandle, answer_stream};
use crate::transport::{AnswerRequest, ChatTransport};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STREAM_PATH: &str = "/stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub base_url: String,
    pub stream_path: String,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>, stream_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().to_string(),
            stream_path: stream_path.into().trim().to_string(),
        }
    }

    /// Joins base URL and path with exactly one slash between them.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.stream_path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_STREAM_PATH)
    }
}

/// Posts the question as JSON and streams the plain-text answer body.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> StreamResult<Self> {
        ensure!(
            !config.base_url.is_empty(),
            MissingEndpointSnafu {
                stage: "http-transport-new",
            }
        );

        // Session cookies persist across turns of the same transport.
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context(BuildClientSnafu {
                stage: "http-transport-new",
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn open_body(
        client: Client,
        endpoint: String,
        request: AnswerRequest,
    ) -> StreamResult<Option<impl Stream<Item = StreamResult<Bytes>> + Send + 'static>> {
        let response = client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .context(SendRequestSnafu {
                stage: "send-stream-request",
                url: endpoint.clone(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // The body is still the answer the user sees.
            tracing::warn!(
                url = %endpoint,
                status = status.as_u16(),
                "stream endpoint answered with a non-success status"
            );
        }

        if is_null_body_status(status) {
            return Ok(None);
        }

        Ok(Some(response.bytes_stream().map(|chunk| {
            chunk.context(ReadChunkSnafu {
                stage: "read-stream-chunk",
            })
        })))
    }
}

impl ChatTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn open_stream(&self, request: AnswerRequest) -> StreamResult<AnswerStreamHandle> {
        ensure!(
            !request.question.trim().is_empty(),
            EmptyQuestionSnafu {
                stage: "open-stream",
            }
        );

        tracing::debug!(url = %self.endpoint, "opening answer stream");
        Ok(answer_stream(Self::open_body(
            self.client.clone(),
            self.endpoint.clone(),
            request,
        )))
    }
}

/// Statuses that never carry a body, mirroring what a browser exposes as a null body.
fn is_null_body_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 101 | 103 | 204 | 205 | 304)
}
