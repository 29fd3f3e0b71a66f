use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StreamError {
    #[snafu(display("stream request has an empty question"))]
    EmptyQuestion { stage: &'static str },
    #[snafu(display("stream endpoint is not configured"))]
    MissingEndpoint { stage: &'static str },
    #[snafu(display("http client failed to build on `{stage}`, {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to '{url}' failed on `{stage}`, {source}"))]
    SendRequest {
        stage: &'static str,
        url: String,
        source: reqwest::Error,
    },
    #[snafu(display("reading response chunk failed on `{stage}`, {source}"))]
    ReadChunk {
        stage: &'static str,
        source: reqwest::Error,
    },
}

pub type StreamResult<T> = Result<T, StreamError>;
