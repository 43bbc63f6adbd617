/// Everything that can go wrong between issuing a request and holding a
/// decoded body. The engine folds all of these into the `Errored` state.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Expected JSON response, got content-type {0:?}")]
    NotJson(Option<String>),

    #[error("JSON decode error: {0}")]
    Decode(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Network(e.to_string())
    }
}
