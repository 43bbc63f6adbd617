// errors.rs
use crate::client::TransportError;

/// Errors that end the binary. Engine-level failures never get here; they
/// are folded into collection state.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad argument: {0}")]
    BadArgument(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
