use std::io::ErrorKind;

use thiserror::Error;

/// Errors produced by the lookup, presentation and logging paths
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller supplied something we refuse to send upstream (e.g. a malformed username)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A primary Mojang call did not answer within its timeout
    #[error("Upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// A primary Mojang call failed at the transport level or returned a non-2xx status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Profile payload could not be decoded
    #[error("Skin error: {0}")]
    Skin(String),

    #[error("Discord error: {0}")]
    Discord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Short machine-readable name, used as the `errorType` field in log events
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UpstreamTimeout(_) => "UpstreamTimeout",
            AppError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            AppError::Skin(_) => "Skin",
            AppError::Discord(_) => "Discord",
            AppError::Config(_) => "Config",
            AppError::Network(_) => "Network",
            AppError::Json(_) => "Json",
        }
    }

    /// Whether this failure is a recognised transient network condition
    /// (timeout, connection reset/refused, DNS lookup failure)
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::UpstreamTimeout(_) => true,
            AppError::Network(e) => is_transient_network_error(e),
            _ => false,
        }
    }

    /// Convert a reqwest failure on a primary upstream call into a typed fetch error
    pub(crate) fn upstream(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout(format!("{}: {}", context, err))
        } else {
            AppError::UpstreamUnavailable(format!("{}: {}", context, err))
        }
    }
}

/// Timeouts and connect failures (which include DNS resolution) are transient,
/// as are resets surfaced as io errors anywhere in the source chain.
pub fn is_transient_network_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::ConnectionRefused
                    | ErrorKind::TimedOut
                    | ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        source = cause.source();
    }

    false
}
