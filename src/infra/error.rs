use thiserror::Error;

/// Infrastructure setup failures (client construction, telemetry).
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("telemetry setup failed: {message}")]
    Telemetry { message: String },
    #[error("http client setup failed: {message}")]
    ClientBuild { message: String },
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry {
            message: message.into(),
        }
    }

    pub fn client_build(message: impl Into<String>) -> Self {
        Self::ClientBuild {
            message: message.into(),
        }
    }
}

/// Transport-level failures surfaced by every query and mutation.
///
/// Cloneable on purpose: concurrent callers of one shared in-flight fetch
/// all receive the same failure. Only `Unauthorized` has a side effect
/// outside its call site (the transport clears the session before
/// returning it).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("not authenticated: no active session token")]
    NotAuthenticated,
    #[error("session rejected by server")]
    Unauthorized,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server error: status {status} body {body}")]
    Server { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("mutation rejected: {msg}")]
    Rejected { msg: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
