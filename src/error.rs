use reqwest::StatusCode;

/// Failures talking to the organizer backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Requests the session refuses to start.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no layout has been fetched yet")]
    NothingFetched,

    #[error("a {0} request is already in flight")]
    InFlight(&'static str),
}
