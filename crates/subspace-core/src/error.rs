use thiserror::Error;

/// Failures talking to the automation backend.
///
/// The backend contract defines no structured error codes, so every
/// non-success is opaque to the dashboard beyond this taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backend URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Reasons a start/stop command is refused before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Please enter a job title or keyword.")]
    EmptyQuery,

    #[error("Automation is already running.")]
    AlreadyRunning,

    #[error("Automation is not running.")]
    NotRunning,

    #[error("A command is already in progress.")]
    CommandPending,
}
