use std::time::Duration;

/// Failure of the message channel itself, as opposed to a non-200 status
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Gateway closed")]
    Closed,

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed settings: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why a secondary action (examples, favorite) had no effect.
///
/// These never reach the rendered view; they are published as notices so a
/// host can decide whether to surface them.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Entry has no id")]
    MissingId,

    #[error("Entry has no content")]
    MissingContent,

    #[error("Saved state is unknown")]
    SavedStateUnknown,

    #[error("{action} rejected with status {status}")]
    Rejected { action: &'static str, status: u16 },

    #[error("Malformed {action} payload: {source}")]
    Malformed {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
