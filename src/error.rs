use thiserror::Error;

/// Rejections of a watchlist operation. The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("No stock symbol selected, please click on the desired symbol first.")]
    NoSelection,

    #[error("The stock symbol {0} has already been added!")]
    AlreadyTracked(String),

    #[error("The stock symbol {0} is not on the watchlist")]
    NotTracked(String),
}

/// Failure talking to one of the upstream data APIs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value in slot '{slot}' is malformed: {source}")]
    Malformed {
        slot: String,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("Panel {0} already exists")]
    AlreadyExists(String),
}

/// Rejected feed subscription changes, sent back to the client as text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PubSubError {
    #[error("Session {session} already subscribed to {topic}")]
    AlreadySubscribed { session: String, topic: String },

    #[error("Session {session} not subscribed to {topic}")]
    NotSubscribed { session: String, topic: String },

    #[error("Session {0} has no subscriptions")]
    NoSubscriptions(String),
}
