use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("All proxies failed for {0}")]
    AllProxiesFailed(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Channel already tracked: {0}")]
    ChannelAlreadyTracked(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file error: {0}")]
    State(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("A refresh is already in progress")]
    RefreshInProgress,

    #[error("No channel could be refreshed")]
    RefreshFailed,

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FreshetError>;
