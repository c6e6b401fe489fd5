use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid interval for {what}: must be greater than zero")]
    InvalidInterval { what: &'static str },

    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    #[error("Invalid root margin '{0}'")]
    InvalidRootMargin(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
