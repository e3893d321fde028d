use thiserror::Error;

/// Top-level error type for the MAR assistant.
///
/// Subsystem crates define their own error types and convert into
/// `MarError` where a failure crosses a crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for MarError {
    fn from(err: toml::de::Error) -> Self {
        MarError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MarError {
    fn from(err: toml::ser::Error) -> Self {
        MarError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MarError {
    fn from(err: serde_json::Error) -> Self {
        MarError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for MAR operations.
pub type Result<T> = std::result::Result<T, MarError>;
