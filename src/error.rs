use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmiError {
    #[error("Unknown scope '{scope}' (no catalog configuration for its prefix)")]
    UnknownScope { scope: String },
    #[error("Unknown hashtag dimension '{0}' (legal ones: PMGL1, PMGL2, PMGL3, PMGL4)")]
    UnknownDimension(String),
    #[error("Invalid slot index {index}: out of range or already bound")]
    InvalidIndex { index: usize },
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),
    #[error("Remote call failed: {0}")]
    RemoteCallFailure(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Ambiguous: {count} records match {what}")]
    Ambiguous { what: String, count: usize },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, AmiError>;

// Helper conversions
impl From<rusqlite::Error> for AmiError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<serde_json::Error> for AmiError {
    fn from(e: serde_json::Error) -> Self { Self::Serialization(e.to_string()) }
}
impl From<config::ConfigError> for AmiError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<std::io::Error> for AmiError {
    fn from(e: std::io::Error) -> Self { Self::Persistence(e.to_string()) }
}
