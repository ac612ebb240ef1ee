use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyGraphError {
    #[error("Format error: {0}")]
    Format(String),
    #[error("Schema error: {message}")]
    Schema { message: String, row: Option<usize> },
    #[error("Attribute error: record has no attribute '{0}'")]
    Attribute(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, SurveyGraphError>;

// Helper conversions
impl From<config::ConfigError> for SurveyGraphError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for SurveyGraphError {
    fn from(e: serde_json::Error) -> Self { Self::Render(e.to_string()) }
}
