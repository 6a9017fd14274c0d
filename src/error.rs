use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsglotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported target language: {requested:?}")]
    UnsupportedLanguage {
        requested: Vec<String>,
        supported: Vec<String>,
    },

    #[error("Invalid language definition: {0}")]
    InvalidLanguageDefinition(String),

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("Malformed request: {0}")]
    RequestMalformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NewsglotError>;
