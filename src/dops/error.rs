use thiserror::Error;

#[derive(Error, Debug)]
pub enum DopsError {
    #[error("Docker API error: {0}")]
    Source(String),

    #[error("Failed to decode Docker API response: {message} (payload: {excerpt})")]
    Decode { message: String, excerpt: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing format specification for output")]
    MissingFormat,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl DopsError {
    /// Wraps a serde error, keeping the start of the payload that failed to decode.
    pub fn decode(err: serde_json::Error, payload: &str) -> Self {
        const EXCERPT_LEN: usize = 120;
        let mut excerpt: String = payload.chars().take(EXCERPT_LEN).collect();
        if payload.chars().count() > EXCERPT_LEN {
            excerpt.push('…');
        }
        DopsError::Decode {
            message: err.to_string(),
            excerpt,
        }
    }
}

pub type Result<T> = std::result::Result<T, DopsError>;
