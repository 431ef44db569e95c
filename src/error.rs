use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeraldError>;

#[derive(Debug, Error)]
pub enum HeraldError {
    /// Source data could not be fetched. Callers degrade to a "no data" notice.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Malformed price or ratio. Nothing may be sent based on these numbers.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Delivery error (status {status}): {message}")]
    Delivery { status: u16, message: String },

    #[error("Transform error: {0}")]
    Transform(String),
}

impl From<reqwest::Error> for HeraldError {
    fn from(err: reqwest::Error) -> Self {
        HeraldError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for HeraldError {
    fn from(err: serde_json::Error) -> Self {
        HeraldError::Fetch(err.to_string())
    }
}
