use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiaryError>;

#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DiaryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// NotFound for an entry id, with the message surfaced to clients.
    pub fn entry_not_found(id: &str) -> Self {
        Self::NotFound(format!("Entry with ID {id} not found"))
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to return to an HTTP client. Internal details stay in the log.
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}
