use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("receipt serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write receipt: {0}")]
    Io(#[from] std::io::Error),
}
