//! Errors raised while constructing core types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(String),

    #[error("duplicate option id {option} in question {question}")]
    DuplicateOption { question: String, option: String },
}
