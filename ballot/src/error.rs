use thiserror::Error;
use votekit_types::VotingType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no ballot is loaded")]
    NoBallot,

    #[error("question {0} is not part of the loaded ballot")]
    UnknownQuestion(String),

    #[error("option {option} is not an option of question {question}")]
    UnknownOption { question: String, option: String },

    #[error("answer shape {got} does not match ballot voting type {expected}")]
    WrongShape { expected: VotingType, got: VotingType },

    #[error("answers are locked after submission")]
    Frozen,
}
