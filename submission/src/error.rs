use thiserror::Error;
use votekit_ballot::StoreError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("no ballot is loaded")]
    NoBallot,

    #[error("answers cannot change while a submission is {0}")]
    Locked(&'static str),

    #[error("submission ticket {0} is not the one in flight")]
    StaleTicket(u64),

    #[error("answer store error: {0}")]
    Store(#[from] StoreError),
}
