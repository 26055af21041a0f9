use crate::method::VerificationMethod;
use thiserror::Error;

/// Problems with the verification inputs or the order of operations.
///
/// Backend failures are not errors here; they become a failed
/// [`VerificationOutcome`](crate::VerificationOutcome).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("choose a verification method first")]
    NoMethod,

    #[error("{method} verification needs a {field}")]
    EmptyField {
        method: VerificationMethod,
        field: &'static str,
    },

    #[error("the current method is {current}, not {requested}")]
    WrongMethod {
        current: VerificationMethod,
        requested: VerificationMethod,
    },

    #[error("a {0} query is already pending")]
    QueryPending(VerificationMethod),

    #[error("a result is showing; reset before starting again")]
    ResultShowing,

    #[error("page {0} is out of range")]
    PageOutOfRange(u32),
}
