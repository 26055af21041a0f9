//! In-progress ballot state for one voter.
//!
//! - [`AnswerStore`] holds the loaded ballot and the voter's per-question answers.
//! - [`validate`] checks those answers against the ballot's voting-type rules.
//!
//! The validator is a pure function; deciding what to do with its output
//! (storing per-question errors, blocking submission) is left to the caller.

pub mod error;
pub mod store;
pub mod validator;

pub use error::StoreError;
pub use store::AnswerStore;
pub use validator::{validate, ValidationFailure, ValidationKind};
