//! Proving a past vote.
//!
//! The [`VerificationCenter`] is independent of submission. The voter picks
//! one of four [`VerificationMethod`]s, fills in its inputs, and the center
//! arms exactly one query. Responses that arrive after the voter switched
//! method or reset are discarded, so the result on screen always belongs to
//! the most recently armed query.
//!
//! [`VerificationDriver`] runs armed queries against an
//! [`ElectionApi`](votekit_client::ElectionApi).

pub mod center;
pub mod driver;
pub mod error;
pub mod method;
pub mod outcome;

pub use center::{CenterState, QuerySlot, QueryTicket, VerificationCenter};
pub use driver::{run_query, VerificationDriver};
pub use error::VerificationError;
pub use method::{MethodInput, VerificationMethod, VerificationQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use outcome::{VerificationFailure, VerificationOutcome};
