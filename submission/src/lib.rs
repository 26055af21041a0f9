//! Vote submission for one voter and one election.
//!
//! State machine: `Idle → Validating → Submitting → Submitted | Failed`.
//!
//! - [`SubmissionCoordinator`] is the synchronous state machine. It owns the
//!   [`AnswerStore`](votekit_ballot::AnswerStore) and the anonymous-mode switch,
//!   and is the only place a [`VoteRecord`](votekit_types::VoteRecord) is created.
//! - [`SubmissionSession`] drives it against an
//!   [`ElectionApi`](votekit_client::ElectionApi), guaranteeing at most one
//!   submission in flight.
//! - [`SubmissionListener`] is the collaborator interface notified after a
//!   successful submission (lottery-ticket issuance and the like).

pub mod anonymous;
pub mod coordinator;
pub mod error;
pub mod listener;
pub mod session;

pub use anonymous::AnonymousMode;
pub use coordinator::{
    Begin, SubmissionCoordinator, SubmissionState, SubmitOutcome, SubmitTicket, INTERRUPTED_REASON,
};
pub use error::SubmissionError;
pub use listener::{ChannelListener, NotifyError, SubmissionListener, VoteSubmitted};
pub use session::SubmissionSession;
