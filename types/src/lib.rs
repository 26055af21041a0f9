//! Fundamental types for the votekit election client.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, ballots and their questions, answers, vote records, and timestamps.

pub mod answer;
pub mod ballot;
pub mod error;
pub mod ids;
pub mod record;
pub mod time;

pub use answer::Answer;
pub use ballot::{Ballot, BallotOption, ElectionMetadata, Question, VotingType};
pub use error::TypesError;
pub use ids::{ElectionId, OptionId, QuestionId, ReceiptId, VerificationCode, VoteHash, VotingId};
pub use record::VoteRecord;
pub use time::Timestamp;
