//! Client side of the election backend.
//!
//! [`ElectionApi`] is the contract every network-facing component is written
//! against: vote submission, the four verification queries, and live results.
//! [`HttpElectionClient`] implements it over HTTP with `reqwest`; tests use
//! the scripted implementation from `votekit-nullables`.

pub mod api;
pub mod error;
pub mod http;
pub mod wire;

pub use api::ElectionApi;
pub use error::ApiError;
pub use http::HttpElectionClient;
pub use wire::{
    AnonymousProofRequest, AnonymousVerification, BulletinBoardPage, BulletinEntry,
    ElectionBallot, OptionTally, QuestionTally, ResultsSnapshot, SubmitVoteRequest,
    SubmitVoteResponse, VoteLookup, WireAnswer,
};
