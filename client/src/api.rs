//! The backend contract.

use crate::error::ApiError;
use crate::wire::{
    AnonymousProofRequest, AnonymousVerification, BulletinBoardPage, ElectionBallot,
    ResultsSnapshot, SubmitVoteRequest, SubmitVoteResponse, VoteLookup,
};
use std::future::Future;
use votekit_types::{ElectionId, QuestionId, ReceiptId, VoteHash};

/// Everything the client engine asks of the election backend.
///
/// The backend owns vote hashing, receipt issuance and the zero-knowledge
/// machinery; the client only ever forwards inputs and reads back results.
pub trait ElectionApi: Send + Sync {
    /// `GET /elections/{electionId}`
    fn fetch_election(
        &self,
        election: &ElectionId,
    ) -> impl Future<Output = Result<ElectionBallot, ApiError>> + Send;

    /// `POST /votes`
    fn submit_vote(
        &self,
        request: &SubmitVoteRequest,
    ) -> impl Future<Output = Result<SubmitVoteResponse, ApiError>> + Send;

    /// `GET /verify/receipt/{receiptId}`
    fn verify_receipt(
        &self,
        receipt: &ReceiptId,
    ) -> impl Future<Output = Result<VoteLookup, ApiError>> + Send;

    /// `GET /verify/hash/{voteHash}`
    fn verify_hash(
        &self,
        hash: &VoteHash,
    ) -> impl Future<Output = Result<VoteLookup, ApiError>> + Send;

    /// `GET /bulletin-board/{electionId}?page&limit`
    fn bulletin_board(
        &self,
        election: &ElectionId,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<BulletinBoardPage, ApiError>> + Send;

    /// `POST /verify/anonymous-vote`
    fn verify_anonymous(
        &self,
        request: &AnonymousProofRequest,
    ) -> impl Future<Output = Result<AnonymousVerification, ApiError>> + Send;

    /// `GET /results?electionId&questionId`
    fn live_results(
        &self,
        election: &ElectionId,
        question: Option<&QuestionId>,
    ) -> impl Future<Output = Result<ResultsSnapshot, ApiError>> + Send;
}
