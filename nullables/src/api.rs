//! Nullable election backend with scripted responses and no network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::watch;
use votekit_client::{
    AnonymousProofRequest, AnonymousVerification, ApiError, BulletinBoardPage, ElectionApi,
    ElectionBallot, ResultsSnapshot, SubmitVoteRequest, SubmitVoteResponse, VoteLookup,
};
use votekit_types::{ElectionId, QuestionId, ReceiptId, VoteHash};

/// The backend endpoints, for gating and call accounting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FetchElection,
    Submit,
    Receipt,
    Hash,
    Bulletin,
    Anonymous,
    Results,
}

/// Holds every request to one endpoint until [`Gate::release`] is called.
#[derive(Clone)]
pub struct Gate {
    tx: watch::Sender<bool>,
}

impl Gate {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn release(&self) {
        self.tx.send_replace(true);
    }

    async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

#[derive(Default)]
struct Script {
    elections: HashMap<ElectionId, ElectionBallot>,
    submits: VecDeque<Result<SubmitVoteResponse, ApiError>>,
    receipts: HashMap<ReceiptId, Result<VoteLookup, ApiError>>,
    hashes: HashMap<VoteHash, Result<VoteLookup, ApiError>>,
    bulletins: HashMap<ElectionId, Result<BulletinBoardPage, ApiError>>,
    anonymous: Option<Result<AnonymousVerification, ApiError>>,
    results: VecDeque<Result<ResultsSnapshot, ApiError>>,
    gates: HashMap<Endpoint, Gate>,
}

#[derive(Default)]
struct Journal {
    calls: Vec<Endpoint>,
    submitted: Vec<SubmitVoteRequest>,
    bulletin_queries: Vec<(ElectionId, u32, u32)>,
    result_queries: Vec<(ElectionId, Option<QuestionId>)>,
}

/// A test backend that answers from a script instead of the network.
///
/// Unscripted queries fail with HTTP 404. Submission responses are consumed
/// in order; the last scripted results snapshot is repeated forever.
pub struct NullElectionApi {
    script: Mutex<Script>,
    journal: Mutex<Journal>,
    call_count: watch::Sender<usize>,
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

impl NullElectionApi {
    pub fn new() -> Self {
        let (call_count, _) = watch::channel(0);
        Self {
            script: Mutex::new(Script::default()),
            journal: Mutex::new(Journal::default()),
            call_count,
        }
    }

    // ── Scripting ───────────────────────────────────────────────────────

    pub fn with_election(self, election: ElectionBallot) -> Self {
        self.script
            .lock()
            .unwrap()
            .elections
            .insert(election.ballot.election_id.clone(), election);
        self
    }

    pub fn push_submit(&self, response: Result<SubmitVoteResponse, ApiError>) {
        self.script.lock().unwrap().submits.push_back(response);
    }

    pub fn set_receipt(&self, receipt: impl Into<ReceiptId>, response: Result<VoteLookup, ApiError>) {
        self.script
            .lock()
            .unwrap()
            .receipts
            .insert(receipt.into(), response);
    }

    pub fn set_hash(&self, hash: impl Into<VoteHash>, response: Result<VoteLookup, ApiError>) {
        self.script.lock().unwrap().hashes.insert(hash.into(), response);
    }

    pub fn set_bulletin(
        &self,
        election: impl Into<ElectionId>,
        response: Result<BulletinBoardPage, ApiError>,
    ) {
        self.script
            .lock()
            .unwrap()
            .bulletins
            .insert(election.into(), response);
    }

    pub fn set_anonymous(&self, response: Result<AnonymousVerification, ApiError>) {
        self.script.lock().unwrap().anonymous = Some(response);
    }

    pub fn push_results(&self, response: Result<ResultsSnapshot, ApiError>) {
        self.script.lock().unwrap().results.push_back(response);
    }

    /// Hold every future request to `endpoint` until the returned gate is released.
    pub fn gate(&self, endpoint: Endpoint) -> Gate {
        let gate = Gate::new();
        self.script
            .lock()
            .unwrap()
            .gates
            .insert(endpoint, gate.clone());
        gate
    }

    // ── Assertions ──────────────────────────────────────────────────────

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.journal
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|e| **e == endpoint)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        *self.call_count.borrow()
    }

    pub fn submitted(&self) -> Vec<SubmitVoteRequest> {
        self.journal.lock().unwrap().submitted.clone()
    }

    pub fn bulletin_queries(&self) -> Vec<(ElectionId, u32, u32)> {
        self.journal.lock().unwrap().bulletin_queries.clone()
    }

    pub fn result_queries(&self) -> Vec<(ElectionId, Option<QuestionId>)> {
        self.journal.lock().unwrap().result_queries.clone()
    }

    /// Wait until at least `n` requests (to any endpoint) have arrived.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.call_count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    fn record(&self, endpoint: Endpoint) -> Option<Gate> {
        self.journal.lock().unwrap().calls.push(endpoint);
        self.call_count.send_modify(|c| *c += 1);
        self.script.lock().unwrap().gates.get(&endpoint).cloned()
    }

    async fn enter(&self, endpoint: Endpoint) {
        if let Some(gate) = self.record(endpoint) {
            gate.wait().await;
        }
    }
}

impl Default for NullElectionApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ElectionApi for NullElectionApi {
    async fn fetch_election(&self, election: &ElectionId) -> Result<ElectionBallot, ApiError> {
        self.enter(Endpoint::FetchElection).await;
        self.script
            .lock()
            .unwrap()
            .elections
            .get(election)
            .cloned()
            .ok_or_else(|| not_found("election"))
    }

    async fn submit_vote(
        &self,
        request: &SubmitVoteRequest,
    ) -> Result<SubmitVoteResponse, ApiError> {
        self.journal.lock().unwrap().submitted.push(request.clone());
        self.enter(Endpoint::Submit).await;
        self.script
            .lock()
            .unwrap()
            .submits
            .pop_front()
            .unwrap_or_else(|| Err(not_found("election")))
    }

    async fn verify_receipt(&self, receipt: &ReceiptId) -> Result<VoteLookup, ApiError> {
        self.enter(Endpoint::Receipt).await;
        self.script
            .lock()
            .unwrap()
            .receipts
            .get(receipt)
            .cloned()
            .unwrap_or_else(|| Err(not_found("receipt")))
    }

    async fn verify_hash(&self, hash: &VoteHash) -> Result<VoteLookup, ApiError> {
        self.enter(Endpoint::Hash).await;
        self.script
            .lock()
            .unwrap()
            .hashes
            .get(hash)
            .cloned()
            .unwrap_or_else(|| Err(not_found("vote")))
    }

    async fn bulletin_board(
        &self,
        election: &ElectionId,
        page: u32,
        limit: u32,
    ) -> Result<BulletinBoardPage, ApiError> {
        self.journal
            .lock()
            .unwrap()
            .bulletin_queries
            .push((election.clone(), page, limit));
        self.enter(Endpoint::Bulletin).await;
        self.script
            .lock()
            .unwrap()
            .bulletins
            .get(election)
            .cloned()
            .unwrap_or_else(|| Err(not_found("election")))
    }

    async fn verify_anonymous(
        &self,
        _request: &AnonymousProofRequest,
    ) -> Result<AnonymousVerification, ApiError> {
        self.enter(Endpoint::Anonymous).await;
        self.script
            .lock()
            .unwrap()
            .anonymous
            .clone()
            .unwrap_or_else(|| Err(not_found("receipt")))
    }

    async fn live_results(
        &self,
        election: &ElectionId,
        question: Option<&QuestionId>,
    ) -> Result<ResultsSnapshot, ApiError> {
        self.journal
            .lock()
            .unwrap()
            .result_queries
            .push((election.clone(), question.cloned()));
        self.enter(Endpoint::Results).await;
        let mut script = self.script.lock().unwrap();
        if script.results.len() > 1 {
            script.results.pop_front().unwrap_or_else(|| Ok(ResultsSnapshot::default()))
        } else {
            script
                .results
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(ResultsSnapshot::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn lookup() -> VoteLookup {
        VoteLookup {
            election_title: "Board".into(),
            voting_id: "v1".into(),
            vote_hash: "h1".into(),
        }
    }

    #[tokio::test]
    async fn unscripted_queries_fail_with_404() {
        let api = NullElectionApi::new();
        let err = api.verify_receipt(&ReceiptId::new("r1")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(api.calls(Endpoint::Receipt), 1);
    }

    #[tokio::test]
    async fn scripted_receipt_is_returned() {
        let api = NullElectionApi::new();
        api.set_receipt("r1", Ok(lookup()));
        assert_eq!(api.verify_receipt(&ReceiptId::new("r1")).await, Ok(lookup()));
    }

    #[tokio::test]
    async fn gate_holds_request_until_released() {
        let api = Arc::new(NullElectionApi::new());
        api.set_hash("h1", Ok(lookup()));
        let gate = api.gate(Endpoint::Hash);

        let task = {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.verify_hash(&VoteHash::new("h1")).await })
        };
        api.wait_for_calls(1).await;
        assert!(!task.is_finished());

        gate.release();
        assert_eq!(task.await.unwrap(), Ok(lookup()));
    }

    #[tokio::test]
    async fn last_results_snapshot_repeats() {
        let api = NullElectionApi::new();
        api.push_results(Ok(ResultsSnapshot::default()));
        let e = ElectionId::new("e1");
        assert!(api.live_results(&e, None).await.is_ok());
        assert!(api.live_results(&e, None).await.is_ok());
        assert_eq!(api.result_queries().len(), 2);
    }
}
