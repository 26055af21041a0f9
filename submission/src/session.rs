//! Async driver for [`SubmissionCoordinator`].

use crate::coordinator::{Begin, SubmissionCoordinator, SubmitOutcome};
use crate::error::SubmissionError;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use votekit_ballot::AnswerStore;
use votekit_client::{ApiError, ElectionApi};
use votekit_types::ElectionId;

/// Shares a coordinator between UI-side callers and the network.
///
/// The lock is only held while the state machine changes, never across the
/// backend request, so answers and status can be read while a vote is in flight.
pub struct SubmissionSession {
    coordinator: Arc<Mutex<SubmissionCoordinator>>,
}

impl SubmissionSession {
    pub fn new(coordinator: SubmissionCoordinator) -> Self {
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
        }
    }

    /// Fetch an election's ballot and start a fresh session for it.
    pub async fn open<A: ElectionApi>(api: &A, election: &ElectionId) -> Result<Self, ApiError> {
        let fetched = api.fetch_election(election).await?;
        tracing::info!(
            election = %election,
            questions = fetched.ballot.questions.len(),
            voting_type = %fetched.ballot.voting_type,
            "ballot loaded"
        );
        Ok(Self::new(SubmissionCoordinator::new(AnswerStore::with_ballot(
            fetched.ballot,
            fetched.metadata,
        ))))
    }

    pub async fn lock(&self) -> MutexGuard<'_, SubmissionCoordinator> {
        self.coordinator.lock().await
    }

    /// Validate and submit the current answers.
    ///
    /// A call made while another is in flight returns [`SubmitOutcome::InFlight`]
    /// without contacting the backend.
    ///
    /// Dropping the returned future before the backend answers (a timeout,
    /// a losing `select!` branch, an aborted task) leaves the coordinator in
    /// `Failed` with [`INTERRUPTED_REASON`](crate::INTERRUPTED_REASON), so a
    /// later call can retry.
    pub async fn submit<A: ElectionApi>(&self, api: &A) -> Result<SubmitOutcome, SubmissionError> {
        let ticket = match self.coordinator.lock().await.begin_submit()? {
            Begin::Ready(ticket) => ticket,
            Begin::Settled(outcome) => return Ok(outcome),
        };
        let mut pending = PendingSubmit {
            coordinator: Arc::clone(&self.coordinator),
            ticket: Some(ticket.id()),
        };

        let response = api.submit_vote(ticket.request()).await;
        let mut coordinator = self.coordinator.lock().await;
        pending.ticket = None;
        coordinator.resolve(ticket, response)
    }
}

/// Abandons its ticket on drop unless the submission was resolved first.
struct PendingSubmit {
    coordinator: Arc<Mutex<SubmissionCoordinator>>,
    ticket: Option<u64>,
}

impl Drop for PendingSubmit {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        if let Ok(mut coordinator) = self.coordinator.try_lock() {
            coordinator.abandon(ticket);
            return;
        }
        // Someone holds the lock; settle from a task once it is released.
        let coordinator = Arc::clone(&self.coordinator);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    coordinator.lock().await.abandon(ticket);
                });
            }
            Err(_) => tracing::warn!(ticket, "no runtime to abandon interrupted submission"),
        }
    }
}
