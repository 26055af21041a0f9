//! The submission state machine.

use crate::anonymous::AnonymousMode;
use crate::error::SubmissionError;
use crate::listener::{SubmissionListener, VoteSubmitted};
use std::fmt;
use std::sync::Arc;
use votekit_ballot::{AnswerStore, ValidationFailure};
use votekit_client::{ApiError, SubmitVoteRequest, SubmitVoteResponse};
use votekit_types::{Answer, Ballot, ElectionMetadata, OptionId, QuestionId, Timestamp, VoteRecord};

/// Failure reason recorded when a submission is abandoned mid-flight.
pub const INTERRUPTED_REASON: &str = "submission interrupted";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Submitted,
    Failed { reason: String },
}

impl SubmissionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
            Self::Failed { .. } => "failed",
        }
    }

    /// States from which the voter may edit answers and start a submission.
    fn is_open(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. })
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A submission that has passed validation and is waiting on the network.
///
/// The request already carries the anonymous flag captured when the
/// submission started.
#[derive(Debug)]
pub struct SubmitTicket {
    id: u64,
    request: SubmitVoteRequest,
}

impl SubmitTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> &SubmitVoteRequest {
        &self.request
    }
}

/// What a submit request ended in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend acknowledged the vote.
    Submitted(VoteRecord),
    /// Local validation failed; the coordinator is back in `Idle`.
    Invalid(Vec<ValidationFailure>),
    /// The backend rejected the vote; the coordinator is `Failed` and may be retried.
    Failed(String),
    /// Another submission is already in flight; nothing happened.
    InFlight,
    /// This voter already has a vote record for the election.
    AlreadySubmitted(VoteRecord),
}

/// Result of [`SubmissionCoordinator::begin_submit`].
#[derive(Debug)]
pub enum Begin {
    /// Validation passed; send the ticket's request and pass the response to `resolve`.
    Ready(SubmitTicket),
    /// The request settled without touching the network.
    Settled(SubmitOutcome),
}

/// Drives one voter's ballot from answers to a vote record.
pub struct SubmissionCoordinator {
    store: AnswerStore,
    anonymous: AnonymousMode,
    state: SubmissionState,
    record: Option<VoteRecord>,
    lottery_ticket: Option<String>,
    last_failures: Vec<ValidationFailure>,
    next_ticket: u64,
    in_flight: Option<u64>,
    listeners: Vec<Arc<dyn SubmissionListener>>,
}

impl SubmissionCoordinator {
    pub fn new(store: AnswerStore) -> Self {
        let anonymous = AnonymousMode::for_election(store.metadata());
        Self {
            store,
            anonymous,
            state: SubmissionState::Idle,
            record: None,
            lottery_ticket: None,
            last_failures: Vec::new(),
            next_ticket: 1,
            in_flight: None,
            listeners: Vec::new(),
        }
    }

    pub fn for_ballot(ballot: Ballot, metadata: ElectionMetadata) -> Self {
        Self::new(AnswerStore::with_ballot(ballot, metadata))
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SubmissionListener>) {
        self.listeners.push(listener);
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn store(&self) -> &AnswerStore {
        &self.store
    }

    pub fn record(&self) -> Option<&VoteRecord> {
        self.record.as_ref()
    }

    pub fn lottery_ticket(&self) -> Option<&str> {
        self.lottery_ticket.as_deref()
    }

    /// Failures from the most recent validation run.
    pub fn last_failures(&self) -> &[ValidationFailure] {
        &self.last_failures
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    // ── Ballot and answers ──────────────────────────────────────────────

    /// Replace the ballot. Not possible once a vote has been recorded.
    pub fn load_ballot(
        &mut self,
        ballot: Ballot,
        metadata: ElectionMetadata,
    ) -> Result<(), SubmissionError> {
        self.ensure_open()?;
        self.anonymous = AnonymousMode::for_election(&metadata);
        self.store.load_ballot(ballot, metadata);
        self.last_failures.clear();
        self.transition(SubmissionState::Idle);
        Ok(())
    }

    /// Drop the ballot and answers (the voter navigated away).
    pub fn reset_ballot(&mut self) -> Result<(), SubmissionError> {
        self.ensure_open()?;
        self.store.reset_ballot();
        self.anonymous = AnonymousMode::Unsupported;
        self.last_failures.clear();
        self.transition(SubmissionState::Idle);
        Ok(())
    }

    pub fn set_answer(&mut self, question: QuestionId, answer: Answer) -> Result<(), SubmissionError> {
        self.ensure_open()?;
        self.store.set_answer(question, answer)?;
        Ok(())
    }

    pub fn toggle_approval(
        &mut self,
        question: QuestionId,
        option: OptionId,
    ) -> Result<(), SubmissionError> {
        self.ensure_open()?;
        self.store.toggle_approval(question, option)?;
        Ok(())
    }

    pub fn rank(&mut self, question: QuestionId, order: Vec<OptionId>) -> Result<(), SubmissionError> {
        self.ensure_open()?;
        self.store.rank(question, order)?;
        Ok(())
    }

    pub fn clear_answer(&mut self, question: &QuestionId) -> Result<Option<Answer>, SubmissionError> {
        self.ensure_open()?;
        Ok(self.store.clear_answer(question)?)
    }

    pub fn clear_all_answers(&mut self) -> Result<(), SubmissionError> {
        self.ensure_open()?;
        self.store.clear_all_answers()?;
        Ok(())
    }

    // ── Anonymous mode ──────────────────────────────────────────────────

    /// The anonymous switch's value, or `None` when the election has no such control.
    pub fn anonymous_control(&self) -> Option<bool> {
        self.anonymous.control()
    }

    /// Toggle anonymous mode. Only applies while no submission is under way.
    pub fn set_anonymous(&mut self, enabled: bool) -> bool {
        if !self.state.is_open() || self.record.is_some() {
            return false;
        }
        self.anonymous.set(enabled)
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Start a submission: validate, and on success move to `Submitting`.
    pub fn begin_submit(&mut self) -> Result<Begin, SubmissionError> {
        if let Some(record) = &self.record {
            return Ok(Begin::Settled(SubmitOutcome::AlreadySubmitted(record.clone())));
        }
        if self.state == SubmissionState::Submitting {
            tracing::debug!("submit ignored: a submission is already in flight");
            return Ok(Begin::Settled(SubmitOutcome::InFlight));
        }
        let election_id = self
            .store
            .ballot()
            .map(|b| b.election_id.clone())
            .ok_or(SubmissionError::NoBallot)?;

        self.transition(SubmissionState::Validating);
        let failures = self.store.validate();
        self.store.record_errors(&failures);
        self.last_failures = failures.clone();

        if !failures.is_empty() {
            tracing::info!(
                election = %election_id,
                failures = failures.len(),
                "ballot incomplete"
            );
            self.transition(SubmissionState::Idle);
            return Ok(Begin::Settled(SubmitOutcome::Invalid(failures)));
        }

        let request = SubmitVoteRequest::new(
            election_id,
            self.store.answers_in_order(),
            self.anonymous.is_enabled(),
        );
        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        self.transition(SubmissionState::Submitting);
        Ok(Begin::Ready(SubmitTicket { id, request }))
    }

    /// Settle the in-flight submission with the backend's answer.
    pub fn resolve(
        &mut self,
        ticket: SubmitTicket,
        response: Result<SubmitVoteResponse, ApiError>,
    ) -> Result<SubmitOutcome, SubmissionError> {
        if self.in_flight != Some(ticket.id) {
            return Err(SubmissionError::StaleTicket(ticket.id));
        }
        self.in_flight = None;

        match response {
            Ok(ack) => {
                let request = ticket.request;
                let record = VoteRecord::new(
                    request.election_id,
                    ack.voting_id,
                    ack.vote_hash,
                    ack.receipt_id,
                    ack.verification_code,
                    request.anonymous,
                    Timestamp::now(),
                );
                tracing::info!(
                    election = %record.election_id(),
                    voting_id = %record.voting_id(),
                    anonymous = record.is_anonymous(),
                    "vote submitted"
                );
                self.store.freeze();
                self.record = Some(record.clone());
                self.lottery_ticket = ack.lottery_ticket;
                self.transition(SubmissionState::Submitted);
                self.notify(&record);
                Ok(SubmitOutcome::Submitted(record))
            }
            Err(e) => {
                let reason = e.user_message();
                tracing::warn!(error = %e, "vote submission failed");
                self.transition(SubmissionState::Failed {
                    reason: reason.clone(),
                });
                Ok(SubmitOutcome::Failed(reason))
            }
        }
    }

    /// Give up on the in-flight submission whose answer will never arrive.
    ///
    /// Moves to `Failed` so the voter can retry. Returns `false` when
    /// `ticket_id` is not the submission in flight.
    pub fn abandon(&mut self, ticket_id: u64) -> bool {
        if self.in_flight != Some(ticket_id) {
            return false;
        }
        self.in_flight = None;
        tracing::warn!(ticket = ticket_id, "vote submission interrupted before the backend answered");
        self.transition(SubmissionState::Failed {
            reason: INTERRUPTED_REASON.to_string(),
        });
        true
    }

    fn notify(&self, record: &VoteRecord) {
        let event = VoteSubmitted {
            election_id: record.election_id().clone(),
            voting_id: record.voting_id().clone(),
            receipt_id: record.receipt_id().clone(),
            anonymous: record.is_anonymous(),
            lottery_ticket: self.lottery_ticket.clone(),
        };
        for listener in &self.listeners {
            if let Err(e) = listener.vote_submitted(&event) {
                tracing::warn!(listener = listener.name(), "{e}");
            }
        }
    }

    fn ensure_open(&self) -> Result<(), SubmissionError> {
        if self.record.is_some() {
            return Err(SubmissionError::Locked("submitted"));
        }
        match self.state {
            SubmissionState::Validating => Err(SubmissionError::Locked("validating")),
            SubmissionState::Submitting => Err(SubmissionError::Locked("submitting")),
            _ => Ok(()),
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        tracing::debug!(from = %self.state, to = %next, "submission state");
        self.state = next;
    }
}
