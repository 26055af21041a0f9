//! The verification center state machine.
//!
//! ```text
//! ChooseMethod ──select──▶ AwaitingInput ──arm──▶ Pending ──settle──▶ Result
//!      ▲                        │  ▲                 │                  │
//!      └──────── reset ─────────┴──┼─── reset ───────┴──── reset ───────┘
//!                                  └──── select (any state) ────────────
//! ```
//!
//! Only one query is armed at a time. Every arm gets a fresh generation;
//! a response whose generation is no longer pending is dropped on arrival.

use crate::error::VerificationError;
use crate::method::{clamp_page_size, MethodInput, VerificationMethod, VerificationQuery, DEFAULT_PAGE_SIZE};
use crate::outcome::VerificationOutcome;

/// The one query the center may have outstanding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum QuerySlot {
    #[default]
    NoRequest,
    Pending {
        generation: u64,
        query: VerificationQuery,
    },
    Resolved(VerificationOutcome),
}

/// What the center is showing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CenterState<'a> {
    ChooseMethod,
    AwaitingInput(&'a MethodInput),
    Pending(&'a VerificationQuery),
    Result(&'a VerificationOutcome),
}

/// An armed query. Send it, then hand the outcome back to [`VerificationCenter::settle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    query: VerificationQuery,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &VerificationQuery {
        &self.query
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationCenter {
    input: Option<MethodInput>,
    slot: QuerySlot,
    generation: u64,
    page_size: u32,
}

impl Default for VerificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationCenter {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            input: None,
            slot: QuerySlot::NoRequest,
            generation: 0,
            page_size: clamp_page_size(page_size),
        }
    }

    pub fn state(&self) -> CenterState<'_> {
        match (&self.input, &self.slot) {
            (None, _) => CenterState::ChooseMethod,
            (Some(_), QuerySlot::Pending { query, .. }) => CenterState::Pending(query),
            (Some(_), QuerySlot::Resolved(outcome)) => CenterState::Result(outcome),
            (Some(input), QuerySlot::NoRequest) => CenterState::AwaitingInput(input),
        }
    }

    pub fn method(&self) -> Option<VerificationMethod> {
        self.input.as_ref().map(MethodInput::method)
    }

    pub fn input(&self) -> Option<&MethodInput> {
        self.input.as_ref()
    }

    pub fn slot(&self) -> &QuerySlot {
        &self.slot
    }

    /// The settled outcome, if one is showing.
    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        match &self.slot {
            QuerySlot::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.slot, QuerySlot::Pending { .. })
    }

    /// Switch to `method` with blank inputs.
    ///
    /// Whatever was armed or showing before is discarded, including a query
    /// still in flight.
    pub fn select_method(&mut self, method: VerificationMethod) {
        self.disarm();
        tracing::debug!(%method, "verification method selected");
        self.input = Some(MethodInput::empty(method, self.page_size));
    }

    /// Edit the current method's inputs.
    pub fn input_mut(&mut self) -> Result<&mut MethodInput, VerificationError> {
        self.ensure_editable()?;
        self.input.as_mut().ok_or(VerificationError::NoMethod)
    }

    /// Replace the inputs of the current method.
    pub fn set_input(&mut self, input: MethodInput) -> Result<(), VerificationError> {
        let current = self.method().ok_or(VerificationError::NoMethod)?;
        if current != input.method() {
            return Err(VerificationError::WrongMethod {
                current,
                requested: input.method(),
            });
        }
        *self.input_mut()? = input;
        Ok(())
    }

    /// Validate the inputs and arm their query.
    pub fn arm(&mut self) -> Result<QueryTicket, VerificationError> {
        self.ensure_editable()?;
        let query = self
            .input
            .as_ref()
            .ok_or(VerificationError::NoMethod)?
            .to_query()?;
        self.generation += 1;
        tracing::debug!(method = %query.method(), generation = self.generation, "verification query armed");
        self.slot = QuerySlot::Pending {
            generation: self.generation,
            query: query.clone(),
        };
        Ok(QueryTicket {
            generation: self.generation,
            query,
        })
    }

    /// Select, fill in and arm in one step, discarding whatever came before.
    pub fn arm_with(&mut self, input: MethodInput) -> Result<QueryTicket, VerificationError> {
        self.select_method(input.method());
        self.input = Some(input);
        self.arm()
    }

    /// Deliver a query's outcome. Returns `false` when the query was superseded
    /// and the outcome dropped.
    pub fn settle(&mut self, generation: u64, outcome: VerificationOutcome) -> bool {
        let current = matches!(
            &self.slot,
            QuerySlot::Pending { generation: pending, query }
                if *pending == generation && query.method() == outcome.method()
        );
        if !current {
            tracing::debug!(generation, method = %outcome.method(), "discarding superseded verification result");
            return false;
        }
        match outcome.failure() {
            Some(failure) => {
                tracing::info!(method = %failure.method, message = %failure.message, "verification failed")
            }
            None => tracing::info!(method = %outcome.method(), "verification succeeded"),
        }
        self.slot = QuerySlot::Resolved(outcome);
        true
    }

    /// Back to `ChooseMethod` with no inputs and nothing armed.
    pub fn reset(&mut self) {
        if self.input.is_some() || self.slot != QuerySlot::NoRequest {
            tracing::debug!("verification center reset");
        }
        self.input = None;
        self.slot = QuerySlot::NoRequest;
    }

    // ── Bulletin paging ─────────────────────────────────────────────────

    /// Re-arm the bulletin query for the following page.
    pub fn next_page(&mut self) -> Result<QueryTicket, VerificationError> {
        let (page, page_size) = self.bulletin_position()?;
        if let Some(listing) = self.outcome().and_then(VerificationOutcome::bulletin_page) {
            if u64::from(page) * u64::from(page_size) >= listing.total_votes {
                return Err(VerificationError::PageOutOfRange(page + 1));
            }
        }
        self.turn_page(page + 1)
    }

    /// Re-arm the bulletin query for the preceding page.
    pub fn previous_page(&mut self) -> Result<QueryTicket, VerificationError> {
        let (page, _) = self.bulletin_position()?;
        if page <= 1 {
            return Err(VerificationError::PageOutOfRange(0));
        }
        self.turn_page(page - 1)
    }

    fn bulletin_position(&self) -> Result<(u32, u32), VerificationError> {
        match &self.input {
            Some(MethodInput::Bulletin {
                page, page_size, ..
            }) => {
                if let QuerySlot::Pending { query, .. } = &self.slot {
                    return Err(VerificationError::QueryPending(query.method()));
                }
                Ok((*page, *page_size))
            }
            Some(other) => Err(VerificationError::WrongMethod {
                current: other.method(),
                requested: VerificationMethod::Bulletin,
            }),
            None => Err(VerificationError::NoMethod),
        }
    }

    fn turn_page(&mut self, to: u32) -> Result<QueryTicket, VerificationError> {
        if let Some(MethodInput::Bulletin { page, .. }) = self.input.as_mut() {
            *page = to;
        }
        self.slot = QuerySlot::NoRequest;
        self.arm()
    }

    fn ensure_editable(&self) -> Result<(), VerificationError> {
        match &self.slot {
            QuerySlot::NoRequest => Ok(()),
            QuerySlot::Pending { query, .. } => Err(VerificationError::QueryPending(query.method())),
            QuerySlot::Resolved(_) => Err(VerificationError::ResultShowing),
        }
    }

    fn disarm(&mut self) {
        if let QuerySlot::Pending { generation, query } = &self.slot {
            tracing::debug!(generation, method = %query.method(), "verification query superseded");
        }
        self.slot = QuerySlot::NoRequest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votekit_client::{ApiError, BulletinBoardPage, VoteLookup};

    fn lookup() -> VoteLookup {
        VoteLookup {
            election_title: "Board".into(),
            voting_id: "v1".into(),
            vote_hash: "h1".into(),
        }
    }

    fn page(total: u64) -> BulletinBoardPage {
        BulletinBoardPage {
            election_title: "Board".into(),
            total_votes: total,
            votes: Vec::new(),
        }
    }

    #[test]
    fn starts_in_choose_method() {
        let center = VerificationCenter::new();
        assert_eq!(center.state(), CenterState::ChooseMethod);
        assert_eq!(center.method(), None);
    }

    #[test]
    fn arm_requires_a_method() {
        let mut center = VerificationCenter::new();
        assert_eq!(center.arm(), Err(VerificationError::NoMethod));
    }

    #[test]
    fn receipt_flow_reaches_result() {
        let mut center = VerificationCenter::new();
        center.select_method(VerificationMethod::Receipt);
        assert!(matches!(center.state(), CenterState::AwaitingInput(_)));

        center.set_input(MethodInput::receipt("r1")).unwrap();
        let ticket = center.arm().unwrap();
        assert_eq!(ticket.query(), &VerificationQuery::Receipt("r1".into()));
        assert!(matches!(center.state(), CenterState::Pending(_)));

        assert!(center.settle(ticket.generation(), VerificationOutcome::receipt(Ok(lookup()))));
        let CenterState::Result(outcome) = center.state() else {
            panic!("expected result");
        };
        assert_eq!(outcome.lookup(), Some(&lookup()));
    }

    #[test]
    fn server_error_becomes_a_failed_result() {
        let mut center = VerificationCenter::new();
        let ticket = center.arm_with(MethodInput::receipt("r1")).unwrap();
        center.settle(
            ticket.generation(),
            VerificationOutcome::receipt(Err(ApiError::Status {
                status: 404,
                message: "Receipt not found".into(),
            })),
        );
        let outcome = center.outcome().unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.failure().unwrap().message, "Receipt not found");
    }

    #[test]
    fn switching_method_discards_pending_result() {
        let mut center = VerificationCenter::new();
        let receipt = center.arm_with(MethodInput::receipt("r1")).unwrap();
        center.select_method(VerificationMethod::Hash);

        let late = VerificationOutcome::receipt(Err(ApiError::Status {
            status: 500,
            message: "boom".into(),
        }));
        assert!(!center.settle(receipt.generation(), late));
        assert_eq!(
            center.state(),
            CenterState::AwaitingInput(&MethodInput::hash(""))
        );
    }

    #[test]
    fn reset_discards_pending_result() {
        let mut center = VerificationCenter::new();
        let ticket = center.arm_with(MethodInput::hash("h1")).unwrap();
        center.reset();
        assert!(!center.settle(ticket.generation(), VerificationOutcome::hash(Ok(lookup()))));
        assert_eq!(center.state(), CenterState::ChooseMethod);
    }

    #[test]
    fn rearming_the_same_method_drops_the_older_response() {
        let mut center = VerificationCenter::new();
        let first = center.arm_with(MethodInput::hash("old")).unwrap();
        let second = center.arm_with(MethodInput::hash("new")).unwrap();
        assert_ne!(first.generation(), second.generation());
        assert!(!center.settle(first.generation(), VerificationOutcome::hash(Ok(lookup()))));
        assert!(center.is_pending());
        assert!(center.settle(second.generation(), VerificationOutcome::hash(Ok(lookup()))));
    }

    #[test]
    fn outcome_for_another_method_is_dropped() {
        let mut center = VerificationCenter::new();
        let ticket = center.arm_with(MethodInput::hash("h1")).unwrap();
        assert!(!center.settle(ticket.generation(), VerificationOutcome::receipt(Ok(lookup()))));
        assert!(center.is_pending());
    }

    #[test]
    fn reset_twice_equals_reset_once() {
        let mut center = VerificationCenter::new();
        center.arm_with(MethodInput::anonymous("r1", "t1", "c1")).unwrap();
        center.reset();
        let once = center.clone();
        center.reset();
        assert_eq!(center, once);
        assert_eq!(center.state(), CenterState::ChooseMethod);
        assert_eq!(center.input(), None);
    }

    #[test]
    fn inputs_are_locked_while_pending_and_showing() {
        let mut center = VerificationCenter::new();
        let ticket = center.arm_with(MethodInput::receipt("r1")).unwrap();
        assert_eq!(
            center.input_mut().err(),
            Some(VerificationError::QueryPending(VerificationMethod::Receipt))
        );
        center.settle(ticket.generation(), VerificationOutcome::receipt(Ok(lookup())));
        assert_eq!(center.arm().err(), Some(VerificationError::ResultShowing));
    }

    #[test]
    fn selecting_a_method_never_reuses_old_inputs() {
        let mut center = VerificationCenter::new();
        center.select_method(VerificationMethod::Receipt);
        center.set_input(MethodInput::receipt("r1")).unwrap();
        center.select_method(VerificationMethod::Receipt);
        assert_eq!(center.input(), Some(&MethodInput::receipt("")));
    }

    #[test]
    fn set_input_rejects_other_method() {
        let mut center = VerificationCenter::new();
        center.select_method(VerificationMethod::Receipt);
        assert_eq!(
            center.set_input(MethodInput::hash("h1")),
            Err(VerificationError::WrongMethod {
                current: VerificationMethod::Receipt,
                requested: VerificationMethod::Hash
            })
        );
    }

    #[test]
    fn bulletin_paging() {
        let mut center = VerificationCenter::with_page_size(10);
        center.select_method(VerificationMethod::Bulletin);
        if let MethodInput::Bulletin { election_id, .. } = center.input_mut().unwrap() {
            *election_id = "e1".into();
        }
        let first = center.arm().unwrap();
        assert_eq!(
            first.query(),
            &VerificationQuery::Bulletin {
                election: "e1".into(),
                page: 1,
                limit: 10
            }
        );
        assert!(matches!(
            center.next_page(),
            Err(VerificationError::QueryPending(_))
        ));
        center.settle(first.generation(), VerificationOutcome::bulletin(Ok(page(25))));
        assert_eq!(center.previous_page(), Err(VerificationError::PageOutOfRange(0)));

        let second = center.next_page().unwrap();
        assert!(matches!(second.query(), VerificationQuery::Bulletin { page: 2, .. }));
        center.settle(second.generation(), VerificationOutcome::bulletin(Ok(page(25))));

        let third = center.next_page().unwrap();
        center.settle(third.generation(), VerificationOutcome::bulletin(Ok(page(25))));
        assert_eq!(center.next_page(), Err(VerificationError::PageOutOfRange(4)));

        let back = center.previous_page().unwrap();
        assert!(matches!(back.query(), VerificationQuery::Bulletin { page: 2, .. }));
    }

    #[test]
    fn paging_other_methods_is_an_error() {
        let mut center = VerificationCenter::new();
        center.select_method(VerificationMethod::Hash);
        assert!(matches!(
            center.next_page(),
            Err(VerificationError::WrongMethod { .. })
        ));
    }
}
