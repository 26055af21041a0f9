//! Async driver for [`VerificationCenter`].

use crate::center::{QueryTicket, VerificationCenter};
use crate::error::VerificationError;
use crate::method::{MethodInput, VerificationQuery};
use crate::outcome::VerificationOutcome;
use tokio::sync::{Mutex, MutexGuard};
use votekit_client::ElectionApi;

/// Send `query` and fold the backend's answer into an outcome.
pub async fn run_query<A: ElectionApi>(api: &A, query: &VerificationQuery) -> VerificationOutcome {
    match query {
        VerificationQuery::Receipt(receipt) => {
            VerificationOutcome::receipt(api.verify_receipt(receipt).await)
        }
        VerificationQuery::Hash(hash) => VerificationOutcome::hash(api.verify_hash(hash).await),
        VerificationQuery::Bulletin {
            election,
            page,
            limit,
        } => VerificationOutcome::bulletin(api.bulletin_board(election, *page, *limit).await),
        VerificationQuery::Anonymous(request) => {
            VerificationOutcome::anonymous(api.verify_anonymous(request).await)
        }
    }
}

/// Shares a [`VerificationCenter`] between the UI and in-flight queries.
///
/// Arming happens under the lock; the query itself runs without it, so the
/// voter can switch method or reset while a response is outstanding.
#[derive(Default)]
pub struct VerificationDriver {
    center: Mutex<VerificationCenter>,
}

impl VerificationDriver {
    pub fn new(center: VerificationCenter) -> Self {
        Self {
            center: Mutex::new(center),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, VerificationCenter> {
        self.center.lock().await
    }

    /// Fire the query for the inputs already entered.
    ///
    /// Returns `None` when the center moved on before the response arrived.
    pub async fn fire<A: ElectionApi>(
        &self,
        api: &A,
    ) -> Result<Option<VerificationOutcome>, VerificationError> {
        let ticket = self.center.lock().await.arm()?;
        Ok(self.complete(api, ticket).await)
    }

    /// Select the input's method, fill it in, and fire, discarding anything before.
    pub async fn verify<A: ElectionApi>(
        &self,
        api: &A,
        input: MethodInput,
    ) -> Result<Option<VerificationOutcome>, VerificationError> {
        let ticket = self.center.lock().await.arm_with(input)?;
        Ok(self.complete(api, ticket).await)
    }

    pub async fn next_page<A: ElectionApi>(
        &self,
        api: &A,
    ) -> Result<Option<VerificationOutcome>, VerificationError> {
        let ticket = self.center.lock().await.next_page()?;
        Ok(self.complete(api, ticket).await)
    }

    pub async fn previous_page<A: ElectionApi>(
        &self,
        api: &A,
    ) -> Result<Option<VerificationOutcome>, VerificationError> {
        let ticket = self.center.lock().await.previous_page()?;
        Ok(self.complete(api, ticket).await)
    }

    pub async fn reset(&self) {
        self.center.lock().await.reset();
    }

    async fn complete<A: ElectionApi>(
        &self,
        api: &A,
        ticket: QueryTicket,
    ) -> Option<VerificationOutcome> {
        let outcome = run_query(api, ticket.query()).await;
        let mut center = self.center.lock().await;
        if center.settle(ticket.generation(), outcome) {
            center.outcome().cloned()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::center::CenterState;
    use crate::method::VerificationMethod;
    use std::sync::Arc;
    use votekit_client::{
        AnonymousVerification, ApiError, BulletinBoardPage, BulletinEntry, VoteLookup,
    };
    use votekit_nullables::{Endpoint, NullElectionApi};

    fn lookup() -> VoteLookup {
        VoteLookup {
            election_title: "Board".into(),
            voting_id: "v1".into(),
            vote_hash: "h1".into(),
        }
    }

    #[tokio::test]
    async fn receipt_lookup_succeeds() {
        let api = NullElectionApi::new();
        api.set_receipt("r1", Ok(lookup()));
        let driver = VerificationDriver::default();

        let outcome = driver
            .verify(&api, MethodInput::receipt("r1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.lookup(), Some(&lookup()));
        assert_eq!(api.calls(Endpoint::Receipt), 1);
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_backend() {
        let api = NullElectionApi::new();
        let driver = VerificationDriver::default();
        let err = driver
            .verify(&api, MethodInput::anonymous("r1", "t1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, VerificationError::EmptyField { field: "verification code", .. }));
        assert_eq!(api.total_calls(), 0);
        assert!(matches!(driver.lock().await.state(), CenterState::AwaitingInput(_)));
    }

    #[tokio::test]
    async fn receipt_error_then_switch_discards_it() {
        let api = Arc::new(NullElectionApi::new());
        api.set_receipt(
            "r1",
            Err(ApiError::Status {
                status: 404,
                message: "Receipt not found".into(),
            }),
        );
        let gate = api.gate(Endpoint::Receipt);
        let driver = Arc::new(VerificationDriver::default());

        let pending = {
            let (api, driver) = (Arc::clone(&api), Arc::clone(&driver));
            tokio::spawn(async move { driver.verify(api.as_ref(), MethodInput::receipt("r1")).await })
        };
        api.wait_for_calls(1).await;
        driver.lock().await.select_method(VerificationMethod::Hash);

        gate.release();
        assert_eq!(pending.await.unwrap(), Ok(None));
        let center = driver.lock().await;
        assert_eq!(center.method(), Some(VerificationMethod::Hash));
        assert!(matches!(center.state(), CenterState::AwaitingInput(_)));
    }

    #[tokio::test]
    async fn receipt_error_is_shown_with_server_message() {
        let api = NullElectionApi::new();
        api.set_receipt(
            "r1",
            Err(ApiError::Status {
                status: 404,
                message: "Receipt not found".into(),
            }),
        );
        let driver = VerificationDriver::default();
        let outcome = driver
            .verify(&api, MethodInput::receipt("r1"))
            .await
            .unwrap()
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.failure().unwrap().message, "Receipt not found");
    }

    #[tokio::test]
    async fn reset_while_pending_leaves_center_empty() {
        let api = Arc::new(NullElectionApi::new());
        api.set_hash("h1", Ok(lookup()));
        let gate = api.gate(Endpoint::Hash);
        let driver = Arc::new(VerificationDriver::default());

        let pending = {
            let (api, driver) = (Arc::clone(&api), Arc::clone(&driver));
            tokio::spawn(async move { driver.verify(api.as_ref(), MethodInput::hash("h1")).await })
        };
        api.wait_for_calls(1).await;
        driver.reset().await;
        gate.release();

        assert_eq!(pending.await.unwrap(), Ok(None));
        assert_eq!(driver.lock().await.state(), CenterState::ChooseMethod);
    }

    #[tokio::test]
    async fn bulletin_pages_through_the_board() {
        let api = NullElectionApi::new();
        api.set_bulletin(
            "e1",
            Ok(BulletinBoardPage {
                election_title: "Board".into(),
                total_votes: 3,
                votes: vec![BulletinEntry {
                    voting_id: "v1".into(),
                    receipt_id: "r1".into(),
                    anonymous: true,
                }],
            }),
        );
        let driver = VerificationDriver::default();
        let first = driver
            .verify(&api, MethodInput::bulletin("e1", 1, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.bulletin_page().unwrap().total_votes, 3);

        driver.next_page(&api).await.unwrap();
        assert_eq!(
            driver.next_page(&api).await,
            Err(VerificationError::PageOutOfRange(3))
        );
        driver.previous_page(&api).await.unwrap();
        assert_eq!(
            api.bulletin_queries(),
            vec![("e1".into(), 1, 2), ("e1".into(), 2, 2), ("e1".into(), 1, 2)]
        );
    }

    #[tokio::test]
    async fn anonymous_proof_round_trip() {
        let api = NullElectionApi::new();
        api.set_anonymous(Ok(AnonymousVerification {
            is_valid: true,
            election_title: Some("Board".into()),
            verified_at: Some("2024-03-01T10:00:00Z".into()),
            message: None,
        }));
        let driver = VerificationDriver::default();
        driver.lock().await.select_method(VerificationMethod::Anonymous);
        driver
            .lock()
            .await
            .set_input(MethodInput::anonymous("r1", "t1", "c1"))
            .unwrap();
        let outcome = driver.fire(&api).await.unwrap().unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.method(), VerificationMethod::Anonymous);
    }
}
