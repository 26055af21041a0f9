use proptest::prelude::*;

use votekit_client::{ApiError, SubmitVoteResponse};
use votekit_submission::{Begin, SubmissionCoordinator, SubmissionState, SubmitOutcome};
use votekit_types::{Answer, Ballot, BallotOption, ElectionMetadata, Question, VotingType};

fn coordinator(supports_anonymous: bool) -> SubmissionCoordinator {
    let ballot = Ballot::new(
        "e",
        VotingType::Plurality,
        vec![Question::new(
            "q",
            true,
            vec![BallotOption::new("a", "A"), BallotOption::new("b", "B")],
        )],
    )
    .unwrap();
    let metadata = ElectionMetadata {
        supports_anonymous,
        ..Default::default()
    };
    let mut c = SubmissionCoordinator::for_ballot(ballot, metadata);
    c.set_answer("q".into(), Answer::Single("a".into())).unwrap();
    c
}

fn ack() -> SubmitVoteResponse {
    SubmitVoteResponse {
        voting_id: "v".into(),
        vote_hash: "h".into(),
        receipt_id: "r".into(),
        verification_code: "c".into(),
        lottery_ticket: None,
    }
}

proptest! {
    #[test]
    fn anonymous_flag_requires_support(supported in any::<bool>(), requested in any::<bool>()) {
        let mut c = coordinator(supported);
        c.set_anonymous(requested);
        let Begin::Ready(ticket) = c.begin_submit().unwrap() else {
            panic!("ballot is complete");
        };
        prop_assert_eq!(ticket.request().anonymous, supported && requested);
    }

    #[test]
    fn repeated_begins_never_issue_a_second_ticket(extra in 1usize..10) {
        let mut c = coordinator(false);
        let Begin::Ready(ticket) = c.begin_submit().unwrap() else {
            panic!("ballot is complete");
        };
        for _ in 0..extra {
            let again = c.begin_submit().unwrap();
            prop_assert!(matches!(again, Begin::Settled(SubmitOutcome::InFlight)));
        }
        prop_assert!(c.resolve(ticket, Ok(ack())).is_ok());
        prop_assert_eq!(c.state(), &SubmissionState::Submitted);
    }

    #[test]
    fn failures_before_success_yield_exactly_one_record(failures in 0usize..5) {
        let mut c = coordinator(false);
        for i in 0..failures {
            let Begin::Ready(ticket) = c.begin_submit().unwrap() else {
                panic!("ballot is complete");
            };
            let outcome = c.resolve(ticket, Err(ApiError::Transport(format!("attempt {i}")))).unwrap();
            prop_assert!(matches!(outcome, SubmitOutcome::Failed(_)));
            prop_assert!(c.record().is_none());
        }
        let Begin::Ready(ticket) = c.begin_submit().unwrap() else {
            panic!("ballot is complete");
        };
        c.resolve(ticket, Ok(ack())).unwrap();
        let record = c.record().cloned();
        prop_assert!(record.is_some());
        let again = c.begin_submit().unwrap();
        prop_assert!(matches!(again, Begin::Settled(SubmitOutcome::AlreadySubmitted(r)) if Some(r.clone()) == record));
    }
}
