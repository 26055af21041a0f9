//! Voting-type-aware completeness rules.
//!
//! For every question of the ballot, in ballot order:
//! - a required question without an answer (or with an empty one) fails with
//!   [`ValidationKind::Missing`];
//! - a present ranked-choice answer must rank at least one option, and must
//!   not rank the same option twice;
//! - a present approval answer must approve at least one option;
//! - a plurality answer only needs a selected option.
//!
//! At most one failure is reported per question.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use votekit_types::{Answer, Ballot, Question, QuestionId, VotingType};

/// Why a question failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Missing,
    EmptyRanking,
    EmptyApproval,
    DuplicateRank,
    WrongShape,
}

impl ValidationKind {
    fn message(&self) -> &'static str {
        match self {
            Self::Missing => "This question is required",
            Self::EmptyRanking => "Please rank at least one option",
            Self::EmptyApproval => "Please select at least one option",
            Self::DuplicateRank => "Each option can only be ranked once",
            Self::WrongShape => "Answer does not match the ballot's voting type",
        }
    }
}

/// A single validation failure, tied to the offending question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub question_id: QuestionId,
    pub kind: ValidationKind,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(question_id: QuestionId, kind: ValidationKind) -> Self {
        Self {
            question_id,
            kind,
            message: kind.message().to_owned(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.question_id, self.message)
    }
}

/// Validate `answers` against `ballot`. An empty result means the ballot may be submitted.
pub fn validate(ballot: &Ballot, answers: &HashMap<QuestionId, Answer>) -> Vec<ValidationFailure> {
    ballot
        .questions
        .iter()
        .filter_map(|q| {
            check_question(ballot.voting_type, q, answers.get(&q.id))
                .map(|kind| ValidationFailure::new(q.id.clone(), kind))
        })
        .collect()
}

fn check_question(
    voting_type: VotingType,
    question: &Question,
    answer: Option<&Answer>,
) -> Option<ValidationKind> {
    let Some(answer) = answer else {
        return question.required.then_some(ValidationKind::Missing);
    };

    if answer.voting_type() != voting_type {
        return Some(ValidationKind::WrongShape);
    }

    match answer {
        Answer::Ranked(order) if order.is_empty() => Some(ValidationKind::EmptyRanking),
        Answer::Ranked(order) => {
            let mut seen = HashSet::with_capacity(order.len());
            if order.iter().all(|id| seen.insert(id)) {
                None
            } else {
                Some(ValidationKind::DuplicateRank)
            }
        }
        Answer::Approval(set) if set.is_empty() => Some(ValidationKind::EmptyApproval),
        Answer::Approval(_) => None,
        Answer::Single(id) if id.is_blank() => {
            question.required.then_some(ValidationKind::Missing)
        }
        Answer::Single(_) => None,
    }
}
