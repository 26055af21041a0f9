//! Ballot structure: an election's ordered questions and their options.

use crate::error::TypesError;
use crate::ids::{ElectionId, OptionId, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How voters express their choice on every question of a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingType {
    /// Exactly one option per question.
    Plurality,
    /// An ordered ranking of options.
    RankedChoice,
    /// Any non-empty set of options.
    Approval,
}

impl VotingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plurality => "plurality",
            Self::RankedChoice => "ranked_choice",
            Self::Approval => "approval",
        }
    }
}

impl fmt::Display for VotingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotOption {
    pub id: OptionId,
    #[serde(alias = "option_text", alias = "optionText")]
    pub text: String,
    /// Running vote count; only populated in result views.
    #[serde(default, alias = "voteCount")]
    pub vote_count: Option<u64>,
}

impl BallotOption {
    pub fn new(id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            vote_count: None,
        }
    }
}

/// A single ballot question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default, alias = "question_text", alias = "questionText")]
    pub text: String,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<BallotOption>,
}

impl Question {
    pub fn new(id: impl Into<QuestionId>, required: bool, options: Vec<BallotOption>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            required,
            options,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn has_option(&self, option: &OptionId) -> bool {
        self.options.iter().any(|o| &o.id == option)
    }
}

/// The questions presented to a voter for one election.
///
/// Immutable once loaded. Opening another election replaces it wholesale.
/// Deserialized ballots pass the same [`check`](Ballot::check) as [`Ballot::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedBallot")]
pub struct Ballot {
    #[serde(alias = "electionId")]
    pub election_id: ElectionId,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "votingType")]
    pub voting_type: VotingType,
    pub questions: Vec<Question>,
}

#[derive(Deserialize)]
struct UncheckedBallot {
    #[serde(alias = "electionId")]
    election_id: ElectionId,
    #[serde(default)]
    title: String,
    #[serde(alias = "votingType")]
    voting_type: VotingType,
    questions: Vec<Question>,
}

impl TryFrom<UncheckedBallot> for Ballot {
    type Error = TypesError;

    fn try_from(raw: UncheckedBallot) -> Result<Self, TypesError> {
        Ok(Self::new(raw.election_id, raw.voting_type, raw.questions)?.with_title(raw.title))
    }
}

impl Ballot {
    /// Build a ballot, rejecting duplicate question or option identifiers.
    pub fn new(
        election_id: impl Into<ElectionId>,
        voting_type: VotingType,
        questions: Vec<Question>,
    ) -> Result<Self, TypesError> {
        let ballot = Self {
            election_id: election_id.into(),
            title: String::new(),
            voting_type,
            questions,
        };
        ballot.check()?;
        Ok(ballot)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Question ids are unique, and option ids are unique within a question.
    pub fn check(&self) -> Result<(), TypesError> {
        let mut seen = HashSet::new();
        for q in &self.questions {
            if !seen.insert(&q.id) {
                return Err(TypesError::DuplicateQuestion(q.id.to_string()));
            }
            let mut opts = HashSet::new();
            for o in &q.options {
                if !opts.insert(&o.id) {
                    return Err(TypesError::DuplicateOption {
                        question: q.id.to_string(),
                        option: o.id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    pub fn contains_question(&self, id: &QuestionId) -> bool {
        self.question(id).is_some()
    }

    pub fn first_question(&self) -> Option<&Question> {
        self.questions.first()
    }
}

/// Election-level metadata delivered alongside the ballot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the anonymous-vote control is offered at all.
    #[serde(default, alias = "supportsAnonymous")]
    pub supports_anonymous: bool,
    /// Whether a successful vote earns a lottery ticket.
    #[serde(default, alias = "lotteryEnabled")]
    pub lottery_enabled: bool,
}
