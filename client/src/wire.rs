//! Request and response bodies exchanged with the backend.
//!
//! Field names follow the backend exactly. Several endpoints are served by
//! handlers that disagree on casing, so responses accept both the camelCase
//! and snake_case spelling of the same field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use votekit_types::{
    Answer, Ballot, ElectionId, ElectionMetadata, OptionId, Question, QuestionId, ReceiptId,
    TypesError, VerificationCode, VoteHash, VotingId, VotingType,
};

// ── Submission ──────────────────────────────────────────────────────────

/// One answer as the backend expects it: a bare option id, or a list of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireAnswer {
    Single(OptionId),
    Many(Vec<OptionId>),
}

impl From<&Answer> for WireAnswer {
    fn from(answer: &Answer) -> Self {
        match answer {
            Answer::Single(id) => Self::Single(id.clone()),
            Answer::Ranked(order) => Self::Many(order.clone()),
            Answer::Approval(set) => Self::Many(set.iter().cloned().collect()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub election_id: ElectionId,
    pub answers: BTreeMap<QuestionId, WireAnswer>,
    pub anonymous: bool,
}

impl SubmitVoteRequest {
    pub fn new<'a>(
        election_id: ElectionId,
        answers: impl IntoIterator<Item = (&'a QuestionId, &'a Answer)>,
        anonymous: bool,
    ) -> Self {
        Self {
            election_id,
            answers: answers
                .into_iter()
                .map(|(q, a)| (q.clone(), WireAnswer::from(a)))
                .collect(),
            anonymous,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteResponse {
    #[serde(alias = "voting_id")]
    pub voting_id: VotingId,
    #[serde(alias = "vote_hash")]
    pub vote_hash: VoteHash,
    #[serde(alias = "receipt_id")]
    pub receipt_id: ReceiptId,
    #[serde(alias = "verification_code")]
    pub verification_code: VerificationCode,
    /// Present when the election runs a lottery and a ticket was issued inline.
    #[serde(default, alias = "lottery_ticket")]
    pub lottery_ticket: Option<String>,
}

// ── Ballot ──────────────────────────────────────────────────────────────

/// `GET /elections/{id}` payload: the ballot plus election metadata.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawElection")]
pub struct ElectionBallot {
    pub ballot: Ballot,
    pub metadata: ElectionMetadata,
}

// The backend sends ballot and metadata as one flat object sharing `title`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElection {
    #[serde(alias = "election_id", alias = "id")]
    election_id: ElectionId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(alias = "voting_type")]
    voting_type: VotingType,
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(default, alias = "supports_anonymous")]
    supports_anonymous: bool,
    #[serde(default, alias = "lottery_enabled")]
    lottery_enabled: bool,
}

impl TryFrom<RawElection> for ElectionBallot {
    type Error = TypesError;

    fn try_from(raw: RawElection) -> Result<Self, TypesError> {
        let ballot = Ballot::new(raw.election_id, raw.voting_type, raw.questions)?
            .with_title(raw.title.clone());
        Ok(Self {
            ballot,
            metadata: ElectionMetadata {
                title: raw.title,
                description: raw.description,
                supports_anonymous: raw.supports_anonymous,
                lottery_enabled: raw.lottery_enabled,
            },
        })
    }
}

// ── Verification ────────────────────────────────────────────────────────

/// Payload of the receipt and hash lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteLookup {
    #[serde(default, alias = "election_title")]
    pub election_title: String,
    #[serde(alias = "voting_id")]
    pub voting_id: VotingId,
    #[serde(alias = "vote_hash")]
    pub vote_hash: VoteHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinEntry {
    #[serde(alias = "votingId")]
    pub voting_id: VotingId,
    #[serde(alias = "receiptId")]
    pub receipt_id: ReceiptId,
    #[serde(rename = "is_anonymous", alias = "isAnonymous", default)]
    pub anonymous: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletinBoardPage {
    #[serde(default, alias = "election_title")]
    pub election_title: String,
    #[serde(default, alias = "total_votes")]
    pub total_votes: u64,
    #[serde(default)]
    pub votes: Vec<BulletinEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousProofRequest {
    pub receipt_id: ReceiptId,
    pub vote_token: String,
    pub verification_code: VerificationCode,
}

/// Outcome of the zero-knowledge check. Carries no ballot content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousVerification {
    #[serde(default = "default_valid", alias = "is_valid", alias = "valid", alias = "verified")]
    pub is_valid: bool,
    #[serde(default, alias = "election_title")]
    pub election_title: Option<String>,
    #[serde(default, alias = "verified_at")]
    pub verified_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_valid() -> bool {
    true
}

// ── Live results ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTally {
    pub id: OptionId,
    #[serde(default, alias = "optionText")]
    pub option_text: String,
    #[serde(default, alias = "voteCount")]
    pub vote_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTally {
    pub id: QuestionId,
    #[serde(default, alias = "questionText")]
    pub question_text: String,
    #[serde(default, alias = "totalVotes")]
    pub total_votes: u64,
    #[serde(default)]
    pub options: Vec<OptionTally>,
}

/// One poll of `GET /results`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    #[serde(default)]
    pub questions: Vec<QuestionTally>,
}

impl ResultsSnapshot {
    /// The question with `id`, or the first question when `id` is `None`.
    pub fn question(&self, id: Option<&QuestionId>) -> Option<&QuestionTally> {
        match id {
            Some(id) => self.questions.iter().find(|q| &q.id == id),
            None => self.questions.first(),
        }
    }
}

// ── Envelopes ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct ReceiptEnvelope {
    pub receipt: VoteLookup,
}

#[derive(Deserialize)]
pub(crate) struct HashEnvelope {
    pub vote: VoteLookup,
}

#[derive(Deserialize)]
pub(crate) struct BulletinEnvelope {
    #[serde(rename = "bulletinBoard", alias = "bulletin_board")]
    pub bulletin_board: BulletinBoardPage,
}

#[derive(Deserialize)]
pub(crate) struct AnonymousEnvelope {
    pub verification: AnonymousVerification,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ElectionEnvelope {
    pub election: ElectionBallot,
}
