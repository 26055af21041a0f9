//! The terminal artifact of a successful submission.

use crate::ids::{ElectionId, ReceiptId, VerificationCode, VoteHash, VotingId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// The authoritative identifiers produced by a successful vote submission.
///
/// Fields are private: a record is built once from the server acknowledgment
/// and never mutated afterwards. The `anonymous` flag is the value that was
/// captured when the submission started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    election_id: ElectionId,
    voting_id: VotingId,
    vote_hash: VoteHash,
    receipt_id: ReceiptId,
    verification_code: VerificationCode,
    anonymous: bool,
    submitted_at: Timestamp,
}

impl VoteRecord {
    pub fn new(
        election_id: ElectionId,
        voting_id: VotingId,
        vote_hash: VoteHash,
        receipt_id: ReceiptId,
        verification_code: VerificationCode,
        anonymous: bool,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            election_id,
            voting_id,
            vote_hash,
            receipt_id,
            verification_code,
            anonymous,
            submitted_at,
        }
    }

    pub fn election_id(&self) -> &ElectionId {
        &self.election_id
    }

    pub fn voting_id(&self) -> &VotingId {
        &self.voting_id
    }

    pub fn vote_hash(&self) -> &VoteHash {
        &self.vote_hash
    }

    pub fn receipt_id(&self) -> &ReceiptId {
        &self.receipt_id
    }

    pub fn verification_code(&self) -> &VerificationCode {
        &self.verification_code
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn submitted_at(&self) -> Timestamp {
        self.submitted_at
    }
}
