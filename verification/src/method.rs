//! The four ways to prove a past vote, their inputs, and the query each one fires.

use crate::error::VerificationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use votekit_client::AnonymousProofRequest;
use votekit_types::{ElectionId, ReceiptId, VoteHash};

/// Default bulletin-board page size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest bulletin-board page the client will request.
pub const MAX_PAGE_SIZE: u32 = 100;

pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    Receipt,
    Hash,
    Bulletin,
    Anonymous,
}

impl VerificationMethod {
    pub const ALL: [VerificationMethod; 4] = [Self::Receipt, Self::Hash, Self::Bulletin, Self::Anonymous];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Hash => "hash",
            Self::Bulletin => "bulletin board",
            Self::Anonymous => "anonymous proof",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the voter has typed for the selected method.
///
/// Fields are raw text; nothing is checked until the query is armed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodInput {
    Receipt {
        receipt_id: String,
    },
    Hash {
        vote_hash: String,
    },
    Bulletin {
        election_id: String,
        page: u32,
        page_size: u32,
    },
    Anonymous {
        receipt_id: String,
        vote_token: String,
        verification_code: String,
    },
}

impl MethodInput {
    /// Blank inputs for `method`.
    pub fn empty(method: VerificationMethod, page_size: u32) -> Self {
        match method {
            VerificationMethod::Receipt => Self::Receipt {
                receipt_id: String::new(),
            },
            VerificationMethod::Hash => Self::Hash {
                vote_hash: String::new(),
            },
            VerificationMethod::Bulletin => Self::Bulletin {
                election_id: String::new(),
                page: 1,
                page_size: clamp_page_size(page_size),
            },
            VerificationMethod::Anonymous => Self::Anonymous {
                receipt_id: String::new(),
                vote_token: String::new(),
                verification_code: String::new(),
            },
        }
    }

    pub fn receipt(receipt_id: impl Into<String>) -> Self {
        Self::Receipt {
            receipt_id: receipt_id.into(),
        }
    }

    pub fn hash(vote_hash: impl Into<String>) -> Self {
        Self::Hash {
            vote_hash: vote_hash.into(),
        }
    }

    pub fn bulletin(election_id: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self::Bulletin {
            election_id: election_id.into(),
            page,
            page_size: clamp_page_size(page_size),
        }
    }

    pub fn anonymous(
        receipt_id: impl Into<String>,
        vote_token: impl Into<String>,
        verification_code: impl Into<String>,
    ) -> Self {
        Self::Anonymous {
            receipt_id: receipt_id.into(),
            vote_token: vote_token.into(),
            verification_code: verification_code.into(),
        }
    }

    pub fn method(&self) -> VerificationMethod {
        match self {
            Self::Receipt { .. } => VerificationMethod::Receipt,
            Self::Hash { .. } => VerificationMethod::Hash,
            Self::Bulletin { .. } => VerificationMethod::Bulletin,
            Self::Anonymous { .. } => VerificationMethod::Anonymous,
        }
    }

    /// Check the inputs and build the query they describe.
    pub fn to_query(&self) -> Result<VerificationQuery, VerificationError> {
        let method = self.method();
        let field = |value: &str, name: &'static str| -> Result<String, VerificationError> {
            let value = value.trim();
            if value.is_empty() {
                Err(VerificationError::EmptyField {
                    method,
                    field: name,
                })
            } else {
                Ok(value.to_owned())
            }
        };

        Ok(match self {
            Self::Receipt { receipt_id } => {
                VerificationQuery::Receipt(ReceiptId::new(field(receipt_id, "receipt id")?))
            }
            Self::Hash { vote_hash } => {
                VerificationQuery::Hash(VoteHash::new(field(vote_hash, "vote hash")?))
            }
            Self::Bulletin {
                election_id,
                page,
                page_size,
            } => {
                if *page == 0 {
                    return Err(VerificationError::PageOutOfRange(0));
                }
                VerificationQuery::Bulletin {
                    election: ElectionId::new(field(election_id, "election id")?),
                    page: *page,
                    limit: clamp_page_size(*page_size),
                }
            }
            Self::Anonymous {
                receipt_id,
                vote_token,
                verification_code,
            } => VerificationQuery::Anonymous(AnonymousProofRequest {
                receipt_id: ReceiptId::new(field(receipt_id, "receipt id")?),
                vote_token: field(vote_token, "vote token")?,
                verification_code: field(verification_code, "verification code")?.into(),
            }),
        })
    }
}

/// A validated query, ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationQuery {
    Receipt(ReceiptId),
    Hash(VoteHash),
    Bulletin {
        election: ElectionId,
        page: u32,
        limit: u32,
    },
    Anonymous(AnonymousProofRequest),
}

impl VerificationQuery {
    pub fn method(&self) -> VerificationMethod {
        match self {
            Self::Receipt(_) => VerificationMethod::Receipt,
            Self::Hash(_) => VerificationMethod::Hash,
            Self::Bulletin { .. } => VerificationMethod::Bulletin,
            Self::Anonymous(_) => VerificationMethod::Anonymous,
        }
    }
}
