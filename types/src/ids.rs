//! Opaque identifier newtypes.
//!
//! Every identifier the backend hands out is carried as a string. The server
//! is free to send numeric ids in JSON; they are normalised to their decimal
//! string form on deserialization so the rest of the client never has to care.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is empty once surrounding whitespace is ignored.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

string_id!(
    /// Identifies one election (and therefore one ballot).
    ElectionId
);
string_id!(
    /// Identifies a question within a ballot.
    QuestionId
);
string_id!(
    /// Identifies an option within a question.
    OptionId
);
string_id!(
    /// Server-assigned identifier of a cast vote.
    VotingId
);
string_id!(
    /// Voter-held receipt identifier.
    ReceiptId
);
string_id!(
    /// Server-computed hash of the recorded vote.
    VoteHash
);
string_id!(
    /// Code used for the anonymous zero-knowledge proof path.
    VerificationCode
);

impl VoteHash {
    /// Abbreviated form for list views (first 8 and last 8 characters).
    pub fn short(&self) -> String {
        let s = self.as_str();
        if s.chars().count() <= 19 {
            return s.to_owned();
        }
        let head: String = s.chars().take(8).collect();
        let tail: String = s
            .chars()
            .rev()
            .take(8)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{head}...{tail}")
    }
}
