//! A voter's answer to one question.

use crate::ballot::VotingType;
use crate::ids::OptionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The answer to a single question. The shape follows the ballot's voting type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Plurality: one chosen option.
    Single(OptionId),
    /// Ranked choice: options in preference order, most preferred first.
    Ranked(Vec<OptionId>),
    /// Approval: every approved option.
    Approval(BTreeSet<OptionId>),
}

impl Answer {
    /// The voting type this answer shape belongs to.
    pub fn voting_type(&self) -> VotingType {
        match self {
            Self::Single(_) => VotingType::Plurality,
            Self::Ranked(_) => VotingType::RankedChoice,
            Self::Approval(_) => VotingType::Approval,
        }
    }

    /// True when no option is selected at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(id) => id.is_blank(),
            Self::Ranked(order) => order.is_empty(),
            Self::Approval(set) => set.is_empty(),
        }
    }

    /// All option ids referenced by this answer, in answer order.
    pub fn option_ids(&self) -> Vec<&OptionId> {
        match self {
            Self::Single(id) => vec![id],
            Self::Ranked(order) => order.iter().collect(),
            Self::Approval(set) => set.iter().collect(),
        }
    }

    pub fn approval<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OptionId>,
    {
        Self::Approval(ids.into_iter().map(Into::into).collect())
    }

    pub fn ranked<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OptionId>,
    {
        Self::Ranked(ids.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_shapes() {
        assert!(Answer::Ranked(vec![]).is_empty());
        assert!(Answer::Approval(BTreeSet::new()).is_empty());
        assert!(Answer::Single(OptionId::new("")).is_empty());
        assert!(!Answer::Single(OptionId::new("a")).is_empty());
    }

    #[test]
    fn voting_type_follows_shape() {
        assert_eq!(Answer::ranked(["a", "b"]).voting_type(), VotingType::RankedChoice);
        assert_eq!(Answer::approval(["a"]).voting_type(), VotingType::Approval);
    }

    #[test]
    fn tagged_json_form() {
        let json = serde_json::to_string(&Answer::ranked(["b", "a"])).unwrap();
        assert_eq!(json, r#"{"kind":"ranked","value":["b","a"]}"#);
    }
}
