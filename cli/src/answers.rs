//! Reading a voter's answers from JSON.
//!
//! The file uses the same shape as the submit request's `answers` field:
//! `{"q1": "opt-a", "q2": ["opt-c", "opt-b"]}`.

use anyhow::{bail, Context};
use std::collections::BTreeMap;
use votekit_client::WireAnswer;
use votekit_types::{Answer, QuestionId, VotingType};

pub fn parse_answers(
    voting_type: VotingType,
    json: &str,
) -> anyhow::Result<Vec<(QuestionId, Answer)>> {
    let raw: BTreeMap<QuestionId, WireAnswer> =
        serde_json::from_str(json).context("answers must be a JSON object of question id to option id(s)")?;
    raw.into_iter()
        .map(|(question, wire)| {
            let answer = to_answer(voting_type, wire)
                .with_context(|| format!("answer for question {question}"))?;
            Ok((question, answer))
        })
        .collect()
}

fn to_answer(voting_type: VotingType, wire: WireAnswer) -> anyhow::Result<Answer> {
    Ok(match (voting_type, wire) {
        (VotingType::Plurality, WireAnswer::Single(id)) => Answer::Single(id),
        (VotingType::Plurality, WireAnswer::Many(mut ids)) => {
            if ids.len() != 1 {
                bail!("plurality questions take exactly one option, got {}", ids.len());
            }
            Answer::Single(ids.remove(0))
        }
        (VotingType::RankedChoice, WireAnswer::Single(id)) => Answer::Ranked(vec![id]),
        (VotingType::RankedChoice, WireAnswer::Many(ids)) => Answer::Ranked(ids),
        (VotingType::Approval, WireAnswer::Single(id)) => Answer::approval([id]),
        (VotingType::Approval, WireAnswer::Many(ids)) => Answer::approval(ids),
    })
}
