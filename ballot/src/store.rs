//! The answer store: one voter's in-progress ballot.
//!
//! Owned explicitly by whoever drives a voting session (normally the
//! submission coordinator). It is created when a ballot is loaded and dropped,
//! or reset, when the voter navigates away.

use crate::error::StoreError;
use crate::validator::{validate, ValidationFailure};
use std::collections::{BTreeSet, HashMap};
use votekit_types::{Answer, Ballot, ElectionMetadata, OptionId, QuestionId};

#[derive(Debug, Default)]
pub struct AnswerStore {
    ballot: Option<Ballot>,
    metadata: ElectionMetadata,
    answers: HashMap<QuestionId, Answer>,
    errors: HashMap<QuestionId, ValidationFailure>,
    frozen: bool,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a ballot already loaded.
    pub fn with_ballot(ballot: Ballot, metadata: ElectionMetadata) -> Self {
        let mut store = Self::new();
        store.load_ballot(ballot, metadata);
        store
    }

    /// Replace all ballot-scoped state with a freshly loaded ballot.
    pub fn load_ballot(&mut self, ballot: Ballot, metadata: ElectionMetadata) {
        tracing::debug!(
            election = %ballot.election_id,
            questions = ballot.questions.len(),
            "ballot loaded"
        );
        self.ballot = Some(ballot);
        self.metadata = metadata;
        self.answers.clear();
        self.errors.clear();
        self.frozen = false;
    }

    /// Drop the ballot and every answer together.
    pub fn reset_ballot(&mut self) {
        self.ballot = None;
        self.metadata = ElectionMetadata::default();
        self.answers.clear();
        self.errors.clear();
        self.frozen = false;
    }

    pub fn ballot(&self) -> Option<&Ballot> {
        self.ballot.as_ref()
    }

    pub fn metadata(&self) -> &ElectionMetadata {
        &self.metadata
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Make the answers read-only. They stay available for display.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Upsert the answer for one question and clear that question's errors.
    pub fn set_answer(&mut self, question_id: QuestionId, answer: Answer) -> Result<(), StoreError> {
        self.ensure_mutable()?;
        let ballot = self.ballot.as_ref().ok_or(StoreError::NoBallot)?;
        let question = ballot
            .question(&question_id)
            .ok_or_else(|| StoreError::UnknownQuestion(question_id.to_string()))?;

        if answer.voting_type() != ballot.voting_type {
            return Err(StoreError::WrongShape {
                expected: ballot.voting_type,
                got: answer.voting_type(),
            });
        }
        if let Some(unknown) = answer
            .option_ids()
            .into_iter()
            .find(|id| !id.is_blank() && !question.has_option(id))
        {
            return Err(StoreError::UnknownOption {
                question: question_id.to_string(),
                option: unknown.to_string(),
            });
        }

        self.errors.remove(&question_id);
        self.answers.insert(question_id, answer);
        Ok(())
    }

    /// Add `option` to an approval answer, or remove it when already approved.
    pub fn toggle_approval(
        &mut self,
        question_id: QuestionId,
        option: OptionId,
    ) -> Result<(), StoreError> {
        let mut set = match self.answers.get(&question_id) {
            Some(Answer::Approval(set)) => set.clone(),
            _ => BTreeSet::new(),
        };
        if !set.remove(&option) {
            set.insert(option);
        }
        self.set_answer(question_id, Answer::Approval(set))
    }

    /// Set a ranked-choice answer from an ordering, first preference first.
    pub fn rank<I, T>(&mut self, question_id: QuestionId, order: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OptionId>,
    {
        self.set_answer(question_id, Answer::ranked(order))
    }

    pub fn clear_answer(&mut self, question_id: &QuestionId) -> Result<Option<Answer>, StoreError> {
        self.ensure_mutable()?;
        self.errors.remove(question_id);
        Ok(self.answers.remove(question_id))
    }

    pub fn clear_all_answers(&mut self) -> Result<(), StoreError> {
        self.ensure_mutable()?;
        self.answers.clear();
        self.errors.clear();
        Ok(())
    }

    pub fn answer(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn answers(&self) -> &HashMap<QuestionId, Answer> {
        &self.answers
    }

    /// Answers in ballot question order.
    pub fn answers_in_order(&self) -> Vec<(&QuestionId, &Answer)> {
        let Some(ballot) = &self.ballot else {
            return Vec::new();
        };
        ballot
            .questions
            .iter()
            .filter_map(|q| self.answers.get_key_value(&q.id))
            .collect()
    }

    /// Run the validator over the current answers. No ballot means nothing to validate.
    pub fn validate(&self) -> Vec<ValidationFailure> {
        match &self.ballot {
            Some(ballot) => validate(ballot, &self.answers),
            None => Vec::new(),
        }
    }

    /// Replace the stored per-question errors with `failures`.
    pub fn record_errors(&mut self, failures: &[ValidationFailure]) {
        self.errors = failures
            .iter()
            .filter(|f| {
                self.ballot
                    .as_ref()
                    .is_some_and(|b| b.contains_question(&f.question_id))
            })
            .map(|f| (f.question_id.clone(), f.clone()))
            .collect();
    }

    pub fn error_for(&self, question_id: &QuestionId) -> Option<&ValidationFailure> {
        self.errors.get(question_id)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn ensure_mutable(&self) -> Result<(), StoreError> {
        if self.frozen {
            Err(StoreError::Frozen)
        } else {
            Ok(())
        }
    }
}
