use thiserror::Error;
use votekit_types::QuestionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("vote counts for question {0} do not fit in a 64-bit total")]
    TotalOverflow(QuestionId),
}
