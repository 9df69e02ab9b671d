//! Core trait definitions for the quiz backend.
//!
//! Implemented over HTTP by `wordquiz-client`, and by its `MockBackend` for
//! tests.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::model::{AnswerAttempt, AnswerReceipt, Question};

/// The two backend calls the quiz loop depends on.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Fetch a freshly generated question.
    async fn fetch_question(&self, token: &str) -> Result<Question, BackendError>;

    /// Record a graded answer.
    async fn record_answer(
        &self,
        token: &str,
        attempt: &AnswerAttempt,
    ) -> Result<AnswerReceipt, BackendError>;
}
