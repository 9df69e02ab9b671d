//! Mock backend for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use wordquiz_core::{AnswerAttempt, AnswerReceipt, BackendError, Question, QuestionId, QuizBackend};

/// A scripted quiz backend for exercising the controller without a server.
///
/// Fetches pop queued results in order; an empty queue answers 404. Answer
/// submissions pop queued results too, and succeed with the backend's usual
/// `+3`/`-2` score change once the queue is empty.
#[derive(Default)]
pub struct MockBackend {
    questions: Mutex<VecDeque<Result<Question, BackendError>>>,
    receipts: Mutex<VecDeque<Result<AnswerReceipt, BackendError>>>,
    fetch_delay: Option<Duration>,
    record_delay: Option<Duration>,
    fetch_count: AtomicU32,
    record_count: AtomicU32,
    fetch_times: Mutex<Vec<Instant>>,
    tokens: Mutex<Vec<String>>,
    attempts: Mutex<Vec<AnswerAttempt>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a question whose options are `options` and whose answer is `correct`.
pub fn sample_question(id: i64, correct: &str, options: &[&str]) -> Question {
    Question {
        id: QuestionId(id),
        prompt: format!("word #{id}"),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that serves `questions` in order.
    pub fn with_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mock = Self::new();
        for q in questions {
            mock.push_question(q);
        }
        mock
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Make every answer submission take `delay` before answering.
    pub fn with_record_delay(mut self, delay: Duration) -> Self {
        self.record_delay = Some(delay);
        self
    }

    pub fn push_question(&self, question: Question) {
        lock(&self.questions).push_back(Ok(question));
    }

    pub fn push_fetch_error(&self, error: BackendError) {
        lock(&self.questions).push_back(Err(error));
    }

    pub fn push_receipt(&self, receipt: AnswerReceipt) {
        lock(&self.receipts).push_back(Ok(receipt));
    }

    pub fn push_record_error(&self, error: BackendError) {
        lock(&self.receipts).push_back(Err(error));
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn record_count(&self) -> u32 {
        self.record_count.load(Ordering::SeqCst)
    }

    /// When each fetch was issued, on the tokio clock.
    pub fn fetch_times(&self) -> Vec<Instant> {
        lock(&self.fetch_times).clone()
    }

    /// Every token presented, fetches and submissions alike, in call order.
    pub fn tokens_seen(&self) -> Vec<String> {
        lock(&self.tokens).clone()
    }

    pub fn attempts(&self) -> Vec<AnswerAttempt> {
        lock(&self.attempts).clone()
    }
}

#[async_trait]
impl QuizBackend for MockBackend {
    async fn fetch_question(&self, token: &str) -> Result<Question, BackendError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.fetch_times).push(Instant::now());
        lock(&self.tokens).push(token.to_string());

        // Claim the result before sleeping so overlapping fetches get
        // distinct questions.
        let next = lock(&self.questions).pop_front();

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        next.unwrap_or_else(|| {
            Err(BackendError::Api {
                status: 404,
                message: Some("no more questions".into()),
            })
        })
    }

    async fn record_answer(
        &self,
        token: &str,
        attempt: &AnswerAttempt,
    ) -> Result<AnswerReceipt, BackendError> {
        self.record_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.tokens).push(token.to_string());
        lock(&self.attempts).push(attempt.clone());
        let next = lock(&self.receipts).pop_front();

        if let Some(delay) = self.record_delay {
            tokio::time::sleep(delay).await;
        }

        next.unwrap_or_else(|| {
            Ok(AnswerReceipt {
                score_change: Some(if attempt.is_correct { 3 } else { -2 }),
            })
        })
    }
}
