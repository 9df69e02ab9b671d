//! The quiz state controller.
//!
//! Drives one question at a time through
//! `Idle → Loading → Ready → Submitting → Feedback → Loading → ...`.
//! State is published on a [`tokio::sync::watch`] channel so a view can render
//! transitions that happen off the caller's task (the auto-advance fetch).
//!
//! Every state change goes through the watch sender's write lock, which is
//! what makes "last fetch wins" hold: a response is only applied if no newer
//! fetch has started since it was issued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::error::QuizError;
use crate::model::{feedback_message, AnswerAttempt, AnswerReceipt, Question, QuizStats};
use crate::session::SessionContext;
use crate::traits::QuizBackend;

/// Delay between recorded feedback and the next automatic fetch.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Configuration for a [`QuizController`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long feedback stays up before the next question is fetched.
    pub advance_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            advance_delay: AUTO_ADVANCE_DELAY,
        }
    }
}

/// Result of sending an answer to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded {
        message: String,
        receipt: AnswerReceipt,
    },
    Failed {
        error: String,
    },
}

/// Where the controller is in its cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    /// No active question. Holds the error of the last failed fetch, if any.
    Idle { error: Option<String> },
    Loading,
    Ready {
        question: Question,
        selected: Option<String>,
    },
    Submitting {
        question: Question,
        selected: String,
        is_correct: bool,
    },
    Feedback {
        question: Question,
        selected: String,
        is_correct: bool,
        outcome: SubmitOutcome,
    },
}

/// Discriminant of [`QuizState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Submitting,
    Feedback,
}

impl QuizState {
    pub fn phase(&self) -> Phase {
        match self {
            QuizState::Idle { .. } => Phase::Idle,
            QuizState::Loading => Phase::Loading,
            QuizState::Ready { .. } => Phase::Ready,
            QuizState::Submitting { .. } => Phase::Submitting,
            QuizState::Feedback { .. } => Phase::Feedback,
        }
    }

    /// The active question, if there is one.
    pub fn question(&self) -> Option<&Question> {
        match self {
            QuizState::Ready { question, .. }
            | QuizState::Submitting { question, .. }
            | QuizState::Feedback { question, .. } => Some(question),
            QuizState::Idle { .. } | QuizState::Loading => None,
        }
    }
}

/// Flat, view-friendly projection of a [`QuizState`].
///
/// Empty strings stand for "nothing selected" and "no feedback yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub phase: Phase,
    pub question: Option<Question>,
    pub selected_option: String,
    pub feedback: String,
    pub is_correct: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl From<&QuizState> for QuizSnapshot {
    fn from(state: &QuizState) -> Self {
        let mut snapshot = QuizSnapshot {
            phase: state.phase(),
            question: state.question().cloned(),
            selected_option: String::new(),
            feedback: String::new(),
            is_correct: false,
            loading: false,
            error: None,
        };

        match state {
            QuizState::Idle { error } => snapshot.error = error.clone(),
            QuizState::Loading => snapshot.loading = true,
            QuizState::Ready { selected, .. } => {
                snapshot.selected_option = selected.clone().unwrap_or_default();
            }
            QuizState::Submitting {
                selected,
                is_correct,
                ..
            } => {
                snapshot.selected_option = selected.clone();
                snapshot.is_correct = *is_correct;
            }
            QuizState::Feedback {
                selected,
                is_correct,
                outcome,
                ..
            } => {
                snapshot.selected_option = selected.clone();
                snapshot.is_correct = *is_correct;
                match outcome {
                    SubmitOutcome::Recorded { message, .. } => snapshot.feedback = message.clone(),
                    SubmitOutcome::Failed { error } => snapshot.error = Some(error.clone()),
                }
            }
        }

        snapshot
    }
}

/// Feedback returned by a successful [`QuizController::check_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub message: String,
    pub receipt: AnswerReceipt,
}

struct Shared {
    backend: Arc<dyn QuizBackend>,
    session: SessionContext,
    config: ControllerConfig,
    state: watch::Sender<QuizState>,
    /// Bumped whenever a fetch starts. Responses carrying an older value are stale.
    generation: AtomicU64,
    stats: Mutex<QuizStats>,
    /// The scheduled fetch, if one is waiting.
    pending: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn cancel_pending(&self) {
        if let Some(handle) = lock(&self.pending).take() {
            tracing::debug!("cancelling scheduled fetch");
            handle.abort();
        }
    }

    fn schedule_fetch(self: &Arc<Self>, delay: Duration) {
        // Held across the spawn so the task cannot look for its own handle
        // before it has been stored.
        let mut pending = lock(&self.pending);
        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // Detach our own handle so the fetch below does not abort this task.
            drop(lock(&shared.pending).take());
            if let Err(e) = shared.fetch().await {
                tracing::debug!("scheduled fetch did not complete: {e}");
            }
        });
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    #[instrument(skip_all)]
    async fn fetch(&self) -> Result<Question, QuizError> {
        self.cancel_pending();

        let Some(token) = self.session.token() else {
            let err = QuizError::NotAuthenticated;
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.state.send_replace(QuizState::Idle {
                error: Some(err.user_message()),
            });
            return Err(err);
        };

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = QuizState::Loading;
        });
        tracing::debug!(generation, "fetching question");

        let result = self.backend.fetch_question(&token).await;

        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            applied = true;
            *state = match &result {
                Ok(question) => QuizState::Ready {
                    question: question.clone(),
                    selected: None,
                },
                Err(e) => QuizState::Idle {
                    error: Some(QuizError::Fetch(e.clone()).user_message()),
                },
            };
            true
        });

        if !applied {
            tracing::debug!(generation, "discarding superseded fetch");
            return Err(QuizError::Superseded);
        }

        match result {
            Ok(question) => {
                tracing::debug!(question_id = %question.id, "question ready");
                Ok(question)
            }
            Err(e) => {
                tracing::warn!("failed to fetch question: {e}");
                Err(QuizError::Fetch(e))
            }
        }
    }
}

/// Owns the lifecycle of the active question.
///
/// Dropping the controller cancels any scheduled fetch.
pub struct QuizController {
    shared: Arc<Shared>,
}

impl QuizController {
    /// Create an idle controller. Call [`start`](Self::start) to load the
    /// first question, or use [`spawn`](Self::spawn).
    pub fn new(
        backend: Arc<dyn QuizBackend>,
        session: SessionContext,
        config: ControllerConfig,
    ) -> Self {
        let (state, _) = watch::channel(QuizState::Idle { error: None });
        Self {
            shared: Arc::new(Shared {
                backend,
                session,
                config,
                state,
                generation: AtomicU64::new(0),
                stats: Mutex::new(QuizStats::default()),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Create a controller that is already `Loading` its first question.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        backend: Arc<dyn QuizBackend>,
        session: SessionContext,
        config: ControllerConfig,
    ) -> Self {
        let controller = Self::new(backend, session, config);
        controller.start();
        controller
    }

    /// Enter `Loading` and begin fetching the first question in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        self.shared.state.send_replace(QuizState::Loading);
        self.shared.schedule_fetch(Duration::ZERO);
    }

    /// Replace the active question with a fresh one from the backend.
    ///
    /// Supersedes any scheduled or in-flight fetch.
    pub async fn fetch_new_question(&self) -> Result<Question, QuizError> {
        self.shared.fetch().await
    }

    /// Choose one of the active question's options.
    pub fn select_option(&self, option: &str) -> Result<(), QuizError> {
        let mut result = Ok(());
        self.shared.state.send_if_modified(|state| match state {
            QuizState::Ready { question, selected } => {
                if question.has_option(option) {
                    *selected = Some(option.to_string());
                    true
                } else {
                    result = Err(QuizError::UnknownOption(option.to_string()));
                    false
                }
            }
            QuizState::Submitting { .. } => {
                result = Err(QuizError::Busy);
                false
            }
            QuizState::Feedback { .. } => {
                result = Err(QuizError::AlreadyAnswered);
                false
            }
            QuizState::Idle { .. } | QuizState::Loading => {
                result = Err(QuizError::MissingQuestion);
                false
            }
        });
        result
    }

    /// Grade the selected option and record it with the backend.
    ///
    /// Validation failures return before any network call and leave the
    /// state untouched. A recorded answer schedules the next fetch after the
    /// configured delay; a failed submission does not, and may be retried by
    /// calling this again.
    #[instrument(skip_all)]
    pub async fn check_answer(&self) -> Result<AnswerFeedback, QuizError> {
        let shared = &self.shared;
        let token = shared.session.token();

        let mut prepared = Err(QuizError::MissingQuestion);
        shared.state.send_if_modified(|state| {
            let (question, selected) = match state {
                QuizState::Submitting { .. } => {
                    prepared = Err(QuizError::Busy);
                    return false;
                }
                QuizState::Feedback {
                    outcome: SubmitOutcome::Recorded { .. },
                    ..
                } => {
                    prepared = Err(QuizError::AlreadyAnswered);
                    return false;
                }
                QuizState::Idle { .. } | QuizState::Loading => {
                    prepared = Err(QuizError::MissingQuestion);
                    return false;
                }
                QuizState::Ready {
                    selected: None, ..
                } => {
                    prepared = Err(QuizError::NoOptionSelected);
                    return false;
                }
                QuizState::Ready {
                    question,
                    selected: Some(selected),
                }
                | QuizState::Feedback {
                    question, selected, ..
                } => (question.clone(), selected.clone()),
            };

            let Some(token) = token.clone() else {
                prepared = Err(QuizError::NotAuthenticated);
                return false;
            };

            let attempt = AnswerAttempt::grade(&question, selected.clone());
            *state = QuizState::Submitting {
                question: question.clone(),
                selected,
                is_correct: attempt.is_correct,
            };
            let generation = shared.generation.load(Ordering::SeqCst);
            prepared = Ok((token, question, attempt, generation));
            true
        });

        let (token, question, attempt, generation) = prepared.inspect_err(|e| {
            tracing::debug!("answer not submitted: {e}");
        })?;

        tracing::debug!(
            question_id = %attempt.question_id,
            is_correct = attempt.is_correct,
            "submitting answer"
        );
        let result = shared.backend.record_answer(&token, &attempt).await;

        let message = feedback_message(attempt.is_correct, &question.correct_answer);
        let outcome = match &result {
            Ok(receipt) => SubmitOutcome::Recorded {
                message: message.clone(),
                receipt: *receipt,
            },
            Err(e) => SubmitOutcome::Failed {
                error: QuizError::Submit(e.clone()).user_message(),
            },
        };

        // The backend has counted it even if the question has since moved on.
        if result.is_ok() {
            lock(&shared.stats).record(attempt.is_correct);
        }

        let mut applied = false;
        shared.state.send_if_modified(|state| {
            let still_active = matches!(
                state,
                QuizState::Submitting { question: q, .. } if q.id == question.id
            ) && shared.generation.load(Ordering::SeqCst) == generation;
            if !still_active {
                return false;
            }
            applied = true;
            *state = QuizState::Feedback {
                question: question.clone(),
                selected: attempt.selected_option.clone(),
                is_correct: attempt.is_correct,
                outcome,
            };
            true
        });

        if !applied {
            tracing::debug!(question_id = %question.id, "discarding superseded submission");
            return Err(QuizError::Superseded);
        }

        match result {
            Ok(receipt) => {
                shared.schedule_fetch(shared.config.advance_delay);
                Ok(AnswerFeedback {
                    is_correct: attempt.is_correct,
                    message,
                    receipt,
                })
            }
            Err(e) => {
                tracing::warn!("failed to submit answer: {e}");
                Err(QuizError::Submit(e))
            }
        }
    }

    /// Abort the scheduled fetch, if any.
    pub fn cancel_pending(&self) {
        self.shared.cancel_pending();
    }

    /// Whether an automatic fetch is waiting to run.
    pub fn has_pending_fetch(&self) -> bool {
        lock(&self.shared.pending)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn state(&self) -> QuizState {
        self.shared.state.borrow().clone()
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot::from(&*self.shared.state.borrow())
    }

    /// Observe state changes, including those made by the auto-advance task.
    pub fn subscribe(&self) -> watch::Receiver<QuizState> {
        self.shared.state.subscribe()
    }

    pub fn stats(&self) -> QuizStats {
        *lock(&self.shared.stats)
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        self.shared.cancel_pending();
    }
}
