//! wordquiz-core — quiz state machine, session guard, and data model.
//!
//! This crate defines the data model, the backend trait, and the two pieces
//! of client logic: the [`route::SessionGuard`] that gates navigation and the
//! [`controller::QuizController`] that drives the fetch → answer → submit loop.

pub mod controller;
pub mod error;
pub mod model;
pub mod route;
pub mod session;
pub mod traits;

pub use controller::{ControllerConfig, QuizController, QuizSnapshot, QuizState};
pub use error::{BackendError, QuizError, Severity};
pub use model::{AnswerAttempt, AnswerReceipt, Question, QuestionId, QuizStats};
pub use route::{guard, Navigation, Route, SessionGuard};
pub use session::{MemoryTokenStore, SessionContext, TokenStore};
pub use traits::QuizBackend;
