//! wordquiz-client — backend integration for wordquiz.
//!
//! Implements the `QuizBackend` trait over HTTP, loads configuration, and
//! persists the session token on disk.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod token_store;

pub use config::{load_config_from, WordquizConfig};
pub use http::{HttpBackend, LoginResponse, ScoreResponse};
pub use mock::MockBackend;
pub use token_store::FileTokenStore;
