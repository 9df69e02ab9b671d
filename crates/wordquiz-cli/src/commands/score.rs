//! The `wordquiz score` command.

use std::path::PathBuf;

use anyhow::Result;

use wordquiz_core::{QuizError, Route};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load(config_path)?;
    let session = config.session();
    super::require_session(&session, Route::Dashboard)?;

    let token = session.token().ok_or(QuizError::NotAuthenticated)?;
    let backend = config.backend()?;
    let score = backend
        .score(&token)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load score")))?;

    println!("Score: {}", score.score);
    Ok(())
}
