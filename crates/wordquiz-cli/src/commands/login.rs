//! The `wordquiz login` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use wordquiz_core::{Navigation, SessionGuard};

pub async fn execute(
    config_path: Option<PathBuf>,
    username: String,
    password: String,
    force: bool,
) -> Result<()> {
    let config = super::load(config_path)?;
    let session = config.session();

    if let Navigation::Redirect(home) = SessionGuard::new(session.clone()).navigate("/login") {
        if !force {
            println!("Already signed in (home: {home}). Use --force to sign in again.");
            return Ok(());
        }
    }

    let backend = config.backend()?;
    let response = backend
        .login(&username, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Login failed")))?;

    session
        .sign_in(&response.token)
        .context("failed to store session token")?;
    tracing::info!(user = %username, "signed in");

    match response.user_id {
        Some(id) => println!("Signed in as {username} (user {id})"),
        None => println!("Signed in as {username}"),
    }
    Ok(())
}
