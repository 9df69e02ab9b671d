//! The `wordquiz register` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(config_path: Option<PathBuf>, username: String, password: String) -> Result<()> {
    let config = super::load(config_path)?;
    let backend = config.backend()?;

    let message = backend
        .register(&username, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Registration failed")))?;

    println!("{message}");
    println!("Run: wordquiz login {username}");
    Ok(())
}
