//! The `wordquiz logout` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load(config_path)?;
    let session = config.session();

    if !session.has_token() {
        println!("Not signed in.");
        return Ok(());
    }

    session.sign_out().context("failed to clear session token")?;
    println!("Signed out.");
    Ok(())
}
