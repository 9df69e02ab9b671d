//! The `wordquiz navigate` command.

use std::path::PathBuf;

use anyhow::Result;

use wordquiz_core::{Navigation, SessionGuard};

pub fn execute(config_path: Option<PathBuf>, path: String) -> Result<()> {
    let config = super::load(config_path)?;
    let guard = SessionGuard::new(config.session());

    match guard.navigate(&path) {
        Navigation::Proceed(dest) => println!("proceed {dest}"),
        Navigation::Redirect(route) => println!("redirect {route}"),
    }
    Ok(())
}
