pub mod init;
pub mod login;
pub mod logout;
pub mod navigate;
pub mod quiz;
pub mod register;
pub mod score;

use std::path::PathBuf;

use anyhow::Result;

use wordquiz_client::{load_config_from, WordquizConfig};
use wordquiz_core::{Navigation, Route, SessionContext, SessionGuard};

pub(crate) fn load(config_path: Option<PathBuf>) -> Result<WordquizConfig> {
    load_config_from(config_path.as_deref())
}

/// Pass `route` through the session guard, failing if it sends us to the login page.
pub(crate) fn require_session(session: &SessionContext, route: Route) -> Result<()> {
    match SessionGuard::new(session.clone()).navigate(route.path()) {
        Navigation::Redirect(Route::Login) => {
            anyhow::bail!("not signed in; run `wordquiz login` first")
        }
        _ => Ok(()),
    }
}
