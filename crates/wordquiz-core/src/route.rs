//! Navigation surface and the session guard.

use std::fmt;

use crate::session::SessionContext;

/// The views a user can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Learning,
    Dashboard,
    MultipleChoice,
}

impl Route {
    /// Where signed-in users land by default.
    pub const HOME: Route = Route::Learning;

    pub const ALL: [Route; 5] = [
        Route::Root,
        Route::Login,
        Route::Learning,
        Route::Dashboard,
        Route::MultipleChoice,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Learning => "/learning",
            Route::Dashboard => "/dashboard",
            Route::MultipleChoice => "/multiple-choice",
        }
    }

    /// Match a path against the route table. A single trailing slash is ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = match path.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => path,
        };
        Route::ALL.into_iter().find(|r| r.path() == trimmed)
    }

    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            Route::Learning | Route::Dashboard | Route::MultipleChoice
        )
    }

    /// Static redirect declared in the route table itself.
    fn alias(self) -> Option<Route> {
        match self {
            Route::Root => Some(Route::HOME),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Continue to the requested path unchanged.
    Proceed(String),
    /// Go somewhere else instead.
    Redirect(Route),
}

impl Navigation {
    /// The path the user ends up on.
    pub fn destination(&self) -> &str {
        match self {
            Navigation::Proceed(path) => path,
            Navigation::Redirect(route) => route.path(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}

/// Decide a navigation from the target path and whether a token is present.
pub fn guard(target: &str, has_token: bool) -> Navigation {
    let route = Route::parse(target);

    if route == Some(Route::Login) && has_token {
        return Navigation::Redirect(Route::HOME);
    }

    if route.is_some_and(Route::requires_auth) && !has_token {
        return Navigation::Redirect(Route::Login);
    }

    Navigation::Proceed(target.to_string())
}

/// Applies [`guard`] to every navigation, reading the token fresh each time.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    session: SessionContext,
}

impl SessionGuard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn navigate(&self, target: &str) -> Navigation {
        let resolved = Route::parse(target).and_then(Route::alias);
        let has_token = self.session.has_token();

        let decision = match resolved {
            Some(alias) => match guard(alias.path(), has_token) {
                Navigation::Proceed(_) => Navigation::Redirect(alias),
                redirect => redirect,
            },
            None => guard(target, has_token),
        };

        tracing::debug!(path = target, destination = decision.destination(), "navigation");
        decision
    }
}
