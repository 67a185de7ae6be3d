//! Route table and auth guards for the presentation layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page applies the same rule set: the landing page and the login page
//! bounce signed-in users onward, and everything under `/dashboard` bounces
//! anonymous users to `/login`.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::fmt;

use crate::net::types::Id;

const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    /// `/dashboard` and any nested path without a dedicated view.
    Dashboard { rest: String },
    /// `/dashboard/blogs/{id}`.
    PostDetail(Id),
    NotFound(String),
}

impl Route {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["dashboard", "blogs", id] => Self::PostDetail(Id::from(*id)),
            ["dashboard", rest @ ..] => Self::Dashboard { rest: rest.join("/") },
            _ => Self::NotFound(path.to_owned()),
        }
    }

    #[must_use]
    pub fn dashboard() -> Self {
        Self::Dashboard { rest: String::new() }
    }

    /// Detail view a post update navigates to.
    #[must_use]
    pub fn post_detail(id: &Id) -> Self {
        Self::PostDetail(id.clone())
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard { .. } | Self::PostDetail(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Login => f.write_str("/login"),
            Self::Dashboard { rest } if rest.is_empty() => f.write_str("/dashboard"),
            Self::Dashboard { rest } => write!(f, "/dashboard/{rest}"),
            Self::PostDetail(id) => write!(f, "/dashboard/blogs/{id}"),
            Self::NotFound(path) => f.write_str(path),
        }
    }
}

/// What a route renders once guards pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Homepage,
    Login,
    Dashboard,
    PostDetail(Id),
    /// No route matched; nothing is rendered.
    Blank,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(Page),
    Redirect(Route),
}

/// Apply the auth guard for a single route.
#[must_use]
pub fn resolve(route: &Route, authenticated: bool) -> Resolution {
    match route {
        Route::Home if authenticated => Resolution::Redirect(Route::dashboard()),
        Route::Home => Resolution::Render(Page::Homepage),
        Route::Login if authenticated => Resolution::Redirect(Route::Home),
        Route::Login => Resolution::Render(Page::Login),
        Route::Dashboard { .. } | Route::PostDetail(_) if !authenticated => Resolution::Redirect(Route::Login),
        Route::Dashboard { .. } => Resolution::Render(Page::Dashboard),
        Route::PostDetail(id) => Resolution::Render(Page::PostDetail(id.clone())),
        Route::NotFound(_) => Resolution::Render(Page::Blank),
    }
}

/// Parse `path` and follow redirects until a page renders.
///
/// Returns the route that finally rendered alongside its page.
#[must_use]
pub fn navigate(path: &str, authenticated: bool) -> (Route, Page) {
    let mut route = Route::parse(path);
    for _ in 0..MAX_REDIRECTS {
        match resolve(&route, authenticated) {
            Resolution::Render(page) => return (route, page),
            Resolution::Redirect(next) => {
                tracing::debug!(from = %route, to = %next, "route redirect");
                route = next;
            }
        }
    }
    tracing::warn!(%route, "redirect limit reached");
    (route, Page::Blank)
}

/// True when an auth-required page should bounce to `/login`.
#[must_use]
pub fn should_redirect_unauth(route: &Route, authenticated: bool) -> bool {
    matches!(resolve(route, authenticated), Resolution::Redirect(Route::Login))
}
