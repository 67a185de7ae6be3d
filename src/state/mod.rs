//! Application state store.
//!
//! ARCHITECTURE
//! ============
//! All state changes go through [`reduce`], which mutates [`AppState`] for a
//! single [`Action`] and reports the storage side effects the transition
//! requires. Persistence therefore happens on session edges only, never on
//! every read of the session.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod auth;
pub mod posts;

use crate::net::types::{Id, Post, Session};
use crate::routes::Route;

use self::auth::AuthState;
use self::posts::PostsState;

/// User-visible failure message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub code: &'static str,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub posts: PostsState,
    /// Last failure, shown until dismissed or replaced.
    pub notice: Option<Notice>,
    /// Navigation requested by an operation, consumed by the presentation layer.
    pub redirect: Option<Route>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// A persisted session was read back at startup.
    SessionRestored(Session),
    LoggedIn(Session),
    LoggedOut,
    /// The backend refused the current credential.
    SessionRejected(Notice),
    PostsRequested,
    PostsLoaded(Vec<Post>),
    PostsFailed(Notice),
    PostCreated(Post),
    /// Edit from the post editor; navigates to the post afterwards.
    PostUpdated(Post),
    /// Canonical post after a hidden toggle or a comment removal.
    PostReplaced(Post),
    PostRemoved(Id),
    MutationStarted(Id),
    MutationSettled(Id),
    Failed(Notice),
    NoticeDismissed,
}

/// Storage work a transition requires.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    PersistSession(Session),
    ClearPersistedSession,
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::SessionRestored(session) => {
            // The record came from storage; writing it back would be redundant.
            switch_session(state, session);
            Vec::new()
        }
        Action::LoggedIn(session) => {
            if switch_session(state, session.clone()) {
                state.notice = None;
                vec![Effect::PersistSession(session)]
            } else {
                Vec::new()
            }
        }
        Action::LoggedOut => {
            sign_out(state);
            vec![Effect::ClearPersistedSession]
        }
        Action::SessionRejected(notice) => {
            let had_session = sign_out(state);
            state.notice = Some(notice);
            if had_session { vec![Effect::ClearPersistedSession] } else { Vec::new() }
        }
        Action::PostsRequested => {
            state.posts.loading = true;
            state.posts.fetch_due = false;
            Vec::new()
        }
        Action::PostsLoaded(posts) => {
            state.posts.replace_all(posts);
            state.posts.loading = false;
            Vec::new()
        }
        Action::PostsFailed(notice) => {
            state.posts.loading = false;
            state.notice = Some(notice);
            Vec::new()
        }
        Action::PostCreated(post) => {
            state.posts.prepend(post);
            Vec::new()
        }
        Action::PostUpdated(post) => {
            let id = post.id.clone();
            if state.posts.replace(post) {
                state.redirect = Some(Route::post_detail(&id));
            }
            Vec::new()
        }
        Action::PostReplaced(post) => {
            state.posts.replace(post);
            Vec::new()
        }
        Action::PostRemoved(id) => {
            state.posts.remove(&id);
            Vec::new()
        }
        Action::MutationStarted(id) => {
            state.posts.in_flight.insert(id);
            Vec::new()
        }
        Action::MutationSettled(id) => {
            state.posts.in_flight.remove(&id);
            Vec::new()
        }
        Action::Failed(notice) => {
            state.notice = Some(notice);
            Vec::new()
        }
        Action::NoticeDismissed => {
            state.notice = None;
            Vec::new()
        }
    }
}

/// Adopt `session` and schedule a fetch. Posts loaded under a different
/// previous session are dropped. Returns `false` if nothing changed.
fn switch_session(state: &mut AppState, session: Session) -> bool {
    let replacing = state.auth.is_authenticated();
    if !state.auth.sign_in(session) {
        return false;
    }
    if replacing {
        state.posts.clear();
        state.redirect = None;
    }
    state.posts.fetch_due = true;
    true
}

/// Leaving a session also drops everything fetched under it.
fn sign_out(state: &mut AppState) -> bool {
    let had_session = state.auth.sign_out();
    state.posts.clear();
    state.redirect = None;
    had_session
}
