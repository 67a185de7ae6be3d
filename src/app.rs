//! Application shell: owns the state store and its collaborators.
//!
//! DESIGN
//! ======
//! `App` is shared by reference across concurrent operations. The state lock
//! is held only while reducing an action and never across a backend call, so
//! overlapping operations resolve independently in completion order.
//! Session and post operations live in `services::session` and
//! `services::posts` as further `impl App` blocks.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::api::BlogBackend;
use crate::net::types::Id;
use crate::routes::Route;
use crate::services::{SyncError, Ticket};
use crate::state::{Action, AppState, Effect, Notice, reduce};
use crate::storage::{self, SessionStore};

pub struct App {
    state: Mutex<AppState>,
    pub(crate) backend: Arc<dyn BlogBackend>,
    pub(crate) store: Arc<dyn SessionStore>,
}

/// Returned when an action was requested under a session that is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Superseded;

impl App {
    #[must_use]
    pub fn new(backend: Arc<dyn BlogBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self { state: Mutex::new(AppState::default()), backend, store }
    }

    /// Copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().auth.is_authenticated()
    }

    /// Take the pending navigation request, if any.
    pub fn take_redirect(&self) -> Option<Route> {
        self.lock().redirect.take()
    }

    /// Take the pending user-visible failure, if any.
    pub fn take_notice(&self) -> Option<Notice> {
        let mut state = self.lock();
        let notice = state.notice.clone();
        if notice.is_some() {
            self.apply(&mut state, Action::NoticeDismissed);
        }
        notice
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }

    pub(crate) fn dispatch(&self, action: Action) {
        let mut state = self.lock();
        self.apply(&mut state, action);
    }

    /// Dispatch only if the session epoch still equals `epoch`.
    pub(crate) fn dispatch_if_current(&self, epoch: u64, action: Action) -> Result<(), Superseded> {
        let mut state = self.lock();
        if state.auth.epoch != epoch {
            return Err(Superseded);
        }
        self.apply(&mut state, action);
        Ok(())
    }

    /// Claim the current session for a backend call.
    ///
    /// With a `target`, the post is marked in flight until the ticket is
    /// settled; a second claim on the same post fails with `Busy`.
    pub(crate) fn begin(&self, target: Option<&Id>) -> Result<Ticket, SyncError> {
        let mut state = self.lock();
        let Some(session) = state.auth.session.clone() else {
            return Err(SyncError::NotAuthenticated);
        };
        if let Some(id) = target {
            if state.posts.is_busy(id) {
                return Err(SyncError::Busy(id.clone()));
            }
            self.apply(&mut state, Action::MutationStarted(id.clone()));
        }
        Ok(Ticket { session, epoch: state.auth.epoch, target: target.cloned() })
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reduce under the held lock and run storage effects before releasing
    /// it, so the persisted record always matches the latest transition.
    fn apply(&self, state: &mut AppState, action: Action) {
        for effect in reduce(state, action) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        let (kind, result) = match &effect {
            Effect::PersistSession(session) => ("persist", storage::save_json(self.store.as_ref(), session)),
            Effect::ClearPersistedSession => ("clear", self.store.remove()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, effect = kind, "session storage update failed");
        }
    }
}
