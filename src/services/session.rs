//! Session manager: restore, login, logout.
//!
//! Persisting and removing the session record is not done here directly;
//! it follows from the transitions these operations dispatch.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use tracing::{info, warn};

use super::SyncError;
use crate::app::{App, Superseded};
use crate::net::types::{Credentials, Session};
use crate::state::{Action, Notice};
use crate::storage::{self, StorageError};

impl App {
    /// Adopt the persisted session, if a usable one exists.
    ///
    /// Makes no network call. An unreadable record is removed so the next
    /// start begins anonymous without tripping over it again.
    pub fn restore(&self) -> bool {
        match storage::load_json::<Session>(self.store.as_ref()) {
            Ok(Some(session)) if session.is_well_formed() => {
                info!(user = session.display_name(), "session restored");
                self.dispatch(Action::SessionRestored(session));
                true
            }
            Ok(Some(_)) => {
                warn!("persisted session has no token; discarding");
                self.discard_record();
                false
            }
            Ok(None) => false,
            Err(StorageError::Corrupt(reason)) => {
                warn!(%reason, "persisted session is corrupt; discarding");
                self.discard_record();
                false
            }
            Err(e) => {
                warn!(error = %e, "persisted session unreadable");
                false
            }
        }
    }

    /// Restore, then load posts if that produced a session.
    pub async fn start(&self) -> bool {
        if !self.restore() {
            return false;
        }
        if let Err(e) = self.sync_posts().await {
            warn!(error = %e, "initial post fetch failed");
        }
        true
    }

    /// Exchange credentials for a session and load posts for it.
    ///
    /// A failed post fetch after a successful login does not fail the login;
    /// it is surfaced as a notice like any other fetch failure.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Api`] when the backend refuses the credentials
    /// or cannot be reached, and [`SyncError::Stale`] if the session changed
    /// while the request was in flight.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, SyncError> {
        let epoch = self.read(|state| state.auth.epoch);
        info!(username = %credentials.username, "logging in");

        let session = match self.backend.login(credentials).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "login failed");
                let notice = Notice::new(e.error_code(), format!("login failed: {e}"));
                return match self.dispatch_if_current(epoch, Action::Failed(notice)) {
                    Ok(()) => Err(SyncError::Api(e)),
                    Err(Superseded) => Err(SyncError::Stale),
                };
            }
        };

        self.dispatch_if_current(epoch, Action::LoggedIn(session.clone()))
            .map_err(|Superseded| SyncError::Stale)?;
        info!(user = session.display_name(), "logged in");

        if let Err(e) = self.sync_posts().await {
            warn!(error = %e, "post fetch after login failed");
        }
        Ok(session)
    }

    /// Drop the session, its posts and the persisted record. No network call.
    pub fn logout(&self) {
        info!("logging out");
        self.dispatch(Action::LoggedOut);
    }

    fn discard_record(&self) {
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "could not remove persisted session");
        }
    }
}
