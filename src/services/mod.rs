//! Session manager and post synchronizer.
//!
//! ARCHITECTURE
//! ============
//! Both services are `impl App` blocks. Each backend call follows the same
//! shape: claim a [`Ticket`] (session + epoch), perform one request, then
//! settle it. Settling applies the canonical response only if the session
//! that issued the request is still current; failures are logged, surfaced
//! as a notice, and leave the collection untouched.

pub mod posts;
pub mod session;

use crate::app::{App, Superseded};
use crate::net::api::ApiError;
use crate::net::types::{Id, Session};
use crate::state::{Action, Notice};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("post {0} already has a change in flight")]
    Busy(Id),

    #[error("post {0} is not in the collection")]
    UnknownPost(Id),

    #[error("response belongs to a session that has since ended")]
    Stale,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SyncError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Busy(_) => "E_BUSY",
            Self::UnknownPost(_) => "E_UNKNOWN_POST",
            Self::Stale => "E_STALE",
            Self::Api(e) => e.error_code(),
        }
    }
}

/// Session snapshot a backend call was issued under.
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub session: Session,
    pub epoch: u64,
    /// Post marked in flight for the duration of the call.
    pub target: Option<Id>,
}

impl App {
    /// Apply the outcome of a ticketed call.
    pub(crate) fn settle<T>(
        &self,
        op: &'static str,
        ticket: Ticket,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&T) -> Action,
    ) -> Result<T, SyncError> {
        // A new session's marker on the same post belongs to its own call;
        // sign-out already dropped ours.
        if let Some(id) = ticket.target {
            let _ = self.dispatch_if_current(ticket.epoch, Action::MutationSettled(id));
        }
        match result {
            Ok(value) => match self.dispatch_if_current(ticket.epoch, apply(&value)) {
                Ok(()) => Ok(value),
                Err(Superseded) => {
                    tracing::info!(op, "discarding response for superseded session");
                    Err(SyncError::Stale)
                }
            },
            Err(e) => Err(self.fail(op, ticket.epoch, e, Action::Failed)),
        }
    }

    /// Log a failed call and surface it. Auth failures end the session.
    pub(crate) fn fail(&self, op: &'static str, epoch: u64, err: ApiError, surface: fn(Notice) -> Action) -> SyncError {
        tracing::warn!(op, error = %err, code = err.error_code(), retryable = err.retryable(), "backend call failed");
        let notice = Notice::new(err.error_code(), format!("{op} failed: {err}"));
        let action = if err.is_auth() { Action::SessionRejected(notice) } else { surface(notice) };
        match self.dispatch_if_current(epoch, action) {
            Ok(()) => SyncError::Api(err),
            Err(Superseded) => SyncError::Stale,
        }
    }
}
