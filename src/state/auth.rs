//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by route guards and by every mutating post operation, which needs the
//! bearer token and the epoch it was issued under.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Anonymous,
    Authenticated,
}

/// Current session plus a counter bumped on every sign-in or sign-out.
///
/// A response is only applied if the epoch it was requested under is still
/// current.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub epoch: u64,
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.session.is_some() { Phase::Authenticated } else { Phase::Anonymous }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase() == Phase::Authenticated
    }

    /// Install `session`. Returns `false` when it equals the current one.
    pub(crate) fn sign_in(&mut self, session: Session) -> bool {
        if self.session.as_ref() == Some(&session) {
            return false;
        }
        self.session = Some(session);
        self.epoch += 1;
        true
    }

    /// Drop the session. Returns `false` when already anonymous.
    pub(crate) fn sign_out(&mut self) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        self.epoch += 1;
        true
    }
}
