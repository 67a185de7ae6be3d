//! Blog dashboard client shell.
//!
//! ARCHITECTURE
//! ============
//! `state` holds the pure reducer over session and post state. `app` owns
//! the store together with a backend and a session store, and `services`
//! adds the session and post operations on top of it. `routes` applies the
//! auth guards to navigation. `net`, `storage` and `config` are the edges.

pub mod app;
pub mod config;
pub mod net;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::App;
pub use config::{ClientConfig, ConfigError};
pub use net::api::{ApiError, BlogBackend, HttpBackend};
pub use services::SyncError;
pub use storage::{FileStore, SessionStore};
