//! Backend access: wire types and the REST client.
//!
//! DESIGN
//! ======
//! `types` mirrors the backend's JSON records and tolerates fields this
//! client does not model. `api` defines the `BlogBackend` seam and its HTTP
//! implementation; tests substitute a scripted backend behind the same trait.

pub mod api;
pub mod types;
