//! Scripted backend and app builders shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::app::App;
use crate::net::api::{ApiError, BlogBackend};
use crate::net::types::{Credentials, Id, Post, PostDraft, PostPatch, Session};
use crate::storage::{SessionStore, StorageError};

/// Backend answering from per-endpoint queues and recording every call.
///
/// An empty queue answers with a transport error. Calls may be held on a
/// gate (see [`MockBackend::gate_next`]) to interleave them with other work.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<String>>,
    logins: Mutex<VecDeque<Result<Session, ApiError>>>,
    fetches: Mutex<VecDeque<Result<Vec<Post>, ApiError>>>,
    posts: Mutex<VecDeque<Result<Post, ApiError>>>,
    deletes: Mutex<VecDeque<Result<(), ApiError>>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_login(&self, result: Result<Session, ApiError>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn push_fetch(&self, result: Result<Vec<Post>, ApiError>) {
        self.fetches.lock().unwrap().push_back(result);
    }

    /// Response for the next create, update or comment delete.
    pub fn push_post(&self, result: Result<Post, ApiError>) {
        self.posts.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<(), ApiError>) {
        self.deletes.lock().unwrap().push_back(result);
    }

    /// Hold the next mutating call until the returned sender fires.
    pub fn gate_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Yield until at least `n` calls have been recorded.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass_gate(&self) {
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    fn unscripted<T>() -> Result<T, ApiError> {
        Err(ApiError::Transport("no scripted response".to_owned()))
    }
}

#[async_trait::async_trait]
impl BlogBackend for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.record(format!("login {}", credentials.username));
        self.logins.lock().unwrap().pop_front().unwrap_or_else(Self::unscripted)
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.record("fetch".to_owned());
        self.fetches.lock().unwrap().pop_front().unwrap_or_else(Self::unscripted)
    }

    async fn create_post(&self, session: &Session, draft: &PostDraft) -> Result<Post, ApiError> {
        self.record(format!("create {} {}", session.token, draft.title));
        self.pass_gate().await;
        self.posts.lock().unwrap().pop_front().unwrap_or_else(Self::unscripted)
    }

    async fn update_post(&self, session: &Session, id: &Id, patch: &PostPatch) -> Result<Post, ApiError> {
        let body = serde_json::to_string(patch).unwrap();
        self.record(format!("update {} {id} {body}", session.token));
        self.pass_gate().await;
        self.posts.lock().unwrap().pop_front().unwrap_or_else(Self::unscripted)
    }

    async fn delete_post(&self, session: &Session, id: &Id) -> Result<(), ApiError> {
        self.record(format!("delete {} {id}", session.token));
        self.pass_gate().await;
        self.deletes.lock().unwrap().pop_front().unwrap_or_else(Self::unscripted)
    }

    async fn delete_comment(&self, session: &Session, post_id: &Id, comment_id: &Id) -> Result<Post, ApiError> {
        self.record(format!("delete_comment {} {post_id} {comment_id}", session.token));
        self.pass_gate().await;
        self.posts.lock().unwrap().pop_front().unwrap_or_else(Self::unscripted)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store; counts writes so callers can observe persistence edges.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
    writes: AtomicUsize,
    removals: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(raw: &str) -> Self {
        Self { slot: Mutex::new(Some(raw.to_owned())), ..Self::default() }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::Relaxed)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, raw: &str) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw.to_owned());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.removals.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// App over a mock backend and an in-memory store.
pub fn app_with(backend: &Arc<MockBackend>, store: &Arc<MemoryStore>) -> App {
    App::new(backend.clone(), store.clone())
}

/// App already signed in as `t1` with `posts` loaded.
pub async fn signed_in_app(posts: Vec<Post>) -> (App, Arc<MockBackend>, Arc<MemoryStore>) {
    let backend = MockBackend::new();
    let store = Arc::new(MemoryStore::with_record(r#"{"token":"t1"}"#));
    backend.push_fetch(Ok(posts));
    let app = app_with(&backend, &store);
    assert!(app.start().await);
    (app, backend, store)
}

pub fn post(id: &str, title: &str) -> Post {
    Post::new(id, title)
}

pub fn ids(app: &App) -> Vec<String> {
    app.snapshot()
        .posts
        .items
        .iter()
        .map(|p| p.id.to_string())
        .collect()
}
