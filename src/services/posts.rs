//! Post synchronizer: the fetch triggered by sign-in and the five mutations.

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;

use tracing::{debug, info};

use super::SyncError;
use crate::app::{App, Superseded};
use crate::net::types::{Id, Post, PostDraft, PostPatch};
use crate::state::Action;

impl App {
    /// Fetch posts if the session changed since the last fetch.
    ///
    /// # Errors
    ///
    /// See [`App::refresh_posts`].
    pub async fn sync_posts(&self) -> Result<(), SyncError> {
        if self.read(|state| state.posts.fetch_due) {
            self.refresh_posts().await
        } else {
            Ok(())
        }
    }

    /// Replace the collection with the server's full post list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotAuthenticated`] without a session,
    /// [`SyncError::Api`] on failure (the collection is kept), or
    /// [`SyncError::Stale`] if the session changed meanwhile.
    pub async fn refresh_posts(&self) -> Result<(), SyncError> {
        let ticket = self.begin(None)?;
        self.dispatch(Action::PostsRequested);

        match self.backend.fetch_posts().await {
            Ok(posts) => {
                let count = posts.len();
                self.dispatch_if_current(ticket.epoch, Action::PostsLoaded(posts))
                    .map_err(|Superseded| SyncError::Stale)?;
                info!(count, "posts loaded");
                Ok(())
            }
            Err(e) => Err(self.fail("fetch posts", ticket.epoch, e, Action::PostsFailed)),
        }
    }

    /// # Errors
    ///
    /// Returns [`SyncError`] when signed out or when the backend call fails;
    /// the collection is unchanged in either case.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, SyncError> {
        let ticket = self.begin(None)?;
        let result = self.backend.create_post(&ticket.session, draft).await;
        let post = self.settle("create post", ticket, result, |post| Action::PostCreated(post.clone()))?;
        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    /// Apply an edit and request navigation to the post's detail view.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Busy`] if the post already has a change in
    /// flight, otherwise as [`App::create_post`].
    pub async fn update_post(&self, id: &Id, patch: &PostPatch) -> Result<Post, SyncError> {
        let ticket = self.begin(Some(id))?;
        let result = self.backend.update_post(&ticket.session, id, patch).await;
        let post = self.settle("update post", ticket, result, |post| Action::PostUpdated(post.clone()))?;
        info!(post_id = %id, "post updated");
        Ok(post)
    }

    /// # Errors
    ///
    /// As [`App::update_post`].
    pub async fn delete_post(&self, id: &Id) -> Result<(), SyncError> {
        let ticket = self.begin(Some(id))?;
        let result = self.backend.delete_post(&ticket.session, id).await;
        let removed = id.clone();
        self.settle("delete post", ticket, result, move |_: &()| Action::PostRemoved(removed))?;
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    /// Send `patch` (normally a hidden-flag flip) and adopt the result.
    ///
    /// # Errors
    ///
    /// As [`App::update_post`].
    pub async fn toggle_hidden(&self, id: &Id, patch: &PostPatch) -> Result<Post, SyncError> {
        let ticket = self.begin(Some(id))?;
        let result = self.backend.update_post(&ticket.session, id, patch).await;
        let post = self.settle("toggle hidden", ticket, result, |post| Action::PostReplaced(post.clone()))?;
        debug!(post_id = %id, hidden = post.hidden, "visibility changed");
        Ok(post)
    }

    /// Flip the hidden flag of a post held in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownPost`] if the post is not loaded,
    /// otherwise as [`App::toggle_hidden`].
    pub async fn toggle_hidden_flag(&self, id: &Id) -> Result<Post, SyncError> {
        let hidden = self
            .read(|state| state.posts.get(id).map(|post| post.hidden))
            .ok_or_else(|| SyncError::UnknownPost(id.clone()))?;
        self.toggle_hidden(id, &PostPatch::hidden(!hidden)).await
    }

    /// Remove a comment and adopt the returned parent post.
    ///
    /// # Errors
    ///
    /// As [`App::update_post`]; the busy check applies to the parent post.
    pub async fn delete_comment_from(&self, post_id: &Id, comment_id: &Id) -> Result<Post, SyncError> {
        let ticket = self.begin(Some(post_id))?;
        let result = self
            .backend
            .delete_comment(&ticket.session, post_id, comment_id)
            .await;
        let post = self.settle("delete comment", ticket, result, |post| Action::PostReplaced(post.clone()))?;
        info!(%post_id, %comment_id, "comment deleted");
        Ok(post)
    }
}
