//! Post collection state for the dashboard.
//!
//! DESIGN
//! ======
//! Entries only ever come from server responses. Every helper matches on
//! post `id` and leaves the relative order of untouched posts alone.

#[cfg(test)]
#[path = "posts_test.rs"]
mod posts_test;

use std::collections::HashSet;

use crate::net::types::{Id, Post};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostsState {
    pub items: Vec<Post>,
    /// A fetch is outstanding.
    pub loading: bool,
    /// The session changed and the collection has not been fetched for it.
    pub fetch_due: bool,
    /// Posts with a mutation awaiting its response.
    pub in_flight: HashSet<Id>,
}

impl PostsState {
    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&Post> {
        self.items.iter().find(|post| &post.id == id)
    }

    #[must_use]
    pub fn is_busy(&self, id: &Id) -> bool {
        self.in_flight.contains(id)
    }

    pub(crate) fn replace_all(&mut self, posts: Vec<Post>) {
        self.items = posts;
    }

    pub(crate) fn prepend(&mut self, post: Post) {
        self.items.insert(0, post);
    }

    /// Swap in the canonical version of a post. Returns `false` if no post
    /// with that id is held.
    pub(crate) fn replace(&mut self, post: Post) -> bool {
        match self.items.iter_mut().find(|existing| existing.id == post.id) {
            Some(slot) => {
                *slot = post;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &Id) -> bool {
        let before = self.items.len();
        self.items.retain(|post| &post.id != id);
        self.items.len() != before
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
