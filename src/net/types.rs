//! Wire schema for the blog REST backend.
//!
//! DESIGN
//! ======
//! Responses are parsed into these types at the HTTP boundary so a shape
//! mismatch fails the call instead of leaking half-filled records into the
//! post collection. Unknown fields are kept in `extra` so canonical server
//! payloads survive a round-trip untouched.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Backend entity identifier.
///
/// Accepts either a JSON string (`"65a1..."`) or an integer (`1`) and keeps
/// the textual form, so comparisons never depend on how the server typed it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<u64> for Id {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(raw) if !raw.is_empty() => Ok(Self(raw)),
            Value::String(_) => Err(D::Error::custom("id must not be empty")),
            Value::Number(number) if number.is_i64() || number.is_u64() => Ok(Self(number.to_string())),
            Value::Number(_) => Err(D::Error::custom("expected integer id")),
            _ => Err(D::Error::custom("expected string or integer id")),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Authenticated user as returned by `POST /api/users/login`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented on every mutating call.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remaining profile fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: token.into(), username: None, name: None, extra: Map::new() }
    }

    /// A session is usable only when it carries a non-blank token.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// `Authorization` header value for this session.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("bearer {}", self.token)
    }

    /// Best label for the signed-in user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("(unnamed)")
    }
}

/// Login form payload.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// POSTS
// =============================================================================

/// Post author: the backend either populates the user or sends its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Ref(Id),
    Profile(AuthorProfile),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AuthorRecord")]
pub struct AuthorProfile {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CommentRecord")]
pub struct Comment {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub body: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Canonical blog post as stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PostRecord")]
pub struct Post {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// RECORD IDS
// =============================================================================

// Mongo documents carry `_id` and, with virtuals enabled, an `id` copy as
// well. Either key is accepted; `id` wins when both are present.

fn record_id(kind: &str, id: Option<Id>, mongo_id: Option<Id>) -> Result<Id, String> {
    id.or(mongo_id).ok_or_else(|| format!("{kind} record has neither `id` nor `_id`"))
}

#[derive(Deserialize)]
struct AuthorRecord {
    id: Option<Id>,
    #[serde(rename = "_id")]
    mongo_id: Option<Id>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<AuthorRecord> for AuthorProfile {
    type Error = String;

    fn try_from(record: AuthorRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id("author", record.id, record.mongo_id)?,
            username: record.username,
            name: record.name,
        })
    }
}

#[derive(Deserialize)]
struct CommentRecord {
    id: Option<Id>,
    #[serde(rename = "_id")]
    mongo_id: Option<Id>,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    body: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<CommentRecord> for Comment {
    type Error = String;

    fn try_from(record: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id("comment", record.id, record.mongo_id)?,
            author: record.author,
            body: record.body,
            extra: record.extra,
        })
    }
}

#[derive(Deserialize)]
struct PostRecord {
    id: Option<Id>,
    #[serde(rename = "_id")]
    mongo_id: Option<Id>,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<PostRecord> for Post {
    type Error = String;

    fn try_from(record: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id("post", record.id, record.mongo_id)?,
            author: record.author,
            title: record.title,
            body: record.body,
            hidden: record.hidden,
            comments: record.comments,
            extra: record.extra,
        })
    }
}

impl Post {
    #[must_use]
    pub fn new(id: impl Into<Id>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: None,
            title: title.into(),
            body: String::new(),
            hidden: false,
            comments: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Body of `POST /api/posts`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub hidden: bool,
}

/// Body of `PUT /api/posts/{id}`; absent fields are left to the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl PostPatch {
    #[must_use]
    pub fn hidden(hidden: bool) -> Self {
        Self { hidden: Some(hidden), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.hidden.is_none()
    }
}
