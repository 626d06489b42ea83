//! Book aggregate root and its association records

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::author::Author;
use super::genre::Genre;

/// Association record linking a book to a persisted author's identifier.
/// Not meaningful on its own; it is the edge stored in the `book_author`
/// join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct AuthorRef {
    pub author: i64,
}

/// Book aggregate root.
///
/// `id` is the storage identifier, `None` until the first save assigns one.
/// `aggregate_id` is assigned at construction and never changes afterwards.
/// Mutations go through the `with_*` constructors, which build the updated
/// state and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    #[serde(default)]
    pub id: Option<i64>,
    pub last_modified: DateTime<Utc>,
    pub aggregate_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub authors: HashSet<AuthorRef>,
}

impl Book {
    /// Create an unpersisted book from its content alone. The genre defaults
    /// to the Undefined sentinel and the author set starts empty.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            last_modified: Utc::now(),
            aggregate_id: Uuid::new_v4(),
            content: content.into(),
            genre: Some(Genre::undefined()),
            authors: HashSet::new(),
        }
    }

    /// Replace the genre reference; identifiers are untouched.
    pub fn with_genre(&self, genre: Genre) -> Book {
        Book {
            genre: Some(genre),
            ..self.clone()
        }
    }

    /// Attach a persisted author and refresh the modification timestamp.
    ///
    /// The author must already carry an identifier; attaching an unpersisted
    /// author is a contract violation.
    pub fn with_author(&self, author: &Author) -> AppResult<Book> {
        let author_id = author.id.ok_or_else(|| {
            AppError::Validation("author must be persisted before it can be attached".to_string())
        })?;
        let mut updated = self.clone();
        updated.authors.insert(AuthorRef { author: author_id });
        Ok(updated.with_last_modified_updated())
    }

    /// Refresh the modification timestamp, everything else unchanged.
    pub fn with_last_modified_updated(&self) -> Book {
        Book {
            last_modified: Utc::now(),
            ..self.clone()
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub content: Option<String>,
}
