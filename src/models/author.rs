//! Author reference entity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Author record. Books reference authors by identifier only, through
/// [`AuthorRef`](crate::models::book::AuthorRef) association records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

impl Author {
    /// Create an author that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}
