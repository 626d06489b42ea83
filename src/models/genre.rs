//! Genre reference entity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Genre record. Lives either as a standalone row or as the one-to-one
/// reference owned by a book aggregate (reverse column `genre.book`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

impl Genre {
    /// Create a genre that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Sentinel used before a real genre has been persisted and assigned an
    /// identifier.
    pub fn undefined() -> Self {
        Self::new("Undefined")
    }
}
