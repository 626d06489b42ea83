//! Genres repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::Genre,
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Sqlite>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert when the genre has no identifier yet, update the row
    /// otherwise. Standalone saves leave the reverse column untouched.
    pub async fn save(&self, genre: Genre) -> AppResult<Genre> {
        match genre.id {
            Some(id) => {
                sqlx::query("UPDATE genre SET name = ?1 WHERE id = ?2")
                    .bind(&genre.name)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                Ok(genre)
            }
            None => {
                let row = sqlx::query_as::<_, Genre>(
                    "INSERT INTO genre (name) VALUES (?1) RETURNING id, name",
                )
                .bind(&genre.name)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }
        }
    }

    /// Get genre by identifier; a missing row is not an error.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    /// List all genres, in storage order.
    pub async fn find_all(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Remove the row if present; absent identifiers are a no-op.
    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM genre WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove the row identified by the genre's own identifier.
    pub async fn delete(&self, genre: &Genre) -> AppResult<()> {
        let id = genre
            .id
            .ok_or_else(|| AppError::Validation("genre has no identifier yet".to_string()))?;
        self.delete_by_id(id).await
    }
}
