//! Authors repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::Author,
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Sqlite>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert when the author has no identifier yet, update the row
    /// otherwise.
    pub async fn save(&self, author: Author) -> AppResult<Author> {
        match author.id {
            Some(id) => {
                sqlx::query("UPDATE author SET name = ?1 WHERE id = ?2")
                    .bind(&author.name)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                Ok(author)
            }
            None => {
                let row = sqlx::query_as::<_, Author>(
                    "INSERT INTO author (name) VALUES (?1) RETURNING id, name",
                )
                .bind(&author.name)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }
        }
    }

    /// Get author by identifier; a missing row is not an error.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>("SELECT id, name FROM author WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(author)
    }

    /// List all authors, in storage order.
    pub async fn find_all(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT id, name FROM author")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Remove the row if present; absent identifiers are a no-op.
    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM author WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove the row identified by the author's own identifier.
    pub async fn delete(&self, author: &Author) -> AppResult<()> {
        let id = author
            .id
            .ok_or_else(|| AppError::Validation("author has no identifier yet".to_string()))?;
        self.delete_by_id(id).await
    }
}
