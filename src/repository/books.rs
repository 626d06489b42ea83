//! Books repository: aggregate persistence for the book root.
//!
//! A book owns its genre reference (reverse column `genre.book`) and its
//! author links (`book_author` rows). Saving the root rewrites those
//! referenced rows in the same transaction; loading hydrates them back.

use std::collections::HashSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{AuthorRef, Book, Genre},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert the book when it has no identifier yet, update the existing
    /// row otherwise. Referenced rows are replaced wholesale inside one
    /// transaction; the returned aggregate carries the assigned identifiers.
    pub async fn save(&self, book: Book) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id = match book.id {
            Some(id) => {
                sqlx::query(
                    "UPDATE book SET last_modified = ?1, content = ?2 WHERE id = ?3",
                )
                .bind(book.last_modified)
                .bind(&book.content)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let row = sqlx::query(
                    "INSERT INTO book (last_modified, aggregate_id, content) \
                     VALUES (?1, ?2, ?3) RETURNING id",
                )
                .bind(book.last_modified)
                .bind(book.aggregate_id.to_string())
                .bind(&book.content)
                .fetch_one(&mut *tx)
                .await?;
                row.try_get("id")?
            }
        };

        sqlx::query("DELETE FROM genre WHERE book = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let genre = match &book.genre {
            Some(genre) => {
                let row =
                    sqlx::query("INSERT INTO genre (name, book) VALUES (?1, ?2) RETURNING id")
                        .bind(&genre.name)
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await?;
                Some(Genre {
                    id: Some(row.try_get("id")?),
                    name: genre.name.clone(),
                })
            }
            None => None,
        };

        sqlx::query("DELETE FROM book_author WHERE book = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for author_ref in &book.authors {
            sqlx::query("INSERT INTO book_author (book, author) VALUES (?1, ?2)")
                .bind(id)
                .bind(author_ref.author)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Book {
            id: Some(id),
            genre,
            ..book
        })
    }

    /// Load one aggregate by identifier; a missing row is not an error.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, last_modified, aggregate_id, content FROM book WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// Load every aggregate, in storage order.
    pub async fn find_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query("SELECT id, last_modified, aggregate_id, content FROM book")
            .fetch_all(&self.pool)
            .await?;

        let mut books = Vec::with_capacity(rows.len());
        for row in &rows {
            books.push(self.hydrate(row).await?);
        }
        Ok(books)
    }

    /// Delete the whole aggregate: author links, genre row, then the root.
    /// Absent identifiers are a no-op.
    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM book_author WHERE book = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM genre WHERE book = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM book WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete the aggregate identified by the book's own identifier.
    pub async fn delete(&self, book: &Book) -> AppResult<()> {
        let id = book
            .id
            .ok_or_else(|| AppError::Validation("book has no identifier yet".to_string()))?;
        self.delete_by_id(id).await
    }

    /// Rebuild the aggregate from its root row: parse the identity columns,
    /// then load the genre via its reverse column and the author links from
    /// the join table.
    async fn hydrate(&self, row: &SqliteRow) -> AppResult<Book> {
        let id: i64 = row.try_get("id")?;
        let raw_aggregate_id: String = row.try_get("aggregate_id")?;
        let aggregate_id = Uuid::parse_str(&raw_aggregate_id)
            .map_err(|e| AppError::Internal(format!("malformed aggregate_id: {}", e)))?;

        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE book = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let authors = sqlx::query("SELECT author FROM book_author WHERE book = ?1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|r| {
                Ok(AuthorRef {
                    author: r.try_get("author")?,
                })
            })
            .collect::<Result<HashSet<_>, sqlx::Error>>()?;

        Ok(Book {
            id: Some(id),
            last_modified: row.try_get("last_modified")?,
            aggregate_id,
            content: row.try_get("content")?,
            genre,
            authors,
        })
    }
}
