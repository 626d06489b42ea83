//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, CreateBook, Genre},
    repository::Repository,
};

/// Name given to the author attached by the create endpoint.
const DEFAULT_AUTHOR_NAME: &str = "me";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a book from free-text content.
    ///
    /// The aggregate is persisted bare first, then re-persisted with a
    /// default author attached, and both versions are returned in order.
    /// Each save is atomic on its own; a failure after the first save
    /// leaves the bare book in place.
    pub async fn create_book(&self, request: CreateBook) -> AppResult<Vec<Book>> {
        let content = request
            .content
            .ok_or_else(|| AppError::Validation("content parameter is required.".to_string()))?;

        let repository = self.repository.clone();
        let task = tokio::task::spawn(async move {
            let bare = repository.books.save(Book::new(content)).await?;
            tracing::info!("book created: {:?}", bare);
            let author = repository
                .authors
                .save(Author::new(DEFAULT_AUTHOR_NAME))
                .await?;
            let updated = repository.books.save(bare.with_author(&author)?).await?;
            Ok::<_, AppError>(vec![bare, updated])
        });

        task.await
            .map_err(|e| AppError::Internal(format!("book creation task failed: {e}")))?
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.find_all().await
    }

    /// Get a book by ID; a missing book is reported as `None`, not an error
    pub async fn get_book(&self, id: i64) -> AppResult<Option<Book>> {
        self.repository.books.find_by_id(id).await
    }

    /// Delete a book by ID. Absent identifiers are a no-op.
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete_by_id(id).await?;
        tracing::info!("book {} deleted", id);
        Ok(())
    }

    /// List all genres
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.find_all().await
    }

    /// List all authors
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.find_all().await
    }

    /// Datastore connectivity probe used by the readiness endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
