//! Data models for Octavo

pub mod author;
pub mod book;
pub mod genre;

// Re-export commonly used types
pub use author::Author;
pub use book::{AuthorRef, Book, CreateBook};
pub use genre::Genre;
