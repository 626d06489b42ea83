//! API handlers for Octavo REST endpoints

pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books))
        .route("/book/:id", get(books::get_book))
        .route("/book/:id", delete(books::delete_book))
        // Reference entities
        .route("/genres", get(genres::list_genres))
        .route("/authors", get(authors::list_authors))
        // Root: create on POST, book list for any other method
        .route("/", post(books::create_book).fallback(books::api_fallback))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .merge(api)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
