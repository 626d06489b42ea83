//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Octavo API",
        version = "1.0.0",
        description = "Book catalog REST API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::delete_book,
        // Reference entities
        genres::list_genres,
        authors::list_authors,
    ),
    components(
        schemas(
            crate::models::Book,
            crate::models::AuthorRef,
            crate::models::CreateBook,
            crate::models::Genre,
            crate::models::Author,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book aggregate management"),
        (name = "genres", description = "Genre reference entities"),
        (name = "authors", description = "Author reference entities")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
