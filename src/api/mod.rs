//! API handlers for the bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books))
        .route("/books", post(books::create_book))
        .route("/books/:id", put(books::update_book))
        .route("/books/:id", delete(books::delete_book))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Turn a handler panic into the standard 500 error body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}
