//! Book endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    services::books::parse_book_id,
    AppState,
};

/// Book list response
#[derive(Serialize, ToSchema)]
pub struct BooksListResponse {
    pub success: bool,
    pub books: Vec<Book>,
}

/// Created book response
#[derive(Serialize, ToSchema)]
pub struct CreateBookResponse {
    pub success: bool,
    pub message: String,
    pub book: Book,
}

/// Updated book response
#[derive(Serialize, ToSchema)]
pub struct UpdateBookResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "updatedBook")]
    pub updated_book: Book,
}

/// Deleted book response
#[derive(Serialize, ToSchema)]
pub struct DeleteBookResponse {
    pub success: bool,
    pub message: String,
}

/// List books with optional filters and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = BooksListResponse),
        (status = 400, description = "Invalid numeric query parameter", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<BookQuery>, AppError>,
) -> AppResult<Json<BooksListResponse>> {
    let books = state.services.books.list(&query).await?;
    Ok(Json(BooksListResponse {
        success: true,
        books,
    }))
}

/// Add a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = CreateBookResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 409, description = "Title already exists", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    WithRejection(Json(data), _): WithRejection<Json<CreateBook>, AppError>,
) -> AppResult<(StatusCode, Json<CreateBookResponse>)> {
    let book = state.services.books.create(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBookResponse {
            success: true,
            message: "Book added successfully.".to_string(),
            book,
        }),
    ))
}

/// Update some fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = u32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = UpdateBookResponse),
        (status = 400, description = "Invalid ID or nothing to update", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 409, description = "Title already exists", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> AppResult<Json<UpdateBookResponse>> {
    // A bad id wins over a bad body
    let id = parse_book_id(&id)?;
    let Json(data) = body?;
    let updated_book = state.services.books.update(id, &data).await?;
    Ok(Json(UpdateBookResponse {
        success: true,
        message: "Book updated successfully.".to_string(),
        updated_book,
    }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = u32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = DeleteBookResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<Json<DeleteBookResponse>> {
    let id = parse_book_id(&id)?;
    let id = state.services.books.delete(id).await?;
    Ok(Json(DeleteBookResponse {
        success: true,
        message: format!("Book with ID {} deleted successfully.", id),
    }))
}
