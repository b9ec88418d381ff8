use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use bookstore_http::{
    error::{AppError, MessageBody},
    extract::{JsonBody, PathParam},
};

use super::models::{BookCreated, BookDocument, BookInput, BookRow, DocumentBook};
use super::store::{DocumentBookStore, RelationalBookStore, StoreError};

/// Store handles injected into every books route.
#[derive(Clone)]
pub struct BooksState {
    pub documents: Arc<dyn DocumentBookStore>,
    pub rows: Arc<dyn RelationalBookStore>,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(message) => AppError::bad_request(message),
            other => AppError::internal(other),
        }
    }
}

/// Relational bodies go to MySQL as sent, so an unreadable one fails the
/// same way a rejected statement does.
fn relational_body(body: Result<Json<BookInput>, JsonRejection>) -> Result<BookInput, AppError> {
    body.map(|Json(book)| book)
        .map_err(|rejection| AppError::internal(rejection.body_text()))
}

pub async fn list_documents(
    State(state): State<BooksState>,
) -> Result<Json<Vec<BookDocument>>, AppError> {
    let books = state.documents.list().await?;
    Ok(Json(books))
}

pub async fn create_document(
    State(state): State<BooksState>,
    JsonBody(book): JsonBody<DocumentBook>,
) -> Result<(StatusCode, Json<BookDocument>), AppError> {
    let saved = state.documents.insert(book).await?;
    tracing::debug!(object_id = %saved.object_id, "book document saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list_rows(State(state): State<BooksState>) -> Result<Json<Vec<BookRow>>, AppError> {
    let rows = state.rows.list().await?;
    Ok(Json(rows))
}

pub async fn create_row(
    State(state): State<BooksState>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<BookCreated>), AppError> {
    let book = relational_body(body)?;
    let book_id = state.rows.insert(&book).await?;
    tracing::debug!(book_id, "book row inserted");
    Ok((
        StatusCode::CREATED,
        Json(BookCreated {
            message: "Book added successfully".to_string(),
            book_id,
        }),
    ))
}

pub async fn update_row(
    State(state): State<BooksState>,
    PathParam(id): PathParam<i64>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let book = relational_body(body)?;
    if state.rows.update(id, &book).await? == 0 {
        return Err(AppError::not_found("Book not found"));
    }
    Ok(Json(MessageBody::new("Book updated successfully")))
}

pub async fn delete_row(
    State(state): State<BooksState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MessageBody>, AppError> {
    if state.rows.delete(id).await? == 0 {
        return Err(AppError::not_found("Book not found"));
    }
    Ok(Json(MessageBody::new("Book deleted successfully")))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "books module is healthy"
}
