//! HTTP handlers for `/books`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::AppError;
use serde_json::Value;

use super::models::{BookList, BookResponse, DeletedResponse};
use super::store::BookStore;
use super::validation::{validate_book_update, validate_new_book};

pub type SharedStore = Arc<dyn BookStore>;

/// Routes relative to the module prefix.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

fn book_not_found(isbn: &str) -> AppError {
    AppError::not_found(format!("no book with isbn '{}'", isbn))
}

pub async fn list_books(State(store): State<SharedStore>) -> Result<Json<BookList>, AppError> {
    let books = store.list().await?;
    Ok(Json(BookList { books }))
}

pub async fn get_book(
    State(store): State<SharedStore>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = store
        .get(&isbn)
        .await?
        .ok_or_else(|| book_not_found(&isbn))?;
    Ok(Json(BookResponse { book }))
}

pub async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(body) = payload?;
    let book = validate_new_book(&body)?;

    let book = store.create(&book).await?;
    tracing::info!(isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// Full replacement of every field except the isbn.
pub async fn update_book(
    State(store): State<SharedStore>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Json(body) = payload?;
    let changes = validate_book_update(&isbn, &body)?;

    let book = store
        .update(&isbn, &changes)
        .await?
        .ok_or_else(|| book_not_found(&isbn))?;
    tracing::info!(isbn = %book.isbn, "book updated");

    Ok(Json(BookResponse { book }))
}

pub async fn delete_book(
    State(store): State<SharedStore>,
    Path(isbn): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    if !store.delete(&isbn).await? {
        return Err(book_not_found(&isbn));
    }
    tracing::info!(isbn = %isbn, "book deleted");

    Ok(Json(DeletedResponse::book_deleted()))
}
