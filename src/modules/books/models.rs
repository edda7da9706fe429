use serde::{Deserialize, Serialize};

/// A book record, keyed by its isbn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier, primary key of the `books` table
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

impl Book {
    /// Assemble a book from its isbn and the remaining fields.
    pub fn from_changes(isbn: impl Into<String>, changes: BookChanges) -> Self {
        Self {
            isbn: isbn.into(),
            amazon_url: changes.amazon_url,
            author: changes.author,
            language: changes.language,
            pages: changes.pages,
            publisher: changes.publisher,
            title: changes.title,
            year: changes.year,
        }
    }
}

/// Every field of a book except the isbn; a PUT replaces all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookChanges {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// `GET /books` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// Response body for single-book operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `DELETE /books/{isbn}` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

impl DeletedResponse {
    pub fn book_deleted() -> Self {
        Self {
            message: "Book deleted".to_string(),
        }
    }
}
