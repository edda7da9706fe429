//! Data access for the `books` table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bookshelf_http::AppError;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

use super::models::{Book, BookChanges};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a book with isbn '{0}' already exists")]
    Duplicate(String),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(isbn) => AppError::conflict(
                vec![json!({ "field": "isbn", "error": "already exists", "value": isbn })],
                format!("a book with isbn '{}' already exists", isbn),
            ),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

/// Storage seam used by the books handlers.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ordered by the bytes of their isbn.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Insert a new book; fails with [`StoreError::Duplicate`] if the isbn is taken.
    async fn create(&self, book: &Book) -> Result<Book, StoreError>;

    /// Replace every mutable field. Returns `None` if no such isbn exists.
    async fn update(&self, isbn: &str, changes: &BookChanges) -> Result<Option<Book>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, isbn: &str) -> Result<bool, StoreError>;
}

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY isbn COLLATE \"C\"");
        tracing::debug!(sql = %sql, "query");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1");
        tracing::debug!(sql = %sql, isbn, "query");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        let sql = format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {BOOK_COLUMNS}"
        );
        tracing::debug!(sql = %sql, isbn = %book.isbn, "query");
        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.isbn)
            .bind(&book.amazon_url)
            .bind(&book.author)
            .bind(&book.language)
            .bind(book.pages)
            .bind(&book.publisher)
            .bind(&book.title)
            .bind(book.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Duplicate(book.isbn.clone())
                }
                other => StoreError::Database(other),
            })
    }

    async fn update(&self, isbn: &str, changes: &BookChanges) -> Result<Option<Book>, StoreError> {
        let sql = format!(
            "UPDATE books SET amazon_url = $2, author = $3, language = $4, pages = $5, \
             publisher = $6, title = $7, year = $8 WHERE isbn = $1 RETURNING {BOOK_COLUMNS}"
        );
        tracing::debug!(sql = %sql, isbn, "query");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .bind(&changes.amazon_url)
            .bind(&changes.author)
            .bind(&changes.language)
            .bind(changes.pages)
            .bind(&changes.publisher)
            .bind(&changes.title)
            .bind(changes.year)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn delete(&self, isbn: &str) -> Result<bool, StoreError> {
        tracing::debug!(isbn, "delete book");
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-process store, used by the HTTP tests.
#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<String, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.books.read().await.get(isbn).cloned())
    }

    async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(StoreError::Duplicate(book.isbn.clone()));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(book.clone())
    }

    async fn update(&self, isbn: &str, changes: &BookChanges) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(isbn).map(|book| {
            *book = Book::from_changes(isbn, changes.clone());
            book.clone()
        }))
    }

    async fn delete(&self, isbn: &str) -> Result<bool, StoreError> {
        Ok(self.books.write().await.remove(isbn).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power_up() -> Book {
        Book {
            isbn: "0691161518".to_string(),
            amazon_url: "http://a.co/eobPtX2".to_string(),
            author: "Matthew Lane".to_string(),
            language: "english".to_string(),
            pages: 264,
            publisher: "Princeton University Press".to_string(),
            title: "Power-Up: Unlocking the Hidden Mathematics in Video Games".to_string(),
            year: 2017,
        }
    }

    fn changes() -> BookChanges {
        BookChanges {
            amazon_url: "http://a.co/eobPtX2".to_string(),
            author: "Pedro Moyano".to_string(),
            language: "english".to_string(),
            pages: 264,
            publisher: "Princeton University Press".to_string(),
            title: "Power-Up: Unlocking the Hidden Mathematics in Video Games".to_string(),
            year: 2022,
        }
    }

    async fn exercise_store(store: &dyn BookStore) {
        let book = power_up();

        assert_eq!(store.create(&book).await.unwrap(), book);
        assert!(matches!(
            store.create(&book).await,
            Err(StoreError::Duplicate(isbn)) if isbn == book.isbn
        ));
        assert_eq!(store.get(&book.isbn).await.unwrap(), Some(book.clone()));

        let updated = store.update(&book.isbn, &changes()).await.unwrap().unwrap();
        assert_eq!(updated.isbn, book.isbn);
        assert_eq!(updated.author, "Pedro Moyano");
        assert_eq!(updated.year, 2022);
        assert!(store.update("missing", &changes()).await.unwrap().is_none());

        assert_eq!(store.list().await.unwrap(), vec![updated]);

        assert!(store.delete(&book.isbn).await.unwrap());
        assert!(!store.delete(&book.isbn).await.unwrap());
        assert!(store.get(&book.isbn).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_crud() {
        exercise_store(&MemoryBookStore::new()).await;
    }

    /// Hyphens and case sort by byte value, not by locale rules.
    async fn exercise_list_order(store: &dyn BookStore) {
        for isbn in ["a1", "3", "a-2", "A3", "1"] {
            let book = Book {
                isbn: isbn.to_string(),
                ..power_up()
            };
            store.create(&book).await.unwrap();
        }

        let isbns: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.isbn)
            .collect();
        assert_eq!(isbns, vec!["1", "3", "A3", "a-2", "a1"]);
    }

    #[tokio::test]
    async fn memory_store_lists_in_isbn_order() {
        exercise_list_order(&MemoryBookStore::new()).await;
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        let err: AppError = StoreError::Duplicate("0691161518".to_string()).into();
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn pg_store_crud(pool: PgPool) {
        let migrations = vec![("books".to_string(), super::super::create_books_migration())];
        bookshelf_db::run_migrations(&pool, &migrations).await.unwrap();

        exercise_store(&PgBookStore::new(pool)).await;
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn pg_store_lists_in_isbn_order(pool: PgPool) {
        let migrations = vec![("books".to_string(), super::super::create_books_migration())];
        bookshelf_db::run_migrations(&pool, &migrations).await.unwrap();

        exercise_list_order(&PgBookStore::new(pool)).await;
    }
}
