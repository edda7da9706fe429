pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use routes::SharedStore;
use store::BookStore;

/// Book records: CRUD over the `books` table, mounted under `/books`
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

pub(crate) fn create_books_migration() -> Migration {
    Migration {
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                isbn       TEXT PRIMARY KEY,
                amazon_url TEXT NOT NULL,
                author     TEXT NOT NULL,
                language   TEXT NOT NULL,
                pages      INTEGER NOT NULL,
                publisher  TEXT NOT NULL,
                title      TEXT NOT NULL,
                year       INTEGER NOT NULL
            );
            "#,
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let content = |schema: &str| {
            json!({
                "application/json": {
                    "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                }
            })
        };
        let isbn_param = json!({
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let book_string = |description: &str| json!({ "type": "string", "description": description });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "All books", "content": content("BookList") },
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": { "required": true, "content": content("Book") },
                        "responses": {
                            "201": { "description": "Created book", "content": content("BookResponse") },
                            "400": error("Validation error"),
                            "409": error("A book with this isbn already exists")
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by isbn",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "responses": {
                            "200": { "description": "The book", "content": content("BookResponse") },
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "requestBody": { "required": true, "content": content("BookChanges") },
                        "responses": {
                            "200": { "description": "Updated book", "content": content("BookResponse") },
                            "400": error("Validation error"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "responses": {
                            "200": { "description": "Book deleted", "content": content("DeletedResponse") },
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": book_string("Unique identifier for the book"),
                            "amazon_url": { "type": "string", "format": "uri" },
                            "author": book_string("Author of the book"),
                            "language": book_string("Language the book is written in"),
                            "pages": { "type": "integer", "minimum": 1 },
                            "publisher": book_string("Publisher of the book"),
                            "title": book_string("Title of the book"),
                            "year": { "type": "integer", "maximum": 9999 }
                        },
                        "required": ["isbn", "amazon_url", "author", "language", "pages", "publisher", "title", "year"]
                    },
                    "BookChanges": {
                        "type": "object",
                        "properties": {
                            "isbn": book_string("Optional; must match the path isbn"),
                            "amazon_url": { "type": "string", "format": "uri" },
                            "author": { "type": "string" },
                            "language": { "type": "string" },
                            "pages": { "type": "integer", "minimum": 1 },
                            "publisher": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer", "maximum": 9999 }
                        },
                        "required": ["amazon_url", "author", "language", "pages", "publisher", "title", "year"]
                    },
                    "BookList": {
                        "type": "object",
                        "properties": {
                            "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                        },
                        "required": ["books"]
                    },
                    "BookResponse": {
                        "type": "object",
                        "properties": {
                            "book": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["book"]
                    },
                    "DeletedResponse": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string", "example": "Book deleted" }
                        },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![create_books_migration()]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module on top of the given store
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryBookStore;

    #[test]
    fn exposes_books_migration_and_schema() {
        let module = BooksModule::new(Arc::new(MemoryBookStore::new()));

        let migrations = module.migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].id, "001_create_books");
        assert!(migrations[0].up.contains("isbn       TEXT PRIMARY KEY"));

        let openapi = module.openapi().unwrap();
        assert!(openapi["paths"]["/{isbn}"]["put"].is_object());
        assert_eq!(
            openapi["components"]["schemas"]["Book"]["required"]
                .as_array()
                .unwrap()
                .len(),
            8
        );
    }
}
