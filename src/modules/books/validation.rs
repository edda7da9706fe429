//! Request body checks for the books endpoints.
//!
//! Bodies arrive as raw JSON so that every offending field can be reported
//! in one response instead of stopping at the first serde error.

use bookshelf_http::AppError;
use serde_json::{json, Map, Number, Value};

use super::models::{Book, BookChanges};

const MAX_YEAR: i64 = 9999;

/// Collects per-field failures while reading a JSON object.
struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<Value>,
}

impl<'a> FieldReader<'a> {
    fn new(body: &'a Map<String, Value>) -> Self {
        Self {
            body,
            errors: Vec::new(),
        }
    }

    fn reject(&mut self, field: &str, error: &str) {
        self.errors.push(json!({ "field": field, "error": error }));
    }

    fn string(&mut self, field: &str) -> Option<String> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.reject(field, "is required");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.reject(field, "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.reject(field, "must be a string");
                None
            }
        }
    }

    fn url(&mut self, field: &str) -> Option<String> {
        let value = self.string(field)?;
        if value.starts_with("http://") || value.starts_with("https://") {
            Some(value)
        } else {
            self.reject(field, "must be an http or https URL");
            None
        }
    }

    fn integer(&mut self, field: &str, min: i64, max: i64) -> Option<i32> {
        let number = match self.body.get(field) {
            None | Some(Value::Null) => {
                self.reject(field, "is required");
                return None;
            }
            Some(Value::Number(n)) => whole_number(n),
            Some(_) => None,
        };

        let Some(number) = number else {
            self.reject(field, "must be an integer");
            return None;
        };

        if number < i128::from(min) {
            self.reject(field, &format!("must be at least {}", min));
            return None;
        }
        if number > i128::from(max) {
            self.reject(field, &format!("must be at most {}", max));
            return None;
        }

        i32::try_from(number).ok()
    }

    fn changes(&mut self) -> Option<BookChanges> {
        let amazon_url = self.url("amazon_url");
        let author = self.string("author");
        let language = self.string("language");
        let pages = self.integer("pages", 1, i64::from(i32::MAX));
        let publisher = self.string("publisher");
        let title = self.string("title");
        let year = self.integer("year", i64::from(i32::MIN), MAX_YEAR);

        Some(BookChanges {
            amazon_url: amazon_url?,
            author: author?,
            language: language?,
            pages: pages?,
            publisher: publisher?,
            title: title?,
            year: year?,
        })
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, AppError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(AppError::validation(self.errors, "invalid book")),
        }
    }
}

/// Integral value of a JSON number, accepting floats with no fractional part.
///
/// Widened to `i128` so values beyond `i64` still reach the range checks;
/// float-to-int casts saturate.
fn whole_number(n: &Number) -> Option<i128> {
    if let Some(v) = n.as_i64() {
        return Some(i128::from(v));
    }
    if let Some(v) = n.as_u64() {
        return Some(i128::from(v));
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object().ok_or_else(|| {
        AppError::validation(
            vec![json!({ "field": "body", "error": "must be a JSON object" })],
            "invalid book",
        )
    })
}

/// Check a `POST /books` body; all fields are required.
pub fn validate_new_book(body: &Value) -> Result<Book, AppError> {
    let mut reader = FieldReader::new(as_object(body)?);

    let isbn = reader.string("isbn");
    let changes = reader.changes();
    let book = isbn.zip(changes).map(|(isbn, changes)| Book::from_changes(isbn, changes));

    reader.finish(book)
}

/// Check a `PUT /books/{isbn}` body.
///
/// The isbn comes from the path. A body may repeat it but cannot change it.
pub fn validate_book_update(isbn: &str, body: &Value) -> Result<BookChanges, AppError> {
    let object = as_object(body)?;
    let mut reader = FieldReader::new(object);

    match object.get("isbn") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if s == isbn => {}
        Some(_) => reader.reject("isbn", "must match the isbn in the path"),
    }

    let changes = reader.changes();
    reader.finish(changes)
}
