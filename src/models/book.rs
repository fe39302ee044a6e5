//! Book model and request payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use utoipa::{IntoParams, ToSchema};

/// Book record as stored in the backing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Assigned by the server, never by clients
    pub id: u32,
    pub title: String,
    pub author: String,
    /// Publication year
    pub year: i32,
    pub genre: String,
    /// Page count, any JSON number
    #[schema(value_type = f64)]
    pub pages: Number,
    /// Members written by other tools, kept so that rewriting the file does not drop them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Create book request.
///
/// Every field is optional at the deserialization level so that all missing
/// fields can be reported together.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub pages: Option<Number>,
}

/// Update book request. Any `id` member in the payload is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub pages: Option<Number>,
}

/// Query parameters for listing books.
///
/// Values are kept as raw strings; numeric validation happens in the service.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Filter by genre (case-insensitive)
    pub genre: Option<String>,
    /// Filter by publication year
    pub year: Option<String>,
    /// Page number (1-based), only applied together with `limit`
    pub page: Option<String>,
    /// Items per page, only applied together with `page`
    pub limit: Option<String>,
}

/// Returns the text if it is set and not blank.
pub(crate) fn present_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Returns the number if it is set and non-zero.
pub(crate) fn present_number<T>(value: Option<T>) -> Option<T>
where
    T: Default + PartialEq,
{
    value.filter(|v| *v != T::default())
}

/// Returns the JSON number if it is set and non-zero.
pub(crate) fn present_json_number(value: &Option<Number>) -> Option<&Number> {
    value.as_ref().filter(|n| n.as_f64().is_some_and(|v| v != 0.0))
}

impl CreateBook {
    /// Names of required fields that are absent, blank or zero, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if present_text(&self.title).is_none() {
            missing.push("title");
        }
        if present_text(&self.author).is_none() {
            missing.push("author");
        }
        if present_number(self.year).is_none() {
            missing.push("year");
        }
        if present_text(&self.genre).is_none() {
            missing.push("genre");
        }
        if present_json_number(&self.pages).is_none() {
            missing.push("pages");
        }
        missing
    }

    /// Build a book with the given id.
    ///
    /// Returns `None` if any required field is missing.
    pub fn into_book(self, id: u32) -> Option<Book> {
        if !self.missing_fields().is_empty() {
            return None;
        }
        Some(Book {
            id,
            title: self.title?,
            author: self.author?,
            year: self.year?,
            genre: self.genre?,
            pages: self.pages?,
            extra: Map::new(),
        })
    }
}

impl UpdateBook {
    /// True if at least one mutable field carries a value
    pub fn has_changes(&self) -> bool {
        present_text(&self.title).is_some()
            || present_text(&self.author).is_some()
            || present_number(self.year).is_some()
            || present_text(&self.genre).is_some()
            || present_json_number(&self.pages).is_some()
    }

    /// The new title, if this update changes it
    pub fn title(&self) -> Option<&str> {
        present_text(&self.title)
    }

    /// Shallow-merge the supplied fields onto `book`. The id is never touched.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = present_text(&self.title) {
            book.title = title.to_string();
        }
        if let Some(author) = present_text(&self.author) {
            book.author = author.to_string();
        }
        if let Some(year) = present_number(self.year) {
            book.year = year;
        }
        if let Some(genre) = present_text(&self.genre) {
            book.genre = genre.to_string();
        }
        if let Some(pages) = present_json_number(&self.pages) {
            book.pages = pages.clone();
        }
    }
}
