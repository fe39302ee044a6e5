//! Book collection service
//!
//! Every operation loads the whole collection from the store, works on that
//! copy and, for mutations, writes the whole collection back. There is no
//! locking between requests: concurrent writers race and the last one wins.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{present_text, Book, BookQuery, CreateBook, UpdateBook},
    repository::BookStore,
};

/// Validated listing parameters
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListParams {
    pub genre: Option<String>,
    pub year: Option<f64>,
    /// `(page, limit)`, only set when both were supplied
    pub pagination: Option<(f64, f64)>,
}

impl ListParams {
    /// Validate raw query values. Blank values count as absent.
    pub fn parse(query: &BookQuery) -> AppResult<Self> {
        let year = match present_text(&query.year) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|y| y.is_finite())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "Invalid year format. It should be a number.".to_string(),
                        )
                    })?,
            ),
            None => None,
        };

        let page = parse_page_param(&query.page)?;
        let limit = parse_page_param(&query.limit)?;

        Ok(Self {
            genre: present_text(&query.genre).map(str::to_string),
            year,
            pagination: page.zip(limit),
        })
    }
}

fn parse_page_param(value: &Option<String>) -> AppResult<Option<f64>> {
    match present_text(value) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::Validation("Page and limit must be numbers.".to_string())),
        None => Ok(None),
    }
}

/// Keep books matching the genre (case-insensitive) and year filters
pub fn filter_books(books: Vec<Book>, genre: Option<&str>, year: Option<f64>) -> Vec<Book> {
    let genre = genre.map(str::to_lowercase);
    books
        .into_iter()
        .filter(|book| {
            genre
                .as_deref()
                .map_or(true, |g| book.genre.to_lowercase() == g)
        })
        .filter(|book| year.map_or(true, |y| f64::from(book.year) == y))
        .collect()
}

/// Resolve a slice bound: fractions truncate toward zero, negative values
/// count back from the end, and the result is clamped to `0..=len`.
fn slice_bound(value: f64, len: usize) -> usize {
    let value = value.trunc();
    let len_f = len as f64;
    if value < 0.0 {
        (len_f + value).max(0.0) as usize
    } else {
        value.min(len_f) as usize
    }
}

/// Slice `[(page-1)*limit, (page-1)*limit + limit)` with array-slice bounds.
///
/// Out-of-range bounds give an empty page, never an error.
pub fn paginate(books: Vec<Book>, page: f64, limit: f64) -> Vec<Book> {
    let start = (page - 1.0) * limit;
    let end = start + limit;
    let from = slice_bound(start, books.len());
    let to = slice_bound(end, books.len());
    if from >= to {
        return Vec::new();
    }
    books.into_iter().skip(from).take(to - from).collect()
}

/// Parse a path id. Only positive integers are valid.
pub fn parse_book_id(raw: &str) -> AppResult<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation("Invalid book ID.".to_string()))
}

/// Next free id: one past the largest, or 1 for an empty collection
pub fn next_id(books: &[Book]) -> AppResult<u32> {
    match books.iter().map(|b| b.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| AppError::Internal("Book id space exhausted".to_string())),
    }
}

fn find_title<'a>(books: &'a [Book], title: &str) -> Option<&'a Book> {
    let title = title.to_lowercase();
    books.iter().find(|b| b.title.to_lowercase() == title)
}

fn title_conflict(title: &str, existing: &Book) -> AppError {
    AppError::Conflict(format!(
        "A book titled \"{}\" already exists with ID {}. Please choose a different title.",
        title, existing.id
    ))
}

fn not_found() -> AppError {
    AppError::NotFound("Book not found.".to_string())
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
    strict_writes: bool,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>, strict_writes: bool) -> Self {
        Self {
            store,
            strict_writes,
        }
    }

    /// List books with optional genre/year filters and page/limit slicing
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let params = ListParams::parse(query)?;
        tracing::debug!("Listing books with {:?}", params);

        let books = self.store.load().await;
        let books = filter_books(books, params.genre.as_deref(), params.year);
        Ok(match params.pagination {
            Some((page, limit)) => paginate(books, page, limit),
            None => books,
        })
    }

    /// Number of books in the collection
    pub async fn count(&self) -> usize {
        self.store.load().await.len()
    }

    /// Create a book, assigning the next id
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let missing = data.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "The following fields are required: {}.",
                missing.join(", ")
            )));
        }

        let mut books = self.store.load().await;

        if let Some(title) = present_text(&data.title) {
            if let Some(existing) = find_title(&books, title) {
                return Err(title_conflict(title, existing));
            }
        }

        let id = next_id(&books)?;
        let book = data
            .into_book(id)
            .ok_or_else(|| AppError::Internal("Incomplete book after validation".to_string()))?;

        books.push(book.clone());
        self.persist(&books).await?;

        tracing::info!("Created book id={} title={:?}", book.id, book.title);
        Ok(book)
    }

    /// Merge the supplied fields into an existing book
    pub async fn update(&self, id: u32, data: &UpdateBook) -> AppResult<Book> {
        if !data.has_changes() {
            return Err(AppError::Validation(
                "At least one field (title, author, year, genre, pages) must be updated."
                    .to_string(),
            ));
        }

        let mut books = self.store.load().await;
        let index = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(not_found)?;

        if let Some(title) = data.title() {
            if let Some(existing) = find_title(&books, title).filter(|b| b.id != id) {
                return Err(title_conflict(title, existing));
            }
        }

        data.apply_to(&mut books[index]);
        let updated = books[index].clone();
        self.persist(&books).await?;

        tracing::info!("Updated book id={}", id);
        Ok(updated)
    }

    /// Remove a book, returning its id
    pub async fn delete(&self, id: u32) -> AppResult<u32> {
        let mut books = self.store.load().await;
        let before = books.len();
        books.retain(|b| b.id != id);
        if books.len() == before {
            return Err(not_found());
        }

        self.persist(&books).await?;

        tracing::info!("Deleted book id={}", id);
        Ok(id)
    }

    async fn persist(&self, books: &[Book]) -> AppResult<()> {
        match self.store.save(books).await {
            Ok(()) => Ok(()),
            Err(e) if self.strict_writes => Err(e.into()),
            Err(e) => {
                tracing::error!("Failed to persist {} books: {}", books.len(), e);
                Ok(())
            }
        }
    }
}
