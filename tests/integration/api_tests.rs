//! API integration tests
//!
//! Each test starts the full router on an ephemeral port over its own
//! temporary books file.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Number, Value};
use tempfile::TempDir;

use bookshelf_server::{
    api, config::AppConfig, models::Book, repository::JsonFileStore, AppState,
};

struct TestApp {
    base_url: String,
    books_file: PathBuf,
    client: Client,
    _dir: TempDir,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn seed(&self, books: &[Book]) {
        std::fs::write(&self.books_file, serde_json::to_string_pretty(books).unwrap())
            .expect("Failed to seed books file");
    }

    fn stored(&self) -> Vec<Book> {
        let contents = std::fs::read_to_string(&self.books_file).expect("Books file missing");
        serde_json::from_str(&contents).expect("Books file is not valid JSON")
    }

    fn raw_file(&self) -> Option<String> {
        std::fs::read_to_string(&self.books_file).ok()
    }
}

async fn spawn_app() -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let books_file = dir.path().join("books.json");

    let mut config = AppConfig::default();
    config.storage.path = books_file.display().to_string();
    let state = AppState::new(config, Arc::new(JsonFileStore::new(&books_file)));
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        books_file,
        client: Client::new(),
        _dir: dir,
    }
}

fn book(id: u32, title: &str, genre: &str, year: i32) -> Book {
    Book {
        id,
        title: title.to_string(),
        author: "Author".to_string(),
        year,
        genre: genre.to_string(),
        pages: Number::from(250),
        extra: Map::new(),
    }
}

fn numbered(count: u32) -> Vec<Book> {
    (1..=count)
        .map(|i| book(i, &format!("Book {}", i), "Fiction", 2000))
        .collect()
}

fn ids(body: &Value, key: &str) -> Vec<u64> {
    body[key]
        .as_array()
        .expect("Expected an array")
        .iter()
        .map(|b| b["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_count_and_file() {
    let app = spawn_app().await;
    app.seed(&numbered(3));

    let body: Value = app
        .client
        .get(app.url("/ready"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["books"], 3);
    assert_eq!(body["books_file"], app.books_file.display().to_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/books"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_list_empty_without_file() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/books")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "books": [] }));
}

#[tokio::test]
async fn test_list_corrupt_file_is_empty() {
    let app = spawn_app().await;
    std::fs::write(&app.books_file, "{ not json").unwrap();

    let body: Value = app
        .client
        .get(app.url("/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["books"], json!([]));
}

#[tokio::test]
async fn test_create_assigns_ids_and_persists() {
    let app = spawn_app().await;
    let payload = json!({
        "title": "Kindred",
        "author": "Octavia E. Butler",
        "year": 1979,
        "genre": "Fiction",
        "pages": 264
    });

    let response = app
        .client
        .post(app.url("/books"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book added successfully.");
    assert_eq!(body["book"]["id"], 1);

    app.seed(&[book(3, "Three", "Fiction", 2000), book(8, "Eight", "Fiction", 2000)]);
    let response = app
        .client
        .post(app.url("/books"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["id"], 9);

    let stored = app.stored();
    assert_eq!(stored.iter().map(|b| b.id).collect::<Vec<_>>(), vec![3, 8, 9]);
    assert_eq!(stored[2].title, "Kindred");
}

#[tokio::test]
async fn test_create_duplicate_title_conflicts() {
    let app = spawn_app().await;
    app.seed(&[book(4, "Beloved", "Fiction", 1987)]);
    let before = app.raw_file();

    let response = app
        .client
        .post(app.url("/books"))
        .json(&json!({
            "title": "BELOVED",
            "author": "Someone Else",
            "year": 2001,
            "genre": "Fiction",
            "pages": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "A book titled \"BELOVED\" already exists with ID 4. Please choose a different title."
    );
    assert_eq!(app.raw_file(), before);
}

#[tokio::test]
async fn test_create_missing_fields() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/books"))
        .json(&json!({ "author": "Anonymous", "genre": "Poetry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "The following fields are required: title, year, pages."
    );
    assert!(app.raw_file().is_none());
}

#[tokio::test]
async fn test_create_malformed_body() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/books"))
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_list_pagination() {
    let app = spawn_app().await;
    app.seed(&numbered(12));

    let body: Value = app
        .client
        .get(app.url("/books?page=2&limit=5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books"), vec![6, 7, 8, 9, 10]);

    let body: Value = app
        .client
        .get(app.url("/books?page=3&limit=5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books"), vec![11, 12]);

    let body: Value = app
        .client
        .get(app.url("/books?page=2.0&limit=5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books"), vec![6, 7, 8, 9, 10]);

    // Only one half of the pair: no pagination
    let body: Value = app
        .client
        .get(app.url("/books?page=3"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books").len(), 12);
}

#[tokio::test]
async fn test_list_filters() {
    let app = spawn_app().await;
    app.seed(&[
        book(1, "A", "Fiction", 2000),
        book(2, "B", "fiction", 1999),
        book(3, "C", "History", 2000),
        book(4, "D", "FICTION", 2000),
    ]);

    let body: Value = app
        .client
        .get(app.url("/books?genre=Fiction"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books"), vec![1, 2, 4]);

    let body: Value = app
        .client
        .get(app.url("/books?year=2000"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books"), vec![1, 3, 4]);

    let body: Value = app
        .client
        .get(app.url("/books?genre=fiction&year=2000&page=2&limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body, "books"), vec![4]);
}

#[tokio::test]
async fn test_list_invalid_numbers() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/books?year=abc")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid year format. It should be a number.");

    let response = app
        .client
        .get(app.url("/books?page=1&limit=ten"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Page and limit must be numbers.");
}

#[tokio::test]
async fn test_fractional_pages_and_extra_members_kept() {
    let app = spawn_app().await;
    std::fs::write(
        &app.books_file,
        r#"[{"id":1,"title":"Seeded","author":"A","year":1999,"genre":"G","pages":120.5,"isbn":"123"}]"#,
    )
    .unwrap();

    let response = app
        .client
        .post(app.url("/books"))
        .json(&json!({
            "title": "Novella",
            "author": "B",
            "year": 2005,
            "genre": "Fiction",
            "pages": 96.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["id"], 2);
    assert_eq!(body["book"]["pages"], 96.5);

    let stored: Value = serde_json::from_str(&app.raw_file().unwrap()).unwrap();
    assert_eq!(stored[0]["pages"], 120.5);
    assert_eq!(stored[0]["isbn"], "123");
    assert_eq!(stored[1]["pages"], 96.5);

    let body: Value = app
        .client
        .get(app.url("/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["books"][0]["isbn"], "123");
}

#[tokio::test]
async fn test_update_ignores_supplied_id() {
    let app = spawn_app().await;
    app.seed(&numbered(3));

    let response = app
        .client
        .put(app.url("/books/2"))
        .json(&json!({ "id": 999, "author": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Book updated successfully.");
    assert_eq!(body["updatedBook"]["id"], 2);
    assert_eq!(body["updatedBook"]["author"], "X");

    let mut expected = numbered(3);
    expected[1].author = "X".to_string();
    assert_eq!(app.stored(), expected);
}

#[tokio::test]
async fn test_update_errors_leave_file_untouched() {
    let app = spawn_app().await;
    app.seed(&numbered(2));
    let before = app.raw_file();

    let response = app
        .client
        .put(app.url("/books/42"))
        .json(&json!({ "author": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "message": "Book not found." }));

    let response = app
        .client
        .put(app.url("/books/1"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .client
        .put(app.url("/books/abc"))
        .json(&json!({ "author": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid book ID.");

    // The id is checked before the body is parsed
    let response = app
        .client
        .put(app.url("/books/abc"))
        .header("content-type", "application/json")
        .body("{\"author\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid book ID.");

    let response = app
        .client
        .put(app.url("/books/1"))
        .header("content-type", "application/json")
        .body("{\"author\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_ne!(body["message"], "Invalid book ID.");

    assert_eq!(app.raw_file(), before);
}

#[tokio::test]
async fn test_delete_book() {
    let app = spawn_app().await;
    app.seed(&numbered(4));

    let response = app.client.delete(app.url("/books/3")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Book with ID 3 deleted successfully.");

    assert_eq!(
        app.stored().iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![1, 2, 4]
    );

    let before = app.raw_file();
    let response = app.client.delete(app.url("/books/3")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.raw_file(), before);

    let response = app.client.delete(app.url("/books/0")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
