//! API integration tests, driving the router in process over the memory backend

use athenaeum_server::{
    api,
    config::{AppConfig, BackendMode, SeedUser},
    AppState,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@library.com";
const ADMIN_PASSWORD: &str = "admin";

fn app() -> Router {
    let mut config = AppConfig::default();
    config.backend.mode = BackendMode::Memory;
    config.backend.seed_users = vec![SeedUser {
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    }];

    api::create_router(AppState::build(config).expect("Failed to build state"))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

/// Helper to get an access token for the seeded admin
async fn get_auth_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().expect("No token in response").to_string()
}

async fn create_book(app: &Router, token: &str, title: &str, author: &str, category: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(token),
        Some(json!({
            "title": title,
            "author": author,
            "publisher": "Penguin",
            "year": 1950,
            "category": category
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_member(app: &Router, token: &str, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/members",
        Some(token),
        Some(json!({ "name": name, "email": email, "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_login_and_current_user() {
    let app = app();
    let token = get_auth_token(&app).await;

    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);

    let (status, _) = send(&app, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid login credentials");
}

#[tokio::test]
async fn test_unauthorized_access() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/stats", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The catalog stays public
    let (status, body) = send(&app, Method::GET, "/catalog", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_book_crud() {
    let app = app();
    let token = get_auth_token(&app).await;

    let book = create_book(&app, &token, "Brave New World", "Aldous Huxley", "Dystopia").await;
    assert_eq!(book["status"], "available");
    let id = book["id"].as_str().expect("No book ID").to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(&token),
        Some(json!({ "year": 1932 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 1932);
    assert_eq!(body["title"], "Brave New World");

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_validation() {
    let app = app();
    let token = get_auth_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(&token),
        Some(json!({ "title": "", "author": "Anonymous", "category": "Poetry" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_admin_book_filters() {
    let app = app();
    let token = get_auth_token(&app).await;

    create_book(&app, &token, "Emma", "Jane Austen", "Classics").await;
    create_book(&app, &token, "Persuasion", "Jane Austen", "Classics").await;
    create_book(&app, &token, "Neuromancer", "William Gibson", "Science Fiction").await;

    let (status, body) = send(&app, Method::GET, "/books?author=austen", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .expect("Expected a list")
        .iter()
        .filter_map(|b| b["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Persuasion", "Emma"]);

    let (_, body) = send(&app, Method::GET, "/books?category=Science%20Fiction", Some(&token), None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_catalog_filters() {
    let app = app();
    let token = get_auth_token(&app).await;

    create_book(&app, &token, "The Hobbit", "J.R.R. Tolkien", "Fantasy").await;
    create_book(&app, &token, "Dune", "Frank Herbert", "Science Fiction").await;
    create_book(&app, &token, "The Silmarillion", "J.R.R. Tolkien", "Fantasy").await;

    let (status, body) = send(&app, Method::GET, "/catalog?search=tolkien", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["books"][0]["title"], "The Silmarillion");
    assert_eq!(body["categories"], json!(["Fantasy", "Science Fiction"]));

    let (_, body) = send(&app, Method::GET, "/catalog?category=fantasy", None, None).await;
    assert_eq!(body["total"], 0);

    let (status, body) = send(&app, Method::GET, "/catalog?search=&category=Fantasy&status=", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_checkout_and_return() {
    let app = app();
    let token = get_auth_token(&app).await;

    let book = create_book(&app, &token, "Moby-Dick", "Herman Melville", "Classics").await;
    let member = create_member(&app, &token, "Ishmael", "ishmael@example.com").await;
    let book_id = book["id"].as_str().expect("No book ID").to_string();

    // Check out
    let (status, loan) = send(
        &app,
        Method::POST,
        "/loans",
        Some(&token),
        Some(json!({ "book_id": book_id, "member_id": member["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "borrowed");
    assert!(loan["borrow_date"].is_string());
    assert!(loan["staff_id"].is_string());
    let loan_id = loan["id"].as_str().expect("No loan ID").to_string();

    let (_, book) = send(&app, Method::GET, &format!("/catalog/{}", book_id), None, None).await;
    assert_eq!(book["status"], "borrowed");

    // A borrowed book cannot be lent twice
    let (status, _) = send(
        &app,
        Method::POST,
        "/loans",
        Some(&token),
        Some(json!({ "book_id": book_id, "member_id": member["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, loans) = send(&app, Method::GET, "/loans", Some(&token), None).await;
    assert_eq!(loans[0]["book"]["title"], "Moby-Dick");
    assert_eq!(loans[0]["member"]["name"], "Ishmael");

    let (_, stats) = send(&app, Method::GET, "/stats", Some(&token), None).await;
    assert_eq!(stats["borrowed_books"], 1);
    assert_eq!(stats["active_loans"], 1);

    // Return
    let (status, loan) = send(&app, Method::POST, &format!("/loans/{}/return", loan_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loan["status"], "returned");
    assert!(loan["return_date"].is_string());

    let (_, book) = send(&app, Method::GET, &format!("/catalog/{}", book_id), None, None).await;
    assert_eq!(book["status"], "available");

    let (status, _) = send(&app, Method::POST, &format!("/loans/{}/return", loan_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, dashboard) = send(&app, Method::GET, "/dashboard", Some(&token), None).await;
    assert_eq!(
        dashboard["stats"],
        json!({
            "total_books": 1,
            "available_books": 1,
            "borrowed_books": 0,
            "total_members": 1,
            "active_loans": 0
        })
    );
    assert_eq!(dashboard["recent_loans"][0]["status"], "returned");
}

#[tokio::test]
async fn test_checkout_unknown_member() {
    let app = app();
    let token = get_auth_token(&app).await;

    let book = create_book(&app, &token, "Ulysses", "James Joyce", "Classics").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/loans",
        Some(&token),
        Some(json!({
            "book_id": book["id"],
            "member_id": "00000000-0000-4000-8000-000000000000"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, loans) = send(&app, Method::GET, "/loans", Some(&token), None).await;
    assert_eq!(loans, json!([]));
}

#[tokio::test]
async fn test_borrowed_book_cannot_be_deleted() {
    let app = app();
    let token = get_auth_token(&app).await;

    let book = create_book(&app, &token, "Middlemarch", "George Eliot", "Classics").await;
    let member = create_member(&app, &token, "Dorothea", "dorothea@example.com").await;
    let book_id = book["id"].as_str().expect("No book ID").to_string();

    let (status, loan) = send(
        &app,
        Method::POST,
        "/loans",
        Some(&token),
        Some(json!({ "book_id": book_id, "member_id": member["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let loan_id = loan["id"].as_str().expect("No loan ID").to_string();

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", book_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    // The loan can still be closed, after which the book may go
    let (status, _) = send(&app, Method::POST, &format!("/loans/{}/return", loan_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", book_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats) = send(&app, Method::GET, "/stats", Some(&token), None).await;
    assert_eq!(stats["active_loans"], 0);
    assert_eq!(stats["total_books"], 0);

    let (_, loans) = send(&app, Method::GET, "/loans", Some(&token), None).await;
    assert_eq!(loans[0]["status"], "returned");
    assert_eq!(loans[0]["book"], Value::Null);
}

#[tokio::test]
async fn test_update_trims_category() {
    let app = app();
    let token = get_auth_token(&app).await;

    let book = create_book(&app, &token, "Lud-in-the-Mist", "Hope Mirrlees", "Classics").await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", book["id"].as_str().expect("No book ID")),
        Some(&token),
        Some(json!({ "category": "Fantasy " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/catalog?category=Fantasy", None, None).await;
    assert_eq!(body["total"], 1);
}
