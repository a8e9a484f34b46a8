// End-to-end tests for the HTTP surface
// The router runs against fresh in-memory stores for each test

use super::*;
use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_app() -> TestServer {
    let config = Config {
        jwt_secret: "test_secret".to_string(),
        ..Config::default()
    };
    let state = AppState::new(&config, Stores::in_memory());
    TestServer::new(create_router(state, config.request_timeout)).unwrap()
}

fn signup_payload(email: &str) -> Value {
    json!({
        "email": email,
        "password": "1234567890",
        "cellphone": 5555555555_u64
    })
}

fn book(title: &str, author: &str) -> Value {
    json!({
        "title": title,
        "author": author,
        "dateFinished": "2020-01-01",
        "comments": "Good read"
    })
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// Register and log in, returning the auth token
async fn signup_and_login(server: &TestServer, email: &str) -> String {
    let response = server.post("/api/users").json(&signup_payload(email)).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "1234567890" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    body["authToken"].as_str().unwrap().to_string()
}

async fn add_book(server: &TestServer, token: &str, title: &str, author: &str) -> Value {
    let (name, value) = bearer(token);
    let response = server
        .post("/api/library")
        .add_header(name, value)
        .json(&book(title, author))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

async fn list_books(server: &TestServer, token: &str) -> Vec<Value> {
    let (name, value) = bearer(token);
    let response = server.get("/api/library").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_signup_returns_public_user() {
    let server = create_test_app();

    let response = server.post("/api/users").json(&signup_payload("t@t.com")).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["email"], "t@t.com");
    assert_eq!(body["cellphone"], 5555555555_u64);
    assert!(body["id"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_missing_field() {
    let server = create_test_app();

    let response = server
        .post("/api/users")
        .json(&json!({ "email": "t@t.com", "password": "1234567890" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], 422);
    assert_eq!(body["reason"], "ValidationError");
    assert_eq!(body["kind"], "MissingField");
    assert_eq!(body["message"], "Missing field");
    assert_eq!(body["location"], "cellphone");
}

#[tokio::test]
async fn test_signup_untrimmed_email() {
    let server = create_test_app();

    let response = server.post("/api/users").json(&signup_payload(" t@t.com")).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "UntrimmedField");
    assert_eq!(body["location"], "email");
}

#[tokio::test]
async fn test_signup_short_password() {
    let server = create_test_app();

    let response = server
        .post("/api/users")
        .json(&json!({ "email": "t@t.com", "password": "short", "cellphone": 5555555555_u64 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "OutOfRange");
    assert_eq!(body["location"], "password");
    assert_eq!(body["message"], "Must be at least 10 characters long");
}

#[tokio::test]
async fn test_signup_fractional_cellphone() {
    let server = create_test_app();

    let response = server
        .post("/api/users")
        .json(&json!({ "email": "t@t.com", "password": "1234567890", "cellphone": 5555555555.0 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "OutOfRange");
    assert_eq!(body["location"], "cellphone");
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let server = create_test_app();
    server.post("/api/users").json(&signup_payload("t@t.com")).await;

    let response = server.post("/api/users").json(&signup_payload("t@t.com")).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "DuplicateField");
    assert_eq!(body["message"], "Email already taken");
    assert_eq!(body["location"], "email");
}

// ============================================================================
// Login and tokens
// ============================================================================

#[tokio::test]
async fn test_login_wrong_password() {
    let server = create_test_app();
    server.post("/api/users").json(&signup_payload("t@t.com")).await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@t.com", "password": "0987654321" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "LoginError");
    assert_eq!(body["message"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let server = create_test_app();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@t.com", "password": "1234567890" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_missing_credentials() {
    let server = create_test_app();

    for payload in [json!({ "email": "t@t.com" }), json!({ "email": "", "password": "" })] {
        let response = server.post("/api/auth/login").json(&payload).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Missing credentials");
    }
}

#[tokio::test]
async fn test_protected_endpoint() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;

    let response = server.get("/api/protected").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer(&token);
    let response = server.get("/api/protected").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"], "this is a supersecret endpoint.");
}

#[tokio::test]
async fn test_refresh_issues_usable_token() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;

    let (name, value) = bearer(&token);
    let response = server.post("/api/auth/refresh").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let refreshed = body["authToken"].as_str().unwrap();
    assert!(list_books(&server, refreshed).await.is_empty());
}

#[tokio::test]
async fn test_library_requires_valid_token() {
    let server = create_test_app();

    let response = server.get("/api/library").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "AuthenticationError");

    let (name, value) = bearer("not.a.token");
    let response = server.get("/api/library").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.post("/api/library").json(&book("A", "B")).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_and_delete_require_token() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;
    let created = add_book(&server, &token, "Dune", "Frank Herbert").await;
    let id = created["id"].as_str().unwrap();
    let path = format!("/api/library/{}", id);

    let response = server
        .put(&path)
        .json(&json!({ "id": id, "title": "Changed" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "AuthenticationError");

    let response = server.delete(&path).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "AuthenticationError");

    let entries = list_books(&server, &token).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Dune");
}

// ============================================================================
// Library
// ============================================================================

#[tokio::test]
async fn test_add_and_list_books() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;

    let created = add_book(&server, &token, "Dune", "Frank Herbert").await;
    assert_eq!(created["title"], "Dune");
    assert_eq!(created["author"], "Frank Herbert");
    assert_eq!(created["dateFinished"], "2020-01-01");
    assert_eq!(created["comments"], "Good read");
    assert!(created["id"].as_str().is_some());
    assert!(created["userId"].as_str().is_some());

    let entries = list_books(&server, &token).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_add_duplicate_book() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;
    add_book(&server, &token, "Dune", "Frank Herbert").await;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/library")
        .add_header(name, value)
        .json(&book("Dune", "Frank Herbert"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "DuplicateEntry");
    assert_eq!(body["message"], "Book already present in library.");
    assert_eq!(list_books(&server, &token).await.len(), 1);
}

#[tokio::test]
async fn test_same_book_in_two_libraries() {
    let server = create_test_app();
    let alice = signup_and_login(&server, "alice@t.com").await;
    let bob = signup_and_login(&server, "bob@t.com").await;

    add_book(&server, &alice, "Dune", "Frank Herbert").await;
    add_book(&server, &bob, "Dune", "Frank Herbert").await;

    assert_eq!(list_books(&server, &alice).await.len(), 1);
    assert_eq!(list_books(&server, &bob).await.len(), 1);
}

#[tokio::test]
async fn test_add_book_missing_field() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/library")
        .add_header(name, value)
        .json(&json!({ "title": "Dune", "dateFinished": "2020-01-01" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MissingField");
    assert_eq!(body["location"], "author");
}

#[tokio::test]
async fn test_update_book() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;
    let created = add_book(&server, &token, "Dune", "Frank Herbert").await;
    let id = created["id"].as_str().unwrap();

    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/library/{}", id))
        .add_header(name, value)
        .json(&json!({ "id": id, "comments": "Better the second time" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let entries = list_books(&server, &token).await;
    assert_eq!(entries[0]["title"], "Dune");
    assert_eq!(entries[0]["comments"], "Better the second time");
}

#[tokio::test]
async fn test_update_id_mismatch_changes_nothing() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;
    let created = add_book(&server, &token, "Dune", "Frank Herbert").await;
    let id = created["id"].as_str().unwrap();

    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/library/{}", id))
        .add_header(name, value)
        .json(&json!({ "id": "something-else", "title": "Changed" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["reason"], "BadRequest");
    assert_eq!(
        body["message"],
        "Request path id and request body id values must match"
    );
    assert_eq!(list_books(&server, &token).await[0]["title"], "Dune");
}

#[tokio::test]
async fn test_delete_book() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;
    let created = add_book(&server, &token, "Dune", "Frank Herbert").await;
    let path = format!("/api/library/{}", created["id"].as_str().unwrap());

    let (name, value) = bearer(&token);
    let response = server.delete(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(list_books(&server, &token).await.is_empty());

    let (name, value) = bearer(&token);
    let response = server.delete(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["reason"], "NotFound");
}

#[tokio::test]
async fn test_foreign_entries_are_invisible() {
    let server = create_test_app();
    let alice = signup_and_login(&server, "alice@t.com").await;
    let mallory = signup_and_login(&server, "mallory@t.com").await;
    let created = add_book(&server, &alice, "Dune", "Frank Herbert").await;
    let id = created["id"].as_str().unwrap();
    let path = format!("/api/library/{}", id);

    assert!(list_books(&server, &mallory).await.is_empty());

    let (name, value) = bearer(&mallory);
    let response = server
        .put(&path)
        .add_header(name, value)
        .json(&json!({ "id": id, "title": "Stolen" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let (name, value) = bearer(&mallory);
    let response = server.delete(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let entries = list_books(&server, &alice).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Dune");
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;

    let (name, value) = bearer(&token);
    let response = server.delete("/api/library/not-a-uuid").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Request bodies
// ============================================================================

#[tokio::test]
async fn test_malformed_json_body() {
    let server = create_test_app();

    let response = server
        .post("/api/users")
        .bytes(Bytes::from_static(b"{bad json"))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], 400);
    assert_eq!(body["reason"], "BadRequest");
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_non_json_body() {
    let server = create_test_app();

    let response = server.post("/api/users").text("email=t@t.com").await;

    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json();
    assert_eq!(body["code"], 415);
    assert_eq!(body["reason"], "BadRequest");
}

#[tokio::test]
async fn test_malformed_json_on_library_add() {
    let server = create_test_app();
    let token = signup_and_login(&server, "t@t.com").await;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/library")
        .add_header(name, value)
        .bytes(Bytes::from_static(b"{\"title\": "))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["reason"], "BadRequest");
    assert!(list_books(&server, &token).await.is_empty());
}

// ============================================================================
// Fallback and docs
// ============================================================================

#[tokio::test]
async fn test_unmatched_route() {
    let server = create_test_app();

    let response = server.get("/api/nothing-here").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": 404, "message": "Not Found" }));
}

#[test]
fn test_openapi_documents_every_route() {
    let doc = ApiDoc::openapi();
    for path in [
        "/api/users",
        "/api/auth/login",
        "/api/auth/refresh",
        "/api/protected",
        "/api/library",
        "/api/library/{id}",
    ] {
        assert!(doc.paths.paths.contains_key(path), "{}", path);
    }
    let components = doc.components.unwrap();
    assert!(components.security_schemes.contains_key("bearer_auth"));
}
