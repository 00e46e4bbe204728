//! 资源路由（owners / products / users）集成测试

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_test_app, register_user, send, send_raw};

#[tokio::test]
async fn test_owner_crud() {
    let app = create_test_app();
    let (_, token) = register_user(&app, "al", "al@x.com", "secret1").await;
    let token = Some(token.as_str());

    let created = send(
        &app,
        Method::POST,
        "/owners",
        Some(json!({"owner_name": "Acme"})),
        token,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_i64().unwrap();

    let list = send(&app, Method::GET, "/owners", None, token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.json().as_array().unwrap().len(), 1);

    let updated = send(
        &app,
        Method::PUT,
        &format!("/owners/{}", id),
        Some(json!({"owner_name": "Acme Ltd"})),
        token,
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["owner_name"], "Acme Ltd");

    let fetched = send(&app, Method::GET, &format!("/owners/{}", id), None, token).await;
    assert_eq!(fetched.json()["owner_name"], "Acme Ltd");

    let deleted = send(&app, Method::DELETE, &format!("/owners/{}", id), None, token).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.body.is_empty());

    let gone = send(&app, Method::GET, &format!("/owners/{}", id), None, token).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json(), json!({"error": "Owner not found"}));
}

#[tokio::test]
async fn test_owner_rejects_bad_input() {
    let app = create_test_app();
    let (_, token) = register_user(&app, "al", "al@x.com", "secret1").await;
    let token = Some(token.as_str());

    let empty_name = send(
        &app,
        Method::POST,
        "/owners",
        Some(json!({"owner_name": ""})),
        token,
    )
    .await;
    assert_eq!(empty_name.status, StatusCode::BAD_REQUEST);

    let bad_id = send(&app, Method::GET, "/owners/abc", None, token).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let missing = send(
        &app,
        Method::PUT,
        "/owners/999",
        Some(json!({"owner_name": "x"})),
        token,
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_crud_with_partial_update() {
    let app = create_test_app();
    let (_, token) = register_user(&app, "al", "al@x.com", "secret1").await;
    let token = Some(token.as_str());

    let created = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"product_name": "Widget", "product_brand": "Acme"})),
        token,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let product = created.json();
    let id = product["product_id"].as_i64().unwrap();
    assert!(product["created_date"].is_string());

    let updated = send(
        &app,
        Method::PUT,
        &format!("/products/{}", id),
        Some(json!({"product_brand": "Globex"})),
        token,
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["product_name"], "Widget");
    assert_eq!(updated.json()["product_brand"], "Globex");

    let deleted = send(&app, Method::DELETE, &format!("/products/{}", id), None, token).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let again = send(&app, Method::DELETE, &format!("/products/{}", id), None, token).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.json(), json!({"error": "Product not found"}));
}

#[tokio::test]
async fn test_product_malformed_json() {
    let app = create_test_app();
    let (_, token) = register_user(&app, "al", "al@x.com", "secret1").await;
    let auth = format!("Bearer {}", token);

    let response = send_raw(
        &app,
        Method::POST,
        "/products",
        Some("{\"product_name\":".into()),
        &[("authorization", auth.as_str())],
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_use_public_view() {
    let app = create_test_app();
    let (user_id, token) = register_user(&app, "al", "al@x.com", "secret1").await;
    let token = Some(token.as_str());

    let list = send(&app, Method::GET, "/users", None, token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(!list.text().contains("password"));

    let fetched = send(&app, Method::GET, &format!("/users/{}", user_id), None, token).await;
    assert_eq!(fetched.json()["username"], "al");
    assert!(fetched.json().get("password_hash").is_none());
}

#[tokio::test]
async fn test_user_update_cannot_change_password() {
    let app = create_test_app();
    let (user_id, token) = register_user(&app, "al", "al@x.com", "secret1").await;

    let updated = send(
        &app,
        Method::PUT,
        &format!("/users/{}", user_id),
        Some(json!({"email": "al@y.com", "password": "hijacked"})),
        Some(&token),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["email"], "al@y.com");

    let old_password = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({"username": "al", "password": "secret1"})),
        None,
    )
    .await;
    assert_eq!(old_password.status, StatusCode::OK);

    let new_password = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({"username": "al", "password": "hijacked"})),
        None,
    )
    .await;
    assert_eq!(new_password.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_update_collision_is_conflict() {
    let app = create_test_app();
    let (al_id, token) = register_user(&app, "al", "al@x.com", "secret1").await;
    register_user(&app, "bo", "bo@x.com", "secret2").await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/users/{}", al_id),
        Some(json!({"username": "bo"})),
        Some(&token),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.json(),
        json!({"error": "Username or Email already exists"})
    );
}
