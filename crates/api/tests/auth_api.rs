//! Integration tests for authentication: registration, login, and the gate
//! in front of the cart.

mod common;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use secrecy::SecretString;
use serde_json::{Value, json};

use bazaar_api::auth::{Claims, TokenService};
use bazaar_core::UserId;

use common::{TEST_TOKEN_SECRET, spawn_app};

#[tokio::test]
async fn register_then_login_grants_access() {
    let app = spawn_app().await;
    let token = app.register_and_login("alice").await;

    let resp = app
        .client
        .get(app.url("/cart"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("cart request failed");

    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let app = spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({ "username": "", "email": "a@example.com", "password": "long-enough-pass" }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({ "username": "bob", "email": "b@example.com", "password": "short" }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = spawn_app().await;
    app.register_and_login("peggy").await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": "peggy",
            "email": "other@example.com",
            "password": "test-passphrase-123",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    app.register_and_login("quentin").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": "quentin", "password": "not-the-password" }))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn missing_token_is_rejected_before_any_mutation() {
    let app = spawn_app().await;
    let product_id = app.seed_product("Doormat", 800).await;

    let resp = app
        .client
        .post(app.url("/cart"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("cart request failed");

    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(app.cart_line_count().await, 0);
}

#[tokio::test]
async fn foreign_secret_token_is_rejected_before_any_mutation() {
    let app = spawn_app().await;
    let product_id = app.seed_product("Throw Pillow", 1_200).await;

    // A token signed by someone who does not hold our secret.
    let foreign = TokenService::new(
        &SecretString::from("some-other-service-signing-key-123456"),
        Duration::from_secs(3600),
    );
    let forged = foreign.issue(UserId::new(1)).expect("failed to sign token");

    let resp = app
        .client
        .post(app.url("/cart"))
        .header("Authorization", format!("Bearer {forged}"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("cart request failed");

    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(app.cart_line_count().await, 0);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = spawn_app().await;

    let resp = app
        .client
        .get(app.url("/cart"))
        .header("Authorization", "Bearer not-even-a-jwt")
        .send()
        .await
        .expect("cart request failed");

    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = spawn_app().await;

    // Hand-craft a token signed with the right secret but already expired.
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs();
    let claims = Claims {
        sub: "1".to_owned(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let stale = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_TOKEN_SECRET.as_bytes()),
    )
    .expect("failed to sign token");

    let resp = app
        .client
        .get(app.url("/cart"))
        .header("Authorization", format!("Bearer {stale}"))
        .send()
        .await
        .expect("cart request failed");

    assert_eq!(resp.status().as_u16(), 401);

    let body: Value = resp.json().await.expect("error body is not JSON");
    assert_eq!(body["message"], json!("access token expired"));
}

#[tokio::test]
async fn raw_token_without_bearer_prefix_is_accepted() {
    let app = spawn_app().await;
    let token = app.register_and_login("ruth").await;

    let resp = app
        .client
        .get(app.url("/cart"))
        .header("Authorization", token)
        .send()
        .await
        .expect("cart request failed");

    assert_eq!(resp.status().as_u16(), 200);
}
