//! Integration tests for the catalog endpoints.

mod common;

use serde_json::{Value, json};

use common::spawn_app;

#[tokio::test]
async fn create_then_fetch_product() {
    let app = spawn_app().await;
    let category_id = app.seed_category().await;

    let resp = app
        .client
        .post(app.url("/products"))
        .json(&json!({
            "name": "Bluetooth Speaker",
            "category_id": category_id,
            "price": 4_999,
            "description": "Portable speaker",
            "seller": "Acme Audio",
        }))
        .send()
        .await
        .expect("create request failed");
    assert_eq!(resp.status().as_u16(), 201);

    let created: Value = resp.json().await.expect("product body is not JSON");
    let id = created["id"].as_i64().expect("product has no id");

    let resp = app
        .client
        .get(app.url(&format!("/products/{id}")))
        .send()
        .await
        .expect("get request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let fetched: Value = resp.json().await.expect("product body is not JSON");
    assert_eq!(fetched["name"], json!("Bluetooth Speaker"));
    assert_eq!(fetched["price"], json!(4_999));
    assert_eq!(fetched["seller"], json!("Acme Audio"));
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let app = spawn_app().await;

    let resp = app
        .client
        .get(app.url("/products/424242"))
        .send()
        .await
        .expect("get request failed");

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn create_rejects_empty_name_and_unknown_category() {
    let app = spawn_app().await;
    let category_id = app.seed_category().await;

    let resp = app
        .client
        .post(app.url("/products"))
        .json(&json!({ "name": "  ", "category_id": category_id, "price": 100 }))
        .send()
        .await
        .expect("create request failed");
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .client
        .post(app.url("/products"))
        .json(&json!({ "name": "Orphan", "category_id": 999_999, "price": 100 }))
        .send()
        .await
        .expect("create request failed");
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn listing_returns_every_product() {
    let app = spawn_app().await;
    app.seed_product("First", 100).await;
    app.seed_product("Second", 200).await;

    let resp = app
        .client
        .get(app.url("/products"))
        .send()
        .await
        .expect("list request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let products: Value = resp.json().await.expect("list body is not JSON");
    assert_eq!(products.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn search_ignores_case_and_spaces() {
    let app = spawn_app().await;
    app.seed_product("Bluetooth Speaker", 4_999).await;
    app.seed_product("Desk Lamp", 1_500).await;

    let resp = app
        .client
        .get(app.url("/products/search?query=blue%20tooth"))
        .send()
        .await
        .expect("search request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let products: Value = resp.json().await.expect("search body is not JSON");
    let products = products.as_array().expect("search body is not an array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], json!("Bluetooth Speaker"));
}

#[tokio::test]
async fn category_listing_scopes_products() {
    let app = spawn_app().await;

    // Two products in separate categories.
    let in_category = app.seed_product("Scoped", 700).await;
    app.seed_product("Elsewhere", 800).await;

    let category_id: i64 =
        sqlx::query_scalar("SELECT category_id FROM products WHERE id = $1")
            .bind(in_category)
            .fetch_one(&app.pool)
            .await
            .expect("category lookup failed");

    let resp = app
        .client
        .get(app.url(&format!("/categories/{category_id}/products")))
        .send()
        .await
        .expect("category products request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let products: Value = resp.json().await.expect("body is not JSON");
    let products = products.as_array().expect("body is not an array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], json!("Scoped"));

    let resp = app
        .client
        .get(app.url("/categories"))
        .send()
        .await
        .expect("categories request failed");
    assert_eq!(resp.status().as_u16(), 200);
    let categories: Value = resp.json().await.expect("body is not JSON");
    assert_eq!(categories.as_array().map(Vec::len), Some(2));
}
