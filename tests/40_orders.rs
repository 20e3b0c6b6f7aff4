mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

fn order_body(user_id: &str, address_id: &str, product_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "total": "27.00",
        "sub_total": "20.00",
        "tax": "2.00",
        "shipping_cost": "5.00",
        "shipping_address_id": address_id,
        "payment_method": "CREDIT_CARD",
        "order_items": [
            { "product_id": product_id, "quantity": 2, "price": "10.00" }
        ]
    })
}

/// A customer with an address, and a product. Returns `(user_id, token, order body)`.
async fn shopper(server: &TestServer, admin: &str, email: &str, sku: &str) -> Result<(String, String, Value)> {
    let (user_id, token) = server.customer(email).await?;
    let address = server.address(&token).await?;
    let product = server.product(admin, sku, "10.00", 10).await?;
    let body = order_body(&user_id, &address, &product);
    Ok((user_id, token, body))
}

#[tokio::test]
async fn placing_and_reading_an_order() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (user_id, token, body) = shopper(&server, &admin, "buyer@example.com", "LAMP").await?;

    let (status, created) = server.post("/api/orders", Some(&token), body).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["order"]["status"], "PENDING");
    assert_eq!(created["order"]["payment_status"], "PENDING");
    assert_eq!(created["order"]["total"], "27.00");
    assert_eq!(created["order"]["order_items"].as_array().map(Vec::len), Some(1));

    let path = format!("/api/orders/{}", created["order"]["id"].as_str().unwrap_or_default());
    let (status, detail) = server.get(&path, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order"]["user_id"], user_id.as_str());
    assert_eq!(detail["order"]["order_items"][0]["product"]["sku"], "LAMP");
    assert_eq!(detail["order"]["shipping_address"]["city"], "Springfield");
    assert_eq!(detail["order"]["user"]["email"], "buyer@example.com");
    Ok(())
}

#[tokio::test]
async fn customers_only_see_their_own_orders() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (alice_id, alice, alice_order) = shopper(&server, &admin, "alice@example.com", "A").await?;
    let (_, bob, bob_order) = shopper(&server, &admin, "bob@example.com", "B").await?;

    let (_, placed) = server.post("/api/orders", Some(&alice), alice_order).await?;
    server.post("/api/orders", Some(&bob), bob_order.clone()).await?;
    server.post("/api/orders", Some(&bob), bob_order).await?;

    // user_id in the query does not widen a customer's view
    let (status, body) = server.get(&format!("/api/orders?user_id={}", alice_id), Some(&bob)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = server.get("/api/orders", Some(&admin)).await?;
    assert_eq!(body["pagination"]["total"], 3);

    let (_, body) = server.get(&format!("/api/orders?user_id={}", alice_id), Some(&admin)).await?;
    assert_eq!(body["pagination"]["total"], 1);

    let alice_path = format!("/api/orders/{}", placed["order"]["id"].as_str().unwrap_or_default());
    let (status, _) = server.get(&alice_path, Some(&bob)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.get("/api/orders", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .get("/api/orders/00000000-0000-0000-0000-000000000000", Some(&bob))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn orders_are_placed_for_yourself_with_your_address() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (alice_id, _, alice_order) = shopper(&server, &admin, "alice@example.com", "A").await?;
    let (_, bob, bob_order) = shopper(&server, &admin, "bob@example.com", "B").await?;

    let (status, _) = server.post("/api/orders", Some(&bob), alice_order).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bob's address on Alice's order, placed by an admin
    let mut mixed = bob_order.clone();
    mixed["user_id"] = json!(alice_id);
    let (status, _) = server.post("/api/orders", Some(&admin), mixed).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut empty = bob_order.clone();
    empty["order_items"] = json!([]);
    let (status, _) = server.post("/api/orders", Some(&bob), empty).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut negative = bob_order;
    negative["tax"] = json!("-1.00");
    let (status, _) = server.post("/api/orders", Some(&bob), negative).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn status_changes_follow_the_graph() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (_, token, body) = shopper(&server, &admin, "graph@example.com", "G").await?;
    let (_, placed) = server.post("/api/orders", Some(&token), body).await?;
    let id = placed["order"]["id"].as_str().unwrap_or_default().to_string();
    let status_path = format!("/api/orders/{}/status", id);
    let payment_path = format!("/api/orders/{}/payment-status", id);

    let (status, _) = server.put(&status_path, Some(&token), json!({ "status": "PROCESSING" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.put(&status_path, Some(&admin), json!({ "status": "SHIPPED" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot change order status from PENDING to SHIPPED");

    for next in ["PROCESSING", "SHIPPED", "DELIVERED"] {
        let (status, body) = server.put(&status_path, Some(&admin), json!({ "status": next })).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], next);
    }

    // Same value again is a no-op; delivered orders cannot be cancelled
    let (status, _) = server.put(&status_path, Some(&admin), json!({ "status": "DELIVERED" })).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.put(&status_path, Some(&admin), json!({ "status": "CANCELLED" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .put(&payment_path, Some(&admin), json!({ "payment_status": "REFUNDED" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = server
        .put(&payment_path, Some(&admin), json!({ "payment_status": "PAID" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["payment_status"], "PAID");
    assert_eq!(body["order"]["status"], "DELIVERED");

    let (status, _) = server
        .put(&status_path, Some(&admin), json!({ "status": "TELEPORTED" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn ordered_products_and_addresses_cannot_be_deleted() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (_, token, body) = shopper(&server, &admin, "keep@example.com", "KEEP").await?;
    let address_id = body["shipping_address_id"].as_str().unwrap_or_default().to_string();
    let product_id = body["order_items"][0]["product_id"].as_str().unwrap_or_default().to_string();
    server.post("/api/orders", Some(&token), body).await?;

    let (status, _) = server.delete(&format!("/api/products/{}", product_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .delete(&format!("/api/user/addresses/{}", address_id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
