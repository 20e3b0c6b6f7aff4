mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn adding_twice_increments_one_line() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (user_id, token) = server.customer("cart@example.com").await?;
    let product = server.product(&admin, "SOCKS", "5.00", 100).await?;
    let cart = format!("/api/cart/{}", user_id);

    let (status, body) = server.get(&cart, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "cart": null }));

    let items = format!("{}/items", cart);
    let (status, first) = server
        .post(&items, Some(&token), json!({ "product_id": product, "quantity": 2 }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["item"]["quantity"], 2);

    let (_, second) = server
        .post(&items, Some(&token), json!({ "product_id": product, "quantity": 3 }))
        .await?;
    assert_eq!(second["item"]["id"], first["item"]["id"]);
    assert_eq!(second["item"]["quantity"], 5);

    // Quantity defaults to one
    let (_, third) = server.post(&items, Some(&token), json!({ "product_id": product })).await?;
    assert_eq!(third["item"]["quantity"], 6);

    let (_, body) = server.get(&cart, Some(&token)).await?;
    assert_eq!(body["cart"]["user_id"], user_id.as_str());
    assert_eq!(body["cart"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["cart"]["items"][0]["product"]["sku"], "SOCKS");
    Ok(())
}

#[tokio::test]
async fn quantity_updates_and_removal() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (user_id, token) = server.customer("qty@example.com").await?;
    let socks = server.product(&admin, "SOCKS", "5.00", 100).await?;
    let hat = server.product(&admin, "HAT", "15.00", 10).await?;
    let cart = format!("/api/cart/{}", user_id);

    let (_, body) = server
        .post(&format!("{}/items", cart), Some(&token), json!({ "product_id": socks, "quantity": 1 }))
        .await?;
    let socks_line = format!("{}/items/{}", cart, body["item"]["id"].as_str().unwrap_or_default());
    let (_, body) = server
        .post(&format!("{}/items", cart), Some(&token), json!({ "product_id": hat, "quantity": 1 }))
        .await?;
    let hat_line = format!("{}/items/{}", cart, body["item"]["id"].as_str().unwrap_or_default());

    let (status, body) = server.put(&socks_line, Some(&token), json!({ "quantity": 4 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["quantity"], 4);

    let (status, body) = server.put(&socks_line, Some(&token), json!({ "quantity": 0 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "item": null }));

    let (status, _) = server.put(&socks_line, Some(&token), json!({ "quantity": 2 })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.delete(&hat_line, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = server.get(&cart, Some(&token)).await?;
    assert_eq!(body["cart"]["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn carts_are_private_to_their_owner() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (alice_id, alice) = server.customer("alice@example.com").await?;
    let (bob_id, bob) = server.customer("bob@example.com").await?;
    let product = server.product(&admin, "GIFT", "20.00", 5).await?;

    let (status, body) = server
        .post(
            &format!("/api/cart/{}/items", alice_id),
            Some(&alice),
            json!({ "product_id": product, "quantity": 1 }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = body["item"]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = server.get(&format!("/api/cart/{}", alice_id), Some(&bob)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.get(&format!("/api/cart/{}", alice_id), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Alice's line id through Bob's own cart path is simply not there
    let (status, _) = server
        .put(
            &format!("/api/cart/{}/items/{}", bob_id, item_id),
            Some(&bob),
            json!({ "quantity": 50 }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.get(&format!("/api/cart/{}", alice_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"][0]["quantity"], 1);
    Ok(())
}

#[tokio::test]
async fn bad_adds_and_clearing() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (user_id, token) = server.customer("clear@example.com").await?;
    let product = server.product(&admin, "PEN", "1.00", 100).await?;
    let cart = format!("/api/cart/{}", user_id);
    let items = format!("{}/items", cart);

    let (status, _) = server
        .post(&items, Some(&token), json!({ "product_id": product, "quantity": 0 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(&items, Some(&token), json!({ "product_id": product, "quantity": 2147483647 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = server
        .post(
            &items,
            Some(&token),
            json!({ "product_id": "00000000-0000-0000-0000-000000000000", "quantity": 1 }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    server
        .post(&items, Some(&token), json!({ "product_id": product, "quantity": 7 }))
        .await?;
    let (status, body) = server.delete(&cart, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = server.get(&cart, Some(&token)).await?;
    assert_eq!(body["cart"]["items"], json!([]));
    Ok(())
}
