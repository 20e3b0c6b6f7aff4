mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn products_are_public_to_read_and_admin_to_write() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (_, customer) = server.customer("shopper@example.com").await?;

    let (status, _) = server
        .post(
            "/api/products",
            Some(&customer),
            json!({ "name": "Mug", "description": "", "price": "9.50", "sku": "MUG", "inventory": 3 }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let id = server.product(&admin, "MUG-1", "9.50", 3).await?;

    let (status, body) = server.get(&format!("/api/products/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["sku"], "MUG-1");
    assert_eq!(body["product"]["price"], "9.50");
    assert_eq!(body["product"]["images"], json!([]));
    assert_eq!(body["product"]["reviews"], json!([]));

    let (status, body) = server
        .put(&format!("/api/products/{}", id), Some(&admin), json!({ "inventory": 10 }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["inventory"], 10);

    let (status, _) = server.delete(&format!("/api/products/{}", id), Some(&customer)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.delete(&format!("/api/products/{}", id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get(&format!("/api/products/{}", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Product not found" }));
    Ok(())
}

#[tokio::test]
async fn product_validation_and_unique_sku() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    server.product(&admin, "SKU-1", "1.00", 1).await?;

    let (status, _) = server
        .post(
            "/api/products",
            Some(&admin),
            json!({ "name": "Again", "description": "", "price": "2.00", "sku": "SKU-1", "inventory": 1 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post(
            "/api/products",
            Some(&admin),
            json!({ "name": "Negative", "description": "", "price": "-1", "sku": "NEG", "inventory": 1 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/api/products", Some(&admin), json!({ "name": "Missing fields" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn listing_paginates_searches_and_filters() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;

    let (status, body) = server
        .post("/api/categories", Some(&admin), json!({ "name": "Kitchen" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let kitchen = body["category"]["id"].as_str().unwrap_or_default().to_string();

    for n in 0..5 {
        server.product(&admin, &format!("BOWL-{}", n), "4.00", 1).await?;
    }
    let kettle = server.product(&admin, "KETTLE", "30.00", 1).await?;
    server
        .put(&format!("/api/products/{}", kettle), Some(&admin), json!({ "category_id": kitchen }))
        .await?;

    let (status, body) = server.get("/api/products?page=2&limit=4", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"], json!({ "total": 6, "pages": 2, "page": 2, "limit": 4 }));

    let (_, body) = server.get("/api/products?search=product%20bowl", None).await?;
    assert_eq!(body["pagination"]["total"], 5);

    let (_, body) = server.get(&format!("/api/products?category_id={}", kitchen), None).await?;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["products"][0]["category"]["name"], "Kitchen");

    let (status, body) = server
        .put(&format!("/api/products/{}", kettle), Some(&admin), json!({ "category_id": null }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["category_id"], json!(null));
    let (_, body) = server.get(&format!("/api/products?category_id={}", kitchen), None).await?;
    assert_eq!(body["pagination"]["total"], 0);

    // Past the last page is an empty page, not an error
    let (status, body) = server.get("/api/products?page=9&limit=4", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"], json!([]));

    // The server runs with PAGINATION_MAX_LIMIT=50
    let (_, body) = server.get("/api/products?limit=500", None).await?;
    assert_eq!(body["pagination"]["limit"], 50);

    let (status, _) = server.get("/api/products?limit=0", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = server.get("/api/products?page=0", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn category_tree_and_detaching_delete() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;

    let (_, body) = server
        .post("/api/categories", Some(&admin), json!({ "name": "Outdoor" }))
        .await?;
    let outdoor = body["category"]["id"].as_str().unwrap_or_default().to_string();
    let (status, _) = server
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "Camping", "parent_category_id": outdoor }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    // Top level only, without children
    let (_, body) = server.get("/api/categories", None).await?;
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["categories"][0]["name"], "Outdoor");
    assert!(body["categories"][0].get("sub_categories").is_none());

    let (_, body) = server.get("/api/categories?include_subcategories=true", None).await?;
    assert_eq!(body["categories"][1]["name"], "Outdoor");
    assert_eq!(body["categories"][1]["sub_categories"][0]["name"], "Camping");

    let (status, body) = server.get(&format!("/api/categories/{}", outdoor), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["sub_categories"][0]["name"], "Camping");

    let (status, _) = server
        .put(
            &format!("/api/categories/{}", outdoor),
            Some(&admin),
            json!({ "parent_category_id": outdoor }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Outdoor cannot move under its own child
    let (_, body) = server.get(&format!("/api/categories/{}", outdoor), None).await?;
    let camping = body["category"]["sub_categories"][0]["id"].as_str().unwrap_or_default().to_string();
    let (status, _) = server
        .put(
            &format!("/api/categories/{}", outdoor),
            Some(&admin),
            json!({ "parent_category_id": camping }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let tent = server.product(&admin, "TENT", "120.00", 2).await?;
    server
        .put(&format!("/api/products/{}", tent), Some(&admin), json!({ "category_id": outdoor }))
        .await?;

    let (status, body) = server.delete(&format!("/api/categories/{}", outdoor), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = server.get(&format!("/api/products/{}", tent), None).await?;
    assert_eq!(body["product"]["category_id"], json!(null));

    // Camping lost its parent and is now top level
    let (_, body) = server.get("/api/categories", None).await?;
    assert_eq!(body["categories"][0]["name"], "Camping");
    assert_eq!(body["categories"][0]["parent_category_id"], json!(null));
    Ok(())
}

#[tokio::test]
async fn reviews_are_owned_by_their_author() -> Result<()> {
    let server = common::start_server().await?;
    let admin = server.admin_token().await?;
    let (alice_id, alice) = server.customer("alice@example.com").await?;
    let (bob_id, bob) = server.customer("bob@example.com").await?;
    let product = server.product(&admin, "BOOK", "12.00", 5).await?;

    let (status, _) = server
        .post(
            "/api/reviews",
            Some(&alice),
            json!({ "user_id": bob_id, "product_id": product, "rating": 5 }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .post(
            "/api/reviews",
            Some(&alice),
            json!({ "user_id": alice_id, "product_id": product, "rating": 6 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = server
        .post(
            "/api/reviews",
            Some(&alice),
            json!({ "user_id": alice_id, "product_id": product, "rating": 4, "comment": "Good read" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let review = format!("/api/reviews/{}", body["review"]["id"].as_str().unwrap_or_default());

    let (status, body) = server.get(&format!("/api/products/{}/reviews", product), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["reviews"][0]["user"]["name"], "Test Customer");

    let (status, _) = server.put(&review, Some(&bob), json!({ "rating": 1 })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = server.put(&review, Some(&alice), json!({ "rating": 3 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["review"]["rating"], 3);

    let (status, _) = server.delete(&review, Some(&bob)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.delete(&review, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .get("/api/products/00000000-0000-0000-0000-000000000000/reviews", None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
