// handlers/protected/cart.rs - /api/cart/:user_id
//
// Every route is scoped to the cart owner in the path; item ids from another
// user's cart are not found.

use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{CartItem, CartView};
use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted, Keyed, Session};
use crate::services::carts;

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartBody {
    /// `null` until the first item is added
    pub cart: Option<CartView>,
}

/// GET /api/cart/:user_id
pub async fn cart_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<CartBody> {
    let cart = carts::get_cart(state.store.as_ref(), session.identity(), user_id).await?;
    Ok(ApiResponse::success(CartBody { cart }))
}

/// POST /api/cart/:user_id/items - Adds to an existing line for the product
pub async fn cart_items_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(add): ApiJson<AddItem>,
) -> ApiResult<Keyed<CartItem>> {
    let item = carts::add_to_cart(state.store.as_ref(), session.identity(), user_id, add.product_id, add.quantity).await?;
    Ok(ApiResponse::created("item", item))
}

/// PUT /api/cart/:user_id/items/:item_id - A quantity of zero or less removes
/// the line and answers `{"item": null}`
pub async fn cart_item_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath((user_id, item_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(set): ApiJson<SetQuantity>,
) -> ApiResult<Keyed<Option<CartItem>>> {
    let item = carts::update_cart_item(state.store.as_ref(), session.identity(), user_id, item_id, set.quantity).await?;
    Ok(ApiResponse::keyed("item", item))
}

/// DELETE /api/cart/:user_id/items/:item_id
pub async fn cart_item_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath((user_id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Deleted> {
    carts::remove_from_cart(state.store.as_ref(), session.identity(), user_id, item_id).await?;
    Ok(ApiResponse::deleted())
}

/// DELETE /api/cart/:user_id - Empties the cart; the cart row itself stays
pub async fn cart_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    carts::clear_cart(state.store.as_ref(), session.identity(), user_id).await?;
    Ok(ApiResponse::deleted())
}
