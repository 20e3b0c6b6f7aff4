use uuid::Uuid;

use super::{validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{CartItem, CartView};
use crate::database::store::{CartStore, ProductStore};
use crate::guard;
use crate::types::{Action, ResourceKind};

/// Add `quantity` of a product to the user's cart, creating the cart on
/// first use. Adding a product already in the cart increases its line.
pub async fn add_to_cart<S: CartStore + ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> ServiceResult<CartItem> {
    guard::check(caller, ResourceKind::Cart, Action::Create, Some(user_id))?;
    validate::quantity(quantity)?;

    if store.find_product(product_id).await?.is_none() {
        return Err(ServiceError::not_found("Product not found"));
    }
    Ok(store.add_cart_item(user_id, product_id, quantity).await?)
}

/// `None` for a user who has never added anything.
pub async fn get_cart<S: CartStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    user_id: Uuid,
) -> ServiceResult<Option<CartView>> {
    guard::check(caller, ResourceKind::Cart, Action::Read, Some(user_id))?;
    Ok(store.cart_for_user(user_id).await?)
}

/// Set a line's quantity. Zero or less removes the line, and `None` is
/// returned.
pub async fn update_cart_item<S: CartStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    user_id: Uuid,
    item_id: Uuid,
    quantity: i32,
) -> ServiceResult<Option<CartItem>> {
    guard::check(caller, ResourceKind::Cart, Action::Update, Some(user_id))?;
    if quantity > 0 {
        validate::quantity(quantity)?;
    }

    if quantity <= 0 {
        return match store.remove_cart_item(user_id, item_id).await? {
            Some(_) => Ok(None),
            None => Err(ServiceError::not_found("Cart item not found")),
        };
    }

    match store.set_cart_item_quantity(user_id, item_id, quantity).await? {
        Some(item) => Ok(Some(item)),
        None => Err(ServiceError::not_found("Cart item not found")),
    }
}

pub async fn remove_from_cart<S: CartStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    user_id: Uuid,
    item_id: Uuid,
) -> ServiceResult<CartItem> {
    guard::check(caller, ResourceKind::Cart, Action::Delete, Some(user_id))?;
    store
        .remove_cart_item(user_id, item_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Cart item not found"))
}

/// Empty the cart. Succeeds for users without one.
pub async fn clear_cart<S: CartStore + ?Sized>(store: &S, caller: Option<&Identity>, user_id: Uuid) -> ServiceResult<u64> {
    guard::check(caller, ResourceKind::Cart, Action::Delete, Some(user_id))?;
    let removed = store.clear_cart(user_id).await?;
    tracing::debug!(%user_id, removed, "Cleared cart");
    Ok(removed)
}
