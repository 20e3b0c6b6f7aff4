use futures::try_join;
use uuid::Uuid;

use super::{require_identity, validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{NewOrder, Order, OrderDetail, OrderStatus, OrderWithItems, PaymentStatus};
use crate::database::store::{AddressStore, OrderStore};
use crate::guard;
use crate::pagination::{PageRequest, PageResult};
use crate::types::{Action, ResourceKind};

fn validate_order(order: &NewOrder) -> ServiceResult<()> {
    if order.order_items.is_empty() {
        return Err(ServiceError::validation("Order must contain at least one item"));
    }
    for item in &order.order_items {
        validate::quantity(item.quantity)?;
        validate::non_negative("price", item.price)?;
    }
    validate::non_negative("total", order.total)?;
    validate::non_negative("sub_total", order.sub_total)?;
    validate::non_negative("tax", order.tax)?;
    validate::non_negative("shipping_cost", order.shipping_cost)
}

/// Place an order. Customers order for themselves; admins may order on a
/// customer's behalf. The shipping address must belong to that customer.
pub async fn create_order<S: OrderStore + AddressStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    order: NewOrder,
) -> ServiceResult<OrderWithItems> {
    guard::check(caller, ResourceKind::Order, Action::Create, Some(order.user_id))?;
    validate_order(&order)?;

    let address = store
        .find_address(order.shipping_address_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Shipping address not found"))?;
    if address.user_id != order.user_id {
        return Err(ServiceError::validation("Shipping address does not belong to this user"));
    }

    let created = store.create_order(order).await?;
    tracing::info!(
        order_id = %created.order.id,
        user_id = %created.order.user_id,
        items = created.order_items.len(),
        "Created order"
    );
    Ok(created)
}

/// Customers see their own orders whatever `user_id` says. Admins see
/// everyone's, or one customer's when `user_id` is given.
pub async fn list_orders<S: OrderStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    page: PageRequest,
    user_id: Option<Uuid>,
) -> ServiceResult<PageResult<OrderDetail>> {
    guard::check(caller, ResourceKind::Order, Action::List, None)?;
    let identity = require_identity(caller)?;
    let scope = if identity.is_admin() { user_id } else { Some(identity.id) };

    let window = page.window()?;
    let (orders, total) = try_join!(store.list_orders(scope, window), store.count_orders(scope))?;
    Ok(page.wrap(orders, total)?)
}

pub async fn get_order<S: OrderStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<OrderDetail> {
    require_identity(caller)?;
    let order = store
        .order_detail(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order not found"))?;

    guard::check(caller, ResourceKind::Order, Action::Read, Some(order.order.user_id))?;
    Ok(order)
}

/// Move an order along the fulfillment graph. Re-applying the current
/// status is a no-op.
pub async fn update_order_status<S: OrderStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    status: OrderStatus,
) -> ServiceResult<Order> {
    guard::check(caller, ResourceKind::Order, Action::UpdateStatus, None)?;
    let order = store
        .find_order(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order not found"))?;

    if order.status == status {
        return Ok(order);
    }
    if !order.status.can_transition_to(status) {
        return Err(ServiceError::validation(format!(
            "Cannot change order status from {} to {}",
            order.status, status
        )));
    }

    let updated = store
        .transition_order_status(id, order.status, status)
        .await?
        .ok_or_else(|| ServiceError::validation("Order status changed concurrently, reload and retry"))?;
    tracing::info!(order_id = %id, from = %order.status, to = %status, "Order status changed");
    Ok(updated)
}

/// Move an order along the payment graph. Independent of fulfillment.
pub async fn update_payment_status<S: OrderStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    payment_status: PaymentStatus,
) -> ServiceResult<Order> {
    guard::check(caller, ResourceKind::Order, Action::UpdatePaymentStatus, None)?;
    let order = store
        .find_order(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order not found"))?;

    if order.payment_status == payment_status {
        return Ok(order);
    }
    if !order.payment_status.can_transition_to(payment_status) {
        return Err(ServiceError::validation(format!(
            "Cannot change payment status from {} to {}",
            order.payment_status, payment_status
        )));
    }

    let updated = store
        .transition_payment_status(id, order.payment_status, payment_status)
        .await?
        .ok_or_else(|| ServiceError::validation("Payment status changed concurrently, reload and retry"))?;
    tracing::info!(order_id = %id, from = %order.payment_status, to = %payment_status, "Payment status changed");
    Ok(updated)
}
