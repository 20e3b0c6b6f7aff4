// handlers/protected/orders.rs - /api/orders

use axum::extract::{Extension, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{NewOrder, Order, OrderDetail, OrderStatus, OrderWithItems, PaymentStatus};
use crate::handlers::{page_request, AppState};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Keyed, Listing, Session};
use crate::services::orders;

/// `?page=&limit=&user_id=`; `user_id` only narrows the list for admins
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusChange {
    pub payment_status: PaymentStatus,
}

/// GET /api/orders - Newest first. Customers only ever see their own orders.
pub async fn orders_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<Listing<OrderDetail>> {
    let page = page_request(query.page, query.limit);
    let orders = orders::list_orders(state.store.as_ref(), session.identity(), page, query.user_id).await?;
    Ok(ApiResponse::listing("orders", orders))
}

/// POST /api/orders - Place an order with its line items
///
/// Amounts are taken as given; the shipping address must belong to `user_id`.
pub async fn orders_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(order): ApiJson<NewOrder>,
) -> ApiResult<Keyed<OrderWithItems>> {
    let order = orders::create_order(state.store.as_ref(), session.identity(), order).await?;
    Ok(ApiResponse::created("order", order))
}

/// GET /api/orders/:id - Owner or admin
pub async fn order_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Keyed<OrderDetail>> {
    let order = orders::get_order(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::keyed("order", order))
}

/// PUT /api/orders/:id/status (admin)
pub async fn order_status_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(change): ApiJson<StatusChange>,
) -> ApiResult<Keyed<Order>> {
    let order = orders::update_order_status(state.store.as_ref(), session.identity(), id, change.status).await?;
    Ok(ApiResponse::keyed("order", order))
}

/// PUT /api/orders/:id/payment-status (admin)
pub async fn order_payment_status_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(change): ApiJson<PaymentStatusChange>,
) -> ApiResult<Keyed<Order>> {
    let order =
        orders::update_payment_status(state.store.as_ref(), session.identity(), id, change.payment_status).await?;
    Ok(ApiResponse::keyed("order", order))
}
