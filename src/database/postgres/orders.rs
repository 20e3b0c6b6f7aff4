use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    Address, NewOrder, Order, OrderCustomer, OrderDetail, OrderItem, OrderLine, OrderStatus, OrderWithItems,
    PaymentStatus, Product,
};
use crate::database::repository::Repository;
use crate::database::store::{OrderStore, StoreResult};
use crate::pagination::PageWindow;

impl PgStore {
    /// Attach lines (with products) and shipping addresses to orders
    async fn hydrate_orders(&self, orders: Vec<Order>) -> StoreResult<Vec<OrderDetail>> {
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let address_ids: Vec<Uuid> = orders.iter().map(|o| o.shipping_address_id).collect();

        let items = Repository::<OrderItem>::new("order_items", self.pool())
            .select_any_of("order_id", &order_ids, "id")
            .await?;

        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, Product> = Repository::<Product>::new("products", self.pool())
            .select_ids(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let addresses: HashMap<Uuid, Address> = Repository::<Address>::new("addresses", self.pool())
            .select_ids(&address_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for item in items {
            let product = products.get(&item.product_id).cloned();
            lines.entry(item.order_id).or_default().push(OrderLine { item, product });
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderDetail {
                order_items: lines.remove(&order.id).unwrap_or_default(),
                shipping_address: addresses.get(&order.shipping_address_id).cloned(),
                user: None,
                order,
            })
            .collect())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<OrderWithItems> {
        let mut tx = self.pool().begin().await?;

        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, user_id, status, payment_status, payment_method,
                total, sub_total, tax, shipping_cost, shipping_address_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.user_id)
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Pending)
        .bind(order.payment_method)
        .bind(order.total)
        .bind(order.sub_total)
        .bind(order.tax)
        .bind(order.shipping_cost)
        .bind(order.shipping_address_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let mut order_items = Vec::with_capacity(order.order_items.len());
        for item in &order.order_items {
            let inserted = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4, $5) RETURNING *",
            )
            .bind(Uuid::new_v4())
            .bind(created.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
            order_items.push(inserted);
        }

        tx.commit().await?;

        Ok(OrderWithItems {
            order: created,
            order_items,
        })
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Repository::<Order>::new("orders", self.pool()).select_id(id).await
    }

    async fn order_detail(&self, id: Uuid) -> StoreResult<Option<OrderDetail>> {
        let Some(order) = self.find_order(id).await? else {
            return Ok(None);
        };

        let customer = sqlx::query_as::<_, OrderCustomer>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(order.user_id)
            .fetch_optional(self.pool())
            .await?;

        let mut detail = self
            .hydrate_orders(vec![order])
            .await?
            .pop()
            .ok_or_else(|| DatabaseError::not_found("Order not found"))?;
        detail.user = customer;
        Ok(Some(detail))
    }

    async fn list_orders(&self, user_id: Option<Uuid>, window: PageWindow) -> StoreResult<Vec<OrderDetail>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(window.skip)
        .bind(window.take)
        .fetch_all(self.pool())
        .await?;

        self.hydrate_orders(orders).await
    }

    async fn count_orders(&self, user_id: Option<Uuid>) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE ($1::uuid IS NULL OR user_id = $1)")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn transition_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> StoreResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $3, updated_at = now() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(self.pool())
        .await?;
        Ok(order)
    }

    async fn transition_payment_status(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> StoreResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET payment_status = $3, updated_at = now() WHERE id = $1 AND payment_status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(self.pool())
        .await?;
        Ok(order)
    }
}
