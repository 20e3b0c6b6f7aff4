use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Cart, CartItem, CartLine, CartView, Product};
use crate::database::repository::Repository;
use crate::database::store::{CartStore, StoreResult};

#[async_trait]
impl CartStore for PgStore {
    async fn add_cart_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
        let mut tx = self.pool().begin().await?;

        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (id, user_id) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cart.id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await?;
        Ok(item)
    }

    async fn cart_for_user(&self, user_id: Uuid) -> StoreResult<Option<CartView>> {
        let Some(cart) = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
        else {
            return Ok(None);
        };

        let items = Repository::<CartItem>::new("cart_items", self.pool())
            .select_any_of("cart_id", &[cart.id], "created_at, id")
            .await?;

        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, Product> = Repository::<Product>::new("products", self.pool())
            .select_ids(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // product deletion cascades to cart lines, so every line has its product
        let items = items
            .into_iter()
            .filter_map(|item| {
                let product = products.get(&item.product_id)?.clone();
                Some(CartLine { item, product })
            })
            .collect();

        Ok(Some(CartView { cart, items }))
    }

    async fn set_cart_item_quantity(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> StoreResult<Option<CartItem>> {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items ci SET quantity = $3, updated_at = now()
            FROM carts c
            WHERE ci.id = $2 AND ci.cart_id = c.id AND c.user_id = $1
            RETURNING ci.*
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn remove_cart_item(&self, user_id: Uuid, item_id: Uuid) -> StoreResult<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            DELETE FROM cart_items ci USING carts c
            WHERE ci.id = $2 AND ci.cart_id = c.id AND c.user_id = $1
            RETURNING ci.*
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(item)
    }

    async fn clear_cart(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            "DELETE FROM cart_items ci USING carts c WHERE ci.cart_id = c.id AND c.user_id = $1",
        )
        .bind(user_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }
}
