use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Address, AddressPatch, NewAddress};
use crate::database::repository::Repository;
use crate::database::store::{AddressStore, StoreResult};

#[async_trait]
impl AddressStore for PgStore {
    async fn list_addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>> {
        Repository::<Address>::new("addresses", self.pool())
            .select_any_of("user_id", &[user_id], "created_at, id")
            .await
    }

    async fn create_address(&self, user_id: Uuid, address: NewAddress) -> StoreResult<Address> {
        sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (id, user_id, street, city, state, postal_code, country, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.is_default)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_address(&self, id: Uuid) -> StoreResult<Option<Address>> {
        Repository::<Address>::new("addresses", self.pool()).select_id(id).await
    }

    async fn update_address(&self, id: Uuid, patch: AddressPatch) -> StoreResult<Address> {
        sqlx::query_as::<_, Address>(
            r#"
            UPDATE addresses SET
                street = COALESCE($2, street),
                city = COALESCE($3, city),
                state = COALESCE($4, state),
                postal_code = COALESCE($5, postal_code),
                country = COALESCE($6, country),
                is_default = COALESCE($7, is_default),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.street)
        .bind(patch.city)
        .bind(patch.state)
        .bind(patch.postal_code)
        .bind(patch.country)
        .bind(patch.is_default)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Address not found"))
    }

    async fn delete_address(&self, id: Uuid) -> StoreResult<()> {
        if Repository::<Address>::new("addresses", self.pool()).delete_id(id).await? {
            Ok(())
        } else {
            Err(DatabaseError::not_found("Address not found"))
        }
    }
}
