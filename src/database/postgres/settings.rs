use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Setting, SettingType};
use crate::database::store::{SettingStore, StoreResult};

#[async_trait]
impl SettingStore for PgStore {
    async fn upsert_setting(&self, key: &str, value: &str, setting_type: SettingType) -> StoreResult<Setting> {
        sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (id, key, value, setting_type) VALUES ($1, $2, $3, $4)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, setting_type = EXCLUDED.setting_type, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(value)
        .bind(setting_type)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_setting(&self, key: &str) -> StoreResult<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;
        Ok(setting)
    }

    async fn list_settings(&self, setting_type: Option<SettingType>) -> StoreResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT * FROM settings WHERE ($1::setting_type IS NULL OR setting_type = $1) ORDER BY key",
        )
        .bind(setting_type)
        .fetch_all(self.pool())
        .await?;
        Ok(settings)
    }

    async fn delete_setting(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
