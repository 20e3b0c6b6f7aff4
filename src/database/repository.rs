use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Id-keyed reads and deletes shared by the PostgreSQL store.
///
/// Table and column names are compile-time constants supplied by the store,
/// never caller input.
pub struct Repository<'a, T> {
    table_name: &'static str,
    pool: &'a PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T> Repository<'a, T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: &'a PgPool) -> Self {
        Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.table_name);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        self.select_any_of("id", ids, "id").await
    }

    /// Rows whose `column` is one of `ids`, ordered by `order_by`.
    pub async fn select_any_of(
        &self,
        column: &'static str,
        ids: &[Uuid],
        order_by: &'static str,
    ) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ANY($1) ORDER BY {}",
            self.table_name, column, order_by
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// `false` when no row had that id.
    pub async fn delete_id(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table_name);
        let count = sqlx::query_scalar::<_, i64>(&sql).fetch_one(self.pool).await?;
        Ok(count)
    }
}
