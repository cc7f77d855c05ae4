//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the FlowStore trait.
//! Creating a flow takes a per-user advisory lock inside the transaction so
//! the count check and the insert cannot interleave with another save; the
//! `flows_enforce_limit` trigger repeats the check at the database level.

use super::{StorageError, traits::FlowStore};
use crate::models::Flow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

/// SQLSTATE raised by the flow limit trigger.
const QUOTA_SQLSTATE: &str = "P0001";

/// PostgreSQL storage backend implementation.
pub struct PostgresFlowStore {
    pool: PgPool,
    limit: usize,
}

impl PostgresFlowStore {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool, limit: usize) -> Self {
        Self { pool, limit }
    }

    fn map_error(&self, e: sqlx::Error) -> StorageError {
        if let sqlx::Error::Database(db) = &e
            && db.code().as_deref() == Some(QUOTA_SQLSTATE)
        {
            return StorageError::QuotaExceeded { limit: self.limit };
        }
        error!("Database error: {}", e);
        StorageError::ConnectionError(e.to_string())
    }
}

#[async_trait]
impl FlowStore for PostgresFlowStore {
    fn flow_limit(&self) -> usize {
        self.limit
    }

    async fn list_flows(&self, user_id: Uuid) -> Result<Vec<Flow>, StorageError> {
        sqlx::query_as::<_, Flow>(
            r#"
            SELECT id, name, data, user_id, created_at
            FROM flows
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.map_error(e))
    }

    async fn count_flows(&self, user_id: Uuid) -> Result<usize, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;
        Ok(count.max(0) as usize)
    }

    async fn create_flow(
        &self,
        user_id: Uuid,
        name: String,
        data: String,
    ) -> Result<Flow, StorageError> {
        let mut tx = self.pool.begin().await.map_err(|e| self.map_error(e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_error(e))?;

        // The trigger reads the limit from this transaction-local setting.
        sqlx::query("SELECT set_config('process_mapper.flow_limit', $1, true)")
            .bind(self.limit.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_error(e))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| self.map_error(e))?;
        if count as usize >= self.limit {
            return Err(StorageError::QuotaExceeded { limit: self.limit });
        }

        let flow = Flow {
            id: Uuid::new_v4(),
            name,
            data,
            user_id,
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO flows (id, name, data, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(flow.id)
        .bind(&flow.name)
        .bind(&flow.data)
        .bind(flow.user_id)
        .bind(flow.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| self.map_error(e))?;

        tx.commit().await.map_err(|e| self.map_error(e))?;
        info!("Saved flow {} for user {}", flow.id, user_id);
        Ok(flow)
    }

    async fn get_flow(&self, user_id: Uuid, flow_id: Uuid) -> Result<Flow, StorageError> {
        sqlx::query_as::<_, Flow>(
            r#"
            SELECT id, name, data, user_id, created_at
            FROM flows
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(flow_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_error(e))?
        .ok_or_else(|| StorageError::flow_not_found(flow_id))
    }

    async fn update_flow(
        &self,
        user_id: Uuid,
        flow_id: Uuid,
        data: String,
    ) -> Result<Flow, StorageError> {
        sqlx::query_as::<_, Flow>(
            r#"
            UPDATE flows SET data = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, name, data, user_id, created_at
            "#,
        )
        .bind(flow_id)
        .bind(user_id)
        .bind(data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_error(e))?
        .ok_or_else(|| StorageError::flow_not_found(flow_id))
    }

    async fn delete_flow(&self, user_id: Uuid, flow_id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM flows WHERE id = $1 AND user_id = $2")
            .bind(flow_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::flow_not_found(flow_id));
        }
        info!("Deleted flow {}", flow_id);
        Ok(())
    }
}
