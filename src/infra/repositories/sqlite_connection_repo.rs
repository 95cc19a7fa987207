use crate::domain::{
    models::calendar::{CalendarConnection, CalendarProvider},
    ports::ConnectionRepository,
};
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteConnectionRepo {
    pool: SqlitePool,
}

impl SqliteConnectionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepository for SqliteConnectionRepo {
    async fn upsert(&self, connection: &CalendarConnection) -> Result<CalendarConnection, EngineError> {
        // One row per (business, provider); concurrent refreshes race benignly
        // and the last successful write wins.
        sqlx::query_as::<_, CalendarConnection>(
            "INSERT INTO calendar_connections (id, business_id, provider, access_token_enc, refresh_token_enc, expires_at, account_email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(business_id, provider) DO UPDATE SET
               access_token_enc=excluded.access_token_enc,
               refresh_token_enc=excluded.refresh_token_enc,
               expires_at=excluded.expires_at,
               account_email=excluded.account_email,
               updated_at=excluded.updated_at
             RETURNING *",
        )
        .bind(&connection.id).bind(&connection.business_id).bind(connection.provider)
        .bind(&connection.access_token_enc).bind(&connection.refresh_token_enc)
        .bind(connection.expires_at).bind(&connection.account_email)
        .bind(connection.created_at).bind(connection.updated_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn find(
        &self,
        business_id: &str,
        provider: CalendarProvider,
    ) -> Result<Option<CalendarConnection>, EngineError> {
        sqlx::query_as::<_, CalendarConnection>(
            "SELECT * FROM calendar_connections WHERE business_id = ? AND provider = ?",
        )
        .bind(business_id).bind(provider)
        .fetch_optional(&self.pool).await.map_err(EngineError::Database)
    }

    async fn list_by_business(&self, business_id: &str) -> Result<Vec<CalendarConnection>, EngineError> {
        sqlx::query_as::<_, CalendarConnection>(
            "SELECT * FROM calendar_connections WHERE business_id = ?",
        )
        .bind(business_id).fetch_all(&self.pool).await.map_err(EngineError::Database)
    }

    async fn delete(&self, business_id: &str, provider: CalendarProvider) -> Result<(), EngineError> {
        let result = sqlx::query("DELETE FROM calendar_connections WHERE business_id = ? AND provider = ?")
            .bind(business_id).bind(provider).execute(&self.pool).await.map_err(EngineError::Database)?;
        if result.rows_affected() == 0 {
            return Err(EngineError::ConnectionNotFound(provider.as_str().to_string()));
        }
        Ok(())
    }
}
