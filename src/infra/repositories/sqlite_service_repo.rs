use crate::domain::{models::service::BookingService, ports::ServiceRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteServiceRepo {
    pool: SqlitePool,
}

impl SqliteServiceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for SqliteServiceRepo {
    async fn create(&self, service: &BookingService) -> Result<BookingService, EngineError> {
        sqlx::query_as::<_, BookingService>(
            "INSERT INTO booking_services (id, business_id, name, duration_minutes, active, deposit_cents, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&service.id).bind(&service.business_id).bind(&service.name)
        .bind(service.duration_minutes).bind(service.active).bind(service.deposit_cents).bind(service.created_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<BookingService>, EngineError> {
        sqlx::query_as::<_, BookingService>("SELECT * FROM booking_services WHERE business_id = ? AND id = ?")
            .bind(business_id).bind(id).fetch_optional(&self.pool).await.map_err(EngineError::Database)
    }

    async fn list_by_business(&self, business_id: &str) -> Result<Vec<BookingService>, EngineError> {
        sqlx::query_as::<_, BookingService>(
            "SELECT * FROM booking_services WHERE business_id = ? AND active = 1 ORDER BY name",
        )
        .bind(business_id).fetch_all(&self.pool).await.map_err(EngineError::Database)
    }

    async fn update(&self, service: &BookingService) -> Result<BookingService, EngineError> {
        sqlx::query_as::<_, BookingService>(
            "UPDATE booking_services SET name=?, duration_minutes=?, active=?, deposit_cents=?
             WHERE id=? AND business_id=?
             RETURNING *",
        )
        .bind(&service.name).bind(service.duration_minutes).bind(service.active).bind(service.deposit_cents)
        .bind(&service.id).bind(&service.business_id)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }
}
