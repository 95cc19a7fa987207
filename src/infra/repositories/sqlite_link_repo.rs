use crate::domain::{models::public_link::BookingPublicLink, ports::PublicLinkRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteLinkRepo {
    pool: SqlitePool,
}

impl SqliteLinkRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublicLinkRepository for SqliteLinkRepo {
    async fn create(&self, link: &BookingPublicLink) -> Result<BookingPublicLink, EngineError> {
        sqlx::query_as::<_, BookingPublicLink>(
            "INSERT INTO booking_public_links (code, business_id, slug, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&link.code).bind(&link.business_id).bind(&link.slug).bind(link.created_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<BookingPublicLink>, EngineError> {
        sqlx::query_as::<_, BookingPublicLink>("SELECT * FROM booking_public_links WHERE code = ?")
            .bind(code).fetch_optional(&self.pool).await.map_err(EngineError::Database)
    }

    async fn find_by_business(&self, business_id: &str) -> Result<Option<BookingPublicLink>, EngineError> {
        sqlx::query_as::<_, BookingPublicLink>("SELECT * FROM booking_public_links WHERE business_id = ?")
            .bind(business_id).fetch_optional(&self.pool).await.map_err(EngineError::Database)
    }

    async fn update_slug(&self, code: &str, slug: Option<String>) -> Result<(), EngineError> {
        let result = sqlx::query("UPDATE booking_public_links SET slug = ? WHERE code = ?")
            .bind(slug).bind(code).execute(&self.pool).await.map_err(EngineError::Database)?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound("Public link not found".into()));
        }
        Ok(())
    }
}
