use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }
}

pub(crate) const CREATE_NUMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS numbers (
    id BIGSERIAL PRIMARY KEY,
    number TEXT NOT NULL
)
"#;

pub(crate) const CREATE_ENRICHED_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS enriched_info (
    id BIGSERIAL PRIMARY KEY,
    regnum TEXT NOT NULL,
    mark TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    patronymic TEXT,
    number_id BIGINT REFERENCES numbers(id) ON DELETE SET NULL
)
"#;

// Tables created before the number link existed.
pub(crate) const ADD_NUMBER_LINK: &str = r#"
ALTER TABLE enriched_info
    ADD COLUMN IF NOT EXISTS number_id BIGINT REFERENCES numbers(id) ON DELETE SET NULL
"#;
