use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;

use crate::db::{ADD_NUMBER_LINK, CREATE_ENRICHED_INFO_TABLE, CREATE_NUMBERS_TABLE};
use crate::errors::StoreError;
use crate::models::EnrichedInfo;
use crate::store::{prefix_like_pattern, region_posix_pattern, NumberStore};

/// Postgres-backed [`NumberStore`].
///
/// Every call runs under `timeout`; when it expires the query future is
/// dropped, which cancels the statement, and [`StoreError::Timeout`] is returned.
#[derive(Clone)]
pub struct PgNumberStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgNumberStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(StoreError::Database),
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "store call timed out"
                );
                Err(StoreError::Timeout(op.to_string()))
            }
        }
    }
}

#[async_trait]
impl NumberStore for PgNumberStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        self.bounded("migrate", async {
            sqlx::query(CREATE_NUMBERS_TABLE).execute(&self.pool).await?;
            sqlx::query(CREATE_ENRICHED_INFO_TABLE)
                .execute(&self.pool)
                .await?;
            sqlx::query(ADD_NUMBER_LINK).execute(&self.pool).await?;
            Ok::<(), sqlx::Error>(())
        })
        .await
    }

    async fn create(&self, number: &str) -> Result<i64, StoreError> {
        self.bounded(
            "create",
            sqlx::query_scalar::<_, i64>("INSERT INTO numbers (number) VALUES ($1) RETURNING id")
                .bind(number)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = self
            .bounded(
                "delete",
                sqlx::query("DELETE FROM numbers WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(id, "delete matched no rows");
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<String>, StoreError> {
        self.bounded(
            "get_by_id",
            sqlx::query_scalar::<_, String>("SELECT number FROM numbers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.bounded(
            "get_by_prefix",
            sqlx::query_scalar::<_, String>(
                r"SELECT number FROM numbers WHERE number LIKE $1 ESCAPE '\'",
            )
            .bind(prefix_like_pattern(prefix))
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_by_region(&self, region: &str) -> Result<Vec<String>, StoreError> {
        self.bounded(
            "get_by_region",
            sqlx::query_scalar::<_, String>("SELECT number FROM numbers WHERE number ~ $1")
                .bind(region_posix_pattern(region))
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn update(&self, id: i64, number: &str) -> Result<i64, StoreError> {
        self.bounded(
            "update",
            sqlx::query_scalar::<_, i64>(
                "UPDATE numbers SET number = $2 WHERE id = $1 RETURNING id",
            )
            .bind(id)
            .bind(number)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("number with id {} not found", id)))
    }

    async fn create_enriched(
        &self,
        number_id: Option<i64>,
        info: &EnrichedInfo,
    ) -> Result<i64, StoreError> {
        self.bounded(
            "create_enriched",
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO enriched_info
                    (regnum, mark, model, year, name, surname, patronymic, number_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(&info.reg_num)
            .bind(&info.make)
            .bind(&info.model)
            .bind(info.year)
            .bind(&info.owner.name)
            .bind(&info.owner.surname)
            .bind(info.owner.patronymic.as_deref())
            .bind(number_id)
            .fetch_one(&self.pool),
        )
        .await
    }
}
