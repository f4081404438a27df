//! Persistence port for registration numbers and their enrichment records.
//!
//! Handlers and the batch orchestrator depend on [`NumberStore`] only, so the
//! Postgres adapter in `db_storage` can be swapped for a fake in tests.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use crate::errors::StoreError;
use crate::models::EnrichedInfo;

#[async_trait]
pub trait NumberStore: Send + Sync {
    /// Creates the tables if they do not exist yet.
    async fn migrate(&self) -> Result<(), StoreError>;

    /// Inserts a number and returns its generated id.
    async fn create(&self, number: &str) -> Result<i64, StoreError>;

    /// Deletes by id. Deleting an id that does not exist succeeds.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Exact lookup; `None` when absent.
    async fn get_by_id(&self, id: i64) -> Result<Option<String>, StoreError>;

    /// All numbers containing `prefix`, in no particular order.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// All numbers that start with a letter and end with `region`.
    async fn get_by_region(&self, region: &str) -> Result<Vec<String>, StoreError>;

    /// Replaces the number stored under `id`.
    ///
    /// Fails with [`StoreError::NotFound`] when no row matched.
    async fn update(&self, id: i64, number: &str) -> Result<i64, StoreError>;

    /// Stores an enrichment result, optionally linked to its number row.
    async fn create_enriched(
        &self,
        number_id: Option<i64>,
        info: &EnrichedInfo,
    ) -> Result<i64, StoreError>;
}

fn region_regex() -> &'static Regex {
    static REGION: OnceLock<Regex> = OnceLock::new();
    REGION.get_or_init(|| Regex::new(r"^[\p{L}\p{N}]{1,8}$").expect("valid region regex"))
}

/// A region code is 1-8 letters or digits, which keeps it safe to splice
/// into a POSIX regular expression.
pub fn is_valid_region(region: &str) -> bool {
    region_regex().is_match(region)
}

/// Builds the `LIKE` pattern for a substring search, escaping `\`, `%` and `_`.
pub fn prefix_like_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 2);
    escaped.push('%');
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Builds the POSIX regex used by the region lookup.
///
/// Callers must check [`is_valid_region`] first.
pub fn region_posix_pattern(region: &str) -> String {
    format!("[[:alpha:]].*{}$", region)
}
