//! In-process fakes for the persistence port and the car info API.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use regnum_api::config::{AppEnv, Config};
use regnum_api::enrichment::BatchEnricher;
use regnum_api::errors::{EnrichmentError, StoreError};
use regnum_api::handlers::AppState;
use regnum_api::models::{EnrichedInfo, Owner};
use regnum_api::services::CarInfoApi;
use regnum_api::store::NumberStore;

pub fn test_config(enrichment_api_url: String) -> Config {
    Config {
        database_url: "postgresql://test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        env: AppEnv::Local,
        enrichment_api_url,
        store_timeout_ms: 2000,
        enrichment_timeout_ms: 2000,
        batch_concurrency: 4,
        max_batch_size: 50,
        db_max_connections: 2,
    }
}

pub fn sample_info(reg_num: &str) -> EnrichedInfo {
    EnrichedInfo {
        reg_num: reg_num.to_string(),
        make: "Lada".to_string(),
        model: "Vesta".to_string(),
        year: 2002,
        owner: Owner {
            name: "Ivan".to_string(),
            surname: "Ivanov".to_string(),
            patronymic: Some("Ivanovich".to_string()),
        },
    }
}

/// In-memory counterpart of the `[[:alpha:]].*<region>$` lookup: the text
/// after the first letter ends with `region`.
pub fn matches_region(number: &str, region: &str) -> bool {
    number
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .is_some_and(|(idx, c)| number[idx + c.len_utf8()..].ends_with(region))
}

/// Memory-backed store that counts calls and fails on demand.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    pub rows: Mutex<BTreeMap<i64, String>>,
    pub enriched: Mutex<Vec<(Option<i64>, EnrichedInfo)>>,
    pub create_calls: AtomicUsize,
    pub fail_create: HashSet<String>,
    pub timeout_create: HashSet<String>,
    pub fail_delete: HashSet<i64>,
    pub fail_enriched: bool,
    pub fail_reads: bool,
    pub create_delay: HashMap<String, Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numbers(numbers: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.lock().unwrap();
            for n in numbers {
                let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                rows.insert(id, n.to_string());
            }
        }
        store
    }

    pub fn numbers(&self) -> Vec<String> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn enriched_reg_nums(&self) -> Vec<String> {
        self.enriched
            .lock()
            .unwrap()
            .iter()
            .map(|(_, info)| info.reg_num.clone())
            .collect()
    }

    fn read_guard(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl NumberStore for MemoryStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create(&self, number: &str) -> Result<i64, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.create_delay.get(number) {
            tokio::time::sleep(*delay).await;
        }
        if self.timeout_create.contains(number) {
            return Err(StoreError::Timeout("create".to_string()));
        }
        if self.fail_create.contains(number) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.lock().unwrap().insert(id, number.to_string());
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        if self.fail_delete.contains(&id) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<String>, StoreError> {
        self.read_guard()?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.read_guard()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.contains(prefix))
            .cloned()
            .collect())
    }

    async fn get_by_region(&self, region: &str) -> Result<Vec<String>, StoreError> {
        self.read_guard()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|n| matches_region(n, region))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, number: &str) -> Result<i64, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(existing) => {
                *existing = number.to_string();
                Ok(id)
            }
            None => Err(StoreError::NotFound(format!("number with id {} not found", id))),
        }
    }

    async fn create_enriched(
        &self,
        number_id: Option<i64>,
        info: &EnrichedInfo,
    ) -> Result<i64, StoreError> {
        if self.fail_enriched {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let mut enriched = self.enriched.lock().unwrap();
        enriched.push((number_id, info.clone()));
        Ok(enriched.len() as i64)
    }
}

/// Increments its counter when dropped before being disarmed.
struct CancelProbe(Arc<AtomicUsize>);

impl Drop for CancelProbe {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Car info fake with scripted failures and delays.
#[derive(Default)]
pub struct FakeCarInfo {
    pub calls: AtomicUsize,
    pub failures: HashMap<String, EnrichmentError>,
    pub delays: HashMap<String, Duration>,
    /// Lookups for these numbers never finish on their own.
    pub hang: HashSet<String>,
    pub cancelled: Arc<AtomicUsize>,
}

impl FakeCarInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CarInfoApi for FakeCarInfo {
    async fn lookup(&self, reg_num: &str) -> Result<EnrichedInfo, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hang.contains(reg_num) {
            let probe = CancelProbe(Arc::clone(&self.cancelled));
            tokio::time::sleep(Duration::from_secs(3600)).await;
            std::mem::forget(probe);
        }
        if let Some(delay) = self.delays.get(reg_num) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.failures.get(reg_num) {
            return Err(err.clone());
        }
        Ok(sample_info(reg_num))
    }
}

pub fn enricher(
    store: Arc<MemoryStore>,
    car_info: Arc<FakeCarInfo>,
    limit: usize,
) -> BatchEnricher {
    BatchEnricher::new(store, car_info, limit)
}

pub fn app_state(store: Arc<MemoryStore>, car_info: Arc<FakeCarInfo>) -> Arc<AppState> {
    let config = test_config("http://127.0.0.1:9/info".to_string());
    Arc::new(AppState {
        store: store.clone(),
        enricher: BatchEnricher::new(store, car_info, config.batch_concurrency),
        config,
    })
}
