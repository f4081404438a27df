/// Batch create-and-enrich workflow.
///
/// For every submitted registration number, one independent unit of work:
/// 1. Persist the number
/// 2. Look it up in the car info API
/// 3. Store the enrichment, linked to the number row
///
/// A failure ends only its own unit; the batch always reports every item.
use std::sync::Arc;

use crate::batch::run_bounded;
use crate::errors::{EnrichmentError, StoreError};
use crate::models::{BatchOutcome, BatchReport, ItemErrorKind};
use crate::services::CarInfoApi;
use crate::store::NumberStore;

#[derive(Clone)]
pub struct BatchEnricher {
    store: Arc<dyn NumberStore>,
    car_info: Arc<dyn CarInfoApi>,
    concurrency: usize,
}

impl BatchEnricher {
    pub fn new(
        store: Arc<dyn NumberStore>,
        car_info: Arc<dyn CarInfoApi>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            car_info,
            concurrency,
        }
    }

    /// Processes the whole batch and returns once every unit has finished.
    pub async fn process_batch(&self, identifiers: Vec<String>) -> BatchReport {
        let total = identifiers.len();
        tracing::debug!(total, concurrency = self.concurrency, "processing batch");

        let outcomes = run_bounded(
            identifiers,
            self.concurrency,
            |identifier| {
                let store = Arc::clone(&self.store);
                let car_info = Arc::clone(&self.car_info);
                async move { process_item(store.as_ref(), car_info.as_ref(), identifier).await }
            },
            |identifier, reason| {
                BatchOutcome::new(identifier).fail(ItemErrorKind::TaskFailed, reason)
            },
        )
        .await;

        let report = BatchReport::from_outcomes(outcomes);
        tracing::info!(
            total,
            succeeded = report.succeeded,
            failed = report.failed,
            "batch complete"
        );
        report
    }
}

/// One unit of work. Every exit path returns exactly one outcome.
async fn process_item(
    store: &dyn NumberStore,
    car_info: &dyn CarInfoApi,
    identifier: String,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::new(identifier.clone());

    let id = match store.create(&identifier).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(num = %identifier, "create error: {}", e);
            let kind = match e {
                StoreError::Timeout(_) => ItemErrorKind::Timeout,
                _ => ItemErrorKind::PersistFailed,
            };
            return outcome.fail(kind, format!("persist: {}", e));
        }
    };
    outcome.id = Some(id);
    outcome.created = true;
    tracing::info!(num = %identifier, id, "create number success");

    let info = match car_info.lookup(&identifier).await {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!(num = %identifier, "enriching error: {}", e);
            let kind = match e {
                EnrichmentError::Timeout(_) => ItemErrorKind::Timeout,
                EnrichmentError::Transport(_) => ItemErrorKind::TransportFailed,
                EnrichmentError::RemoteStatus { .. } => ItemErrorKind::RemoteStatusError,
                EnrichmentError::Decode(_) => ItemErrorKind::DecodeFailed,
            };
            return outcome.fail(kind, format!("enrich: {}", e));
        }
    };

    if let Err(e) = store.create_enriched(Some(id), &info).await {
        tracing::error!(num = %identifier, "storing enrichment failed: {}", e);
        let kind = match e {
            StoreError::Timeout(_) => ItemErrorKind::Timeout,
            _ => ItemErrorKind::EnrichedPersistFailed,
        };
        return outcome.fail(kind, format!("store enrichment: {}", e));
    }

    outcome.enriched = true;
    tracing::info!(num = %identifier, "enriching success");
    outcome
}
