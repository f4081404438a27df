//! Bounded task group used by the batch endpoints.
//!
//! Every item becomes one task in a [`JoinSet`]; a per-batch [`Semaphore`]
//! caps how many run at once. The join loop collects exactly one result per
//! spawned task, so completion is counted by construction. Dropping the
//! returned future drops the `JoinSet`, which aborts whatever is still running.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs `work` for every item with at most `limit` units in flight and
/// returns the results in input order.
///
/// A unit that panics (or is cancelled) yields `on_failure(item)` in its slot.
pub async fn run_bounded<I, T, F, Fut, E>(
    items: Vec<I>,
    limit: usize,
    work: F,
    on_failure: E,
) -> Vec<T>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    E: Fn(I, String) -> T,
{
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();

    for (index, item) in items.iter().cloned().enumerate() {
        let permits = Arc::clone(&permits);
        let unit = work(item);
        set.spawn(async move {
            // Never closed, so acquire cannot fail.
            let _permit = permits.acquire_owned().await.ok();
            (index, unit.await)
        });
    }

    let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, value)) => results[index] = Some(value),
            Err(e) => tracing::error!("batch unit did not complete: {}", e),
        }
    }

    results
        .into_iter()
        .zip(items)
        .map(|(slot, item)| match slot {
            Some(value) => value,
            None => on_failure(item, "unit of work panicked or was aborted".to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let out = run_bounded(
            vec![30u64, 10, 20],
            3,
            |ms| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                ms
            },
            |_, _| 0,
        )
        .await;
        assert_eq!(out, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let out = run_bounded(
            (0..20).collect::<Vec<u32>>(),
            4,
            |i| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    i
                }
            },
            |_, _| u32::MAX,
        )
        .await;

        assert_eq!(out.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_unit_still_reports() {
        let out = run_bounded(
            vec![1u32, 2, 3],
            2,
            |i| async move {
                if i == 2 {
                    panic!("boom");
                }
                format!("ok {}", i)
            },
            |i, reason| format!("failed {}: {}", i, reason),
        )
        .await;

        assert_eq!(out[0], "ok 1");
        assert!(out[1].starts_with("failed 2"));
        assert_eq!(out[2], "ok 3");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let out: Vec<u32> = run_bounded(Vec::<u32>::new(), 4, |i| async move { i }, |_, _| 0).await;
        assert!(out.is_empty());
    }
}
