//! Batch runner: one isolated extraction per id, results delivered in input order.

use std::fmt::Display;
use std::future::Future;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, error};

/// Largest accepted `--concurrency`.
pub const MAX_CONCURRENCY: usize = 16;

/// Completed/failed counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    completed: usize,
    failed: usize,
}

impl BatchStats {
    #[must_use]
    pub fn new(completed: usize, failed: usize) -> Self {
        Self { completed, failed }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }
}

/// Runs `fetch` for every id with at most `concurrency` runs in flight.
///
/// Each result is handed to `sink` in input order as soon as it and all
/// earlier ones are done. A failed item is logged and counted; the batch
/// continues. An error returned by `sink` aborts the batch.
///
/// # Errors
///
/// Returns the first error produced by `sink`.
pub async fn run_batch<T, E, S, F, Fut, K>(
    ids: Vec<String>,
    concurrency: usize,
    fetch: F,
    mut sink: K,
) -> Result<BatchStats, S>
where
    E: Display,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    K: FnMut(&str, Result<T, E>) -> Result<(), S>,
{
    let concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
    debug!(items = ids.len(), concurrency, "Starting batch");

    let mut outcomes = stream::iter(ids)
        .map(|id| {
            let run = fetch(id.clone());
            async move { (id, run.await) }
        })
        .buffered(concurrency);

    let mut stats = BatchStats::default();
    while let Some((id, result)) = outcomes.next().await {
        match &result {
            Ok(_) => stats.completed += 1,
            Err(failure) => {
                stats.failed += 1;
                error!(id = %id, error = %failure, "Extraction failed");
            }
        }
        sink(&id, result)?;
    }
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[tokio::test]
    async fn test_results_arrive_in_input_order() {
        let mut seen = Vec::new();
        let stats = run_batch(
            ids(&["slow", "fast", "mid"]),
            3,
            |id| async move {
                let delay = match id.as_str() {
                    "slow" => 30,
                    "mid" => 10,
                    _ => 0,
                };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, String>(id.len())
            },
            |id, result| {
                seen.push((id.to_string(), result.unwrap()));
                Ok::<_, ()>(())
            },
        )
        .await
        .unwrap();

        assert_eq!(
            seen,
            vec![
                ("slow".to_string(), 4),
                ("fast".to_string(), 4),
                ("mid".to_string(), 3)
            ]
        );
        assert_eq!(stats.completed(), 3);
        assert_eq!(stats.failed(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_counted_and_batch_continues() {
        let mut delivered = 0;
        let stats = run_batch(
            ids(&["a", "bad", "c"]),
            1,
            |id| async move {
                if id == "bad" {
                    Err(format!("cannot fetch {id}"))
                } else {
                    Ok(())
                }
            },
            |_, _| {
                delivered += 1;
                Ok::<_, ()>(())
            },
        )
        .await
        .unwrap();

        assert_eq!(delivered, 3);
        assert_eq!(stats.completed(), 2);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.total(), 3);
    }

    #[tokio::test]
    async fn test_sink_error_aborts_batch() {
        let mut delivered = Vec::new();
        let result = run_batch(
            ids(&["a", "b", "c"]),
            1,
            |_| async { Ok::<_, String>(()) },
            |id, _| {
                delivered.push(id.to_string());
                if id == "b" { Err("disk full") } else { Ok(()) }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), "disk full");
        assert_eq!(delivered, vec!["a", "b"]);
    }
}
