use crate::domain::api::{ElementId, ManagerId};
use crate::utils::error::LeagueError;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

/// Log level for a lookup that is about to be replaced by a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureLevel {
    /// The resource does not exist (404).
    Info,
    /// Timeouts, dropped connections and 429/5xx answers.
    Warn,
    /// Anything a later run would hit again, such as a payload that no longer decodes.
    Error,
}

impl FailureLevel {
    pub fn of(err: &LeagueError) -> Self {
        match err {
            LeagueError::NotFoundError { .. } => FailureLevel::Info,
            e if e.is_transient() => FailureLevel::Warn,
            _ => FailureLevel::Error,
        }
    }
}

fn log_failure(what: fmt::Arguments<'_>, err: &LeagueError) {
    match FailureLevel::of(err) {
        FailureLevel::Info => tracing::info!("No {} (404)", what),
        FailureLevel::Warn => tracing::warn!("Failed to fetch {}: {}", what, err),
        FailureLevel::Error => tracing::error!("Failed to fetch {}: {}", what, err),
    }
}

/// Logs a per-manager lookup that is about to be replaced by a default.
pub fn log_fetch_failure(what: &str, entry: ManagerId, err: &LeagueError) {
    log_failure(format_args!("{} for entry {}", what, entry), err)
}

/// Logs a player points lookup that is about to count as 0.
pub fn log_element_failure(element: ElementId, gw: u32, err: &LeagueError) {
    log_failure(format_args!("GW{} points for player {}", gw, element), err)
}

/// Runs `task` for every key with at most `concurrency` calls in flight and
/// collects the results by key.
///
/// Completion order is not preserved. Tasks turn their own failures into
/// default values, so one bad key never aborts the batch.
pub async fn scatter_gather<K, T, F, Fut>(
    keys: impl IntoIterator<Item = K>,
    concurrency: usize,
    task: F,
) -> HashMap<K, T>
where
    K: Copy + Eq + Hash,
    F: Fn(K) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(keys)
        .map(|key| {
            let fut = task(key);
            async move { (key, fut.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_collects_every_key() {
        let results = tokio_test::block_on(scatter_gather(1u64..=5, 2, |id| async move {
            id * 10
        }));

        assert_eq!(results.len(), 5);
        assert_eq!(results[&3], 30);
    }

    #[tokio::test]
    async fn test_failures_become_defaults() {
        let results = scatter_gather(vec![1u64, 2, 3], 3, |id| async move {
            if id == 2 {
                Err::<u64, &str>("boom").unwrap_or_default()
            } else {
                id
            }
        })
        .await;

        assert_eq!(results[&1], 1);
        assert_eq!(results[&2], 0);
        assert_eq!(results[&3], 3);
    }

    #[tokio::test]
    async fn test_respects_concurrency_bound() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = scatter_gather(0u32..20, 4, |id| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                id
            }
        })
        .await;

        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[test]
    fn test_failure_level_follows_error_kind() {
        let missing = LeagueError::NotFoundError {
            resource: "element-summary/9/".to_string(),
        };
        let overloaded = LeagueError::HttpStatusError {
            url: "https://example.com/entry/1/".to_string(),
            status: 503,
        };
        let rejected = LeagueError::HttpStatusError {
            url: "https://example.com/entry/1/".to_string(),
            status: 400,
        };
        let garbled =
            LeagueError::SerializationError(serde_json::from_str::<u32>("{").unwrap_err());

        assert_eq!(FailureLevel::of(&missing), FailureLevel::Info);
        assert_eq!(FailureLevel::of(&overloaded), FailureLevel::Warn);
        assert_eq!(FailureLevel::of(&rejected), FailureLevel::Error);
        assert_eq!(FailureLevel::of(&garbled), FailureLevel::Error);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let results = scatter_gather([7u8], 0, |id| async move { id }).await;
        assert_eq!(results[&7], 7);
    }
}
