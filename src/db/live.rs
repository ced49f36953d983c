use std::future::Future;

use futures::stream::Stream;
use tokio::sync::watch;

use crate::error::Result;

/// Turns a data-version receiver plus a snapshot query into a live stream.
///
/// Emits the current snapshot immediately, re-runs the query after every
/// data-version bump, and suppresses snapshots equal to the previous emission.
/// Query errors are logged and the subscription stays alive. The stream ends
/// once every store handle is dropped.
pub(super) fn watch_snapshots<T, F, Fut>(
    mut version: watch::Receiver<u64>,
    fetch: F,
) -> impl Stream<Item = T> + Send + 'static
where
    T: Clone + PartialEq + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send,
{
    // Force an immediate first pass so subscribers do not wait for a write.
    version.mark_changed();

    futures::stream::unfold(
        (version, fetch, None::<T>),
        |(mut version, fetch, last)| async move {
            loop {
                if version.changed().await.is_err() {
                    return None;
                }
                match fetch().await {
                    Ok(snapshot) => {
                        if last.as_ref() == Some(&snapshot) {
                            continue;
                        }
                        return Some((snapshot.clone(), (version, fetch, Some(snapshot))));
                    }
                    Err(e) => {
                        tracing::error!("Failed to refresh live query: {}", e);
                        continue;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use tokio::sync::watch;

    use crate::error::AppError;

    use super::watch_snapshots;

    #[test]
    fn emits_current_snapshot_immediately_and_ends_with_the_sender() {
        tokio_test::block_on(async {
            let (tx, rx) = watch::channel(0u64);
            let mut stream = Box::pin(watch_snapshots(rx, || async { Ok(7u32) }));

            assert_eq!(stream.next().await, Some(7));
            drop(tx);
            assert_eq!(stream.next().await, None);
        });
    }

    #[test]
    fn suppresses_snapshots_equal_to_the_last_emission() {
        tokio_test::block_on(async {
            let (tx, rx) = watch::channel(0u64);
            let value = Arc::new(AtomicU32::new(7));
            let fetch_value = Arc::clone(&value);
            let mut stream = Box::pin(watch_snapshots(rx, move || {
                let fetch_value = Arc::clone(&fetch_value);
                async move { Ok(fetch_value.load(Ordering::SeqCst)) }
            }));

            assert_eq!(stream.next().await, Some(7));

            // A bump that does not change the snapshot must not emit.
            tx.send_modify(|v| *v += 1);
            let unchanged = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
            assert!(unchanged.is_err());

            value.store(9, Ordering::SeqCst);
            tx.send_modify(|v| *v += 1);
            assert_eq!(stream.next().await, Some(9));
        });
    }

    #[test]
    fn keeps_the_subscription_alive_across_query_errors() {
        tokio_test::block_on(async {
            let (tx, rx) = watch::channel(0u64);
            let failing = Arc::new(AtomicBool::new(true));
            let fetch_failing = Arc::clone(&failing);
            let mut stream = Box::pin(watch_snapshots(rx, move || {
                let fetch_failing = Arc::clone(&fetch_failing);
                async move {
                    if fetch_failing.load(Ordering::SeqCst) {
                        Err(AppError::Network("snapshot query failed".to_string()))
                    } else {
                        Ok(42u32)
                    }
                }
            }));

            let pending = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
            assert!(pending.is_err());

            failing.store(false, Ordering::SeqCst);
            tx.send_modify(|v| *v += 1);
            assert_eq!(stream.next().await, Some(42));
        });
    }
}
