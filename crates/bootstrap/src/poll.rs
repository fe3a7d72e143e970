//! Generic fixed-interval polling for eventually-consistent AWS state.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::BootstrapError;

/// One probe result.
pub enum Probe<T> {
    /// The awaited state arrived.
    Ready(T),
    /// Not there yet, keep polling.
    Pending,
    /// Terminal failure; polling further cannot succeed.
    Failed(BootstrapError),
}

/// Polls `probe` every `interval`, at most `max_attempts` times.
///
/// The first attempt runs immediately; the interval sleeps sit between
/// attempts, so total wall time is `(max_attempts - 1) * interval` plus
/// probe time.
pub async fn poll_until<T, F, Fut>(
    what: &'static str,
    interval: Duration,
    max_attempts: u32,
    mut probe: F,
) -> Result<T, BootstrapError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Probe<T>>,
{
    for attempt in 1..=max_attempts {
        match probe().await {
            Probe::Ready(value) => return Ok(value),
            Probe::Failed(e) => return Err(e),
            Probe::Pending => {
                debug!(what, attempt, max_attempts, "still pending");
                if attempt < max_attempts {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
    Err(BootstrapError::Timeout(what))
}
