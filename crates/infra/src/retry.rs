use tracing::{debug, warn};

use crate::error::InventoryResult;

/// Run a read-validate-commit cycle, re-running it when the commit lost an
/// optimistic-concurrency race.
///
/// `attempt` must re-read everything it validates; it is called at most
/// `max_attempts` times (at least once). The last concurrency error is
/// returned when every attempt loses.
pub fn with_commit_retry<T>(
    operation: &'static str,
    max_attempts: u32,
    mut attempt: impl FnMut() -> InventoryResult<T>,
) -> InventoryResult<T> {
    let max_attempts = max_attempts.max(1);
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt() {
            Err(err) if err.is_retryable() && tries < max_attempts => {
                warn!(operation, attempt = tries, max_attempts, error = %err, "commit conflict, retrying");
            }
            Err(err) if err.is_retryable() => {
                warn!(operation, attempts = tries, error = %err, "commit conflict, giving up");
                return Err(err);
            }
            Err(err) => return Err(err),
            Ok(value) => {
                if tries > 1 {
                    debug!(operation, attempts = tries, "commit succeeded after retry");
                }
                return Ok(value);
            }
        }
    }
}
