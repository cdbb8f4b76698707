//! Batch delivery with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

use super::worker::Transport;
use crate::context::LogIdentity;
use crate::logger::{Level, Record};

const BASE_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 5_000;

/// Exponential backoff delay with jitter for retry `attempt` (1-based).
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Up to 10% jitter on top.
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Send `records`, retrying up to `max_retries` times.
///
/// A batch that still fails is dropped and reported at error level through
/// `diag`, which writes to the console only.
pub(crate) async fn deliver<T: Transport>(transport: &mut T, records: &[Record], max_retries: u32, diag: &LogIdentity) {
    let mut attempt = 0;
    loop {
        match transport.send(records).await {
            Ok(()) => return,
            Err(e) if attempt < max_retries => {
                attempt += 1;
                diag.emit(
                    Level::Debug,
                    format_args!("delivery failed, retry {attempt} of {max_retries}"),
                    Some(&e),
                );
                tokio::time::sleep(calculate_backoff(attempt, BASE_DELAY_MS, MAX_DELAY_MS)).await;
            }
            Err(e) => {
                diag.emit(
                    Level::Error,
                    format_args!("dropped {} records after {} attempts", records.len(), attempt + 1),
                    Some(&e),
                );
                return;
            }
        }
    }
}
