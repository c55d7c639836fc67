//! Retry policy for provider calls.
//!
//! Classification looks only at structured errors. Transport failures are
//! mapped to `Timeout` or `ProviderUnreachable` when the request is sent, and
//! HTTP failures carry their status code, so no message text is inspected.

use crate::error::PipelineError;
use rand::Rng;
use std::time::Duration;

/// Upper bound for a single backoff delay, before jitter.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Whether another attempt could succeed where this one failed.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::Timeout { .. } | PipelineError::ProviderUnreachable { .. } => true,
        PipelineError::Llm {
            status_code: Some(code),
            ..
        } => is_transient_status(*code),
        _ => false,
    }
}

/// Request timeout, rate limiting, and server-side failures.
fn is_transient_status(code: u16) -> bool {
    matches!(code, 408 | 429 | 500..=599)
}

/// Delay before retry number `retry` (0-based): `base_delay_ms * 2^retry`,
/// capped at [`MAX_BACKOFF`].
pub fn backoff_duration(retry: u32, base_delay_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
    Duration::from_millis(base_delay_ms.saturating_mul(factor)).min(MAX_BACKOFF)
}

/// Add up to 25% random jitter so concurrent clients don't retry in lockstep.
pub fn with_jitter(delay: Duration) -> Duration {
    let max_jitter = delay.as_millis() as u64 / 4;
    if max_jitter == 0 {
        return delay;
    }
    let jitter = rand::thread_rng().gen_range(0..=max_jitter);
    delay + Duration::from_millis(jitter)
}
