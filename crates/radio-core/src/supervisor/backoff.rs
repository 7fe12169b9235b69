use std::time::Duration;

/// Delay before the reconnect that follows `attempts` failed ones:
/// `base * 2^attempts`, saturating.
pub fn backoff_delay(base: Duration, attempts: u32) -> Duration {
    let factor = 1u32.checked_shl(attempts).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}
