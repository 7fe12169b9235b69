//! Per-section validators.

use crate::schema::RadioConfig;

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_stream(errors: &mut Vec<String>, config: &RadioConfig) {
    validate_non_empty(errors, "stream.url", &config.stream.url);
    validate_non_empty(errors, "stream.ffmpeg_path", &config.stream.ffmpeg_path);
    validate_range(
        errors,
        "stream.start_delay_ms",
        config.stream.start_delay_ms,
        0,
        30_000,
    );
}

pub(crate) fn validate_connection(errors: &mut Vec<String>, config: &RadioConfig) {
    let c = &config.connection;
    validate_range(errors, "connection.join_attempts", c.join_attempts.into(), 1, 10);
    validate_range(errors, "connection.join_timeout_secs", c.join_timeout_secs, 1, 120);
    validate_range(errors, "connection.retry_delay_ms", c.retry_delay_ms, 0, 60_000);
    validate_range(
        errors,
        "connection.retry_teardown_wait_ms",
        c.retry_teardown_wait_ms,
        0,
        10_000,
    );
    validate_range(errors, "connection.ready_timeout_ms", c.ready_timeout_ms, 100, 120_000);
    validate_range(errors, "connection.ready_poll_ms", c.ready_poll_ms, 10, 5_000);
    validate_range(errors, "connection.stabilize_ms", c.stabilize_ms, 0, 10_000);

    if c.ready_poll_ms > c.ready_timeout_ms {
        errors.push(format!(
            "connection.ready_poll_ms = {} exceeds connection.ready_timeout_ms = {}",
            c.ready_poll_ms, c.ready_timeout_ms
        ));
    }
}

pub(crate) fn validate_reconnect(errors: &mut Vec<String>, config: &RadioConfig) {
    validate_range(
        errors,
        "reconnect.max_attempts",
        config.reconnect.max_attempts.into(),
        1,
        20,
    );
    validate_range(
        errors,
        "reconnect.backoff_base_ms",
        config.reconnect.backoff_base_ms,
        1,
        60_000,
    );
}

pub(crate) fn validate_health(errors: &mut Vec<String>, config: &RadioConfig) {
    validate_range(
        errors,
        "health.check_interval_secs",
        config.health.check_interval_secs,
        1,
        3600,
    );
}

pub(crate) fn validate_pipeline(errors: &mut Vec<String>, config: &RadioConfig) {
    validate_range(
        errors,
        "pipeline.send_timeout_ms",
        config.pipeline.send_timeout_ms,
        20,
        5_000,
    );
}

pub(crate) fn validate_shutdown(errors: &mut Vec<String>, config: &RadioConfig) {
    validate_range(errors, "shutdown.timeout_secs", config.shutdown.timeout_secs, 1, 300);
}
