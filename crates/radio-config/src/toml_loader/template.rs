//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Radio Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[stream]
# url = "http://radio.4duk.ru/4duk128.mp3"   # RADIO_URL overrides this
# ffmpeg_path = "ffmpeg"
# reconnect_input = true
# start_delay_ms = 1000

[connection]
# join_attempts = 3          # 1-10
# join_timeout_secs = 15
# retry_delay_ms = 1000      # attempt n waits n * retry_delay_ms
# retry_teardown_wait_ms = 500
# ready_timeout_ms = 10000
# ready_poll_ms = 100
# stabilize_ms = 500

[reconnect]
# max_attempts = 5           # 1-20
# backoff_base_ms = 2000     # attempt n sleeps backoff_base_ms * 2^n
# abandon_when_empty = true

[health]
# check_interval_secs = 20

[pipeline]
# send_timeout_ms = 100
# encoder_profile = "audio"  # audio, voip, lowdelay

[persistence]
# auto_join_path = "data/radio_config.json"

[logging]
# level = "info"             # trace, debug, info, warn, error

[shutdown]
# timeout_secs = 10
"##
    .to_string()
}
