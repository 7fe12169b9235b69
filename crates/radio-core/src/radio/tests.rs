use radio_common::RadioEvent;

use crate::testing::{channel, settle, tenant, Harness};
use crate::voice::SessionStatus;

#[tokio::test(start_paused = true)]
async fn publishes_connect_and_stream_events() {
    let h = Harness::new();
    let mut events = h.radio.subscribe();

    h.radio.start_radio(&tenant(), &channel("vc")).await;
    settle(2).await;

    assert!(matches!(
        events.recv().await.unwrap(),
        RadioEvent::Connected { ref channel, .. } if channel.as_str() == "vc"
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        RadioEvent::StreamStarted { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn repeated_start_reuses_session_and_stream() {
    let h = Harness::new();

    h.radio.start_radio(&tenant(), &channel("vc")).await;
    settle(2).await;
    h.radio.start_radio(&tenant(), &channel("vc")).await;
    settle(2).await;

    assert_eq!(h.provider.joins(), 1);
    assert_eq!(h.source.opens(), 1);
    assert_eq!(h.codec.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn racing_commands_keep_one_live_session() {
    let h = Harness::new();
    h.provider.set_listeners(&tenant(), &channel("a"), 1);
    h.provider.set_listeners(&tenant(), &channel("b"), 1);

    let (guild, a, b) = (tenant(), channel("a"), channel("b"));

    tokio::join!(
        h.radio.start_radio(&guild, &a),
        h.radio.start_radio(&guild, &b),
        h.radio.join(&guild, &a),
    );
    settle(30).await;

    assert!(h.provider.live_sessions(&tenant()) <= 1);
}

#[tokio::test(start_paused = true)]
async fn moving_broadcast_replaces_stream() {
    let h = Harness::new();
    h.provider.set_listeners(&tenant(), &channel("a"), 1);
    h.provider.set_listeners(&tenant(), &channel("b"), 1);

    h.radio.start_radio(&tenant(), &channel("a")).await;
    settle(2).await;
    let first = h.provider.current(&tenant()).unwrap();

    h.radio.start_radio(&tenant(), &channel("b")).await;
    settle(2).await;

    assert!(first.is_closed());
    assert_eq!(h.provider.live_sessions(&tenant()), 1);
    assert!(h.radio.is_streaming(&tenant()));
    assert_eq!(h.provider.joins(), 2);
}

#[tokio::test(start_paused = true)]
async fn status_reflects_broadcast() {
    let h = Harness::new();
    h.radio.start_radio(&tenant(), &channel("vc")).await;

    let status = h.radio.status(&tenant());

    assert!(status.state.active);
    assert_eq!(status.state.target_channel, Some(channel("vc")));
    assert_eq!(status.session, Some(SessionStatus::Ready));
    assert_eq!(status.session_channel, Some(channel("vc")));
    assert!(status.streaming);
    assert!(!status.recovering);

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["active"], true);
    assert_eq!(json["session"], "ready");
}

#[tokio::test(start_paused = true)]
async fn status_of_unknown_guild_is_idle() {
    let h = Harness::new();
    let status = h.radio.status(&tenant());
    assert!(!status.state.active);
    assert!(status.session.is_none());
    assert!(h.radio.store().get(&tenant()).is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_disconnects_and_drains_tasks() {
    let h = Harness::new();
    h.provider.set_listeners(&tenant(), &channel("vc"), 1);
    h.radio.start_radio(&tenant(), &channel("vc")).await;
    h.radio.start();
    settle(2).await;
    let session = h.provider.current(&tenant()).unwrap();

    assert!(h.radio.shutdown().await);

    assert!(h.radio.is_shutting_down());
    assert!(session.is_closed());
    assert!(h.provider.current(&tenant()).is_none());
    assert!(h.radio.encoders().is_empty());
    assert!(!h.radio.is_streaming(&tenant()));
}

#[tokio::test(start_paused = true)]
async fn commands_after_shutdown_do_not_connect() {
    let h = Harness::new();
    h.radio.shutdown().await;

    let reply = h.radio.start_radio(&tenant(), &channel("vc")).await;

    assert!(!reply.ok);
    assert_eq!(h.provider.joins(), 0);
}

#[tokio::test(start_paused = true)]
async fn panicking_disconnect_does_not_break_stop() {
    let h = Harness::new();
    h.radio.start_radio(&tenant(), &channel("vc")).await;
    h.provider.current(&tenant()).unwrap().panic_on_disconnect(true);

    let reply = h.radio.stop(&tenant()).await;

    assert_eq!(reply.message, "Disconnected.");
    assert!(h.provider.current(&tenant()).is_none());
}

#[tokio::test(start_paused = true)]
async fn crashed_decoder_frees_stream_and_recovers() {
    let h = Harness::new();
    h.provider.set_listeners(&tenant(), &channel("vc"), 1);
    h.source.panic_next_opens(1);
    h.radio.start();

    let reply = h.radio.start_radio(&tenant(), &channel("vc")).await;
    assert!(reply.ok);
    settle(2).await;

    assert!(!h.radio.is_streaming(&tenant()));
    assert!(h.radio.is_recovering(&tenant()));

    settle(30).await;
    assert!(h.radio.is_streaming(&tenant()));
    assert_eq!(h.source.opens(), 2);
    assert_eq!(h.provider.joins(), 1);
    assert_eq!(h.provider.live_sessions(&tenant()), 1);
}

#[tokio::test(start_paused = true)]
async fn crashed_decoder_read_restarts_stream() {
    let h = Harness::new();
    h.provider.set_listeners(&tenant(), &channel("vc"), 1);
    h.source.panic_next_reads(1);

    h.radio.start_radio(&tenant(), &channel("vc")).await;
    settle(30).await;

    let status = h.radio.status(&tenant());
    assert!(status.state.active);
    assert!(status.streaming);
    assert!(!status.recovering);
    assert_eq!(h.source.opens(), 2);
}
