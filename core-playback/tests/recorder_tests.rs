//! Recorder session behavior driven through a scripted engine.

mod common;

use bridge_traits::{
    AudioSourceType, ContainerFormat, RecorderCodec, RecorderConfig, RecorderProfile,
    RecorderState,
};
use common::{id, Op, RecorderHarness, STORAGE};
use core_playback::{PlaybackError, RecorderOptions};
use core_runtime::events::{EventName, EventSource, RecorderInfo};
use std::path::PathBuf;

async fn prepared(h: &mut RecorderHarness, n: i64) -> PathBuf {
    let ready = h
        .recorder
        .prepare(id(n), "take.m4a", RecorderOptions::default())
        .await
        .unwrap();
    h.deliver_state(id(n), RecorderState::Prepared).await;
    ready.wait().await.unwrap()
}

#[tokio::test]
async fn prepare_configures_engine_with_defaults() {
    let mut h = RecorderHarness::new();

    let output = prepared(&mut h, 1).await;

    let expected_output = PathBuf::from(format!("{}/take.m4a", STORAGE));
    assert_eq!(output, expected_output);
    assert_eq!(
        h.engine.calls_for(id(1)),
        vec![Op::RecorderPrepare(RecorderConfig {
            source: AudioSourceType::Microphone,
            profile: RecorderProfile {
                audio_bitrate: 48_000,
                audio_channels: 2,
                audio_sample_rate: 48_000,
                audio_codec: RecorderCodec::Aac,
                file_format: ContainerFormat::M4a,
            },
            output: expected_output.clone(),
        })]
    );
    assert_eq!(h.recorder.output_path(id(1)), Some(expected_output));
    assert_eq!(h.recorder.session_state(id(1)), Some(RecorderState::Prepared));
}

#[tokio::test]
async fn prepare_honors_options() {
    let mut h = RecorderHarness::new();
    let options = RecorderOptions {
        bit_rate: Some(96_000),
        channels: Some(1),
        sample_rate: Some(44_100),
    };

    let _ready = h
        .recorder
        .prepare(id(1), "/data/storage/el2/base/cache/memo.m4a", options)
        .await
        .unwrap();

    let Op::RecorderPrepare(config) = &h.engine.calls_for(id(1))[0] else {
        panic!("expected a prepare call");
    };
    assert_eq!(config.profile.audio_bitrate, 96_000);
    assert_eq!(config.profile.audio_channels, 1);
    assert_eq!(config.profile.audio_sample_rate, 44_100);
    assert_eq!(
        config.output,
        PathBuf::from("/data/storage/el2/base/cache/memo.m4a")
    );
}

#[tokio::test]
async fn prepare_rejects_blank_and_remote_paths() {
    let mut h = RecorderHarness::new();

    for path in ["", "https://example.com/upload.m4a"] {
        let err = h
            .recorder
            .prepare(id(1), path, RecorderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidPath(_)));
    }
    assert_eq!(h.engine.created(), 0);
}

#[tokio::test]
async fn rejected_prepare_releases_handle() {
    let mut h = RecorderHarness::new();
    h.engine.fail("recorder_prepare");

    let err = h
        .recorder
        .prepare(id(1), "take.m4a", RecorderOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlaybackError::EngineCall {
            operation: "prepare",
            ..
        }
    ));
    assert_eq!(h.engine.count(id(1), &Op::Release), 1);
    assert!(h.recorder.session_ids().is_empty());
}

#[tokio::test]
async fn record_starts_then_resumes() {
    let mut h = RecorderHarness::new();
    let s = id(1);
    prepared(&mut h, 1).await;
    h.engine.clear_calls();

    h.recorder.record(s).await.unwrap();
    h.deliver_state(s, RecorderState::Started).await;
    // Already recording.
    h.recorder.record(s).await.unwrap();

    h.recorder.pause(s).await.unwrap();
    h.deliver_state(s, RecorderState::Paused).await;
    // Not started any more.
    h.recorder.pause(s).await.unwrap();

    h.recorder.record(s).await.unwrap();

    assert_eq!(
        h.engine.calls_for(s),
        vec![Op::Start, Op::Pause, Op::Resume]
    );
}

#[tokio::test]
async fn stop_only_acts_while_capturing() {
    let mut h = RecorderHarness::new();
    let s = id(1);
    prepared(&mut h, 1).await;
    h.engine.clear_calls();

    h.recorder.stop(s).await.unwrap();
    assert!(h.engine.calls_for(s).is_empty());

    h.recorder.record(s).await.unwrap();
    h.deliver_state(s, RecorderState::Started).await;
    h.recorder.stop(s).await.unwrap();
    h.deliver_state(s, RecorderState::Stopped).await;

    assert_eq!(h.engine.calls_for(s), vec![Op::Start, Op::Stop]);

    let err = h.recorder.record(s).await.unwrap_err();
    assert!(matches!(err, PlaybackError::EngineCall { operation: "record", .. }));
}

#[tokio::test]
async fn state_changes_become_info_events() {
    let mut h = RecorderHarness::new();
    let s = id(7);
    prepared(&mut h, 7).await;
    h.recorder.record(s).await.unwrap();
    h.deliver_state(s, RecorderState::Started).await;

    let events = h.drain_events();
    let infos: Vec<_> = events
        .iter()
        .map(|e| {
            assert_eq!(e.source, EventSource::Recorder);
            assert_eq!(e.event, EventName::Info);
            e.data.info.clone().unwrap()
        })
        .collect();

    assert_eq!(
        infos,
        vec![
            RecorderInfo {
                what: "prepared".into(),
                extra: 1
            },
            RecorderInfo {
                what: "started".into(),
                extra: 1
            },
        ]
    );
    assert_eq!(events[1].channel(), "RCTAudioRecorderEvent:7");
}

#[tokio::test]
async fn engine_error_emits_error_and_fails_prepare() {
    let mut h = RecorderHarness::new();
    let s = id(1);
    let ready = h
        .recorder
        .prepare(s, "take.m4a", RecorderOptions::default())
        .await
        .unwrap();

    h.engine.notify_recorder_error(s, 5400102, "microphone unavailable");
    h.pump().await;

    assert!(matches!(
        ready.wait().await,
        Err(PlaybackError::Engine { code: 5400102, .. })
    ));
    let events = h.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, EventName::Error);
    assert_eq!(events[0].data.message.as_deref(), Some("media recorder error"));
    assert_eq!(
        events[0].data.err.as_deref(),
        Some("microphone unavailable")
    );
    // The session is kept for the application to destroy.
    assert!(h.recorder.session_ids().contains(&s));
}

#[tokio::test]
async fn destroy_stops_resets_and_releases() {
    let mut h = RecorderHarness::new();
    let s = id(1);
    prepared(&mut h, 1).await;
    h.recorder.record(s).await.unwrap();
    h.deliver_state(s, RecorderState::Started).await;
    h.engine.clear_calls();
    h.drain_events();

    h.recorder.destroy(s).await.unwrap();

    assert_eq!(
        h.engine.calls_for(s),
        vec![Op::Stop, Op::Reset, Op::Release]
    );
    let events = h.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, EventName::Info);
    assert_eq!(events[0].data.message.as_deref(), Some("Destroyed recorder"));

    let err = h.recorder.destroy(s).await.unwrap_err();
    let payload = err.payload();
    assert_eq!(payload.err, "notfound");
    assert_eq!(payload.message.as_deref(), Some("1 not found."));
}

#[tokio::test]
async fn reprepare_releases_previous_recorder() {
    let mut h = RecorderHarness::new();
    let s = id(1);
    prepared(&mut h, 1).await;
    h.engine.clear_calls();

    let _ready = h
        .recorder
        .prepare(s, "second.m4a", RecorderOptions::default())
        .await
        .unwrap();

    let calls = h.engine.calls_for(s);
    assert_eq!(&calls[..2], &[Op::Reset, Op::Release]);
    assert!(matches!(calls[2], Op::RecorderPrepare(_)));
    assert_eq!(h.engine.created(), 2);
    assert_eq!(h.recorder.session_state(s), Some(RecorderState::Idle));
}

#[tokio::test]
async fn unknown_recorder_operations_fail() {
    let mut h = RecorderHarness::new();
    let s = id(3);

    for err in [
        h.recorder.record(s).await.unwrap_err(),
        h.recorder.pause(s).await.unwrap_err(),
        h.recorder.stop(s).await.unwrap_err(),
    ] {
        assert!(matches!(
            err,
            PlaybackError::SessionNotFound {
                kind: EventSource::Recorder,
                ..
            }
        ));
    }
}
