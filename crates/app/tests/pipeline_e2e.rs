use std::time::{Duration, Instant};

use livecue_app::{start, CaptionEvent, DeviceFormat, NullTranscriptionSink, PipelineOptions};
use livecue_audio::AudioFrame;
use livecue_foundation::{ClassifierError, PipelineState};
use livecue_scene::{LabelScore, NullSceneClassifier};
use livecue_whistle::{NullWhistleClassifier, WhistleLogits};
use tokio::sync::broadcast;
use tokio::time::timeout;

const RATE: u32 = 16_000;
const FRAME: usize = 256;

fn tone_frame(freq: f32, amplitude: f32, index: usize) -> AudioFrame {
    let samples: Vec<f32> = (0..FRAME)
        .map(|i| {
            let n = (index * FRAME + i) as f32;
            (2.0 * std::f32::consts::PI * freq * n / RATE as f32).sin() * amplitude
        })
        .collect();
    AudioFrame::mono(samples, RATE, Instant::now())
}

fn silence_frame() -> AudioFrame {
    AudioFrame::mono(vec![0.0; FRAME], RATE, Instant::now())
}

fn confident_whistle() -> impl livecue_whistle::WhistleClassifier {
    |_: &[f32]| -> Result<WhistleLogits, ClassifierError> {
        Ok(WhistleLogits {
            non_whistle: -5.0,
            whistle: 5.0,
        })
    }
}

fn test_options() -> PipelineOptions {
    PipelineOptions {
        // Deep enough that a burst of frames outruns the workers without drops
        worker_queue_depth: 512,
        level_update_interval: 1,
        ..Default::default()
    }
}

async fn drain_events(rx: &mut broadcast::Receiver<CaptionEvent>) -> Vec<CaptionEvent> {
    let mut events = Vec::new();
    while let Ok(Ok(event)) = timeout(Duration::from_millis(200), rx.recv()).await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn silence_produces_no_events() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        NullWhistleClassifier,
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();
    let mut events = handle.subscribe_events();

    // ~200 ms of silence
    for _ in 0..13 {
        feed.deliver(&silence_frame());
    }

    assert!(drain_events(&mut events).await.is_empty());
    assert_eq!(*handle.bass_level().borrow(), 0.0);
    assert_eq!(
        handle
            .metrics
            .whistle_confirmed
            .load(std::sync::atomic::Ordering::Relaxed),
        0
    );
    handle.shutdown().await;
}

#[tokio::test]
async fn sustained_tone_confirms_exactly_once_within_cooldown() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        confident_whistle(),
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();
    let mut events = handle.subscribe_events();

    // ~1.3 s of tone: history fills at 60 sub-buffers, everything after the
    // confirmation lands inside the 5 s cooldown
    for i in 0..80 {
        feed.deliver(&tone_frame(3000.0, 0.3, i));
    }

    let events = drain_events(&mut events).await;
    let confirmations = events
        .iter()
        .filter(|e| **e == CaptionEvent::WhistleConfirmed)
        .count();
    assert_eq!(confirmations, 1, "events: {:?}", events);
    assert_eq!(
        handle
            .metrics
            .whistle_confirmed
            .load(std::sync::atomic::Ordering::Relaxed),
        1
    );
    handle.shutdown().await;
}

#[tokio::test]
async fn crowd_scores_surface_as_cheer_cues() {
    let scene_stub = |_: &[f32], _: usize| -> Result<Vec<LabelScore>, ClassifierError> {
        Ok(vec![
            LabelScore {
                label: "Cheering".into(),
                score: 0.5,
            },
            LabelScore {
                label: "Vehicle".into(),
                score: 0.05,
            },
        ])
    };

    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        NullWhistleClassifier,
        scene_stub,
        NullTranscriptionSink,
    )
    .unwrap();
    let mut events = handle.subscribe_events();

    // One full scene window is 15_600 samples; 70 frames exceed it
    for i in 0..70 {
        feed.deliver(&tone_frame(200.0, 0.1, i));
    }

    let events = drain_events(&mut events).await;
    assert!(
        events.contains(&CaptionEvent::Scene(livecue_scene::SceneCue::Cheer)),
        "events: {:?}",
        events
    );
    assert_eq!(
        handle
            .metrics
            .cheer_cues
            .load(std::sync::atomic::Ordering::Relaxed),
        1
    );
    handle.shutdown().await;
}

#[tokio::test]
async fn bass_watch_tracks_low_band_energy() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: 48_000,
            channels: 1,
        },
        NullWhistleClassifier,
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();
    let bass = handle.bass_level();

    // One second of a 60 Hz tone in 2048-sample buffers
    let mut index = 0usize;
    for _ in 0..24 {
        let samples: Vec<f32> = (0..2048)
            .map(|i| {
                let n = (index + i) as f32;
                (2.0 * std::f32::consts::PI * 60.0 * n / 48_000.0).sin() * 0.8
            })
            .collect();
        index += 2048;
        feed.deliver(&AudioFrame::mono(samples, 48_000, Instant::now()));
    }

    assert!(*bass.borrow() > 0.1, "bass level {}", *bass.borrow());
    handle.shutdown().await;
}

#[tokio::test]
async fn paused_feed_drops_deliveries() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        confident_whistle(),
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();
    let mut events = handle.subscribe_events();

    feed.pause().unwrap();
    assert_eq!(handle.state(), PipelineState::Paused);
    for i in 0..80 {
        feed.deliver(&tone_frame(3000.0, 0.3, i));
    }
    assert!(drain_events(&mut events).await.is_empty());
    assert_eq!(
        handle
            .metrics
            .capture_frames
            .load(std::sync::atomic::Ordering::Relaxed),
        0
    );

    // Resumed feed behaves like a fresh session
    feed.resume().unwrap();
    assert_eq!(handle.state(), PipelineState::Running);
    for i in 0..80 {
        feed.deliver(&tone_frame(3000.0, 0.3, i));
    }
    let events = drain_events(&mut events).await;
    assert!(events.contains(&CaptionEvent::WhistleConfirmed));
    handle.shutdown().await;
}

#[tokio::test]
async fn lifecycle_transitions_are_observable() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        NullWhistleClassifier,
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();
    let states = handle.subscribe_state();

    assert_eq!(states.recv().unwrap(), PipelineState::Running);
    feed.pause().unwrap();
    assert_eq!(states.recv().unwrap(), PipelineState::Paused);
    feed.resume().unwrap();
    assert_eq!(states.recv().unwrap(), PipelineState::Running);

    // Pausing twice is an invalid transition
    feed.pause().unwrap();
    assert!(feed.pause().is_err());
    feed.resume().unwrap();
    states.recv().unwrap();
    states.recv().unwrap();

    handle.shutdown().await;
    assert_eq!(states.recv().unwrap(), PipelineState::Stopping);
    assert_eq!(states.recv().unwrap(), PipelineState::Stopped);
}

#[tokio::test]
async fn shutdown_clears_stage_activity() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        NullWhistleClassifier,
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();

    feed.deliver(&silence_frame());
    let metrics = handle.metrics.clone();
    assert!(metrics
        .stage_capture
        .load(std::sync::atomic::Ordering::Relaxed));

    handle.shutdown().await;
    assert!(!metrics
        .stage_capture
        .load(std::sync::atomic::Ordering::Relaxed));
    assert!(!metrics
        .stage_preprocess
        .load(std::sync::atomic::Ordering::Relaxed));
}

#[tokio::test]
async fn reset_discards_frames_queued_before_it() {
    let (mut feed, handle) = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 1,
        },
        confident_whistle(),
        NullSceneClassifier,
        NullTranscriptionSink,
    )
    .unwrap();
    let mut events = handle.subscribe_events();

    // Queue 59 tone frames, then reset before the worker runs: none of
    // them may survive into the new session's ring
    for i in 0..59 {
        feed.deliver(&tone_frame(3000.0, 0.3, i));
    }
    feed.reset();

    for i in 0..80 {
        feed.deliver(&tone_frame(3000.0, 0.3, i));
    }

    let events = drain_events(&mut events).await;
    let confirmations = events
        .iter()
        .filter(|e| **e == CaptionEvent::WhistleConfirmed)
        .count();
    assert_eq!(confirmations, 1, "events: {:?}", events);
    // Only post-reset frames reach the detector
    assert_eq!(
        handle
            .metrics
            .whistle_windows
            .load(std::sync::atomic::Ordering::Relaxed),
        80
    );
    handle.shutdown().await;
}

#[tokio::test]
async fn rejects_invalid_device_format() {
    let result = start(
        test_options(),
        DeviceFormat {
            sample_rate: RATE,
            channels: 0,
        },
        NullWhistleClassifier,
        NullSceneClassifier,
        NullTranscriptionSink,
    );
    assert!(result.is_err());

    let result = start(
        test_options(),
        DeviceFormat {
            sample_rate: 1_000,
            channels: 1,
        },
        NullWhistleClassifier,
        NullSceneClassifier,
        NullTranscriptionSink,
    );
    assert!(result.is_err());
}
