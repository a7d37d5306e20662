use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use clap::Parser;
use tracing::info;

use livecue_app::{start, CaptionEvent, DeviceFormat, NullTranscriptionSink, Settings};
use livecue_audio::AudioFrame;
use livecue_foundation::ClassifierError;
use livecue_whistle::WhistleLogits;

#[derive(Parser)]
#[command(name = "livecue")]
#[command(about = "Derived caption cues from a live audio feed")]
struct Cli {
    /// Config file path (defaults to config/default.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Synthetic tone frequency for the demo feed (Hz)
    #[arg(long, default_value = "3000")]
    tone_hz: f32,
}

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();
}

/// Demo entry point: drives the pipeline with a synthetic capture feed and
/// heuristic stand-in classifiers, logging every derived event.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_path(path),
        None => Settings::new(),
    }
    .map_err(|e| anyhow!("{}", e))?;

    info!("Starting livecue pipeline demo");

    let format = DeviceFormat {
        sample_rate: 48_000,
        channels: 2,
    };

    // Stand-in classifiers: energy-based heuristics so the demo produces
    // events without a model on disk.
    let whistle_stub = |window: &[f32]| -> Result<WhistleLogits, ClassifierError> {
        let energy: f32 = window.iter().map(|s| s * s).sum::<f32>() / window.len().max(1) as f32;
        let logit = if energy > 1e-4 { 4.0 } else { -4.0 };
        Ok(WhistleLogits {
            non_whistle: -logit,
            whistle: logit,
        })
    };
    let scene_stub = livecue_scene::NullSceneClassifier;

    let (mut feed, handle) = start(
        settings.options(),
        format,
        whistle_stub,
        scene_stub,
        NullTranscriptionSink,
    )?;

    let mut events = handle.subscribe_events();
    let mut bass = handle.bass_level();
    let event_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(CaptionEvent::WhistleConfirmed) => info!("Event: whistle"),
                    Ok(CaptionEvent::Scene(cue)) => info!(?cue, "Event: scene cue"),
                    Err(_) => break,
                },
                changed = bass.changed() => match changed {
                    Ok(()) => tracing::debug!(level = *bass.borrow(), "Bass level"),
                    Err(_) => break,
                },
            }
        }
    });

    // Feed 10 ms stereo buffers of the demo tone
    let frame_len = (format.sample_rate / 100) as usize;
    let total_frames = cli.duration * 100;
    let mut phase = 0.0f32;
    let step = 2.0 * std::f32::consts::PI * cli.tone_hz / format.sample_rate as f32;
    for _ in 0..total_frames {
        let mut samples = Vec::with_capacity(frame_len * 2);
        for _ in 0..frame_len {
            let s = phase.sin() * 0.3;
            phase += step;
            samples.push(s);
            samples.push(s);
        }
        let frame = AudioFrame {
            samples,
            sample_rate: format.sample_rate,
            channels: 2,
            layout: livecue_audio::SampleLayout::Interleaved,
            timestamp: Instant::now(),
        };
        feed.deliver(&frame);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    info!(
        whistles = handle
            .metrics
            .whistle_confirmed
            .load(std::sync::atomic::Ordering::Relaxed),
        "Demo feed finished"
    );

    handle.shutdown().await;
    event_task.abort();
    Ok(())
}
