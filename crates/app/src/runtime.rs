use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use livecue_audio::{
    AudioFrame, BandEnergyConfig, BandEnergyExtractor, Preprocessor, PreprocessorConfig,
};
use livecue_foundation::{AppError, AudioError, PipelineState, StateManager};
use livecue_scene::{SceneClassifier, SceneCue, SceneCueAdapter, SceneCueConfig};
use livecue_telemetry::{FpsTracker, PipelineMetrics, PipelineStage};
use livecue_whistle::{WhistleClassifier, WhistleConfig, WhistleDetector, WhistleOutcome};

use crate::stt::TranscriptionSink;

/// Derived event published to overlay consumers. Fire-and-forget; no
/// history is kept beyond the detector's own cooldown timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionEvent {
    WhistleConfirmed,
    Scene(SceneCue),
}

/// Format reported by the capture collaborator.
#[derive(Debug, Clone, Copy)]
pub struct DeviceFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub preprocessor: PreprocessorConfig,
    pub band: BandEnergyConfig,
    pub whistle: WhistleConfig,
    pub scene: SceneCueConfig,
    /// Publish level/bass every Nth delivered buffer
    pub level_update_interval: u64,
    /// Bounded depth of each classifier worker queue
    pub worker_queue_depth: usize,
    /// Clear filter/ring state when a paused feed is resumed
    pub reset_on_restart: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preprocessor: PreprocessorConfig::default(),
            band: BandEnergyConfig::default(),
            whistle: WhistleConfig::default(),
            scene: SceneCueConfig::default(),
            level_update_interval: 10,
            worker_queue_depth: 64,
            reset_on_restart: true,
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<(), AppError> {
        self.whistle.validate().map_err(AppError::Config)?;
        self.scene.validate().map_err(AppError::Config)?;
        if self.level_update_interval == 0 {
            return Err(AppError::Config("level_update_interval must be > 0".into()));
        }
        if self.worker_queue_depth == 0 {
            return Err(AppError::Config("worker_queue_depth must be > 0".into()));
        }
        Ok(())
    }
}

struct WorkItem {
    samples: Vec<f32>,
    sample_rate: u32,
    delivered_at: Instant,
    /// Session epoch at delivery time; workers discard items from an
    /// earlier epoch so a reset cannot be outrun by queued frames.
    epoch: u64,
}

/// The capture-side half of the pipeline.
///
/// `deliver` runs on the capture callback context: preprocessing and the
/// bass envelope run synchronously (O(1) per sample), classifier work is
/// handed to the serial workers with a non-blocking `try_send`, and the
/// call returns immediately.
pub struct CaptureFeed<T: TranscriptionSink> {
    preprocessor: Preprocessor,
    band: BandEnergyExtractor,
    stt: T,
    state: StateManager,
    whistle_tx: mpsc::Sender<WorkItem>,
    scene_tx: mpsc::Sender<WorkItem>,
    bass_tx: watch::Sender<f32>,
    epoch_tx: watch::Sender<u64>,
    epoch: u64,
    metrics: Arc<PipelineMetrics>,
    fps: FpsTracker,
    level_update_interval: u64,
    reset_on_restart: bool,
    buffers_delivered: u64,
}

impl<T: TranscriptionSink> CaptureFeed<T> {
    pub fn deliver(&mut self, frame: &AudioFrame) {
        if self.state.current() != PipelineState::Running {
            return;
        }
        if frame.channels == 0 || frame.samples.is_empty() {
            tracing::warn!(channels = frame.channels, "Undeliverable frame skipped");
            return;
        }

        self.buffers_delivered += 1;
        self.metrics.increment_capture_frames();
        self.metrics.mark_stage_active(PipelineStage::Capture);
        if let Some(fps) = self.fps.tick() {
            self.metrics.update_capture_fps(fps);
        }

        let mono = self.preprocessor.process(frame);
        self.metrics.mark_stage_active(PipelineStage::Preprocess);

        // Transcription gets the cleaned mono stream as-is
        self.stt.feed(&mono);

        // Bass envelope works from the raw frame so panning information
        // survives; published on a cadence, latest value wins
        if self.buffers_delivered % self.level_update_interval == 0 {
            self.band.update(frame);
            let level = self.band.level();
            self.bass_tx.send_replace(level);
            self.metrics.update_bass_level(level);
            self.metrics.update_audio_level(&mono.samples);
        }

        let delivered_at = frame.timestamp;
        let item = || WorkItem {
            samples: mono.samples.clone(),
            sample_rate: mono.sample_rate,
            delivered_at,
            epoch: self.epoch,
        };

        if self.whistle_tx.try_send(item()).is_err() {
            self.metrics
                .whistle_queue_drops
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        if self.scene_tx.try_send(item()).is_err() {
            self.metrics
                .scene_queue_drops
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    }

    /// A paused feed drops deliveries without touching filter state.
    pub fn pause(&mut self) -> Result<(), AppError> {
        self.state.transition(PipelineState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), AppError> {
        self.state.transition(PipelineState::Running)?;
        if self.reset_on_restart {
            self.reset();
        }
        Ok(())
    }

    /// Clear all filter, envelope, and worker-side ring state so no stale
    /// spectral history bleeds into a new session.
    ///
    /// The epoch bump travels over a watch channel, so the reset reaches
    /// the workers even when their frame queues are full; frames already
    /// queued under the old epoch are discarded when dequeued.
    pub fn reset(&mut self) {
        self.preprocessor.reset();
        self.band.reset();
        self.buffers_delivered = 0;
        self.epoch += 1;
        self.epoch_tx.send_replace(self.epoch);
    }
}

/// Handle to the running pipeline: subscriptions plus teardown.
pub struct PipelineHandle {
    pub metrics: Arc<PipelineMetrics>,
    state: StateManager,
    event_tx: broadcast::Sender<CaptionEvent>,
    bass_rx: watch::Receiver<f32>,
    whistle_handle: JoinHandle<()>,
    scene_handle: JoinHandle<()>,
}

impl PipelineHandle {
    /// Subscribe to whistle confirmations and scene cues.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CaptionEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribe to lifecycle transitions (Running, Paused, ...).
    pub fn subscribe_state(&self) -> crossbeam_channel::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Coalescing bass level in [0,1]; the latest value always wins.
    pub fn bass_level(&self) -> watch::Receiver<f32> {
        self.bass_rx.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state.current()
    }

    /// Tear down the workers, dropping any queued windows.
    pub async fn shutdown(self) {
        info!("Shutting down livecue pipeline");
        let _ = self.state.transition(PipelineState::Stopping);

        self.whistle_handle.abort();
        self.scene_handle.abort();
        let _ = self.whistle_handle.await;
        let _ = self.scene_handle.await;

        self.metrics.decay_stages();
        let _ = self.state.transition(PipelineState::Stopped);
    }
}

/// Wire capture -> preprocessor -> {transcription, bass, classifier
/// workers} and hand back the feed plus the consumer-side handle.
///
/// Must be called within a tokio runtime; the two classifier workers are
/// spawned as serial tasks, one per classifier family.
pub fn start<W, S, T>(
    options: PipelineOptions,
    format: DeviceFormat,
    whistle_classifier: W,
    scene_classifier: S,
    stt: T,
) -> Result<(CaptureFeed<T>, PipelineHandle), AppError>
where
    W: WhistleClassifier + 'static,
    S: SceneClassifier + 'static,
    T: TranscriptionSink,
{
    options.validate()?;
    if format.channels == 0 {
        return Err(AudioError::UnsupportedChannelLayout { channels: 0 }.into());
    }
    if !(8_000..=384_000).contains(&format.sample_rate) {
        return Err(AudioError::SampleRateOutOfRange {
            rate: format.sample_rate,
        }
        .into());
    }

    let metrics = Arc::new(PipelineMetrics::default());
    let state = StateManager::new();

    let (event_tx, _) = broadcast::channel::<CaptionEvent>(32);
    let (bass_tx, bass_rx) = watch::channel(0.0f32);
    let (epoch_tx, epoch_rx) = watch::channel(0u64);
    let (whistle_tx, whistle_rx) = mpsc::channel::<WorkItem>(options.worker_queue_depth);
    let (scene_tx, scene_rx) = mpsc::channel::<WorkItem>(options.worker_queue_depth);

    let detector = WhistleDetector::new(whistle_classifier, options.whistle.clone());
    let adapter = SceneCueAdapter::new(scene_classifier, options.scene.clone());

    let whistle_handle = tokio::spawn(whistle_worker(
        whistle_rx,
        epoch_rx.clone(),
        detector,
        event_tx.clone(),
        metrics.clone(),
    ));
    let scene_handle = tokio::spawn(scene_worker(
        scene_rx,
        epoch_rx,
        adapter,
        event_tx.clone(),
        metrics.clone(),
    ));

    let feed = CaptureFeed {
        preprocessor: Preprocessor::new(format.sample_rate, options.preprocessor),
        band: BandEnergyExtractor::new(format.sample_rate, options.band),
        stt,
        state: state.clone(),
        whistle_tx,
        scene_tx,
        bass_tx,
        epoch_tx,
        epoch: 0,
        metrics: metrics.clone(),
        fps: FpsTracker::new(),
        level_update_interval: options.level_update_interval,
        reset_on_restart: options.reset_on_restart,
        buffers_delivered: 0,
    };

    state.transition(PipelineState::Running)?;
    info!(
        sample_rate = format.sample_rate,
        channels = format.channels,
        "Pipeline started"
    );

    Ok((
        feed,
        PipelineHandle {
            metrics,
            state,
            event_tx,
            bass_rx,
            whistle_handle,
            scene_handle,
        },
    ))
}

async fn whistle_worker<C: WhistleClassifier>(
    mut rx: mpsc::Receiver<WorkItem>,
    epoch_rx: watch::Receiver<u64>,
    mut detector: WhistleDetector<C>,
    event_tx: broadcast::Sender<CaptionEvent>,
    metrics: Arc<PipelineMetrics>,
) {
    info!("Whistle worker started");
    let mut epoch = *epoch_rx.borrow();
    while let Some(item) = rx.recv().await {
        let current = *epoch_rx.borrow();
        if current != epoch {
            detector.reset();
            epoch = current;
        }
        if item.epoch != epoch {
            // Queued before a reset; stale history must not leak in
            continue;
        }

        let outcome = detector.process(&item.samples, item.sample_rate, item.delivered_at);
        let snap = detector.snapshot();
        metrics.record_whistle_window(
            snap.last_stage1_probability,
            snap.last_stage2_probability,
            snap.last_dominant_hz,
        );
        metrics.mark_stage_active(PipelineStage::Whistle);

        if outcome == WhistleOutcome::Confirmed {
            metrics.record_whistle_confirmed();
            // Send fails only when no one is subscribed yet
            let _ = event_tx.send(CaptionEvent::WhistleConfirmed);
        }
    }
    info!("Whistle worker stopped");
}

async fn scene_worker<C: SceneClassifier>(
    mut rx: mpsc::Receiver<WorkItem>,
    epoch_rx: watch::Receiver<u64>,
    mut adapter: SceneCueAdapter<C>,
    event_tx: broadcast::Sender<CaptionEvent>,
    metrics: Arc<PipelineMetrics>,
) {
    info!("Scene worker started");
    let mut epoch = *epoch_rx.borrow();
    while let Some(item) = rx.recv().await {
        let current = *epoch_rx.borrow();
        if current != epoch {
            adapter.reset();
            epoch = current;
        }
        if item.epoch != epoch {
            continue;
        }

        let before = adapter.windows_classified();
        let cues = adapter.ingest(&item.samples, item.sample_rate);
        let completed = adapter.windows_classified() - before;
        if completed > 0 {
            metrics
                .scene_windows
                .fetch_add(completed, std::sync::atomic::Ordering::Relaxed);
        }
        metrics.mark_stage_active(PipelineStage::Scene);
        for cue in cues {
            match cue {
                SceneCue::Cheer => metrics.record_cheer_cue(),
                SceneCue::Boo => metrics.record_boo_cue(),
            }
            let _ = event_tx.send(CaptionEvent::Scene(cue));
        }
    }
    info!("Scene worker stopped");
}
