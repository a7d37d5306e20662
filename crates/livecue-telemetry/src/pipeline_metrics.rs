use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared metrics for cross-thread pipeline monitoring.
///
/// Writers are the delivery path and the classifier workers; readers are
/// UI/status consumers. Everything is relaxed atomics: these are
/// observability values, not synchronization points.
#[derive(Clone)]
pub struct PipelineMetrics {
    // Audio level monitoring
    pub current_rms: Arc<AtomicU64>,    // RMS * 1e6 for precision
    pub audio_level_db: Arc<AtomicI16>, // Current level in dB * 10
    pub overall_level: Arc<AtomicU64>,  // Normalized [0,1] level * 1000
    pub bass_level: Arc<AtomicU64>,     // Bass envelope [0,1] * 1000

    // Pipeline stage tracking
    pub stage_capture: Arc<AtomicBool>,
    pub stage_preprocess: Arc<AtomicBool>,
    pub stage_whistle: Arc<AtomicBool>,
    pub stage_scene: Arc<AtomicBool>,

    // Frame rate tracking
    pub capture_fps: Arc<AtomicU64>, // Frames per second * 10

    // Event counters
    pub capture_frames: Arc<AtomicU64>,
    pub whistle_windows: Arc<AtomicU64>,
    pub scene_windows: Arc<AtomicU64>,
    pub whistle_confirmed: Arc<AtomicU64>,
    pub cheer_cues: Arc<AtomicU64>,
    pub boo_cues: Arc<AtomicU64>,

    // Worker queue health (frames dropped because a queue was full)
    pub whistle_queue_drops: Arc<AtomicU64>,
    pub scene_queue_drops: Arc<AtomicU64>,

    // Whistle detector observability (read-only snapshots)
    pub whistle_stage1_milli: Arc<AtomicU64>, // stage-1 probability * 1000
    pub whistle_stage2_milli: Arc<AtomicU64>, // stage-2 probability * 1000
    pub whistle_dominant_hz: Arc<AtomicU64>,

    pub last_event_time: Arc<RwLock<Option<Instant>>>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            current_rms: Arc::new(AtomicU64::new(0)),
            audio_level_db: Arc::new(AtomicI16::new(-900)),
            overall_level: Arc::new(AtomicU64::new(0)),
            bass_level: Arc::new(AtomicU64::new(0)),

            stage_capture: Arc::new(AtomicBool::new(false)),
            stage_preprocess: Arc::new(AtomicBool::new(false)),
            stage_whistle: Arc::new(AtomicBool::new(false)),
            stage_scene: Arc::new(AtomicBool::new(false)),

            capture_fps: Arc::new(AtomicU64::new(0)),

            capture_frames: Arc::new(AtomicU64::new(0)),
            whistle_windows: Arc::new(AtomicU64::new(0)),
            scene_windows: Arc::new(AtomicU64::new(0)),
            whistle_confirmed: Arc::new(AtomicU64::new(0)),
            cheer_cues: Arc::new(AtomicU64::new(0)),
            boo_cues: Arc::new(AtomicU64::new(0)),

            whistle_queue_drops: Arc::new(AtomicU64::new(0)),
            scene_queue_drops: Arc::new(AtomicU64::new(0)),

            whistle_stage1_milli: Arc::new(AtomicU64::new(0)),
            whistle_stage2_milli: Arc::new(AtomicU64::new(0)),
            whistle_dominant_hz: Arc::new(AtomicU64::new(0)),

            last_event_time: Arc::new(RwLock::new(None)),
        }
    }
}

impl PipelineMetrics {
    pub fn update_audio_level(&self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let sum: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
        let rms = (sum / samples.len() as f64).sqrt();
        self.current_rms
            .store((rms * 1e6) as u64, Ordering::Relaxed);

        let db = 20.0 * rms.max(1e-6).log10();
        self.audio_level_db
            .store((db * 10.0) as i16, Ordering::Relaxed);

        // Normalized meter level, -60 dBFS..0 dBFS mapped to 0..1
        let level = ((db + 60.0) / 60.0).clamp(0.0, 1.0);
        self.overall_level
            .store((level * 1000.0) as u64, Ordering::Relaxed);
    }

    pub fn update_bass_level(&self, level: f32) {
        let clamped = level.clamp(0.0, 1.0);
        self.bass_level
            .store((clamped * 1000.0) as u64, Ordering::Relaxed);
    }

    pub fn bass_level(&self) -> f32 {
        self.bass_level.load(Ordering::Relaxed) as f32 / 1000.0
    }

    pub fn update_capture_fps(&self, fps: f64) {
        self.capture_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn increment_capture_frames(&self) {
        self.capture_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_whistle_window(&self, stage1: f32, stage2: f32, dominant_hz: f32) {
        self.whistle_windows.fetch_add(1, Ordering::Relaxed);
        self.whistle_stage1_milli
            .store((stage1.clamp(0.0, 1.0) * 1000.0) as u64, Ordering::Relaxed);
        self.whistle_stage2_milli
            .store((stage2.clamp(0.0, 1.0) * 1000.0) as u64, Ordering::Relaxed);
        self.whistle_dominant_hz
            .store(dominant_hz.max(0.0) as u64, Ordering::Relaxed);
    }

    pub fn record_whistle_confirmed(&self) {
        self.whistle_confirmed.fetch_add(1, Ordering::Relaxed);
        *self.last_event_time.write() = Some(Instant::now());
    }

    pub fn record_cheer_cue(&self) {
        self.cheer_cues.fetch_add(1, Ordering::Relaxed);
        *self.last_event_time.write() = Some(Instant::now());
    }

    pub fn record_boo_cue(&self) {
        self.boo_cues.fetch_add(1, Ordering::Relaxed);
        *self.last_event_time.write() = Some(Instant::now());
    }

    pub fn mark_stage_active(&self, stage: PipelineStage) {
        match stage {
            PipelineStage::Capture => self.stage_capture.store(true, Ordering::Relaxed),
            PipelineStage::Preprocess => self.stage_preprocess.store(true, Ordering::Relaxed),
            PipelineStage::Whistle => self.stage_whistle.store(true, Ordering::Relaxed),
            PipelineStage::Scene => self.stage_scene.store(true, Ordering::Relaxed),
        }
    }

    pub fn decay_stages(&self) {
        self.stage_capture.store(false, Ordering::Relaxed);
        self.stage_preprocess.store(false, Ordering::Relaxed);
        self.stage_whistle.store(false, Ordering::Relaxed);
        self.stage_scene.store(false, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PipelineStage {
    Capture,
    Preprocess,
    Whistle,
    Scene,
}

#[derive(Debug)]
pub struct FpsTracker {
    last_update: Instant,
    frame_count: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed >= Duration::from_secs(1) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.frame_count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}
