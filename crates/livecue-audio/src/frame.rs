use std::time::Instant;

/// Memory layout of a multi-channel sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLayout {
    /// `[L0, R0, L1, R1, ...]`
    Interleaved,
    /// `[L0, L1, ..., R0, R1, ...]`
    Planar,
}

/// One capture callback's worth of 32-bit float PCM.
///
/// The frame owns its buffer exclusively; downstream consumers copy what
/// they need and never retain references past the delivery call.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    pub layout: SampleLayout,
    pub timestamp: Instant,
}

impl AudioFrame {
    pub fn mono(samples: Vec<f32>, sample_rate: u32, timestamp: Instant) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
            layout: SampleLayout::Interleaved,
            timestamp,
        }
    }

    /// Number of sample frames (per-channel sample count).
    pub fn frame_len(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }

    /// Sample `i` of channel `ch`, independent of layout.
    ///
    /// Callers are expected to stay within `frame_len()` / `channels`.
    #[inline]
    pub fn sample(&self, ch: usize, i: usize) -> f32 {
        match self.layout {
            SampleLayout::Interleaved => self.samples[i * self.channels as usize + ch],
            SampleLayout::Planar => self.samples[ch * self.frame_len() + i],
        }
    }
}
