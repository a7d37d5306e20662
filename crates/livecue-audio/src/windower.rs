use std::collections::VecDeque;

/// Accumulates a sample stream into exact, non-overlapping windows.
///
/// Each ingest may complete zero, one, or several windows; leftover samples
/// stay buffered for the next call. Ordering is strictly FIFO.
pub struct FrameWindower {
    buffer: VecDeque<f32>,
    window_size: usize,
}

impl FrameWindower {
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "window size must be non-zero");
        Self {
            buffer: VecDeque::with_capacity(window_size * 2),
            window_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Samples currently buffered (always `< window_size` after draining).
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn ingest(&mut self, samples: &[f32]) {
        self.buffer.extend(samples.iter().copied());
    }

    /// Pop the oldest complete window, if one is available.
    pub fn next_window(&mut self) -> Option<Vec<f32>> {
        if self.buffer.len() < self.window_size {
            return None;
        }
        Some(self.buffer.drain(..self.window_size).collect())
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Sliding retention ring holding the most recent `capacity` sub-buffers.
///
/// Appending past capacity drops the oldest sub-buffer (true ring). The
/// whistle path uses `tail()` to realize multiple sliding-window durations
/// over the same history without copying the whole ring.
pub struct RetentionRing {
    chunks: VecDeque<Vec<f32>>,
    capacity: usize,
}

impl RetentionRing {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            chunks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, chunk: Vec<f32>) {
        if self.chunks.len() == self.capacity {
            self.chunks.pop_front();
        }
        self.chunks.push_back(chunk);
    }

    /// Number of retained sub-buffers.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenate the most recent `count` sub-buffers, oldest first.
    /// Returns `None` when fewer than `count` are held.
    pub fn tail(&self, count: usize) -> Option<Vec<f32>> {
        if count == 0 || self.chunks.len() < count {
            return None;
        }
        let start = self.chunks.len() - count;
        let total: usize = self.chunks.iter().skip(start).map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for chunk in self.chunks.iter().skip(start) {
            out.extend_from_slice(chunk);
        }
        Some(out)
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}
