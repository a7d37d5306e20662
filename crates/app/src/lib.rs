pub mod config;
pub mod runtime;
pub mod stt;

pub use config::Settings;
pub use runtime::{start, CaptionEvent, CaptureFeed, DeviceFormat, PipelineHandle, PipelineOptions};
pub use stt::{NullTranscriptionSink, TranscriptionSink};
