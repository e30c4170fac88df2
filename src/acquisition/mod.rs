// Frame intake: the pull contract a camera-like source implements, plus the
// bounded handoff queue and a synthetic stand-in used by the demo and tests.

pub mod frame;
pub mod queue;
pub mod synthetic;

use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::time::Instant;

use self::frame::FrameCapture;

const FPS_WINDOW: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The source could not be constructed or started.
    CameraUnavailable(String),
    /// The source dropped out mid-run.
    Disconnected(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::CameraUnavailable(detail) => {
                write!(f, "camera unavailable: {}", detail)
            }
            SourceError::Disconnected(detail) => {
                write!(f, "frame source disconnected: {}", detail)
            }
        }
    }
}

impl Error for SourceError {}

/// Rolling acquisition statistics. Informational only; nothing downstream
/// keys off these numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceStats {
    pub real_fps: f64,
    pub incomplete_count: u64,
}

/// Pull interface onto an image stream.
///
/// `grab_frame` returning `Ok(None)` means no frame is ready and the caller
/// should skip its tick. Incomplete captures are delivered with the flag set
/// so the caller can decide whether to process them.
pub trait FrameSource: Send {
    fn start(&mut self) -> Result<(), SourceError>;
    fn stop(&mut self);
    fn grab_frame(&mut self) -> Result<Option<FrameCapture>, SourceError>;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stats(&self) -> SourceStats;
}

/// Frame-rate and completeness bookkeeping shared by source implementations.
/// Holds the most recent frame timestamps in a window of sixty.
#[derive(Debug, Default)]
pub struct SourceDiagnostics {
    timestamps: VecDeque<Instant>,
    incomplete: u64,
}

impl SourceDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, complete: bool) {
        self.record_at(Instant::now(), complete);
    }

    fn record_at(&mut self, at: Instant, complete: bool) {
        self.timestamps.push_back(at);
        while self.timestamps.len() > FPS_WINDOW {
            self.timestamps.pop_front();
        }
        if !complete {
            self.incomplete += 1;
        }
    }

    pub fn stats(&self) -> SourceStats {
        let real_fps = match (self.timestamps.front(), self.timestamps.back()) {
            (Some(first), Some(last)) if self.timestamps.len() >= 2 => {
                let elapsed = last.duration_since(*first).as_secs_f64();
                if elapsed > 0.0 {
                    (self.timestamps.len() - 1) as f64 / elapsed
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };
        SourceStats {
            real_fps,
            incomplete_count: self.incomplete,
        }
    }

    pub fn reset(&mut self) {
        self.timestamps.clear();
        self.incomplete = 0;
    }
}
