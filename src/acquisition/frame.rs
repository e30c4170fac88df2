/// One grayscale raster in row-major f64 intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Frame {
    /// Builds a frame from a flat row-major buffer. Returns `None` when the
    /// buffer length does not match the dimensions or a dimension is zero.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return None;
        }
        Some(Frame {
            width,
            height,
            data,
        })
    }

    /// For internal producers whose buffer size is correct by construction.
    pub(crate) fn from_raw(width: usize, height: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Frame {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// A frame as delivered by a source. Transmission can truncate a frame; the
/// flag lets callers count or skip those.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCapture {
    pub frame: Frame,
    pub complete: bool,
}

impl FrameCapture {
    pub fn complete(frame: Frame) -> Self {
        FrameCapture {
            frame,
            complete: true,
        }
    }
}
