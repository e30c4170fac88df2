/// Position-vs-time image accumulated from line-region profiles.
///
/// Every appended profile becomes the newest column, reversed so the line's
/// start point renders at the bottom of the image. If a profile arrives with
/// a different length (the line was resized), the image is discarded and
/// reseeded from that profile alone.
#[derive(Debug, Clone, PartialEq)]
pub struct LineScanImage {
    height: usize,
    columns: Vec<Vec<f64>>,
}

impl LineScanImage {
    pub fn seed(profile: &[f64]) -> Self {
        LineScanImage {
            height: profile.len(),
            columns: vec![reversed(profile)],
        }
    }

    /// Appends a column. Returns false when the profile length changed and
    /// the image was reseeded instead.
    pub fn push(&mut self, profile: &[f64]) -> bool {
        if profile.len() != self.height {
            *self = LineScanImage::seed(profile);
            return false;
        }
        self.columns.push(reversed(profile));
        true
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(|column| column.as_slice())
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }
}

fn reversed(profile: &[f64]) -> Vec<f64> {
    profile.iter().rev().copied().collect()
}
