use super::region::Region;
use super::RegionKind;

/// Boolean pixel mask for one region at a given frame size, row-major.
///
/// Rasterization truncates fractional coordinates and includes both edge
/// pixels, so a rectangle spanning x 10..=20 covers eleven columns and a
/// zero-size region still covers one pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl RegionMask {
    fn empty(width: usize, height: usize) -> Self {
        RegionMask {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Rasterizes `region` onto a `width` x `height` pixel grid. Lines set
    /// their sampled points; use [`line_points`] when order matters.
    pub fn for_region(region: &Region, width: usize, height: usize) -> Self {
        let mut mask = RegionMask::empty(width, height);
        if width == 0 || height == 0 {
            return mask;
        }
        match region.kind {
            RegionKind::Rectangle => mask.fill_rectangle(region),
            RegionKind::Ellipse => mask.fill_ellipse(region),
            RegionKind::Line => {
                for (x, y) in line_points(region, width, height) {
                    mask.bits[y * width + x] = true;
                }
            }
        }
        mask
    }

    fn fill_rectangle(&mut self, region: &Region) {
        let (x1, y1, x2, y2) = region.bounds();
        let col_start = (x1.max(0.0) as usize).min(self.width - 1);
        let col_end = (x2.max(0.0) as usize).min(self.width - 1);
        let row_start = (y1.max(0.0) as usize).min(self.height - 1);
        let row_end = (y2.max(0.0) as usize).min(self.height - 1);
        for y in row_start..=row_end {
            for x in col_start..=col_end {
                self.bits[y * self.width + x] = true;
            }
        }
    }

    fn fill_ellipse(&mut self, region: &Region) {
        let (x1, y1, x2, y2) = region.bounds();
        let (h, k) = region.center();
        // Semi-axes never collapse below one pixel, so degenerate drags
        // still produce a measurable region.
        let a = ((x2 - x1) / 2.0).max(1.0);
        let b = ((y2 - y1) / 2.0).max(1.0);
        let col_start = ((h - a).max(0.0) as usize).min(self.width - 1);
        let col_end = ((h + a).max(0.0) as usize).min(self.width - 1);
        let row_start = ((k - b).max(0.0) as usize).min(self.height - 1);
        let row_end = ((k + b).max(0.0) as usize).min(self.height - 1);
        for y in row_start..=row_end {
            for x in col_start..=col_end {
                let nx = (x as f64 - h) / a;
                let ny = (y as f64 - k) / b;
                if nx * nx + ny * ny <= 1.0 {
                    self.bits[y * self.width + x] = true;
                }
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|set| **set).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|set| *set)
    }

    /// Flat row-major indices of the set pixels.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, set)| set.then_some(i))
    }
}

/// Ordered pixel coordinates along a line region, start to end, end point
/// excluded. The line is walked at ten samples per pixel of extent and
/// consecutive duplicates are collapsed, so the result traces the line in
/// its drawn direction without repeats. A degenerate line yields its start
/// pixel only.
pub fn line_points(region: &Region, width: usize, height: usize) -> Vec<(usize, usize)> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let (x1, y1, x2, y2) = region.coords();
    let clamp = |x: f64, limit: usize| (x.max(0.0) as usize).min(limit - 1);
    let num = ((x2 - x1).abs().max((y2 - y1).abs()) * 10.0) as usize;
    if num == 0 {
        return vec![(clamp(x1, width), clamp(y1, height))];
    }
    let mut points: Vec<(usize, usize)> = Vec::new();
    for i in 0..num {
        let t = i as f64 / num as f64;
        let point = (
            clamp(x1 + t * (x2 - x1), width),
            clamp(y1 + t * (y2 - y1), height),
        );
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    points
}
