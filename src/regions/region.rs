use super::{Grab, Handle, RegionError, RegionKind, DEFAULT_LINEWIDTH, EDGE_PAD, FOCUSED_LINEWIDTH};

/// One measurement region on the canvas.
///
/// Geometry is held as two points in f64 canvas coordinates: opposite corners
/// for area shapes, the endpoints for lines. Coordinates stay in float form
/// so repeated viewport rescales do not accumulate rounding error. Corner
/// order may invert transiently while a drag is in progress; `normalize`
/// restores x1 <= x2, y1 <= y2 for area shapes once the interaction ends.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub kind: RegionKind,
    pub color: (u8, u8, u8),
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    focused: bool,
}

impl Region {
    pub fn new(id: String, kind: RegionKind, color: (u8, u8, u8), start: (f64, f64)) -> Self {
        Region {
            id,
            kind,
            color,
            x1: start.0,
            y1: start.1,
            x2: start.0,
            y2: start.1,
            focused: false,
        }
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Outline stroke width; the focused region draws wider.
    pub fn linewidth(&self) -> f64 {
        if self.focused {
            FOCUSED_LINEWIDTH
        } else {
            DEFAULT_LINEWIDTH
        }
    }

    /// Raw coordinates in storage order (unsorted; lines keep direction).
    pub fn coords(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Normalized bounding coordinates (x1 <= x2, y1 <= y2).
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Restores corner order after a drag. Lines keep their endpoint order,
    /// since the profile is sampled from start to end.
    pub fn normalize(&mut self) {
        if self.kind.is_area() {
            let (x1, y1, x2, y2) = self.bounds();
            self.x1 = x1;
            self.y1 = y1;
            self.x2 = x2;
            self.y2 = y2;
        }
    }

    /// Moves one handle to `point`, clamped into the canvas. Corner order is
    /// not re-sorted here; callers normalize on interaction end.
    pub fn resize(
        &mut self,
        handle: Handle,
        point: (f64, f64),
        canvas: (f64, f64),
    ) -> Result<(), RegionError> {
        let (px, py) = self.clamp_to_canvas(point, canvas);
        match (self.kind, handle) {
            (RegionKind::Line, Handle::LineStart) => {
                self.x1 = px;
                self.y1 = py;
            }
            (RegionKind::Line, Handle::LineEnd) => {
                self.x2 = px;
                self.y2 = py;
            }
            (RegionKind::Line, _) => return Err(RegionError::InvalidHandle),
            (_, Handle::TopLeft) => {
                self.x1 = px;
                self.y1 = py;
            }
            (_, Handle::Top) => self.y1 = py,
            (_, Handle::TopRight) => {
                self.x2 = px;
                self.y1 = py;
            }
            (_, Handle::Right) => self.x2 = px,
            (_, Handle::BottomRight) => {
                self.x2 = px;
                self.y2 = py;
            }
            (_, Handle::Bottom) => self.y2 = py,
            (_, Handle::BottomLeft) => {
                self.x1 = px;
                self.y2 = py;
            }
            (_, Handle::Left) => self.x1 = px,
            (_, Handle::LineStart) | (_, Handle::LineEnd) => {
                return Err(RegionError::InvalidHandle)
            }
        }
        Ok(())
    }

    /// Translates the region so its normalized top-left lands on `top_left`.
    /// Rejected without effect if the result would leave the canvas.
    pub fn move_to(&mut self, top_left: (f64, f64), canvas: (f64, f64)) -> Result<(), RegionError> {
        let (bx1, by1, bx2, by2) = self.bounds();
        let (w, h) = (bx2 - bx1, by2 - by1);
        let lw = self.linewidth();
        let (nx, ny) = top_left;
        if nx < 0.0 || ny < 0.0 || nx + w > canvas.0 - lw || ny + h > canvas.1 - lw {
            return Err(RegionError::OutOfBounds);
        }
        let (dx, dy) = (nx - bx1, ny - by1);
        self.x1 += dx;
        self.y1 += dy;
        self.x2 += dx;
        self.y2 += dy;
        Ok(())
    }

    /// Scales the geometry when the canvas changes size, independently per
    /// axis. Old dimensions are clamped to 1 to avoid dividing by zero.
    pub fn rescale(&mut self, old: (f64, f64), new: (f64, f64)) {
        let w_scale = new.0 / old.0.max(1.0);
        let h_scale = new.1 / old.1.max(1.0);
        self.x1 *= w_scale;
        self.x2 *= w_scale;
        self.y1 *= h_scale;
        self.y2 *= h_scale;
    }

    pub fn contains(&self, point: (f64, f64)) -> bool {
        let (x1, y1, x2, y2) = self.bounds();
        point.0 >= x1 && point.0 <= x2 && point.1 >= y1 && point.1 <= y2
    }

    /// What `point` would grab on this region, with its distance for
    /// cross-region tie breaks. Handles win within EDGE_PAD; the body is the
    /// fallback grab (inside the bounds for area shapes, near the segment for
    /// lines).
    pub fn grab_at(&self, point: (f64, f64)) -> Option<(Grab, f64)> {
        match self.kind {
            RegionKind::Line => self.line_grab_at(point),
            _ => self.area_grab_at(point),
        }
    }

    fn area_grab_at(&self, point: (f64, f64)) -> Option<(Grab, f64)> {
        let (x1, y1, x2, y2) = self.bounds();
        let corners = [
            (Handle::TopLeft, (x1, y1)),
            (Handle::TopRight, (x2, y1)),
            (Handle::BottomRight, (x2, y2)),
            (Handle::BottomLeft, (x1, y2)),
        ];
        let edges = [
            (Handle::Top, (x1, y1), (x2, y1)),
            (Handle::Right, (x2, y1), (x2, y2)),
            (Handle::Bottom, (x1, y2), (x2, y2)),
            (Handle::Left, (x1, y1), (x1, y2)),
        ];

        // Corners outrank edges regardless of distance; edges are only
        // considered when no corner is in reach.
        let mut best: Option<(Grab, f64)> = None;
        for (handle, corner) in corners {
            let dist = point_distance(point, corner);
            if dist < EDGE_PAD && best.as_ref().map_or(true, |(_, d)| dist < *d) {
                best = Some((Grab::Handle(handle), dist));
            }
        }
        if best.is_none() {
            for (handle, a, b) in edges {
                let dist = point_segment_distance(point, a, b);
                if dist < EDGE_PAD && best.as_ref().map_or(true, |(_, d)| dist < *d) {
                    best = Some((Grab::Handle(handle), dist));
                }
            }
        }
        if best.is_none() && self.contains(point) {
            // Inside but away from every handle: grab the whole shape.
            let edge_dist = edges
                .iter()
                .map(|(_, a, b)| point_segment_distance(point, *a, *b))
                .fold(f64::INFINITY, f64::min);
            best = Some((Grab::Body, edge_dist));
        }
        best
    }

    fn line_grab_at(&self, point: (f64, f64)) -> Option<(Grab, f64)> {
        let p1 = (self.x1, self.y1);
        let p2 = (self.x2, self.y2);
        let d1 = point_distance(point, p1);
        let d2 = point_distance(point, p2);

        let mut best: Option<(Grab, f64)> = None;
        if d1 < EDGE_PAD {
            best = Some((Grab::Handle(Handle::LineStart), d1));
        }
        if d2 < EDGE_PAD && best.as_ref().map_or(true, |(_, d)| d2 < *d) {
            best = Some((Grab::Handle(Handle::LineEnd), d2));
        }
        if best.is_none() {
            let seg = point_segment_distance(point, p1, p2);
            if seg < EDGE_PAD {
                best = Some((Grab::Body, seg));
            }
        }
        best
    }

    fn clamp_to_canvas(&self, point: (f64, f64), canvas: (f64, f64)) -> (f64, f64) {
        let lw = self.linewidth();
        let max_x = (canvas.0 - lw).max(0.0);
        let max_y = (canvas.1 - lw).max(0.0);
        (point.0.max(0.0).min(max_x), point.1.max(0.0).min(max_y))
    }
}

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Distance from `p` to the segment `a`-`b`, with the projection clamped to
/// the segment span.
fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point_distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    point_distance(p, (a.0 + t * dx, a.1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Region {
        let mut region = Region::new(
            "cyan".to_string(),
            RegionKind::Rectangle,
            (0, 255, 255),
            (x1, y1),
        );
        region
            .resize(Handle::BottomRight, (x2, y2), (640.0, 480.0))
            .unwrap();
        region
    }

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Region {
        let mut region = Region::new(
            "magenta".to_string(),
            RegionKind::Line,
            (255, 0, 255),
            (x1, y1),
        );
        region
            .resize(Handle::LineEnd, (x2, y2), (640.0, 480.0))
            .unwrap();
        region
    }

    #[test]
    fn normalize_swaps_inverted_corners() {
        let mut region = rect(100.0, 100.0, 100.0, 100.0);
        region
            .resize(Handle::BottomRight, (40.0, 30.0), (640.0, 480.0))
            .unwrap();
        // Drag inverted both axes; raw coords stay inverted until normalize.
        assert_eq!(region.coords(), (100.0, 100.0, 40.0, 30.0));
        region.normalize();
        assert_eq!(region.coords(), (40.0, 30.0, 100.0, 100.0));
    }

    #[test]
    fn normalize_keeps_line_direction() {
        let mut region = line(200.0, 50.0, 20.0, 150.0);
        region.normalize();
        assert_eq!(region.coords(), (200.0, 50.0, 20.0, 150.0));
    }

    #[test]
    fn resize_clamps_to_canvas() {
        let mut region = rect(10.0, 10.0, 50.0, 50.0);
        region
            .resize(Handle::BottomRight, (900.0, -20.0), (640.0, 480.0))
            .unwrap();
        assert_eq!(region.coords(), (10.0, 10.0, 639.0, 0.0));
    }

    #[test]
    fn resize_rejects_area_handles_on_lines() {
        let mut region = line(0.0, 0.0, 50.0, 50.0);
        let result = region.resize(Handle::TopLeft, (5.0, 5.0), (640.0, 480.0));
        assert_eq!(result, Err(RegionError::InvalidHandle));
    }

    #[test]
    fn move_rejects_out_of_bounds() {
        let mut region = rect(10.0, 10.0, 60.0, 60.0);
        let before = region.coords();
        assert_eq!(
            region.move_to((620.0, 10.0), (640.0, 480.0)),
            Err(RegionError::OutOfBounds)
        );
        assert_eq!(region.coords(), before);
    }

    #[test]
    fn move_translates_in_bounds() {
        let mut region = rect(10.0, 10.0, 60.0, 60.0);
        region.move_to((100.0, 200.0), (640.0, 480.0)).unwrap();
        assert_eq!(region.bounds(), (100.0, 200.0, 150.0, 250.0));
    }

    #[test]
    fn rescale_identity_leaves_coords_unchanged() {
        let mut region = rect(10.5, 20.25, 333.75, 400.125);
        let before = region.coords();
        region.rescale((640.0, 480.0), (640.0, 480.0));
        let after = region.coords();
        assert_relative_eq!(before.0, after.0);
        assert_relative_eq!(before.1, after.1);
        assert_relative_eq!(before.2, after.2);
        assert_relative_eq!(before.3, after.3);
    }

    #[test]
    fn rescale_scales_each_axis() {
        let mut region = rect(10.0, 10.0, 20.0, 20.0);
        region.rescale((100.0, 100.0), (200.0, 50.0));
        assert_eq!(region.coords(), (20.0, 5.0, 40.0, 10.0));
    }

    #[test]
    fn rescale_survives_repeated_round_trips() {
        let mut region = rect(13.0, 17.0, 101.0, 93.0);
        for _ in 0..1000 {
            region.rescale((640.0, 480.0), (977.0, 311.0));
            region.rescale((977.0, 311.0), (640.0, 480.0));
        }
        let (x1, y1, x2, y2) = region.coords();
        assert_relative_eq!(x1, 13.0, epsilon = 1e-6);
        assert_relative_eq!(y1, 17.0, epsilon = 1e-6);
        assert_relative_eq!(x2, 101.0, epsilon = 1e-6);
        assert_relative_eq!(y2, 93.0, epsilon = 1e-6);
    }

    #[test]
    fn grab_prefers_corner_over_edge() {
        let region = rect(100.0, 100.0, 200.0, 200.0);
        let (grab, _) = region.grab_at((101.0, 101.0)).unwrap();
        assert_eq!(grab, Grab::Handle(Handle::TopLeft));
    }

    #[test]
    fn grab_finds_edge_midway() {
        let region = rect(100.0, 100.0, 200.0, 200.0);
        let (grab, _) = region.grab_at((150.0, 98.0)).unwrap();
        assert_eq!(grab, Grab::Handle(Handle::Top));
    }

    #[test]
    fn grab_body_inside_away_from_handles() {
        let region = rect(100.0, 100.0, 200.0, 200.0);
        let (grab, _) = region.grab_at((150.0, 150.0)).unwrap();
        assert_eq!(grab, Grab::Body);
    }

    #[test]
    fn grab_nothing_far_away() {
        let region = rect(100.0, 100.0, 200.0, 200.0);
        assert!(region.grab_at((400.0, 400.0)).is_none());
    }

    #[test]
    fn line_grab_endpoints_and_body() {
        let region = line(0.0, 0.0, 100.0, 0.0);
        let (start, _) = region.grab_at((2.0, 1.0)).unwrap();
        assert_eq!(start, Grab::Handle(Handle::LineStart));
        let (end, _) = region.grab_at((99.0, -1.0)).unwrap();
        assert_eq!(end, Grab::Handle(Handle::LineEnd));
        let (body, _) = region.grab_at((50.0, 3.0)).unwrap();
        assert_eq!(body, Grab::Body);
        assert!(region.grab_at((50.0, 30.0)).is_none());
    }
}
