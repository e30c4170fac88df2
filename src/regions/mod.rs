pub mod canvas;
pub mod mask;
pub mod region;

use std::error::Error;
use std::fmt;

/// Pointer distance (in canvas pixels) inside which a handle counts as grabbed.
pub const EDGE_PAD: f64 = 8.0;

/// Stroke width of an unfocused region outline.
pub const DEFAULT_LINEWIDTH: f64 = 1.0;

/// Stroke width of the focused region outline.
pub const FOCUSED_LINEWIDTH: f64 = 2.0;

/// Smallest width/height at which a region is considered usable by an operator.
pub const MIN_REGION_SIZE: f64 = 10.0;

/// Overlay colors doubling as region identifiers. Regions take the first
/// unused entry; the palette is sized for the default capacity with room to
/// spare.
pub const REGION_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("lime", (50, 205, 50)),
    ("orange", (255, 165, 0)),
    ("violet", (198, 128, 255)),
    ("coral", (255, 127, 80)),
    ("yellow", (255, 255, 0)),
    ("turquoise", (64, 224, 208)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Rectangle,
    Ellipse,
    Line,
}

impl RegionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Rectangle => "rectangle",
            RegionKind::Ellipse => "ellipse",
            RegionKind::Line => "line",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "rectangle" => Some(RegionKind::Rectangle),
            "ellipse" => Some(RegionKind::Ellipse),
            "line" => Some(RegionKind::Line),
            _ => None,
        }
    }

    /// Area kinds reduce to a scalar per frame; lines produce a profile.
    pub fn is_area(&self) -> bool {
        !matches!(self, RegionKind::Line)
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resize grips on a region outline. Corner and edge handles apply to area
/// shapes, the endpoint handles to lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    LineStart,
    LineEnd,
}

impl Handle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::TopLeft => "top_left",
            Handle::Top => "top",
            Handle::TopRight => "top_right",
            Handle::Right => "right",
            Handle::BottomRight => "bottom_right",
            Handle::Bottom => "bottom",
            Handle::BottomLeft => "bottom_left",
            Handle::Left => "left",
            Handle::LineStart => "line_start",
            Handle::LineEnd => "line_end",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "top_left" => Some(Handle::TopLeft),
            "top" => Some(Handle::Top),
            "top_right" => Some(Handle::TopRight),
            "right" => Some(Handle::Right),
            "bottom_right" => Some(Handle::BottomRight),
            "bottom" => Some(Handle::Bottom),
            "bottom_left" => Some(Handle::BottomLeft),
            "left" => Some(Handle::Left),
            "line_start" => Some(Handle::LineStart),
            "line_end" => Some(Handle::LineEnd),
            _ => None,
        }
    }
}

/// What a pointer position grabs on a region: a resize handle or the body
/// (a whole-shape move).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grab {
    Handle(Handle),
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// The canvas already holds the configured maximum number of regions.
    CapacityExceeded(usize),
    /// A move would place the region outside the canvas bounds.
    OutOfBounds,
    /// No region with the given id exists on the canvas.
    UnknownRegion(String),
    /// The handle does not apply to the region's kind.
    InvalidHandle,
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionError::CapacityExceeded(limit) => {
                write!(f, "maximum of {} regions of interest allowed", limit)
            }
            RegionError::OutOfBounds => {
                write!(f, "region geometry would leave the canvas bounds")
            }
            RegionError::UnknownRegion(id) => write!(f, "no region with id '{}'", id),
            RegionError::InvalidHandle => {
                write!(f, "handle does not apply to this region kind")
            }
        }
    }
}

impl Error for RegionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in [RegionKind::Rectangle, RegionKind::Ellipse, RegionKind::Line] {
            assert_eq!(RegionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RegionKind::parse("triangle"), None);
    }

    #[test]
    fn handle_names_round_trip() {
        let handles = [
            Handle::TopLeft,
            Handle::Top,
            Handle::TopRight,
            Handle::Right,
            Handle::BottomRight,
            Handle::Bottom,
            Handle::BottomLeft,
            Handle::Left,
            Handle::LineStart,
            Handle::LineEnd,
        ];
        for handle in handles {
            assert_eq!(Handle::parse(handle.as_str()), Some(handle));
        }
    }

    #[test]
    fn capacity_message_names_the_limit() {
        let message = RegionError::CapacityExceeded(6).to_string();
        assert!(message.contains("6"));
        assert!(message.contains("regions of interest"));
    }

    #[test]
    fn palette_has_distinct_names() {
        let mut names: Vec<&str> = REGION_COLORS.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), REGION_COLORS.len());
    }
}
