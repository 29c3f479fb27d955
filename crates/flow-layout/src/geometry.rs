use serde::{Deserialize, Serialize};

/// 2D point in canvas coordinates, y growing downwards
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box occupied by a placed node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct NodeBox {
    pub layer_idx: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    /// Middle of the left edge, where incoming links attach
    pub fn left_anchor(&self) -> Point {
        Point::new(self.x, self.y + (self.height / 2.0).floor())
    }

    /// Middle of the right edge, where outgoing links leave
    pub fn right_anchor(&self) -> Point {
        Point::new(self.x + self.width, self.y + (self.height / 2.0).floor())
    }
}
