use serde::{Deserialize, Serialize};

/// Top-left corner of the widget window in physical pixels.
///
/// `None` in either field means there is no usable saved position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WidgetPosition {
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl WidgetPosition {
    pub const fn at(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    pub fn point(&self) -> Option<Point> {
        Some(Point {
            x: self.x?,
            y: self.y?,
        })
    }
}

impl From<Point> for WidgetPosition {
    fn from(p: Point) -> Self {
        Self::at(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSize {
    pub width: i32,
    pub height: i32,
}
