/// One connected display, or a display's work area, in physical pixels.
///
/// `scale_factor` converts the widget's logical size into this display's
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub scale_factor: f64,
}

impl DisplayBounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub const fn with_scale(self, scale_factor: f64) -> Self {
        Self {
            scale_factor,
            ..self
        }
    }

    /// Physical length of `logical` pixels on this display. A bogus scale
    /// factor counts as 1.
    pub fn to_physical(&self, logical: i32) -> i64 {
        let sf = if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        (f64::from(logical) * sf).round() as i64
    }
}
