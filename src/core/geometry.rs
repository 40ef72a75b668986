use crate::models::{DisplayBounds, Point, WidgetPosition, WidgetSize};

pub const WIDGET_SIZE: WidgetSize = WidgetSize {
    width: 400,
    height: 700,
};

/// Inset from the work area's bottom-right corner for the default placement.
pub const CORNER_MARGIN: i32 = 20;

/// Whether a widget of logical `size` placed at physical `pos` lies entirely
/// on one display. The size is scaled by each display's own factor.
///
/// A display smaller than the widget yields an empty range and never matches.
pub fn is_on_screen(pos: WidgetPosition, displays: &[DisplayBounds], size: WidgetSize) -> bool {
    let Some(Point { x, y }) = pos.point() else {
        return false;
    };

    displays.iter().any(|d| {
        // i64 so extreme coordinates cannot overflow the bound computation.
        let (x, y) = (i64::from(x), i64::from(y));
        let max_x = i64::from(d.x) + i64::from(d.width) - d.to_physical(size.width);
        let max_y = i64::from(d.y) + i64::from(d.height) - d.to_physical(size.height);
        x >= i64::from(d.x) && y >= i64::from(d.y) && x <= max_x && y <= max_y
    })
}

/// Bottom-right corner of `work_area`, inset by `margin` logical pixels on
/// both axes.
pub fn default_corner(work_area: DisplayBounds, size: WidgetSize, margin: i32) -> Point {
    let x = i64::from(work_area.x) + i64::from(work_area.width)
        - work_area.to_physical(size.width + margin);
    let y = i64::from(work_area.y) + i64::from(work_area.height)
        - work_area.to_physical(size.height + margin);
    Point {
        x: saturate(x),
        y: saturate(y),
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// The saved position when it is fully visible, otherwise `fallback`.
pub fn resolve_initial(
    saved: WidgetPosition,
    displays: &[DisplayBounds],
    size: WidgetSize,
    fallback: Point,
) -> Point {
    match saved.point() {
        Some(p) if is_on_screen(saved, displays, size) => p,
        _ => fallback,
    }
}
