use crate::models::{DisplayBounds, Point, WidgetSize};
use crate::tray_menu::MenuEntry;

/// Windowing primitives the widget shell needs from its host.
///
/// All calls happen on the UI thread. Positions and display rectangles are
/// physical pixels; the widget size is logical.
pub trait WidgetHost {
    fn displays(&self) -> Vec<DisplayBounds>;

    /// Usable area of the primary display, excluding menu bars and taskbars.
    fn primary_work_area(&self) -> Option<DisplayBounds>;

    /// Creates the frameless, fixed-size widget window at `position` and
    /// loads the local content.
    fn create_window(&mut self, position: Point, size: WidgetSize) -> Result<(), String>;

    fn window_position(&self) -> Option<Point>;
    fn set_window_position(&mut self, position: Point) -> Result<(), String>;

    fn show_window(&mut self) -> Result<(), String>;
    fn hide_window(&mut self) -> Result<(), String>;
    fn is_window_visible(&self) -> Option<bool>;

    /// Keeps the window on every workspace without covering full-screen apps.
    fn pin_to_all_workspaces(&mut self) -> Result<(), String>;

    fn set_tray_menu(&mut self, entries: &[MenuEntry]) -> Result<(), String>;
    fn open_external(&mut self, url: &str) -> Result<(), String>;
    fn exit(&mut self);
}
