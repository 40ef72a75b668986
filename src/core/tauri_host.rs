use super::host::WidgetHost;
use super::shell::WidgetShell;
use crate::models::{DisplayBounds, Point, WidgetSize};
use crate::tray_menu::{self, MenuEntry};
use parking_lot::Mutex;
use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::{
    AppHandle, Manager, Monitor, PhysicalPosition, Position, Url, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder,
};
use tauri_plugin_opener::OpenerExt;

pub const MAIN_WINDOW: &str = "main";
const WINDOW_TITLE: &str = "JustPlan";
const CONTENT_PAGE: &str = "index.html";

const DRAG_STYLE_ID: &str = "justplan-drag-region";
const DRAG_REGION_CSS: &str = "
  .header { -webkit-app-region: drag; app-region: drag; }
  button, .loading, #loading, .header-buttons { -webkit-app-region: no-drag; app-region: no-drag; }
";

/// Script run after every page load. Reuses the style element so running it
/// again never stacks rules.
pub fn drag_region_script() -> String {
    let id = serde_json::Value::from(DRAG_STYLE_ID);
    let css = serde_json::Value::from(DRAG_REGION_CSS);
    format!(
        "(function () {{
  var style = document.getElementById({id});
  if (!style) {{
    style = document.createElement('style');
    style.id = {id};
    document.head.appendChild(style);
  }}
  style.textContent = {css};
  document.querySelectorAll('.header').forEach(function (el) {{
    el.setAttribute('data-tauri-drag-region', '');
  }});
}})();"
    )
}

/// Whether `url` belongs to the bundled content rather than the web.
pub fn is_internal_url(url: &Url) -> bool {
    match url.scheme() {
        "tauri" | "asset" | "about" | "data" | "blob" => true,
        "http" | "https" => url.host_str() == Some("tauri.localhost"),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Load it inside the widget.
    Load,
    /// Deny it and hand the URL to the system browser.
    OpenInBrowser,
    /// Deny it without opening anything.
    Drop,
}

/// In-place navigation stays in the widget only for bundled content.
pub fn navigation_action(url: &Url) -> LinkAction {
    if is_internal_url(url) {
        LinkAction::Load
    } else {
        LinkAction::OpenInBrowser
    }
}

/// `target=_blank` and `window.open()` never get a second widget window.
pub fn new_window_action(url: &Url) -> LinkAction {
    if is_internal_url(url) {
        LinkAction::Drop
    } else {
        LinkAction::OpenInBrowser
    }
}

/// Routes `url` to the browser through the shell. Deferred because webview
/// callbacks may fire while the shell is busy.
fn open_in_browser(app: &AppHandle, url: &Url) {
    let handle = app.clone();
    let url = url.to_string();
    let _ = app.run_on_main_thread(move || {
        with_shell(&handle, |shell| shell.on_external_navigation(&url));
    });
}

fn monitor_bounds(monitor: &Monitor) -> DisplayBounds {
    let pos = monitor.position();
    let size = monitor.size();
    physical_bounds(pos.x, pos.y, size.width, size.height, monitor.scale_factor())
}

fn monitor_work_area(monitor: &Monitor) -> DisplayBounds {
    let area = monitor.work_area();
    physical_bounds(
        area.position.x,
        area.position.y,
        area.size.width,
        area.size.height,
        monitor.scale_factor(),
    )
}

fn physical_bounds(x: i32, y: i32, width: u32, height: u32, scale_factor: f64) -> DisplayBounds {
    let clamp = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
    DisplayBounds::new(x, y, clamp(width), clamp(height)).with_scale(scale_factor)
}

pub struct TauriHost {
    app: AppHandle,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn window(&self) -> Option<WebviewWindow> {
        self.app.get_webview_window(MAIN_WINDOW)
    }

    fn require_window(&self) -> Result<WebviewWindow, String> {
        self.window().ok_or_else(|| "Widget window not found".to_string())
    }
}

impl WidgetHost for TauriHost {
    fn displays(&self) -> Vec<DisplayBounds> {
        self.app
            .available_monitors()
            .map(|monitors| monitors.iter().map(monitor_bounds).collect())
            .unwrap_or_default()
    }

    fn primary_work_area(&self) -> Option<DisplayBounds> {
        let monitor = self.app.primary_monitor().ok().flatten()?;
        Some(monitor_work_area(&monitor))
    }

    fn create_window(&mut self, position: Point, size: WidgetSize) -> Result<(), String> {
        let nav_app = self.app.clone();
        let popup_app = self.app.clone();
        // Created hidden: the builder only takes logical coordinates, so the
        // physical position is applied before the first show.
        let window = WebviewWindowBuilder::new(&self.app, MAIN_WINDOW, WebviewUrl::App(CONTENT_PAGE.into()))
            .title(WINDOW_TITLE)
            .inner_size(size.width as f64, size.height as f64)
            .visible(false)
            .resizable(false)
            .minimizable(false)
            .maximizable(false)
            .closable(false)
            .decorations(false)
            .transparent(true)
            .shadow(true)
            .always_on_top(false)
            .skip_taskbar(true)
            .visible_on_all_workspaces(true)
            .on_page_load(|window, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) {
                    let _ = window.eval(&drag_region_script());
                }
            })
            .on_navigation(move |url| match navigation_action(url) {
                LinkAction::Load => true,
                LinkAction::OpenInBrowser => {
                    open_in_browser(&nav_app, url);
                    false
                }
                LinkAction::Drop => false,
            })
            .on_new_window(move |url, _features| {
                if new_window_action(&url) == LinkAction::OpenInBrowser {
                    open_in_browser(&popup_app, &url);
                }
                NewWindowResponse::Deny
            })
            .build()
            .map_err(|e| format!("Failed to create widget window: {}", e))?;

        window
            .set_position(Position::Physical(PhysicalPosition::new(position.x, position.y)))
            .map_err(|e| format!("Failed to place widget window: {}", e))
    }

    fn window_position(&self) -> Option<Point> {
        let pos = self.window()?.outer_position().ok()?;
        Some(Point { x: pos.x, y: pos.y })
    }

    fn set_window_position(&mut self, position: Point) -> Result<(), String> {
        self.require_window()?
            .set_position(Position::Physical(PhysicalPosition::new(position.x, position.y)))
            .map_err(|e| format!("Failed to move window: {}", e))
    }

    fn show_window(&mut self) -> Result<(), String> {
        self.require_window()?
            .show()
            .map_err(|e| format!("Failed to show window: {}", e))
    }

    fn hide_window(&mut self) -> Result<(), String> {
        self.require_window()?
            .hide()
            .map_err(|e| format!("Failed to hide window: {}", e))
    }

    fn is_window_visible(&self) -> Option<bool> {
        self.window()?.is_visible().ok()
    }

    fn pin_to_all_workspaces(&mut self) -> Result<(), String> {
        self.require_window()?
            .set_visible_on_all_workspaces(true)
            .map_err(|e| format!("Failed to pin window to all workspaces: {}", e))
    }

    fn set_tray_menu(&mut self, entries: &[MenuEntry]) -> Result<(), String> {
        tray_menu::set_tray_menu(&self.app, entries)
            .map_err(|e| format!("Failed to rebuild tray menu: {}", e))
    }

    fn open_external(&mut self, url: &str) -> Result<(), String> {
        self.app
            .opener()
            .open_url(url, None::<&str>)
            .map_err(|e| format!("Failed to open {}: {}", url, e))
    }

    fn exit(&mut self) {
        self.app.exit(0);
    }
}

/// Managed state holding the one widget shell of the process.
pub struct ShellState(Mutex<WidgetShell<TauriHost>>);

impl ShellState {
    pub fn new(shell: WidgetShell<TauriHost>) -> Self {
        Self(Mutex::new(shell))
    }
}

/// Runs `f` against the widget shell. Must be called on the main thread;
/// returns `None` before the shell is installed.
pub fn with_shell<R>(app: &AppHandle, f: impl FnOnce(&mut WidgetShell<TauriHost>) -> R) -> Option<R> {
    let state = app.try_state::<ShellState>()?;
    let mut shell = state.0.lock();
    Some(f(&mut shell))
}
