use super::app_log::{AppLog, AppLogRecord};
use super::geometry::{self, CORNER_MARGIN, WIDGET_SIZE};
use super::host::WidgetHost;
use super::persistence::PlacementStore;
use super::visibility::VisibilityState;
use crate::models::{Point, WidgetPosition};
use crate::tray_menu::{self, MenuEntry};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Keep the window alive and hide it instead.
    Hide,
    /// Let the host destroy the window (quit in progress).
    Allow,
}

/// Owns the widget window, its saved placement and the tray menu state.
pub struct WidgetShell<H: WidgetHost> {
    host: H,
    store: PlacementStore,
    log: Option<AppLog>,
    visibility: VisibilityState,
    intercept_close: bool,
    created: bool,
    // Last position the shell itself moved the window to. Hosts report
    // their own moves too, and those must not overwrite the saved position.
    placed: Option<Point>,
}

impl<H: WidgetHost> WidgetShell<H> {
    pub fn new(host: H, store: PlacementStore, log: Option<AppLog>) -> Self {
        Self {
            host,
            store,
            log,
            visibility: VisibilityState::Shown,
            intercept_close: true,
            created: false,
            placed: None,
        }
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility
    }

    /// Bottom-right of the primary work area. Falls back to the first display,
    /// then to the margin itself when the host reports no displays at all.
    pub fn default_corner(&self) -> Point {
        let area = self
            .host
            .primary_work_area()
            .or_else(|| self.host.displays().first().copied());
        match area {
            Some(area) => geometry::default_corner(area, WIDGET_SIZE, CORNER_MARGIN),
            None => Point {
                x: CORNER_MARGIN,
                y: CORNER_MARGIN,
            },
        }
    }

    pub fn initial_position(&self) -> Point {
        geometry::resolve_initial(
            self.store.get(),
            &self.host.displays(),
            WIDGET_SIZE,
            self.default_corner(),
        )
    }

    /// Creates the singleton window. A second call only shows the existing one.
    pub fn create_and_show(&mut self) -> Result<Point, String> {
        if self.created {
            self.show();
            return self.host.window_position().ok_or_else(|| "Widget window not found".to_string());
        }

        let saved = self.store.get();
        let position = self.initial_position();
        self.host.create_window(position, WIDGET_SIZE)?;
        self.created = true;
        self.placed = Some(position);
        self.info(
            "window",
            "created",
            json!({
                "x": position.x,
                "y": position.y,
                "restored": saved.point() == Some(position),
            }),
        );

        self.transition(VisibilityState::Shown);
        Ok(position)
    }

    /// The window finished moving; persist where it ended up unless it is
    /// still where the shell last put it.
    pub fn on_move_completed(&mut self) {
        let Some(position) = self.host.window_position() else {
            return;
        };
        if self.placed == Some(position) {
            return;
        }
        self.placed = None;
        self.persist(position);
    }

    pub fn on_close_requested(&mut self) -> CloseDecision {
        if !self.intercept_close {
            return CloseDecision::Allow;
        }
        self.on_move_completed();
        self.transition(VisibilityState::Hidden);
        CloseDecision::Hide
    }

    /// Hands `url` to the system browser. Returns whether the widget itself
    /// may navigate, which is never.
    pub fn on_external_navigation(&mut self, url: &str) -> bool {
        if let Err(e) = self.host.open_external(url) {
            self.warn("navigation", "open_external_failed", json!({ "url": url, "error": e }));
        }
        false
    }

    pub fn is_visible(&self) -> bool {
        self.host
            .is_window_visible()
            .unwrap_or(self.visibility.is_shown())
    }

    pub fn show(&mut self) {
        self.transition(VisibilityState::Shown);
    }

    pub fn hide(&mut self) {
        self.transition(VisibilityState::Hidden);
    }

    pub fn toggle(&mut self) {
        let current = VisibilityState::from_visible(self.is_visible());
        self.transition(current.toggled());
    }

    /// Moves the widget to the default corner and persists it explicitly,
    /// since a programmatic move may not report completion.
    pub fn reset_to_default_corner(&mut self) -> Point {
        let corner = self.default_corner();
        if let Err(e) = self.host.set_window_position(corner) {
            self.warn("window", "reset_failed", json!({ "error": e }));
        }
        self.placed = Some(corner);
        self.persist(corner);
        corner
    }

    pub fn quit(&mut self) {
        self.intercept_close = false;
        if let Some(log) = &self.log {
            let _ = log.info("app", "quit");
        }
        self.host.exit();
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        tray_menu::menu_entries(self.visibility)
    }

    pub fn rebuild_menu(&mut self) {
        let entries = self.menu_entries();
        if let Err(e) = self.host.set_tray_menu(&entries) {
            self.warn("tray", "menu_rebuild_failed", json!({ "error": e }));
        }
    }

    fn transition(&mut self, target: VisibilityState) {
        let result = match target {
            VisibilityState::Shown => self
                .host
                .show_window()
                .and_then(|_| self.host.pin_to_all_workspaces()),
            VisibilityState::Hidden => self.host.hide_window(),
        };
        if let Err(e) = result {
            self.warn("window", "visibility_change_failed", json!({ "target": target, "error": e }));
        }

        self.visibility = self
            .host
            .is_window_visible()
            .map(VisibilityState::from_visible)
            .unwrap_or(target);
        self.rebuild_menu();
    }

    fn persist(&mut self, position: Point) {
        if let Err(e) = self.store.set(WidgetPosition::from(position)) {
            self.warn(
                "placement",
                "persist_failed",
                json!({
                    "x": position.x,
                    "y": position.y,
                    "path": self.store.path().display().to_string(),
                    "error": e.to_string(),
                }),
            );
        }
    }

    fn info(&self, scope: &str, message: &str, data: serde_json::Value) {
        if let Some(log) = &self.log {
            let _ = log.append(AppLogRecord::now("info", scope, message, Some(data)));
        }
    }

    fn warn(&self, scope: &str, message: &str, data: serde_json::Value) {
        if let Some(log) = &self.log {
            let _ = log.warn(scope, message, Some(data));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app_log::LOG_FILE_NAME;
    use crate::core::persistence::PLACEMENT_FILE_NAME;
    use crate::models::{DisplayBounds, WidgetSize};
    use crate::tray_menu::{HIDE_LABEL, SHOW_LABEL};

    const FHD: DisplayBounds = DisplayBounds::new(0, 0, 1920, 1080);

    #[derive(Default)]
    struct FakeHost {
        displays: Vec<DisplayBounds>,
        work_area: Option<DisplayBounds>,
        window: Option<Point>,
        created: usize,
        visible: bool,
        pins: usize,
        menus: Vec<Vec<MenuEntry>>,
        opened: Vec<String>,
        exited: bool,
        fail_hide: bool,
    }

    impl FakeHost {
        fn single(display: DisplayBounds) -> Self {
            Self {
                displays: vec![display],
                work_area: Some(display),
                ..Self::default()
            }
        }

        fn last_toggle_label(&self) -> Option<&str> {
            self.menus.last().and_then(|m| match m.first() {
                Some(MenuEntry::Item { label, .. }) => Some(label.as_str()),
                _ => None,
            })
        }
    }

    impl WidgetHost for FakeHost {
        fn displays(&self) -> Vec<DisplayBounds> {
            self.displays.clone()
        }

        fn primary_work_area(&self) -> Option<DisplayBounds> {
            self.work_area
        }

        fn create_window(&mut self, position: Point, size: WidgetSize) -> Result<(), String> {
            assert_eq!(size, WIDGET_SIZE);
            self.created += 1;
            self.window = Some(position);
            self.visible = true;
            Ok(())
        }

        fn window_position(&self) -> Option<Point> {
            self.window
        }

        fn set_window_position(&mut self, position: Point) -> Result<(), String> {
            self.window = Some(position);
            Ok(())
        }

        fn show_window(&mut self) -> Result<(), String> {
            self.visible = true;
            Ok(())
        }

        fn hide_window(&mut self) -> Result<(), String> {
            if self.fail_hide {
                return Err("hide refused".to_string());
            }
            self.visible = false;
            Ok(())
        }

        fn is_window_visible(&self) -> Option<bool> {
            self.window.map(|_| self.visible)
        }

        fn pin_to_all_workspaces(&mut self) -> Result<(), String> {
            self.pins += 1;
            Ok(())
        }

        fn set_tray_menu(&mut self, entries: &[MenuEntry]) -> Result<(), String> {
            self.menus.push(entries.to_vec());
            Ok(())
        }

        fn open_external(&mut self, url: &str) -> Result<(), String> {
            self.opened.push(url.to_string());
            Ok(())
        }

        fn exit(&mut self) {
            self.exited = true;
        }
    }

    fn shell_with(
        host: FakeHost,
        saved: Option<WidgetPosition>,
    ) -> (tempfile::TempDir, WidgetShell<FakeHost>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PlacementStore::open(dir.path().join(PLACEMENT_FILE_NAME)).expect("open");
        if let Some(p) = saved {
            store.set(p).expect("seed");
        }
        let log = AppLog::new(dir.path().join("logs"));
        (dir, WidgetShell::new(host, store, Some(log)))
    }

    #[test]
    fn empty_store_starts_in_default_corner() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        let p = shell.create_and_show().expect("create");
        assert_eq!(p, Point { x: 1500, y: 360 });
        assert_eq!(shell.host.window, Some(p));
        assert_eq!(shell.visibility(), VisibilityState::Shown);
        assert_eq!(shell.host.last_toggle_label(), Some(HIDE_LABEL));
        assert_eq!(shell.host.pins, 1);
    }

    #[test]
    fn off_screen_saved_position_falls_back_to_corner() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), Some(WidgetPosition::at(5000, 5000)));
        assert_eq!(shell.create_and_show().expect("create"), Point { x: 1500, y: 360 });
    }

    #[test]
    fn valid_saved_position_is_restored() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), Some(WidgetPosition::at(100, 200)));
        assert_eq!(shell.create_and_show().expect("create"), Point { x: 100, y: 200 });
    }

    #[test]
    fn create_twice_keeps_a_single_window() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");
        shell.hide();
        shell.create_and_show().expect("again");
        assert_eq!(shell.host.created, 1);
        assert!(shell.is_visible());
    }

    #[test]
    fn toggle_twice_returns_to_shown_with_matching_labels() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");

        shell.toggle();
        assert_eq!(shell.visibility(), VisibilityState::Hidden);
        assert!(!shell.host.visible);
        assert_eq!(shell.host.last_toggle_label(), Some(SHOW_LABEL));

        shell.toggle();
        assert_eq!(shell.visibility(), VisibilityState::Shown);
        assert!(shell.host.visible);
        assert_eq!(shell.host.last_toggle_label(), Some(HIDE_LABEL));
        // Showing re-asserts the all-workspaces flag every time.
        assert_eq!(shell.host.pins, 2);
    }

    #[test]
    fn toggle_follows_the_real_window_state() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");
        shell.host.visible = false;

        shell.toggle();
        assert!(shell.host.visible);
        assert_eq!(shell.host.last_toggle_label(), Some(HIDE_LABEL));
    }

    #[test]
    fn failed_hide_keeps_label_truthful() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");
        shell.host.fail_hide = true;

        shell.hide();
        assert_eq!(shell.visibility(), VisibilityState::Shown);
        assert_eq!(shell.host.last_toggle_label(), Some(HIDE_LABEL));
    }

    #[test]
    fn move_completed_persists_window_position() {
        let (dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");
        shell.host.window = Some(Point { x: 42, y: 84 });

        shell.on_move_completed();
        assert_eq!(shell.store.get(), WidgetPosition::at(42, 84));

        let reopened = PlacementStore::open(dir.path().join(PLACEMENT_FILE_NAME)).expect("reopen");
        assert_eq!(reopened.get(), WidgetPosition::at(42, 84));
    }

    #[test]
    fn reset_moves_and_persists_the_corner() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), Some(WidgetPosition::at(10, 10)));
        shell.create_and_show().expect("create");

        let corner = shell.reset_to_default_corner();
        assert_eq!(corner, Point { x: 1500, y: 360 });
        assert_eq!(shell.host.window, Some(corner));
        assert_eq!(shell.store.get(), WidgetPosition::from(corner));
    }

    #[test]
    fn host_reported_moves_keep_the_saved_position() {
        let (dir, mut shell) = shell_with(FakeHost::single(FHD), Some(WidgetPosition::at(5000, 5000)));
        assert_eq!(shell.create_and_show().expect("create"), Point { x: 1500, y: 360 });

        // Creating and showing the window makes the host report a move.
        shell.on_move_completed();
        assert_eq!(shell.store.get(), WidgetPosition::at(5000, 5000));

        let reopened = PlacementStore::open(dir.path().join(PLACEMENT_FILE_NAME)).expect("reopen");
        assert_eq!(reopened.get(), WidgetPosition::at(5000, 5000));
    }

    #[test]
    fn dragging_back_after_a_move_is_persisted() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        let start = shell.create_and_show().expect("create");

        shell.host.window = Some(Point { x: 300, y: 300 });
        shell.on_move_completed();
        shell.host.window = Some(start);
        shell.on_move_completed();
        assert_eq!(shell.store.get(), WidgetPosition::from(start));
    }

    #[test]
    fn close_request_hides_instead_of_closing() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");
        shell.host.window = Some(Point { x: 640, y: 120 });

        assert_eq!(shell.on_close_requested(), CloseDecision::Hide);
        assert!(!shell.host.visible);
        assert_eq!(shell.host.last_toggle_label(), Some(SHOW_LABEL));
        assert_eq!(shell.store.get(), WidgetPosition::at(640, 120));
    }

    #[test]
    fn close_request_without_a_move_keeps_the_store_empty() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");

        assert_eq!(shell.on_close_requested(), CloseDecision::Hide);
        assert_eq!(shell.store.get(), WidgetPosition::default());
    }

    #[test]
    fn quit_detaches_close_interception() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");

        shell.quit();
        assert!(shell.host.exited);
        assert_eq!(shell.on_close_requested(), CloseDecision::Allow);
        assert!(shell.host.visible);
    }

    #[test]
    fn external_navigation_goes_to_browser() {
        let (_dir, mut shell) = shell_with(FakeHost::single(FHD), None);
        shell.create_and_show().expect("create");

        assert!(!shell.on_external_navigation("https://www.notion.so/"));
        assert_eq!(shell.host.opened, ["https://www.notion.so/"]);
    }

    #[test]
    fn persistence_failure_does_not_block_moves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(PLACEMENT_FILE_NAME);
        std::fs::create_dir_all(path.join("blocker")).expect("mkdir");
        let log = AppLog::new(dir.path().join("logs"));
        let mut shell = WidgetShell::new(FakeHost::single(FHD), PlacementStore::fresh(path), Some(log));

        shell.create_and_show().expect("create");
        let corner = shell.reset_to_default_corner();
        assert_eq!(shell.host.window, Some(corner));

        let written = std::fs::read_to_string(dir.path().join("logs").join(LOG_FILE_NAME)).expect("log");
        assert_eq!(written.lines().filter(|l| l.contains("persist_failed")).count(), 1);
    }

    #[test]
    fn default_corner_without_displays_uses_margin() {
        let (_dir, shell) = shell_with(FakeHost::default(), None);
        assert_eq!(shell.default_corner(), Point { x: CORNER_MARGIN, y: CORNER_MARGIN });
    }

    #[test]
    fn default_corner_uses_first_display_without_work_area() {
        let host = FakeHost {
            displays: vec![FHD],
            ..FakeHost::default()
        };
        let (_dir, shell) = shell_with(host, None);
        assert_eq!(shell.default_corner(), Point { x: 1500, y: 360 });
    }
}
