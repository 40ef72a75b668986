use crate::core::{tauri_host::with_shell, visibility::VisibilityState};
use tauri::{
    image::Image,
    menu::{MenuBuilder, MenuItemBuilder},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Wry,
};

pub const TRAY_ID: &str = "main";
const TRAY_TOOLTIP: &str = "JustPlan";
// 16x16 monochrome; rendered as a template image on macOS.
const TRAY_ICON: &[u8] = include_bytes!("../icons/tray.png");

pub const MENU_TOGGLE: &str = "toggle_widget";
pub const MENU_RESET: &str = "reset_position";
pub const MENU_QUIT: &str = "quit";

pub const HIDE_LABEL: &str = "위젯 숨기기";
pub const SHOW_LABEL: &str = "위젯 보이기";
const RESET_LABEL: &str = "오른쪽 하단으로 초기화";
const QUIT_LABEL: &str = "JustPlan 종료";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item { id: &'static str, label: String },
    Separator,
}

fn item(id: &'static str, label: &str) -> MenuEntry {
    MenuEntry::Item {
        id,
        label: label.to_string(),
    }
}

pub fn toggle_label(visibility: VisibilityState) -> &'static str {
    if visibility.is_shown() {
        HIDE_LABEL
    } else {
        SHOW_LABEL
    }
}

pub fn menu_entries(visibility: VisibilityState) -> Vec<MenuEntry> {
    vec![
        item(MENU_TOGGLE, toggle_label(visibility)),
        MenuEntry::Separator,
        item(MENU_RESET, RESET_LABEL),
        MenuEntry::Separator,
        item(MENU_QUIT, QUIT_LABEL),
    ]
}

fn build_tray_menu(app: &AppHandle<Wry>, entries: &[MenuEntry]) -> tauri::Result<tauri::menu::Menu<Wry>> {
    let mut builder = MenuBuilder::new(app);
    for entry in entries {
        builder = match entry {
            MenuEntry::Item { id, label } => {
                let item = MenuItemBuilder::with_id(*id, label).build(app)?;
                builder.item(&item)
            }
            MenuEntry::Separator => builder.separator(),
        };
    }
    builder.build()
}

pub fn set_tray_menu(app: &AppHandle<Wry>, entries: &[MenuEntry]) -> tauri::Result<()> {
    let Some(tray) = app.tray_by_id(TRAY_ID) else {
        return Ok(());
    };
    let menu = build_tray_menu(app, entries)?;
    tray.set_menu(Some(menu))?;
    Ok(())
}

/// Creates the tray icon. The menu is attached by the widget shell, which
/// rebuilds it on every visibility change.
pub fn create_tray(app: &AppHandle<Wry>) -> tauri::Result<()> {
    let icon = Image::from_bytes(TRAY_ICON)?;
    TrayIconBuilder::with_id(TRAY_ID)
        .icon(icon)
        .icon_as_template(true)
        .tooltip(TRAY_TOOLTIP)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                with_shell(tray.app_handle(), |shell| shell.toggle());
            }
        })
        .build(app)?;
    Ok(())
}

pub fn handle_menu_event(app: &AppHandle<Wry>, event: tauri::menu::MenuEvent) {
    match event.id().as_ref() {
        MENU_TOGGLE => {
            with_shell(app, |shell| shell.toggle());
        }
        MENU_RESET => {
            with_shell(app, |shell| shell.reset_to_default_corner());
        }
        MENU_QUIT => {
            if with_shell(app, |shell| shell.quit()).is_none() {
                app.exit(0);
            }
        }
        _ => {}
    }
}
