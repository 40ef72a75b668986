//! Widget window commands. These are synchronous, so Tauri runs them on the
//! main thread alongside tray and window events.

use crate::core::tauri_host::with_shell;
use crate::core::visibility::VisibilityState;
use crate::models::WidgetPosition;
use tauri::AppHandle;

fn shell_not_ready() -> String {
    "Widget shell not ready".to_string()
}

#[tauri::command]
pub fn show_widget(app_handle: AppHandle) -> Result<(), String> {
    with_shell(&app_handle, |shell| shell.show()).ok_or_else(shell_not_ready)
}

#[tauri::command]
pub fn hide_widget(app_handle: AppHandle) -> Result<(), String> {
    with_shell(&app_handle, |shell| shell.hide()).ok_or_else(shell_not_ready)
}

#[tauri::command]
pub fn toggle_widget(app_handle: AppHandle) -> Result<VisibilityState, String> {
    with_shell(&app_handle, |shell| {
        shell.toggle();
        shell.visibility()
    })
    .ok_or_else(shell_not_ready)
}

#[tauri::command]
pub fn reset_widget_position(app_handle: AppHandle) -> Result<WidgetPosition, String> {
    with_shell(&app_handle, |shell| WidgetPosition::from(shell.reset_to_default_corner()))
        .ok_or_else(shell_not_ready)
}

#[tauri::command]
pub fn quit_app(app_handle: AppHandle) -> Result<(), String> {
    if with_shell(&app_handle, |shell| shell.quit()).is_none() {
        app_handle.exit(0);
    }
    Ok(())
}
