mod commands;
mod core;
mod models;
mod tray_menu;

use anyhow::Context;
use crate::core::{
    app_log::{self, AppLog},
    persistence::{PlacementStore, PLACEMENT_FILE_NAME},
    relay::Relay,
    shell::{CloseDecision, WidgetShell},
    tauri_host::{with_shell, ShellState, TauriHost, MAIN_WINDOW},
    window_placement::{self, MoveSettle},
};
use serde_json::json;
use tauri::{AppHandle, Manager, RunEvent, WindowEvent};

fn setup(app_handle: &AppHandle) -> anyhow::Result<()> {
    let log = AppLog::for_app(app_handle).map_err(anyhow::Error::msg)?;
    app_log::install_panic_hook(log.clone());
    let _ = log.info("app", "startup");

    // Tray-only application: no dock icon.
    #[cfg(target_os = "macos")]
    {
        let _ = app_handle.set_dock_visibility(false);
    }

    let store_path = app_handle
        .path()
        .app_data_dir()
        .context("Failed to resolve app data dir")?
        .join(PLACEMENT_FILE_NAME);
    let store = match PlacementStore::open(store_path.clone()) {
        Ok(store) => store,
        Err(e) => {
            let _ = log.warn(
                "placement",
                "load_failed",
                Some(json!({ "path": store_path.display().to_string(), "error": e.to_string() })),
            );
            PlacementStore::fresh(store_path)
        }
    };

    app_handle.manage(Relay::new().context("Failed to build relay client")?);
    app_handle.manage(MoveSettle::default());

    tray_menu::create_tray(app_handle).context("Failed to create tray icon")?;

    let mut shell = WidgetShell::new(TauriHost::new(app_handle.clone()), store, Some(log.clone()));
    shell
        .create_and_show()
        .map_err(anyhow::Error::msg)
        .context("Failed to create widget window")?;

    app_handle.manage(ShellState::new(shell));
    app_handle.manage(log);
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .on_menu_event(|app, event| {
            tray_menu::handle_menu_event(app, event);
        })
        .setup(|app| {
            setup(app.handle())?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::window::show_widget,
            commands::window::hide_widget,
            commands::window::toggle_widget,
            commands::window::reset_widget_position,
            commands::window::quit_app,
            commands::relay::relay_request,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW {
                return;
            }
            match event {
                WindowEvent::Moved(_) => window_placement::schedule_capture(window.app_handle()),
                WindowEvent::CloseRequested { api, .. } => {
                    let decision = with_shell(window.app_handle(), |shell| shell.on_close_requested());
                    if decision == Some(CloseDecision::Hide) {
                        api.prevent_close();
                    }
                }
                _ => {}
            }
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(handle_run_event);
}

#[cfg_attr(not(target_os = "macos"), allow(unused_variables))]
fn handle_run_event(app_handle: &AppHandle, event: RunEvent) {
    match event {
        // Closing the last window must not end a tray application; only an
        // explicit exit code (quit) does.
        RunEvent::ExitRequested { code: None, api, .. } => api.prevent_exit(),
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            with_shell(app_handle, |shell| shell.show());
        }
        _ => {}
    }
}
