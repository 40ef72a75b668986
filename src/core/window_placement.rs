use super::tauri_host::with_shell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tauri::{AppHandle, Manager};

// Tauri reports moves continuously while dragging; a quiet period marks the end.
const SETTLE_DELAY: Duration = Duration::from_millis(350);

/// Generation counter for pending move captures. Only the newest one fires.
#[derive(Debug, Default)]
pub struct MoveSettle {
    token: AtomicU64,
}

impl MoveSettle {
    pub fn next_token(&self) -> u64 {
        self.token.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.token.load(Ordering::SeqCst) == token
    }
}

pub fn schedule_capture(app_handle: &AppHandle) {
    let Some(settle) = app_handle.try_state::<MoveSettle>() else {
        return;
    };
    let token = settle.next_token();
    let app_handle = app_handle.clone();

    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(SETTLE_DELAY).await;
        let current = app_handle
            .try_state::<MoveSettle>()
            .is_some_and(|s| s.is_current(token));
        if !current {
            return;
        }
        let handle = app_handle.clone();
        let _ = app_handle.run_on_main_thread(move || {
            with_shell(&handle, |shell| shell.on_move_completed());
        });
    });
}
