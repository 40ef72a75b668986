pub mod app_log;
pub mod geometry;
pub mod host;
pub mod persistence;
pub mod relay;
pub mod shell;
pub mod tauri_host;
pub mod visibility;
pub mod window_placement;
