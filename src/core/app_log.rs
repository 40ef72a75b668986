use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tauri::{AppHandle, Manager};

pub const LOG_FILE_NAME: &str = "app.log.jsonl";
const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
const MAX_ROTATIONS: usize = 3;

// One writer at a time across every `AppLog` clone, including the panic hook.
static LOG_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Clone, Serialize)]
pub struct AppLogRecord {
    pub ts_ms: i64,
    pub level: String,
    pub scope: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AppLogRecord {
    pub fn now(level: &str, scope: &str, message: &str, data: Option<Value>) -> Self {
        Self {
            ts_ms: Utc::now().timestamp_millis(),
            level: level.to_string(),
            scope: scope.to_string(),
            message: message.to_string(),
            data,
        }
    }
}

/// JSON-lines log rooted at one directory, rotated by size.
#[derive(Debug, Clone)]
pub struct AppLog {
    dir: PathBuf,
}

impl AppLog {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn for_app(app: &AppHandle) -> Result<Self, String> {
        let dir = app
            .path()
            .app_log_dir()
            .map_err(|e| format!("Failed to resolve log dir: {}", e))?;
        Ok(Self::new(dir))
    }

    pub fn append(&self, record: AppLogRecord) -> io::Result<()> {
        let _guard = LOG_LOCK.lock();
        fs::create_dir_all(&self.dir)?;
        rotate_if_full(&self.dir)?;

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(LOG_FILE_NAME))?
            .write_all(&line)
    }

    pub fn info(&self, scope: &str, message: &str) -> io::Result<()> {
        self.append(AppLogRecord::now("info", scope, message, None))
    }

    pub fn warn(&self, scope: &str, message: &str, data: Option<Value>) -> io::Result<()> {
        self.append(AppLogRecord::now("warn", scope, message, data))
    }

    pub fn error(&self, scope: &str, message: &str, data: Option<Value>) -> io::Result<()> {
        self.append(AppLogRecord::now("error", scope, message, data))
    }
}

fn generation(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("app.log.{}.jsonl", index))
}

/// Shifts `app.log.N.jsonl` up by one once the live file reaches the size
/// cap. The oldest generation is overwritten.
fn rotate_if_full(dir: &Path) -> io::Result<()> {
    let live = dir.join(LOG_FILE_NAME);
    match fs::metadata(&live) {
        Ok(meta) if meta.len() >= MAX_LOG_BYTES => {}
        _ => return Ok(()),
    }

    for index in (1..MAX_ROTATIONS).rev() {
        let from = generation(dir, index);
        if from.exists() {
            fs::rename(&from, generation(dir, index + 1))?;
        }
    }
    fs::rename(&live, generation(dir, 1))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

/// Records panics in the log, then defers to the previously installed hook.
pub fn install_panic_hook(log: AppLog) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let _ = log.error(
            "panic",
            &panic_message(info.payload()),
            Some(json!({ "location": location })),
        );
        previous(info);
    }));
}
