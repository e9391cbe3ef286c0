/*
 * This file is part of Fanmode.
 *
 * Copyright (C) 2025 Fanmode contributors
 *
 * Fanmode is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanmode is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanmode. If not, see <https://www.gnu.org/licenses/>.
 */

//! Diagnostics and the optional JSON event log.
//!
//! Diagnostics go through `tracing` to stderr. With `--logging`, every
//! hardware write is additionally appended as one JSON object per line.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_PATH: &str = "/var/log/fanmode/events.json";
const FALLBACK_LOG_PATH: &str = "/tmp/fanmode_events.json";

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Start appending events to `path`, or to the default log location
pub fn init_logging(path: Option<&Path>) {
    let target = path.unwrap_or_else(|| Path::new(DEFAULT_LOG_PATH));
    // Last resort: fall back to /tmp if the log directory is unavailable (silent)
    let file = open_append(target).or_else(|| open_append(Path::new(FALLBACK_LOG_PATH)));
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
}

/// Stop writing events; later `log_event` calls are dropped
pub fn shutdown_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = None;
    }
}

/// Append one event line. No-op unless `init_logging` was called.
pub fn log_event(event: &str, data: Value) {
    let Ok(mut guard) = LOG_FILE.lock() else { return };
    let Some(f) = guard.as_mut() else { return };
    let line = json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string();
    let _ = writeln!(f, "{}", line);
}
