/*
 * This file is part of nvtune.
 *
 * Copyright (C) 2025 nvtune contributors
 *
 * nvtune is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * nvtune is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with nvtune. If not, see <https://www.gnu.org/licenses/>.
 */

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use nt_nvapi::ErrorSink;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Install the stderr tracing subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_ascii_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

pub fn default_event_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("nvtune")
        .join("events.json")
}

/// Open the JSON-lines event log. Returns the path actually opened, if any.
pub fn init_event_log(path: Option<&Path>) -> Option<PathBuf> {
    let primary = path.map(Path::to_path_buf).unwrap_or_else(default_event_log_path);
    let fallback = std::env::temp_dir().join("nvtune_events.json");

    for candidate in [primary, fallback] {
        if let Some(parent) = candidate.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(f) = OpenOptions::new().create(true).append(true).open(&candidate) {
            if let Ok(mut guard) = LOG_FILE.lock() {
                *guard = Some(f);
                return Some(candidate);
            }
        }
    }
    None
}

/// Append one event. Does nothing unless `init_event_log` succeeded.
pub fn log_event(event: &str, data: Value) {
    let line = json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string();

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(f) = guard.as_mut() {
            let _ = writeln!(f, "{}", line);
        }
    }
}

/// Error sink for the command line: stderr plus the event log
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn display_error(&self, message: &str) {
        eprintln!("Error: {}", message);
        log_event("driver_error", json!({ "message": message }));
    }
}
