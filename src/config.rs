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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use nt_error::{NvTuneError, Result};
use nt_nvapi::{AdapterOptions, DEFAULT_MAX_ENUMERATION_ITERATIONS};
use serde::{Deserialize, Serialize};

/// Largest enumeration bound accepted from the config file
pub const MAX_ENUMERATION_ITERATIONS_LIMIT: u32 = 4096;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn default_max_enumeration_iterations() -> u32 { DEFAULT_MAX_ENUMERATION_ITERATIONS }

fn default_log_level() -> String { "warn".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NvTuneConfig {
    /// Explicit NvAPI library path. When absent the platform default is used.
    #[serde(default)]
    pub library_path: Option<PathBuf>,
    /// Bound on driver calls during display enumeration
    #[serde(default = "default_max_enumeration_iterations")]
    pub max_enumeration_iterations: u32,
    /// Default tracing level (RUST_LOG takes precedence)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// JSON event log written when `--logging` is given
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for NvTuneConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            max_enumeration_iterations: default_max_enumeration_iterations(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl NvTuneConfig {
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            library_path: self.library_path.clone(),
            max_enumeration_iterations: self.max_enumeration_iterations,
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Path::new(&xdg).join("nvtune").join("config.json");
        }
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("nvtune").join("config.json");
    }
    PathBuf::from("/etc/nvtune/config.json")
}

/// Load a config file, falling back to defaults when it does not exist
pub fn load_config_or_default(path: &Path) -> Result<NvTuneConfig> {
    if !path.exists() {
        return Ok(NvTuneConfig::default());
    }
    load_config_from(path)
}

pub fn load_config_from(path: &Path) -> Result<NvTuneConfig> {
    let data = fs::read_to_string(path).map_err(|source| NvTuneError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: NvTuneConfig = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn save_config_to(path: &Path, cfg: &NvTuneConfig) -> Result<()> {
    validate_config(cfg)?;
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).map_err(|source| NvTuneError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn validate_config(cfg: &NvTuneConfig) -> Result<()> {
    if cfg.max_enumeration_iterations == 0 || cfg.max_enumeration_iterations > MAX_ENUMERATION_ITERATIONS_LIMIT {
        return Err(NvTuneError::invalid_config(
            "max_enumeration_iterations",
            format!("must be 1..={}, got {}", MAX_ENUMERATION_ITERATIONS_LIMIT, cfg.max_enumeration_iterations),
        ));
    }
    if !LOG_LEVELS.contains(&cfg.log_level.to_ascii_lowercase().as_str()) {
        return Err(NvTuneError::invalid_config(
            "log_level",
            format!("expected one of {}, got '{}'", LOG_LEVELS.join("/"), cfg.log_level),
        ));
    }
    if let Some(path) = &cfg.library_path {
        if path.as_os_str().is_empty() {
            return Err(NvTuneError::invalid_config("library_path", "must not be empty"));
        }
    }
    Ok(())
}
