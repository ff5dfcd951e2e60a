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

//! Command Line Interface

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nt_nvapi::{CoolerSummary, ErrorSink, NvApi, VibranceSummary};
use serde::Serialize;
use serde_json::json;

use crate::config::{save_config_to, NvTuneConfig};
use crate::logger::{log_event, ConsoleSink};
use crate::report;

#[derive(Parser, Debug)]
#[command(name = "nvtune")]
#[command(version)]
#[command(about = "nvtune - NVIDIA vibrance and cooler control via NvAPI")]
#[command(long_about = "nvtune - NVIDIA vibrance and cooler control via NvAPI

Loads the NVIDIA driver's NvAPI library at runtime and exposes display
digital vibrance and GPU cooler levels.

EXAMPLES:
    nvtune status                      Show displays, GPUs and coolers
    nvtune displays --json             List displays as JSON
    nvtune vibrance get 0              Show vibrance of display 0
    nvtune vibrance set 0 40           Set vibrance of display 0 to 40
    nvtune cooler get 0                Show coolers of GPU 0
    nvtune cooler set 0 1 65           Put GPU 0 cooler 1 on manual at 65%
    nvtune config init                 Write a default config file

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging")]
#[command(propagate_version = true)]
pub struct Cli {
    /// NvAPI library to load instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Append events to the JSON event log
    #[arg(long, global = true)]
    pub logging: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every display, GPU and cooler
    Status,

    /// List NVIDIA-driven displays
    Displays,

    /// List physical GPUs and their coolers
    Gpus,

    /// Digital vibrance control
    #[command(subcommand)]
    Vibrance(VibranceCommands),

    /// GPU cooler control
    #[command(subcommand)]
    Cooler(CoolerCommands),

    /// Configuration file management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum VibranceCommands {
    /// Show the vibrance level and range of a display
    Get { display: u32 },
    /// Set the vibrance level of a display
    Set {
        display: u32,
        #[arg(allow_hyphen_values = true)]
        level: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum CoolerCommands {
    /// Show the coolers of a GPU
    Get { gpu: u32 },
    /// Put one cooler under manual control at a level (percent)
    Set {
        gpu: u32,
        cooler: u32,
        #[arg(value_parser = clap::value_parser!(i32).range(0..=100))]
        level: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_api(cli: &Cli, config: &NvTuneConfig) -> anyhow::Result<NvApi> {
    let mut options = config.adapter_options();
    if let Some(library) = &cli.library {
        options.library_path = Some(library.clone());
    }
    let sink: Arc<dyn ErrorSink> = Arc::new(ConsoleSink);
    Ok(NvApi::initialize(sink, options)?)
}

/// Execute a parsed command line
pub fn run(cli: &Cli, config: &NvTuneConfig, config_file: &Path) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Status => {
            let api = open_api(cli, config)?;
            let snapshot = api.snapshot()?;
            if cli.json {
                print_json(&snapshot)?;
            } else {
                print!("{}", report::render_snapshot(&snapshot));
            }
        }
        Commands::Displays => {
            let api = open_api(cli, config)?;
            let displays = api.displays()?;
            if cli.json {
                print_json(&displays)?;
            } else {
                print!("{}", report::render_displays(&displays));
            }
        }
        Commands::Gpus => {
            let api = open_api(cli, config)?;
            let gpus = api.gpus()?;
            if cli.json {
                print_json(&gpus)?;
            } else {
                print!("{}", report::render_gpus(&gpus));
            }
        }
        Commands::Vibrance(VibranceCommands::Get { display }) => {
            let api = open_api(cli, config)?;
            let info = api.dvc_info(*display)?;
            let summary = VibranceSummary::from(&info);
            if cli.json {
                print_json(&summary)?;
            } else {
                println!("{}", report::render_vibrance(*display, &summary));
            }
        }
        Commands::Vibrance(VibranceCommands::Set { display, level }) => {
            let api = open_api(cli, config)?;
            api.set_dvc_level(*display, *level)?;
            log_event("vibrance_set", json!({ "display": display, "level": level }));
            println!("Display {} vibrance set to {}", display, level);
        }
        Commands::Cooler(CoolerCommands::Get { gpu }) => {
            let api = open_api(cli, config)?;
            let settings = api.cooler_settings(*gpu)?;
            let coolers: Vec<CoolerSummary> = settings
                .valid()
                .iter()
                .enumerate()
                .map(|(i, c)| CoolerSummary::from_setting(i as u32, c))
                .collect();
            if cli.json {
                print_json(&coolers)?;
            } else {
                print!("{}", report::render_coolers(*gpu, &coolers));
            }
        }
        Commands::Cooler(CoolerCommands::Set { gpu, cooler, level }) => {
            let api = open_api(cli, config)?;
            api.set_cooler_level(*gpu, *cooler, *level)?;
            log_event("cooler_set", json!({ "gpu": gpu, "cooler": cooler, "level": level }));
            println!("GPU {} cooler {} set to {}% (manual)", gpu, cooler, level);
        }
        Commands::Config(ConfigCommands::Show) => print_json(config)?,
        Commands::Config(ConfigCommands::Path) => println!("{}", config_file.display()),
        Commands::Config(ConfigCommands::Init { force }) => {
            if config_file.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    config_file.display()
                );
            }
            save_config_to(config_file, &NvTuneConfig::default())
                .with_context(|| format!("writing {}", config_file.display()))?;
            println!("Wrote default config to {}", config_file.display());
        }
    }
    Ok(())
}
