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

use clap::Parser;
use nt_error::NvTuneError;
use tracing::debug;

use nvtune::cli::{self, Cli};
use nvtune::config::{config_path, load_config_or_default};
use nvtune::logger;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_file = cli.config.clone().unwrap_or_else(config_path);
    let config = load_config_or_default(&config_file)?;

    logger::init_tracing(&config.log_level);
    debug!("Using config {}", config_file.display());

    if cli.logging {
        if let Some(path) = logger::init_event_log(config.log_file.as_deref()) {
            debug!("Event log at {}", path.display());
        }
        logger::log_event("startup", serde_json::json!({
            "args": std::env::args().collect::<Vec<_>>(),
        }));
    }

    if let Err(e) = cli::run(&cli, &config, &config_file) {
        // Driver failures were already printed by the console sink
        let reported = e
            .downcast_ref::<NvTuneError>()
            .map(NvTuneError::is_driver_failure)
            .unwrap_or(false);
        if !reported {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}
