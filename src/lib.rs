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

//! nvtune - NVIDIA vibrance and cooler control
//!
//! Command line front end over the `nt-nvapi` adapter: configuration file,
//! logging setup, console error reporting and text rendering.

pub mod cli;
pub mod config;
pub mod logger;
pub mod report;
