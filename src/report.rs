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

//! Human-readable rendering of adapter summaries

use std::fmt::Write;

use nt_nvapi::{CoolerSummary, DisplaySummary, GpuSummary, NvSnapshot, VibranceSummary};

pub fn render_vibrance(display: u32, v: &VibranceSummary) -> String {
    format!(
        "Display {}: vibrance {} (range {}..={}, default {})",
        display, v.current, v.min, v.max, v.default
    )
}

pub fn render_displays(displays: &[DisplaySummary]) -> String {
    if displays.is_empty() {
        return "No NVIDIA displays found\n".to_string();
    }
    let mut out = String::new();
    for d in displays {
        let _ = write!(out, "[{}] {}", d.index, d.name);
        match &d.vibrance {
            Some(v) => {
                let _ = writeln!(out, "  vibrance {} ({}..={})", v.current, v.min, v.max);
            }
            None => {
                let _ = writeln!(out, "  vibrance n/a");
            }
        }
    }
    out
}

pub fn render_coolers(gpu: u32, coolers: &[CoolerSummary]) -> String {
    if coolers.is_empty() {
        return format!("GPU {}: no coolers reported\n", gpu);
    }
    let mut out = String::new();
    for c in coolers {
        let _ = writeln!(
            out,
            "GPU {} cooler {}: {}% ({}..={}) {}{}",
            gpu,
            c.index,
            c.level,
            c.min_level,
            c.max_level,
            if c.manual { "manual" } else { "auto" },
            if c.active { "" } else { ", inactive" },
        );
    }
    out
}

pub fn render_gpus(gpus: &[GpuSummary]) -> String {
    if gpus.is_empty() {
        return "No NVIDIA GPUs found\n".to_string();
    }
    let mut out = String::new();
    for g in gpus {
        let _ = writeln!(out, "[{}] {}", g.index, g.name);
        for line in render_coolers(g.index, &g.coolers).lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

pub fn render_snapshot(snapshot: &NvSnapshot) -> String {
    format!(
        "Displays:\n{}\nGPUs:\n{}",
        render_displays(&snapshot.displays),
        render_gpus(&snapshot.gpus)
    )
}
