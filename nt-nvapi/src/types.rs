//! Serializable summaries of what the driver reports

use serde::{Deserialize, Serialize};

use crate::ffi::{CoolerSetting, DvcInfoEx, COOLER_POLICY_MANUAL};

/// Digital vibrance range and level of one display
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct VibranceSummary {
    pub current: i32,
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl From<&DvcInfoEx> for VibranceSummary {
    fn from(info: &DvcInfoEx) -> Self {
        Self {
            current: info.current_level,
            min: info.min_level,
            max: info.max_level,
            default: info.default_level,
        }
    }
}

/// A display driven by an NVIDIA GPU
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplaySummary {
    /// Enumeration index (stable within one driver session)
    pub index: u32,
    /// Associated display name (e.g. "\\\\.\\DISPLAY1")
    pub name: String,
    /// Vibrance levels, if the driver answered
    pub vibrance: Option<VibranceSummary>,
}

/// One cooler on a physical GPU
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CoolerSummary {
    pub index: u32,
    pub level: i32,
    pub min_level: i32,
    pub max_level: i32,
    pub policy: i32,
    /// Policy is user-controlled
    pub manual: bool,
    pub active: bool,
}

impl CoolerSummary {
    pub fn from_setting(index: u32, cooler: &CoolerSetting) -> Self {
        Self {
            index,
            level: cooler.current_level,
            min_level: cooler.current_min_level,
            max_level: cooler.current_max_level,
            policy: cooler.current_policy,
            manual: cooler.current_policy == COOLER_POLICY_MANUAL,
            active: cooler.active != 0,
        }
    }
}

/// A physical GPU and its coolers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GpuSummary {
    pub index: u32,
    pub name: String,
    pub coolers: Vec<CoolerSummary>,
}

/// Everything the adapter can report in one pass
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NvSnapshot {
    /// Timestamp in milliseconds since Unix epoch
    pub timestamp_ms: u64,
    pub displays: Vec<DisplaySummary>,
    pub gpus: Vec<GpuSummary>,
}
