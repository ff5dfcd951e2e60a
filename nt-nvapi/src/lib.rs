//! Runtime-loaded NvAPI adapter
//!
//! Loads the NVIDIA driver's NvAPI library, resolves its entry points by identifier and
//! exposes a small typed surface:
//! - display enumeration and names
//! - physical GPU enumeration and names
//! - digital vibrance (DVC) get/set per display
//! - cooler level get/set per GPU

pub mod adapter;
pub mod driver;
pub mod entry;
pub mod ffi;
pub mod library;
pub mod sink;

mod types;

#[cfg(test)]
mod test_utils;

pub use adapter::{AdapterOptions, DisplayEnumeration, NvApi, PhysicalGpus, DEFAULT_MAX_ENUMERATION_ITERATIONS};
pub use driver::NvApiDriver;
pub use ffi::{CoolerLevels, CoolerSettings, DvcInfoEx, NvDisplayHandle, NvPhysicalGpuHandle, NvStatus};
pub use library::NvApiLibrary;
pub use sink::{ErrorSink, FnSink, TracingSink};
pub use types::*;

pub use nt_error::NvTuneError;

pub type Result<T> = std::result::Result<T, NvTuneError>;
