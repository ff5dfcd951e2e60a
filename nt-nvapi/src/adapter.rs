//! The NvAPI adapter
//!
//! An [`NvApi`] value only exists once the library is loaded, every entry point is
//! resolved and the driver's initialize call returned OK. Dropping it calls the
//! driver's unload entry point before the library itself is released.

use std::path::PathBuf;
use std::sync::Arc;

use nt_error::NvTuneError;
use tracing::{debug, info, trace, warn};

use crate::driver::NvApiDriver;
use crate::ffi::{
    CoolerLevels, CoolerSettings, DvcInfoEx, NvDisplayHandle, NvPhysicalGpuHandle, NvStatus,
    PhysicalGpuHandles, ShortString, COOLER_POLICY_MANUAL, COOLER_TARGET_ALL, DEFAULT_OUTPUT_ID,
    NVAPI_MAX_COOLERS_PER_GPU, NVAPI_MAX_PHYSICAL_GPUS,
};
use crate::library::NvApiLibrary;
use crate::sink::ErrorSink;
use crate::types::{CoolerSummary, DisplaySummary, GpuSummary, NvSnapshot, VibranceSummary};
use crate::Result;

/// Upper bound on driver calls made while enumerating displays
pub const DEFAULT_MAX_ENUMERATION_ITERATIONS: u32 = 256;

const OP_DISPLAY_ENUM: &str = "display handle enumeration";
const OP_DISPLAY_NAME: &str = "display name lookup";
const OP_GPU_ENUM: &str = "physical GPU enumeration";
const OP_GPU_NAME: &str = "GPU name lookup";
const OP_DVC_GET: &str = "DVC info query";
const OP_DVC_SET: &str = "DVC level change";
const OP_COOLER_GET: &str = "cooler settings query";
const OP_COOLER_SET: &str = "cooler level change";

#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Explicit library path; platform default when `None`
    pub library_path: Option<PathBuf>,
    pub max_enumeration_iterations: u32,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            library_path: None,
            max_enumeration_iterations: DEFAULT_MAX_ENUMERATION_ITERATIONS,
        }
    }
}

/// Result of walking the display list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEnumeration {
    /// Number of displays the driver enumerated
    pub count: u32,
    /// Handle of the requested index, if it was enumerated
    pub handle: Option<NvDisplayHandle>,
}

/// Physical GPU handle table as filled by the driver
#[derive(Debug, Clone, Copy)]
pub struct PhysicalGpus {
    handles: PhysicalGpuHandles,
    count: u32,
}

impl PhysicalGpus {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn get(&self, index: u32) -> Option<NvPhysicalGpuHandle> {
        self.as_slice().get(index as usize).copied()
    }

    pub fn as_slice(&self) -> &[NvPhysicalGpuHandle] {
        &self.handles[..self.count as usize]
    }
}

pub struct NvApi<D: NvApiDriver = NvApiLibrary> {
    driver: D,
    sink: Arc<dyn ErrorSink>,
    max_enumeration_iterations: u32,
}

impl NvApi<NvApiLibrary> {
    /// Load the NvAPI library and initialize the driver session.
    pub fn initialize(sink: Arc<dyn ErrorSink>, options: AdapterOptions) -> Result<Self> {
        let path = options.library_path.clone();
        Self::initialize_with(sink, options, || NvApiLibrary::load(path.as_deref()))
    }
}

impl<D: NvApiDriver> NvApi<D> {
    /// Initialize on top of a driver produced by `load`.
    ///
    /// If the driver's initialize call fails the loaded driver is dropped without its
    /// unload entry point being called.
    pub fn initialize_with<F>(sink: Arc<dyn ErrorSink>, options: AdapterOptions, load: F) -> Result<Self>
    where
        F: FnOnce() -> Result<D>,
    {
        let driver = match load() {
            Ok(driver) => driver,
            Err(e) => {
                sink.display_error(&e.to_string());
                return Err(e);
            }
        };

        let status = driver.initialize();
        if !status.is_ok() {
            let err = NvTuneError::DriverInit {
                status: status.code(),
                reason: status.name().to_string(),
            };
            sink.display_error(&err.to_string());
            return Err(err);
        }

        info!("NvAPI session initialized");
        Ok(Self {
            driver,
            sink,
            max_enumeration_iterations: options.max_enumeration_iterations.max(1),
        })
    }

    fn report(&self, err: NvTuneError) -> NvTuneError {
        self.sink.display_error(&err.to_string());
        err
    }

    fn call_failure(&self, operation: &'static str, status: NvStatus) -> NvTuneError {
        self.report(NvTuneError::DriverCall {
            operation,
            status: status.code(),
            reason: status.name().to_string(),
        })
    }

    fn check(&self, operation: &'static str, status: NvStatus) -> Result<()> {
        if status.is_ok() {
            Ok(())
        } else {
            Err(self.call_failure(operation, status))
        }
    }

    // ========================================================================
    // Displays
    // ========================================================================

    /// Walk display indices until end of enumeration, handing every OK handle to `visit`.
    /// Failed indices are reported and retried. At most `max_enumeration_iterations`
    /// calls may return something other than end of enumeration.
    fn walk_displays<V>(&self, mut visit: V) -> Result<u32>
    where
        V: FnMut(u32, NvDisplayHandle),
    {
        let mut count = 0u32;
        let mut steps = 0u32;
        loop {
            let mut handle = NvDisplayHandle::null();
            let status = self.driver.enum_nvidia_display_handle(count, &mut handle);
            if status == NvStatus::END_ENUMERATION {
                trace!("Display enumeration ended after {} display(s)", count);
                return Ok(count);
            }
            if steps == self.max_enumeration_iterations {
                break;
            }
            steps += 1;

            if status.is_ok() {
                visit(count, handle);
                count += 1;
            } else {
                self.call_failure(OP_DISPLAY_ENUM, status);
            }
        }

        Err(self.report(NvTuneError::EnumerationStalled {
            operation: OP_DISPLAY_ENUM,
            iterations: self.max_enumeration_iterations,
        }))
    }

    /// Enumerate displays, capturing the handle at `target`.
    pub fn enum_display_handle(&self, target: u32) -> Result<DisplayEnumeration> {
        let mut found = None;
        let count = self.walk_displays(|index, handle| {
            if index == target {
                found = Some(handle);
            }
        })?;
        Ok(DisplayEnumeration { count, handle: found })
    }

    pub fn display_count(&self) -> Result<u32> {
        self.walk_displays(|_, _| {})
    }

    pub fn display_handle(&self, index: u32) -> Result<NvDisplayHandle> {
        let result = self.enum_display_handle(index)?;
        result.handle.ok_or(NvTuneError::DisplayNotFound {
            index,
            count: result.count,
        })
    }

    /// Associated display name (e.g. `\\.\DISPLAY1`)
    pub fn display_name(&self, index: u32) -> Result<String> {
        let handle = self.display_handle(index)?;
        self.display_name_for(handle)
    }

    fn display_name_for(&self, handle: NvDisplayHandle) -> Result<String> {
        let mut name = ShortString::new();
        let status = self.driver.get_associated_nvidia_display_name(handle, &mut name);
        self.check(OP_DISPLAY_NAME, status)?;
        Ok(name.to_string_lossy())
    }

    // ========================================================================
    // Physical GPUs
    // ========================================================================

    /// Enumerate physical GPUs. A failure is reported, but whatever the driver wrote is
    /// still returned.
    pub fn enum_physical_gpus(&self) -> PhysicalGpus {
        let mut handles = [NvPhysicalGpuHandle::null(); NVAPI_MAX_PHYSICAL_GPUS];
        let mut count = 0u32;
        let status = self.driver.enum_physical_gpus(&mut handles, &mut count);
        if !status.is_ok() {
            self.call_failure(OP_GPU_ENUM, status);
        }

        let clamped = count.min(NVAPI_MAX_PHYSICAL_GPUS as u32);
        if clamped != count {
            warn!("Driver reported {} GPUs, table holds {}", count, clamped);
        }
        PhysicalGpus { handles, count: clamped }
    }

    pub fn gpu_handle(&self, index: u32) -> Result<NvPhysicalGpuHandle> {
        let gpus = self.enum_physical_gpus();
        gpus.get(index).ok_or(NvTuneError::GpuNotFound {
            index,
            count: gpus.count(),
        })
    }

    pub fn gpu_full_name(&self, index: u32) -> Result<String> {
        let handle = self.gpu_handle(index)?;
        self.gpu_full_name_for(handle)
    }

    fn gpu_full_name_for(&self, handle: NvPhysicalGpuHandle) -> Result<String> {
        let mut name = ShortString::new();
        let status = self.driver.gpu_get_full_name(handle, &mut name);
        self.check(OP_GPU_NAME, status)?;
        Ok(name.to_string_lossy())
    }

    // ========================================================================
    // Digital vibrance
    // ========================================================================

    pub fn dvc_info(&self, index: u32) -> Result<DvcInfoEx> {
        let handle = self.display_handle(index)?;
        self.dvc_info_for(handle)
    }

    fn dvc_info_for(&self, handle: NvDisplayHandle) -> Result<DvcInfoEx> {
        let mut info = DvcInfoEx::new();
        let status = self.driver.get_dvc_info_ex(handle, DEFAULT_OUTPUT_ID, &mut info);
        self.check(OP_DVC_GET, status)?;
        Ok(info)
    }

    /// Change the current vibrance level of a display. The record sent to the driver
    /// carries the range and default it just reported.
    pub fn set_dvc_level(&self, index: u32, level: i32) -> Result<()> {
        let handle = self.display_handle(index)?;
        let mut info = self.dvc_info_for(handle)?;
        if !info.accepts(level) {
            debug!(
                "Vibrance level {} outside driver range {}..={}",
                level, info.min_level, info.max_level
            );
        }

        info.current_level = level;
        info.prepare();
        let status = self.driver.set_dvc_level_ex(handle, DEFAULT_OUTPUT_ID, &mut info);
        self.check(OP_DVC_SET, status)?;

        info!("Set display {} vibrance to {}", index, level);
        Ok(())
    }

    // ========================================================================
    // Coolers
    // ========================================================================

    pub fn cooler_settings(&self, gpu: u32) -> Result<CoolerSettings> {
        let handle = self.gpu_handle(gpu)?;
        self.cooler_settings_for(handle)
    }

    fn cooler_settings_for(&self, handle: NvPhysicalGpuHandle) -> Result<CoolerSettings> {
        let mut settings = CoolerSettings::new();
        let status = self
            .driver
            .gpu_get_cooler_settings(handle, COOLER_TARGET_ALL, &mut settings);
        self.check(OP_COOLER_GET, status)?;
        Ok(settings)
    }

    /// Put one cooler under manual control at `level`. Every other cooler is sent back
    /// with the level and policy it currently has.
    pub fn set_cooler_level(&self, gpu: u32, cooler: u32, level: i32) -> Result<()> {
        if cooler as usize >= NVAPI_MAX_COOLERS_PER_GPU {
            return Err(NvTuneError::CoolerNotFound {
                gpu,
                cooler,
                max: NVAPI_MAX_COOLERS_PER_GPU as u32,
            });
        }

        let handle = self.gpu_handle(gpu)?;
        let settings = self.cooler_settings_for(handle)?;
        if cooler >= settings.count {
            debug!(
                "Cooler {} is beyond the {} cooler(s) reported for GPU {}",
                cooler, settings.count, gpu
            );
        }

        let mut levels = CoolerLevels::from_settings(&settings);
        let slot = &mut levels.levels[cooler as usize];
        slot.level = level;
        slot.policy = COOLER_POLICY_MANUAL;
        levels.prepare();

        let status = self
            .driver
            .gpu_set_cooler_levels(handle, COOLER_TARGET_ALL, &levels);
        self.check(OP_COOLER_SET, status)?;

        info!("Set GPU {} cooler {} to {}%", gpu, cooler, level);
        Ok(())
    }

    // ========================================================================
    // Summaries
    // ========================================================================

    pub fn displays(&self) -> Result<Vec<DisplaySummary>> {
        let mut handles = Vec::new();
        self.walk_displays(|_, handle| handles.push(handle))?;

        let mut displays = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            displays.push(DisplaySummary {
                index: index as u32,
                name: self.display_name_for(handle)?,
                vibrance: self.dvc_info_for(handle).ok().as_ref().map(VibranceSummary::from),
            });
        }
        Ok(displays)
    }

    pub fn gpus(&self) -> Result<Vec<GpuSummary>> {
        let table = self.enum_physical_gpus();
        let mut gpus = Vec::with_capacity(table.as_slice().len());
        for (index, &handle) in table.as_slice().iter().enumerate() {
            let coolers = match self.cooler_settings_for(handle) {
                Ok(settings) => settings
                    .valid()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| CoolerSummary::from_setting(i as u32, c))
                    .collect(),
                Err(_) => Vec::new(),
            };
            gpus.push(GpuSummary {
                index: index as u32,
                name: self.gpu_full_name_for(handle)?,
                coolers,
            });
        }
        Ok(gpus)
    }

    pub fn snapshot(&self) -> Result<NvSnapshot> {
        let displays = self.displays()?;
        let gpus = self.gpus()?;
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_else(|e| {
                warn!("System time before Unix epoch: {}, using 0", e);
                0
            });

        Ok(NvSnapshot { timestamp_ms, displays, gpus })
    }
}

impl<D: NvApiDriver> Drop for NvApi<D> {
    fn drop(&mut self) {
        let status = self.driver.unload();
        if status.is_ok() {
            debug!("NvAPI session unloaded");
        } else {
            warn!("NvAPI unload returned {}", status);
        }
    }
}
