//! Dynamic loading of the NvAPI driver library
//!
//! Uses `libloading` to open the vendor library, resolves `nvapi_QueryInterface`
//! by name and every other entry point through it by identifier.

use std::ffi::{c_void, OsStr};
use std::mem::{size_of, transmute_copy};
use std::path::Path;

use libloading::{Library, Symbol};
use nt_error::NvTuneError;
use tracing::{debug, info, trace};

use crate::driver::NvApiDriver;
use crate::entry::*;
use crate::ffi::{
    CoolerLevels, CoolerSettings, DvcInfoEx, NvDisplayHandle, NvPhysicalGpuHandle, NvStatus,
    PhysicalGpuHandles, ShortString,
};
use crate::Result;

#[cfg(all(windows, target_pointer_width = "64"))]
pub const LIBRARY_CANDIDATES: &[&str] = &["nvapi64.dll"];

#[cfg(all(windows, not(target_pointer_width = "64")))]
pub const LIBRARY_CANDIDATES: &[&str] = &["nvapi.dll"];

#[cfg(not(windows))]
pub const LIBRARY_CANDIDATES: &[&str] = &["libnvidia-api.so.1"];

/// Loaded driver library with its resolved entry-point table
pub struct NvApiLibrary {
    initialize: FnInitialize,
    unload: FnUnload,
    enum_nvidia_display_handle: FnEnumNvidiaDisplayHandle,
    get_associated_nvidia_display_name: FnGetAssociatedNvidiaDisplayName,
    enum_physical_gpus: FnEnumPhysicalGpus,
    gpu_get_full_name: FnGpuGetFullName,
    get_dvc_info_ex: FnGetDvcInfoEx,
    set_dvc_level_ex: FnSetDvcLevelEx,
    gpu_get_cooler_settings: FnGpuGetCoolerSettings,
    gpu_set_cooler_levels: FnGpuSetCoolerLevels,
    name: String,
    _lib: Library,
}

impl NvApiLibrary {
    /// Open the library (explicit path, or the platform default) and resolve every entry point.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (lib, name) = match path {
            Some(path) => {
                let name = path.display().to_string();
                (Self::open(path.as_os_str(), &name)?, name)
            }
            None => Self::open_default()?,
        };

        let query: FnQueryInterface = unsafe {
            let sym: Symbol<FnQueryInterface> =
                lib.get(QUERY_INTERFACE_SYMBOL).map_err(|e| NvTuneError::LibraryLoad {
                    library: name.clone(),
                    reason: format!("nvapi_QueryInterface not exported: {}", e),
                })?;
            *sym
        };

        let driver = unsafe {
            Self {
                initialize: resolve(query, EntryPoint::Initialize)?,
                unload: resolve(query, EntryPoint::Unload)?,
                enum_nvidia_display_handle: resolve(query, EntryPoint::EnumNvidiaDisplayHandle)?,
                get_associated_nvidia_display_name: resolve(
                    query,
                    EntryPoint::GetAssociatedNvidiaDisplayName,
                )?,
                enum_physical_gpus: resolve(query, EntryPoint::EnumPhysicalGpus)?,
                gpu_get_full_name: resolve(query, EntryPoint::GpuGetFullName)?,
                get_dvc_info_ex: resolve(query, EntryPoint::GetDvcInfoEx)?,
                set_dvc_level_ex: resolve(query, EntryPoint::SetDvcLevelEx)?,
                gpu_get_cooler_settings: resolve(query, EntryPoint::GpuGetCoolerSettings)?,
                gpu_set_cooler_levels: resolve(query, EntryPoint::GpuSetCoolerLevels)?,
                name,
                _lib: lib,
            }
        };

        info!("NvAPI entry points resolved from {}", driver.name);
        Ok(driver)
    }

    fn open(path: &OsStr, label: &str) -> Result<Library> {
        match unsafe { Library::new(path) } {
            Ok(lib) => {
                info!("Loaded NvAPI from: {}", label);
                Ok(lib)
            }
            Err(e) => {
                debug!("Failed to load {}: {}", label, e);
                Err(NvTuneError::LibraryLoad {
                    library: label.to_string(),
                    reason: format!("{}: {}", label, e),
                })
            }
        }
    }

    fn open_default() -> Result<(Library, String)> {
        let mut last_err = None;
        for &candidate in LIBRARY_CANDIDATES {
            match Self::open(OsStr::new(candidate), candidate) {
                Ok(lib) => return Ok((lib, candidate.to_string())),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| NvTuneError::LibraryLoad {
            library: String::new(),
            reason: "no NvAPI library candidates for this platform".to_string(),
        }))
    }
}

/// Look up one entry point through QueryInterface.
///
/// # Safety
/// `query` must be a live `nvapi_QueryInterface` and `F` must be the entry point's
/// exact function-pointer type.
unsafe fn resolve<F: Copy>(query: FnQueryInterface, entry: EntryPoint) -> Result<F> {
    debug_assert_eq!(size_of::<F>(), size_of::<*mut c_void>());

    let ptr = query(entry.id());
    if ptr.is_null() {
        return Err(NvTuneError::EntryPointMissing {
            name: entry.name(),
            id: entry.id(),
        });
    }
    trace!("Resolved {} (0x{:08X}) at {:p}", entry.name(), entry.id(), ptr);
    Ok(transmute_copy::<*mut c_void, F>(&ptr))
}

impl NvApiDriver for NvApiLibrary {
    fn initialize(&self) -> NvStatus {
        unsafe { (self.initialize)() }
    }

    fn unload(&self) -> NvStatus {
        unsafe { (self.unload)() }
    }

    fn enum_nvidia_display_handle(&self, index: u32, handle: &mut NvDisplayHandle) -> NvStatus {
        unsafe { (self.enum_nvidia_display_handle)(index, handle) }
    }

    fn get_associated_nvidia_display_name(
        &self,
        handle: NvDisplayHandle,
        name: &mut ShortString,
    ) -> NvStatus {
        unsafe { (self.get_associated_nvidia_display_name)(handle, name.as_mut_ptr()) }
    }

    fn enum_physical_gpus(&self, handles: &mut PhysicalGpuHandles, count: &mut u32) -> NvStatus {
        unsafe { (self.enum_physical_gpus)(handles.as_mut_ptr(), count) }
    }

    fn gpu_get_full_name(&self, gpu: NvPhysicalGpuHandle, name: &mut ShortString) -> NvStatus {
        unsafe { (self.gpu_get_full_name)(gpu, name.as_mut_ptr()) }
    }

    fn get_dvc_info_ex(
        &self,
        handle: NvDisplayHandle,
        output_id: u32,
        info: &mut DvcInfoEx,
    ) -> NvStatus {
        unsafe { (self.get_dvc_info_ex)(handle, output_id, info) }
    }

    fn set_dvc_level_ex(
        &self,
        handle: NvDisplayHandle,
        output_id: u32,
        info: &mut DvcInfoEx,
    ) -> NvStatus {
        unsafe { (self.set_dvc_level_ex)(handle, output_id, info) }
    }

    fn gpu_get_cooler_settings(
        &self,
        gpu: NvPhysicalGpuHandle,
        cooler_index: u32,
        settings: &mut CoolerSettings,
    ) -> NvStatus {
        unsafe { (self.gpu_get_cooler_settings)(gpu, cooler_index, settings) }
    }

    fn gpu_set_cooler_levels(
        &self,
        gpu: NvPhysicalGpuHandle,
        cooler_index: u32,
        levels: &CoolerLevels,
    ) -> NvStatus {
        unsafe { (self.gpu_set_cooler_levels)(gpu, cooler_index, levels) }
    }
}
