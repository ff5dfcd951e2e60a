//! Entry-point identifiers and signatures
//!
//! NvAPI exports a single symbol, `nvapi_QueryInterface`. Every other entry point is
//! looked up through it by a fixed 32-bit identifier. The identifiers are part of the
//! driver's private ABI and must not change.

use std::ffi::c_void;

use crate::ffi::{
    CoolerLevels, CoolerSettings, DvcInfoEx, NvDisplayHandle, NvPhysicalGpuHandle, NvStatus,
};

/// Name of the bootstrap export
pub const QUERY_INTERFACE_SYMBOL: &[u8] = b"nvapi_QueryInterface\0";

/// Entry points the adapter needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Initialize,
    Unload,
    EnumNvidiaDisplayHandle,
    EnumPhysicalGpus,
    GpuGetFullName,
    GetAssociatedNvidiaDisplayName,
    GetDvcInfoEx,
    SetDvcLevelEx,
    GpuGetCoolerSettings,
    GpuSetCoolerLevels,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 10] = [
        EntryPoint::Initialize,
        EntryPoint::Unload,
        EntryPoint::EnumNvidiaDisplayHandle,
        EntryPoint::EnumPhysicalGpus,
        EntryPoint::GpuGetFullName,
        EntryPoint::GetAssociatedNvidiaDisplayName,
        EntryPoint::GetDvcInfoEx,
        EntryPoint::SetDvcLevelEx,
        EntryPoint::GpuGetCoolerSettings,
        EntryPoint::GpuSetCoolerLevels,
    ];

    /// QueryInterface identifier
    pub const fn id(self) -> u32 {
        match self {
            EntryPoint::Initialize => 0x0150_E828,
            EntryPoint::Unload => 0xD22B_DD7E,
            EntryPoint::EnumNvidiaDisplayHandle => 0x9ABD_D40D,
            EntryPoint::EnumPhysicalGpus => 0xE5AC_921F,
            EntryPoint::GpuGetFullName => 0xCEEE_8E9F,
            EntryPoint::GetAssociatedNvidiaDisplayName => 0x22A7_8B05,
            EntryPoint::GetDvcInfoEx => 0x0E45_002D,
            EntryPoint::SetDvcLevelEx => 0x4A82_C2B1,
            EntryPoint::GpuGetCoolerSettings => 0xDA14_1340,
            EntryPoint::GpuSetCoolerLevels => 0x891F_A0AE,
        }
    }

    /// Name as exported in the NvAPI headers
    pub const fn name(self) -> &'static str {
        match self {
            EntryPoint::Initialize => "NvAPI_Initialize",
            EntryPoint::Unload => "NvAPI_Unload",
            EntryPoint::EnumNvidiaDisplayHandle => "NvAPI_EnumNvidiaDisplayHandle",
            EntryPoint::EnumPhysicalGpus => "NvAPI_EnumPhysicalGPUs",
            EntryPoint::GpuGetFullName => "NvAPI_GPU_GetFullName",
            EntryPoint::GetAssociatedNvidiaDisplayName => "NvAPI_GetAssociatedNvidiaDisplayName",
            EntryPoint::GetDvcInfoEx => "NvAPI_GetDVCInfoEx",
            EntryPoint::SetDvcLevelEx => "NvAPI_SetDVCLevelEx",
            EntryPoint::GpuGetCoolerSettings => "NvAPI_GPU_GetCoolerSettings",
            EntryPoint::GpuSetCoolerLevels => "NvAPI_GPU_SetCoolerLevels",
        }
    }
}

// ============================================================================
// Raw signatures
// ============================================================================

pub type FnQueryInterface = unsafe extern "C" fn(id: u32) -> *mut c_void;
pub type FnInitialize = unsafe extern "C" fn() -> NvStatus;
pub type FnUnload = unsafe extern "C" fn() -> NvStatus;
pub type FnEnumNvidiaDisplayHandle =
    unsafe extern "C" fn(index: u32, handle: *mut NvDisplayHandle) -> NvStatus;
pub type FnGetAssociatedNvidiaDisplayName =
    unsafe extern "C" fn(handle: NvDisplayHandle, name: *mut u8) -> NvStatus;
pub type FnEnumPhysicalGpus =
    unsafe extern "C" fn(handles: *mut NvPhysicalGpuHandle, count: *mut u32) -> NvStatus;
pub type FnGpuGetFullName =
    unsafe extern "C" fn(gpu: NvPhysicalGpuHandle, name: *mut u8) -> NvStatus;
pub type FnGetDvcInfoEx =
    unsafe extern "C" fn(handle: NvDisplayHandle, output_id: u32, info: *mut DvcInfoEx) -> NvStatus;
pub type FnSetDvcLevelEx =
    unsafe extern "C" fn(handle: NvDisplayHandle, output_id: u32, info: *mut DvcInfoEx) -> NvStatus;
pub type FnGpuGetCoolerSettings = unsafe extern "C" fn(
    gpu: NvPhysicalGpuHandle,
    cooler_index: u32,
    settings: *mut CoolerSettings,
) -> NvStatus;
pub type FnGpuSetCoolerLevels = unsafe extern "C" fn(
    gpu: NvPhysicalGpuHandle,
    cooler_index: u32,
    levels: *const CoolerLevels,
) -> NvStatus;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<u32> = EntryPoint::ALL.iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), EntryPoint::ALL.len());
    }

    #[test]
    fn test_known_ids() {
        assert_eq!(EntryPoint::Initialize.id(), 0x0150E828);
        assert_eq!(EntryPoint::Unload.id(), 0xD22BDD7E);
        assert_eq!(EntryPoint::GetDvcInfoEx.id(), 0x0E45002D);
        assert_eq!(EntryPoint::GpuSetCoolerLevels.id(), 0x891FA0AE);
    }

    #[test]
    fn test_bootstrap_symbol_is_nul_terminated() {
        assert_eq!(QUERY_INTERFACE_SYMBOL.last(), Some(&0));
    }
}
