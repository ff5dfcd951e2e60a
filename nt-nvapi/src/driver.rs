//! Safe call surface over the NvAPI entry points
//!
//! The adapter talks to the driver only through [`NvApiDriver`]. The real
//! implementation is [`crate::library::NvApiLibrary`]; tests substitute their own.

use crate::ffi::{
    CoolerLevels, CoolerSettings, DvcInfoEx, NvDisplayHandle, NvPhysicalGpuHandle, NvStatus,
    PhysicalGpuHandles, ShortString,
};

/// One method per resolved entry point. Outputs are written through `&mut` and the
/// raw driver status is returned untouched.
#[cfg_attr(test, mockall::automock)]
pub trait NvApiDriver {
    fn initialize(&self) -> NvStatus;

    fn unload(&self) -> NvStatus;

    fn enum_nvidia_display_handle(&self, index: u32, handle: &mut NvDisplayHandle) -> NvStatus;

    fn get_associated_nvidia_display_name(
        &self,
        handle: NvDisplayHandle,
        name: &mut ShortString,
    ) -> NvStatus;

    fn enum_physical_gpus(&self, handles: &mut PhysicalGpuHandles, count: &mut u32) -> NvStatus;

    fn gpu_get_full_name(&self, gpu: NvPhysicalGpuHandle, name: &mut ShortString) -> NvStatus;

    fn get_dvc_info_ex(
        &self,
        handle: NvDisplayHandle,
        output_id: u32,
        info: &mut DvcInfoEx,
    ) -> NvStatus;

    fn set_dvc_level_ex(
        &self,
        handle: NvDisplayHandle,
        output_id: u32,
        info: &mut DvcInfoEx,
    ) -> NvStatus;

    fn gpu_get_cooler_settings(
        &self,
        gpu: NvPhysicalGpuHandle,
        cooler_index: u32,
        settings: &mut CoolerSettings,
    ) -> NvStatus;

    fn gpu_set_cooler_levels(
        &self,
        gpu: NvPhysicalGpuHandle,
        cooler_index: u32,
        levels: &CoolerLevels,
    ) -> NvStatus;
}
