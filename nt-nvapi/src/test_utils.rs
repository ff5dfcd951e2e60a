//! Test doubles for the adapter
//!
//! `FakeDriver` keeps a small in-memory model of displays and GPUs and enforces the
//! same record versioning the real driver does. Clones share state, so a test can keep
//! one clone to inspect the call log after the adapter has been dropped.

use std::cell::RefCell;
use std::ffi::c_void;
use std::rc::Rc;
use std::sync::Mutex;

use crate::driver::NvApiDriver;
use crate::ffi::*;
use crate::sink::ErrorSink;

const DISPLAY_HANDLE_BASE: usize = 0x1000;
const GPU_HANDLE_BASE: usize = 0x2000;

struct FakeDisplay {
    name: String,
    dvc: DvcInfoEx,
}

struct FakeGpu {
    name: String,
    settings: CoolerSettings,
}

#[derive(Default)]
struct FakeState {
    displays: Vec<FakeDisplay>,
    gpus: Vec<FakeGpu>,
    calls: Vec<&'static str>,
    display_enum_failures: u32,
    cooler_write_status: Option<NvStatus>,
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Rc<RefCell<FakeState>>,
}

impl FakeDriver {
    pub fn with_displays(names: &[&str]) -> Self {
        let fake = Self::default();
        for name in names {
            let mut dvc = DvcInfoEx::new();
            dvc.min_level = 0;
            dvc.max_level = 63;
            dvc.default_level = 0;
            fake.state.borrow_mut().displays.push(FakeDisplay {
                name: name.to_string(),
                dvc,
            });
        }
        fake
    }

    pub fn with_gpus(names: &[&str]) -> Self {
        let fake = Self::default();
        for name in names {
            fake.add_gpu(name);
        }
        fake
    }

    pub fn add_gpu(&self, name: &str) {
        self.state.borrow_mut().gpus.push(FakeGpu {
            name: name.to_string(),
            settings: CoolerSettings::new(),
        });
    }

    /// Replace a GPU's coolers with `(level, policy)` pairs
    pub fn set_coolers(&self, gpu: usize, coolers: &[(i32, i32)]) {
        let mut state = self.state.borrow_mut();
        let settings = &mut state.gpus[gpu].settings;
        settings.count = coolers.len() as u32;
        for (slot, &(level, policy)) in settings.coolers.iter_mut().zip(coolers) {
            slot.current_level = level;
            slot.current_policy = policy;
            slot.current_max_level = 100;
            slot.active = 1;
        }
    }

    /// The next `n` display enumeration calls fail with `NVAPI_ERROR`
    pub fn fail_next_display_enums(&self, n: u32) {
        self.state.borrow_mut().display_enum_failures = n;
    }

    pub fn fail_cooler_writes(&self, status: NvStatus) {
        self.state.borrow_mut().cooler_write_status = Some(status);
    }

    /// Lifecycle calls seen so far
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    fn display_index(handle: NvDisplayHandle) -> usize {
        (handle.as_raw() as usize).wrapping_sub(DISPLAY_HANDLE_BASE)
    }

    fn gpu_index(handle: NvPhysicalGpuHandle) -> usize {
        (handle.as_raw() as usize).wrapping_sub(GPU_HANDLE_BASE)
    }
}

impl NvApiDriver for FakeDriver {
    fn initialize(&self) -> NvStatus {
        self.state.borrow_mut().calls.push("initialize");
        NvStatus::OK
    }

    fn unload(&self) -> NvStatus {
        self.state.borrow_mut().calls.push("unload");
        NvStatus::OK
    }

    fn enum_nvidia_display_handle(&self, index: u32, handle: &mut NvDisplayHandle) -> NvStatus {
        let mut state = self.state.borrow_mut();
        if state.display_enum_failures > 0 {
            state.display_enum_failures -= 1;
            return NvStatus::ERROR;
        }
        if (index as usize) < state.displays.len() {
            *handle = NvDisplayHandle::from_raw((DISPLAY_HANDLE_BASE + index as usize) as *const c_void);
            NvStatus::OK
        } else {
            NvStatus::END_ENUMERATION
        }
    }

    fn get_associated_nvidia_display_name(
        &self,
        handle: NvDisplayHandle,
        name: &mut ShortString,
    ) -> NvStatus {
        match self.state.borrow().displays.get(Self::display_index(handle)) {
            Some(display) => {
                *name = ShortString::from_str_truncated(&display.name);
                NvStatus::OK
            }
            None => NvStatus::EXPECTED_DISPLAY_HANDLE,
        }
    }

    fn enum_physical_gpus(&self, handles: &mut PhysicalGpuHandles, count: &mut u32) -> NvStatus {
        let state = self.state.borrow();
        if state.gpus.is_empty() {
            *count = 0;
            return NvStatus::NVIDIA_DEVICE_NOT_FOUND;
        }
        for (i, slot) in handles.iter_mut().take(state.gpus.len()).enumerate() {
            *slot = NvPhysicalGpuHandle::from_raw((GPU_HANDLE_BASE + i) as *const c_void);
        }
        *count = state.gpus.len() as u32;
        NvStatus::OK
    }

    fn gpu_get_full_name(&self, gpu: NvPhysicalGpuHandle, name: &mut ShortString) -> NvStatus {
        match self.state.borrow().gpus.get(Self::gpu_index(gpu)) {
            Some(entry) => {
                *name = ShortString::from_str_truncated(&entry.name);
                NvStatus::OK
            }
            None => NvStatus::EXPECTED_PHYSICAL_GPU_HANDLE,
        }
    }

    fn get_dvc_info_ex(
        &self,
        handle: NvDisplayHandle,
        _output_id: u32,
        info: &mut DvcInfoEx,
    ) -> NvStatus {
        if info.version() != DvcInfoEx::VERSION {
            return NvStatus::INCOMPATIBLE_STRUCT_VERSION;
        }
        match self.state.borrow().displays.get(Self::display_index(handle)) {
            Some(display) => {
                *info = display.dvc;
                NvStatus::OK
            }
            None => NvStatus::EXPECTED_DISPLAY_HANDLE,
        }
    }

    fn set_dvc_level_ex(
        &self,
        handle: NvDisplayHandle,
        _output_id: u32,
        info: &mut DvcInfoEx,
    ) -> NvStatus {
        if info.version() != DvcInfoEx::VERSION {
            return NvStatus::INCOMPATIBLE_STRUCT_VERSION;
        }
        let mut state = self.state.borrow_mut();
        let Some(display) = state.displays.get_mut(Self::display_index(handle)) else {
            return NvStatus::EXPECTED_DISPLAY_HANDLE;
        };
        // The driver refuses records whose range fields do not match its own.
        if info.min_level != display.dvc.min_level
            || info.max_level != display.dvc.max_level
            || info.default_level != display.dvc.default_level
            || !display.dvc.accepts(info.current_level)
        {
            return NvStatus::INVALID_ARGUMENT;
        }
        display.dvc.current_level = info.current_level;
        NvStatus::OK
    }

    fn gpu_get_cooler_settings(
        &self,
        gpu: NvPhysicalGpuHandle,
        cooler_index: u32,
        settings: &mut CoolerSettings,
    ) -> NvStatus {
        if settings.version() != CoolerSettings::VERSION {
            return NvStatus::INCOMPATIBLE_STRUCT_VERSION;
        }
        if cooler_index != COOLER_TARGET_ALL {
            return NvStatus::INVALID_ARGUMENT;
        }
        match self.state.borrow().gpus.get(Self::gpu_index(gpu)) {
            Some(entry) => {
                *settings = entry.settings;
                NvStatus::OK
            }
            None => NvStatus::EXPECTED_PHYSICAL_GPU_HANDLE,
        }
    }

    fn gpu_set_cooler_levels(
        &self,
        gpu: NvPhysicalGpuHandle,
        cooler_index: u32,
        levels: &CoolerLevels,
    ) -> NvStatus {
        if levels.version() != CoolerLevels::VERSION {
            return NvStatus::INCOMPATIBLE_STRUCT_VERSION;
        }
        if cooler_index != COOLER_TARGET_ALL {
            return NvStatus::INVALID_ARGUMENT;
        }
        let mut state = self.state.borrow_mut();
        if let Some(status) = state.cooler_write_status {
            return status;
        }
        let Some(entry) = state.gpus.get_mut(Self::gpu_index(gpu)) else {
            return NvStatus::EXPECTED_PHYSICAL_GPU_HANDLE;
        };
        let count = entry.settings.count as usize;
        for (cooler, level) in entry.settings.coolers.iter_mut().zip(levels.levels.iter()).take(count) {
            cooler.current_level = level.level;
            cooler.current_policy = level.policy;
        }
        NvStatus::OK
    }
}

/// Sink that keeps every message for later assertions
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl ErrorSink for RecordingSink {
    fn display_error(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
