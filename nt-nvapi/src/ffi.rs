//! NvAPI ABI types
//!
//! Layouts here are dictated by the driver. Every record that crosses the boundary
//! carries a `version` word of `size_of::<Self>() | (struct version << 16)`, and the
//! driver rejects a record whose tag does not match what it expects.

use std::ffi::c_void;
use std::fmt;
use std::mem::size_of;

/// Capacity of the physical GPU handle table filled by `EnumPhysicalGPUs`
pub const NVAPI_MAX_PHYSICAL_GPUS: usize = 64;

/// Size of an `NvAPI_ShortString`
pub const NVAPI_SHORT_STRING_MAX: usize = 64;

/// Number of cooler slots in the cooler settings/levels records
pub const NVAPI_MAX_COOLERS_PER_GPU: usize = 20;

/// Cooler target bitmask meaning "all coolers"
pub const COOLER_TARGET_ALL: u32 = 7;

/// Cooler policy meaning manual (user-controlled) level
pub const COOLER_POLICY_MANUAL: i32 = 1;

/// Output id passed to the DVC calls (0 = the display's default output)
pub const DEFAULT_OUTPUT_ID: u32 = 0;

// ============================================================================
// Status codes
// ============================================================================

/// Status returned by every driver call
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NvStatus(pub i32);

impl NvStatus {
    pub const OK: NvStatus = NvStatus(0);
    pub const ERROR: NvStatus = NvStatus(-1);
    pub const LIBRARY_NOT_FOUND: NvStatus = NvStatus(-2);
    pub const NO_IMPLEMENTATION: NvStatus = NvStatus(-3);
    pub const API_NOT_INITIALIZED: NvStatus = NvStatus(-4);
    pub const INVALID_ARGUMENT: NvStatus = NvStatus(-5);
    pub const NVIDIA_DEVICE_NOT_FOUND: NvStatus = NvStatus(-6);
    pub const END_ENUMERATION: NvStatus = NvStatus(-7);
    pub const INVALID_HANDLE: NvStatus = NvStatus(-8);
    pub const INCOMPATIBLE_STRUCT_VERSION: NvStatus = NvStatus(-9);
    pub const HANDLE_INVALIDATED: NvStatus = NvStatus(-10);
    pub const EXPECTED_PHYSICAL_GPU_HANDLE: NvStatus = NvStatus(-101);
    pub const EXPECTED_DISPLAY_HANDLE: NvStatus = NvStatus(-102);
    pub const NOT_SUPPORTED: NvStatus = NvStatus(-104);

    #[inline]
    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    #[inline]
    pub fn code(self) -> i32 {
        self.0
    }

    /// Symbolic name as used in the NvAPI headers
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "NVAPI_OK",
            -1 => "NVAPI_ERROR",
            -2 => "NVAPI_LIBRARY_NOT_FOUND",
            -3 => "NVAPI_NO_IMPLEMENTATION",
            -4 => "NVAPI_API_NOT_INITIALIZED",
            -5 => "NVAPI_INVALID_ARGUMENT",
            -6 => "NVAPI_NVIDIA_DEVICE_NOT_FOUND",
            -7 => "NVAPI_END_ENUMERATION",
            -8 => "NVAPI_INVALID_HANDLE",
            -9 => "NVAPI_INCOMPATIBLE_STRUCT_VERSION",
            -10 => "NVAPI_HANDLE_INVALIDATED",
            -101 => "NVAPI_EXPECTED_PHYSICAL_GPU_HANDLE",
            -102 => "NVAPI_EXPECTED_DISPLAY_HANDLE",
            -104 => "NVAPI_NOT_SUPPORTED",
            _ => "NVAPI_UNKNOWN_STATUS",
        }
    }
}

impl fmt::Display for NvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

// ============================================================================
// Opaque handles
// ============================================================================

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(*const c_void);

        // SAFETY: the handle is a token issued by the driver and never dereferenced here.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}

        impl $name {
            pub const fn null() -> Self {
                Self(std::ptr::null())
            }

            /// Wrap a raw token issued by a driver implementation
            pub const fn from_raw(raw: *const c_void) -> Self {
                Self(raw)
            }

            pub const fn as_raw(self) -> *const c_void {
                self.0
            }

            pub fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }
    };
}

opaque_handle!(
    /// Driver token for an NVIDIA-driven display
    NvDisplayHandle
);
opaque_handle!(
    /// Driver token for a physical GPU
    NvPhysicalGpuHandle
);

/// Handle table filled by `EnumPhysicalGPUs`
pub type PhysicalGpuHandles = [NvPhysicalGpuHandle; NVAPI_MAX_PHYSICAL_GPUS];

// ============================================================================
// Strings
// ============================================================================

/// Fixed-capacity, NUL-terminated `NvAPI_ShortString`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShortString(pub [u8; NVAPI_SHORT_STRING_MAX]);

impl ShortString {
    pub const fn new() -> Self {
        Self([0; NVAPI_SHORT_STRING_MAX])
    }

    /// Copy `s` in, truncating so the terminator always fits
    pub fn from_str_truncated(s: &str) -> Self {
        let mut out = Self::new();
        let len = s.len().min(NVAPI_SHORT_STRING_MAX - 1);
        out.0[..len].copy_from_slice(&s.as_bytes()[..len]);
        out
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.0.as_mut_ptr()
    }

    /// Contents up to the first NUL (or the whole buffer if the driver left none)
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NVAPI_SHORT_STRING_MAX);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl Default for ShortString {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShortString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortString({:?})", self.to_string_lossy())
    }
}

// ============================================================================
// Version-tagged records
// ============================================================================

const fn version_tag(size: usize, version: u32) -> u32 {
    size as u32 | (version << 16)
}

/// Digital vibrance levels of one display (`NV_DISPLAY_DVC_INFO_EX`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvcInfoEx {
    version: u32,
    pub current_level: i32,
    pub min_level: i32,
    pub max_level: i32,
    pub default_level: i32,
}

impl DvcInfoEx {
    pub const VERSION: u32 = version_tag(size_of::<Self>(), 1);

    /// Zeroed record, stamped and ready to hand to the driver
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            current_level: 0,
            min_level: 0,
            max_level: 0,
            default_level: 0,
        }
    }

    pub fn prepare(&mut self) {
        self.version = Self::VERSION;
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// True when `level` lies within the driver-reported range
    pub fn accepts(&self, level: i32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

impl Default for DvcInfoEx {
    fn default() -> Self {
        Self::new()
    }
}

/// One cooler slot of `NV_GPU_COOLER_SETTINGS`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoolerSetting {
    pub cooler_type: i32,
    pub controller: i32,
    pub default_min_level: i32,
    pub default_max_level: i32,
    pub current_min_level: i32,
    pub current_max_level: i32,
    pub current_level: i32,
    pub default_policy: i32,
    pub current_policy: i32,
    pub target: i32,
    pub control_type: i32,
    pub active: i32,
}

/// Per-cooler state of a physical GPU (`NV_GPU_COOLER_SETTINGS`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoolerSettings {
    version: u32,
    pub count: u32,
    pub coolers: [CoolerSetting; NVAPI_MAX_COOLERS_PER_GPU],
}

impl CoolerSettings {
    pub const VERSION: u32 = version_tag(size_of::<Self>(), 3);

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            count: 0,
            coolers: [CoolerSetting::default(); NVAPI_MAX_COOLERS_PER_GPU],
        }
    }

    pub fn prepare(&mut self) {
        self.version = Self::VERSION;
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Coolers the driver reported as present
    pub fn valid(&self) -> &[CoolerSetting] {
        let count = (self.count as usize).min(NVAPI_MAX_COOLERS_PER_GPU);
        &self.coolers[..count]
    }
}

impl Default for CoolerSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of `NV_GPU_COOLER_LEVELS`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoolerLevel {
    pub level: i32,
    pub policy: i32,
}

/// Requested level/policy per cooler (`NV_GPU_COOLER_LEVELS`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoolerLevels {
    version: u32,
    pub levels: [CoolerLevel; NVAPI_MAX_COOLERS_PER_GPU],
}

impl CoolerLevels {
    pub const VERSION: u32 = version_tag(size_of::<Self>(), 1);

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            levels: [CoolerLevel::default(); NVAPI_MAX_COOLERS_PER_GPU],
        }
    }

    pub fn prepare(&mut self) {
        self.version = Self::VERSION;
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Seed from current settings so untouched coolers keep their level and policy
    pub fn from_settings(settings: &CoolerSettings) -> Self {
        let mut levels = Self::new();
        for (slot, cooler) in levels.levels.iter_mut().zip(settings.valid()) {
            slot.level = cooler.current_level;
            slot.policy = cooler.current_policy;
        }
        levels
    }
}

impl Default for CoolerLevels {
    fn default() -> Self {
        Self::new()
    }
}
