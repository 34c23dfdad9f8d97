//! Vulkan driver (ICD) discovery, and device names as reported by `vulkaninfo`.

mod icd;
mod info;
mod search;

pub use self::{
    icd::{IcdLoaders, IcdVendor, UnknownIcdVendor},
    info::{parse_device_name, DeviceName, DiagnosticError, VulkanInfo, VULKANINFO},
    search::{IcdSearch, FALLBACK_DIRS, SYSCONF_DIRS},
};
