#![deny(clippy::all)]
#![allow(clippy::useless_attribute)]

#[macro_use]
extern crate log;

pub mod config;
pub mod environment;
pub mod gpu;
pub mod host;
pub mod vulkan;

pub use self::{
    config::{Config, ConfigError},
    environment::HostEnv,
    gpu::{GpuProbe, GpuRecord, GpuReport, GpuVendor, Prime},
    vulkan::{DeviceName, IcdLoaders, IcdSearch, IcdVendor, VulkanInfo},
};
