//! Probes of the host which shell out to external tools.

pub mod modules;
pub mod nvidia;
pub mod pci;
pub mod runner;

pub use self::{
    modules::{is_nouveau, KernelModules},
    nvidia::nvngx_dir,
    pci::PciDevices,
    runner::{Captured, CommandRunner, SystemRunner},
};
