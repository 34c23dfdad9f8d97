//! Detection of the active GPUs, and of the environment needed to launch a program on each.

mod templates;
mod vendor;

pub use self::{
    templates::{GpuRecord, TemplateInputs, VendorTemplates},
    vendor::{GpuVendor, UnknownGpuVendor},
};

use crate::{
    config::Config,
    environment::HostEnv,
    host::{self, CommandRunner, PciDevices},
    vulkan::{DeviceName, IcdLoaders, VulkanInfo},
};
use serde_derive::Serialize;

/// The integrated and discrete halves of a hybrid graphics system.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prime {
    pub integrated: GpuRecord,
    pub discrete:   GpuRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GpuReport {
    /// The GPU which programs run on by default.
    pub vendors: GpuRecord,
    /// Present when a secondary GPU from another vendor is selectable with PRIME.
    pub prime:   Option<Prime>,
}

impl GpuReport {
    /// Pairs the default device with the one selected by `DRI_PRIME=1`.
    ///
    /// Two GPUs from the same vendor cannot be told apart by vendor alone, so such a
    /// system is reported without a PRIME pairing.
    pub fn assemble(templates: &VendorTemplates, primary: &DeviceName, secondary: &DeviceName) -> Self {
        let vendor = primary.name().map_or(GpuVendor::Unknown, GpuVendor::from_device_name);
        let gpu = templates.record(vendor, primary.to_string());

        let prime = secondary.name().and_then(|name| {
            let prime_vendor = GpuVendor::from_device_name(name);
            if prime_vendor == vendor {
                return None;
            }

            info!("hybrid graphics detected: {} with {}", vendor, prime_vendor);
            Some(Prime { integrated: gpu.clone(), discrete: templates.record(prime_vendor, name) })
        });

        GpuReport { vendors: gpu, prime }
    }
}

/// A detection session, holding everything that is probed at most once.
pub struct GpuProbe<R> {
    runner:  R,
    config:  Config,
    loaders: IcdLoaders,
    vulkan:  VulkanInfo<R>,
    pci:     PciDevices<R>,
}

impl<R: CommandRunner + Clone> GpuProbe<R> {
    pub fn new(runner: R, config: Config, env: &HostEnv) -> Self {
        let loaders = IcdLoaders::discover(&config.icd_search, env);
        GpuProbe::with_loaders(runner, config, loaders)
    }

    pub fn with_loaders(runner: R, config: Config, loaders: IcdLoaders) -> Self {
        GpuProbe {
            vulkan: VulkanInfo::with_program(runner.clone(), config.vulkaninfo.as_str()),
            pci: PciDevices::new(runner.clone()),
            runner,
            config,
            loaders,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn loaders(&self) -> &IcdLoaders { &self.loaders }

    pub fn vulkan(&self) -> &VulkanInfo<R> { &self.vulkan }

    /// Whether a device from `vendor` is on the PCI bus.
    pub fn has_gpu(&self, vendor: GpuVendor) -> bool { self.pci.has_vendor(vendor) }

    pub fn templates(&self) -> VendorTemplates {
        VendorTemplates::new(TemplateInputs {
            loaders:            &self.loaders,
            amd_icd_preference: &self.config.amd_icd_preference,
            nouveau:            host::is_nouveau(&self.runner),
            nvngx_path:         host::nvngx_dir(&self.runner),
        })
    }

    pub fn detect(&self) -> GpuReport {
        let templates = self.templates();
        let primary = self.vulkan.device_name(&[], false);
        let secondary = self.vulkan.device_name(&[], true);

        GpuReport::assemble(&templates, &primary, &secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::runner::{fake::FakeRunner, Captured},
        vulkan::VULKANINFO,
    };
    use std::path::PathBuf;

    const LSMOD_NVIDIA: &str = "Module Size Used by\nnvidia_drm 73728 4\nnvidia 56492032 2\n";
    const LSMOD_NOUVEAU: &str = "Module Size Used by\nnouveau 2289664 1\n";

    fn loaders() -> IcdLoaders {
        IcdLoaders::from_files(
            vec!["/usr/share/vulkan/icd.d/intel_icd.x86_64.json", "/usr/share/vulkan/icd.d/nvidia_icd.json"]
                .into_iter()
                .map(PathBuf::from),
        )
    }

    fn device(name: &str) -> Captured { Captured::ok(&format!("GPU0:\n\tdeviceName = {}\n", name)) }

    fn probe(runner: &FakeRunner) -> GpuProbe<&FakeRunner> {
        GpuProbe::with_loaders(runner, Config::default(), loaders())
    }

    #[test]
    fn hybrid_system_reports_prime() {
        let runner = FakeRunner::default()
            .respond("lsmod", false, Captured::ok(LSMOD_NVIDIA))
            .respond(VULKANINFO, false, device("Intel(R) UHD Graphics 630 (CFL GT2)"))
            .respond(VULKANINFO, true, device("NVIDIA GeForce GTX 1650"));

        let report = probe(&runner).detect();

        assert_eq!(report.vendors.vendor, GpuVendor::Intel);
        assert_eq!(report.vendors.name, "Intel(R) UHD Graphics 630");
        assert_eq!(report.vendors.icd, "/usr/share/vulkan/icd.d/intel_icd.x86_64.json");

        let prime = report.prime.expect("prime pairing");
        assert_eq!(prime.integrated, report.vendors);
        assert_eq!(prime.discrete.vendor, GpuVendor::Nvidia);
        assert_eq!(prime.discrete.name, "NVIDIA GeForce GTX 1650");
        assert_eq!(prime.discrete.envs["__NV_PRIME_RENDER_OFFLOAD"], "1");
        assert_eq!(prime.discrete.icd, "/usr/share/vulkan/icd.d/nvidia_icd.json");
    }

    #[test]
    fn single_gpu_has_no_prime() {
        let runner = FakeRunner::default()
            .respond("lsmod", false, Captured::ok(LSMOD_NVIDIA))
            .respond(VULKANINFO, false, device("AMD Radeon RX 6800 (RADV NAVI21)"));

        let report = probe(&runner).detect();

        assert_eq!(report.vendors.vendor, GpuVendor::Amd);
        assert_eq!(report.vendors.name, "AMD Radeon RX 6800");
        assert_eq!(report.prime, None);
    }

    #[test]
    fn nouveau_discrete_gpu() {
        let runner = FakeRunner::default()
            .respond("lsmod", false, Captured::ok(LSMOD_NOUVEAU))
            .respond(VULKANINFO, false, device("Intel(R) HD Graphics 530 (SKL GT2)"))
            .respond(VULKANINFO, true, device("NVIDIA NV117 (nouveau)"));

        let discrete = probe(&runner).detect().prime.expect("prime pairing").discrete;

        assert_eq!(discrete.envs.len(), 1);
        assert_eq!(discrete.envs["DRI_PRIME"], "1");
        assert_eq!(discrete.icd, "");
    }

    #[test]
    fn missing_vulkaninfo_is_unknown() {
        let runner = FakeRunner::default();
        let report = probe(&runner).detect();

        assert_eq!(report.vendors.vendor, GpuVendor::Unknown);
        assert_eq!(report.vendors.name, "Unknown GPU");
        assert!(report.vendors.envs.is_empty());
        assert_eq!(report.prime, None);
    }

    #[test]
    fn secondary_without_device_has_no_prime() {
        let templates = VendorTemplates::new(TemplateInputs {
            loaders:            &loaders(),
            amd_icd_preference: &[],
            nouveau:            false,
            nvngx_path:         None,
        });

        let report = GpuReport::assemble(
            &templates,
            &DeviceName::Detected("Intel Arc A770".into()),
            &DeviceName::NoDeviceFound,
        );

        assert_eq!(report.vendors.vendor, GpuVendor::Intel);
        assert_eq!(report.prime, None);
    }

    #[test]
    fn has_gpu_uses_lspci() {
        let runner = FakeRunner::default().respond(
            "lspci",
            false,
            Captured::ok("03:00.0 VGA compatible controller: Advanced Micro Devices, Inc. [AMD/ATI] Navi 21\n"),
        );
        let probe = probe(&runner);

        assert!(probe.has_gpu(GpuVendor::Amd));
        assert!(!probe.has_gpu(GpuVendor::Nvidia));
    }
}
