use super::GpuVendor;
use crate::vulkan::{IcdLoaders, IcdVendor};
use serde_derive::Serialize;
use std::{collections::BTreeMap, path::PathBuf};

/// Everything a launcher needs to run a program on one GPU.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GpuRecord {
    pub vendor: GpuVendor,
    pub name:   String,
    /// Variables to merge into the environment of the launched process.
    pub envs:   BTreeMap<String, String>,
    /// ICD manifests for `VK_ICD_FILENAMES`, joined with `:`; empty when none apply.
    pub icd:    String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvngx_path: Option<PathBuf>,
}

impl GpuRecord {
    fn new(vendor: GpuVendor, envs: &[(&str, &str)], icd: String) -> Self {
        GpuRecord {
            vendor,
            name: String::new(),
            envs: envs.iter().map(|&(key, value)| (key.to_owned(), value.to_owned())).collect(),
            icd,
            nvngx_path: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

const NVIDIA_ENVS: &[(&str, &str)] = &[
    ("__NV_PRIME_RENDER_OFFLOAD", "1"),
    ("__GLX_VENDOR_LIBRARY_NAME", "nvidia"),
    ("__VK_LAYER_NV_optimus", "NVIDIA_only"),
];

const DRI_PRIME_ENVS: &[(&str, &str)] = &[("DRI_PRIME", "1")];

/// Host facts which decide the content of the vendor templates.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateInputs<'a> {
    pub loaders:            &'a IcdLoaders,
    pub amd_icd_preference: &'a [IcdVendor],
    /// The open source `nouveau` driver is bound instead of NVIDIA's.
    pub nouveau:            bool,
    pub nvngx_path:         Option<PathBuf>,
}

/// The launch template of every vendor.
#[derive(Clone, Debug, PartialEq)]
pub struct VendorTemplates(BTreeMap<GpuVendor, GpuRecord>);

impl VendorTemplates {
    pub fn new(inputs: TemplateInputs) -> Self {
        let loaders = inputs.loaders;
        let mut templates = BTreeMap::new();

        let mut nvidia = if inputs.nouveau {
            GpuRecord::new(GpuVendor::Nvidia, DRI_PRIME_ENVS, String::new())
        } else {
            GpuRecord::new(GpuVendor::Nvidia, NVIDIA_ENVS, loaders.joined(IcdVendor::Nvidia))
        };
        nvidia.nvngx_path = inputs.nvngx_path;
        templates.insert(GpuVendor::Nvidia, nvidia);

        let amd_icd = loaders.first_joined(inputs.amd_icd_preference);
        templates.insert(GpuVendor::Amd, GpuRecord::new(GpuVendor::Amd, DRI_PRIME_ENVS, amd_icd));

        let intel_icd = loaders.joined(IcdVendor::Intel);
        templates.insert(GpuVendor::Intel, GpuRecord::new(GpuVendor::Intel, DRI_PRIME_ENVS, intel_icd));

        let unknown = GpuRecord::new(GpuVendor::Unknown, &[], loaders.joined(IcdVendor::Unknown));
        templates.insert(GpuVendor::Unknown, unknown.named("unknown"));

        VendorTemplates(templates)
    }

    pub fn get(&self, vendor: GpuVendor) -> &GpuRecord {
        // Every vendor is inserted by `new`.
        &self.0[&vendor]
    }

    /// The template of a vendor, carrying the name of the detected device.
    pub fn record(&self, vendor: GpuVendor, name: impl Into<String>) -> GpuRecord {
        self.get(vendor).clone().named(name)
    }
}
