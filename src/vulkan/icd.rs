use super::search::IcdSearch;
use crate::environment::HostEnv;
use serde_derive::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    path::PathBuf,
    str::FromStr,
};
use thiserror::Error;

/// The driver family that an ICD manifest belongs to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IcdVendor {
    Intel,
    AmdRadv,
    AmdVlkPro,
    AmdVlk,
    Nvidia,
    Unknown,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown ICD vendor key: {0}")]
pub struct UnknownIcdVendor(pub String);

impl IcdVendor {
    pub const ALL: [IcdVendor; 6] = [
        IcdVendor::Intel,
        IcdVendor::AmdRadv,
        IcdVendor::AmdVlkPro,
        IcdVendor::AmdVlk,
        IcdVendor::Nvidia,
        IcdVendor::Unknown,
    ];

    /// AMD driver implementations, in the order they are preferred by default.
    pub const AMD_PREFERENCE: [IcdVendor; 3] =
        [IcdVendor::AmdRadv, IcdVendor::AmdVlkPro, IcdVendor::AmdVlk];

    /// Classifies a manifest path by the first vendor keyword it contains.
    ///
    /// Keywords are tested in a fixed order, so `radeon` wins over `amd`, and anything
    /// that matches nothing is `Unknown`. AMDGPU-PRO only marks its manifest by the
    /// directory it is installed to, so the whole path is a candidate.
    pub fn classify(candidate: &str) -> IcdVendor {
        let candidate = candidate.to_lowercase();

        if candidate.contains("intel") {
            IcdVendor::Intel
        } else if candidate.contains("radeon") {
            IcdVendor::AmdRadv
        } else if candidate.contains("nvidia") {
            IcdVendor::Nvidia
        } else if candidate.contains("amd") {
            if candidate.contains("pro") {
                IcdVendor::AmdVlkPro
            } else {
                IcdVendor::AmdVlk
            }
        } else {
            IcdVendor::Unknown
        }
    }

    pub fn is_amd(self) -> bool {
        matches!(self, IcdVendor::AmdRadv | IcdVendor::AmdVlkPro | IcdVendor::AmdVlk)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IcdVendor::Intel => "intel",
            IcdVendor::AmdRadv => "amdradv",
            IcdVendor::AmdVlkPro => "amdvlkpro",
            IcdVendor::AmdVlk => "amdvlk",
            IcdVendor::Nvidia => "nvidia",
            IcdVendor::Unknown => "unknown",
        }
    }
}

impl Display for IcdVendor {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result { fmt.write_str(self.as_str()) }
}

impl FromStr for IcdVendor {
    type Err = UnknownIcdVendor;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        IcdVendor::ALL
            .iter()
            .copied()
            .find(|vendor| vendor.as_str() == input)
            .ok_or_else(|| UnknownIcdVendor(input.to_owned()))
    }
}

/// ICD manifests grouped by the driver family they belong to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IcdLoaders {
    loaders: BTreeMap<IcdVendor, Vec<PathBuf>>,
}

impl IcdLoaders {
    /// Scans the system for manifests and classifies them.
    pub fn discover(search: &IcdSearch, env: &HostEnv) -> Self {
        let loaders = Self::from_files(search.icd_files(env));
        info!("found {} Vulkan ICD manifests", loaders.len());
        loaders
    }

    /// Classifies each path, preserving the order given.
    pub fn from_files<I: IntoIterator<Item = PathBuf>>(files: I) -> Self {
        let mut loaders: BTreeMap<IcdVendor, Vec<PathBuf>> = BTreeMap::new();

        for file in files {
            let vendor = IcdVendor::classify(&file.to_string_lossy());
            debug!("classified {} as {}", file.display(), vendor);
            loaders.entry(vendor).or_default().push(file);
        }

        IcdLoaders { loaders }
    }

    pub fn files(&self, vendor: IcdVendor) -> &[PathBuf] {
        self.loaders.get(&vendor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The manifests of a vendor joined with `:`, as `VK_ICD_FILENAMES` expects.
    pub fn joined(&self, vendor: IcdVendor) -> String { join_paths(self.files(vendor)) }

    /// Same as `files`, but an unrecognized key yields nothing.
    pub fn files_for_key(&self, key: &str) -> &[PathBuf] {
        match key.parse::<IcdVendor>() {
            Ok(vendor) => self.files(vendor),
            Err(_) => &[],
        }
    }

    pub fn joined_for_key(&self, key: &str) -> String { join_paths(self.files_for_key(key)) }

    /// The joined manifests of the first vendor in `preference` that has any.
    pub fn first_joined(&self, preference: &[IcdVendor]) -> String {
        preference
            .iter()
            .map(|&vendor| self.files(vendor))
            .find(|files| !files.is_empty())
            .map(join_paths)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IcdVendor, &[PathBuf])> {
        self.loaders.iter().map(|(&vendor, files)| (vendor, files.as_slice()))
    }

    pub fn len(&self) -> usize { self.loaders.values().map(Vec::len).sum() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

pub(crate) fn join_paths(paths: &[PathBuf]) -> String {
    let mut joined = String::new();
    for (id, path) in paths.iter().enumerate() {
        if id != 0 {
            joined.push(':');
        }
        joined.push_str(&path.to_string_lossy());
    }

    joined
}
