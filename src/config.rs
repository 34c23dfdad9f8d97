use crate::{
    environment::HostEnv,
    vulkan::{IcdSearch, IcdVendor, UnknownIcdVendor, VULKANINFO},
};
use envfile::EnvFile;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const CONFIG_PATH: &str = "/etc/gpu-detect.conf";
pub const CONFIG_ENV: &str = "GPU_DETECT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {0:?}")]
    Read(PathBuf, #[source] io::Error),

    #[error("AMD_ICD_ORDER contains an invalid key")]
    IcdKey(#[from] UnknownIcdVendor),

    #[error("AMD_ICD_ORDER may only list AMD drivers, found {0}")]
    NotAmd(IcdVendor),

    #[error("AMD_ICD_ORDER must list at least one driver")]
    EmptyOrder,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Which AMD Vulkan implementation to hand to AMD GPUs, first available wins.
    pub amd_icd_preference: Vec<IcdVendor>,
    pub vulkaninfo:         String,
    pub icd_search:         IcdSearch,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            amd_icd_preference: IcdVendor::AMD_PREFERENCE.to_vec(),
            vulkaninfo:         VULKANINFO.to_owned(),
            icd_search:         IcdSearch::default(),
        }
    }
}

impl Config {
    /// Loads the file named by `GPU_DETECT_CONFIG`, or `/etc/gpu-detect.conf` if it
    /// exists. Without either, the defaults are used.
    pub fn load(env: &HostEnv) -> Result<Self, ConfigError> {
        match env.get(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(path)),
            None if Path::new(CONFIG_PATH).exists() => Self::from_file(Path::new(CONFIG_PATH)),
            None => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = EnvFile::new(path).map_err(|why| ConfigError::Read(path.to_owned(), why))?;
        info!("loaded configuration from {}", path.display());

        let mut config = Config::default();

        if let Some(order) = file.get("AMD_ICD_ORDER") {
            config.amd_icd_preference = parse_amd_order(order)?;
        }

        if let Some(program) = file.get("VULKANINFO").filter(|program| !program.is_empty()) {
            config.vulkaninfo = program.to_owned();
        }

        if let Some(dirs) = file.get("ICD_FALLBACK_DIRS") {
            config.icd_search.fallback_dirs =
                dirs.split(':').filter(|dir| !dir.is_empty()).map(PathBuf::from).collect();
        }

        Ok(config)
    }
}

/// Parses a comma-separated list of AMD ICD keys, such as `amdvlk,amdradv`.
pub fn parse_amd_order(input: &str) -> Result<Vec<IcdVendor>, ConfigError> {
    let mut order = Vec::new();

    for key in input.split(',').map(str::trim).filter(|key| !key.is_empty()) {
        let vendor = key.parse::<IcdVendor>()?;
        if !vendor.is_amd() {
            return Err(ConfigError::NotAmd(vendor));
        }

        if !order.contains(&vendor) {
            order.push(vendor);
        }
    }

    if order.is_empty() {
        return Err(ConfigError::EmptyOrder);
    }

    Ok(order)
}
