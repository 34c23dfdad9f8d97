use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Unknown,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown GPU vendor: {0}")]
pub struct UnknownGpuVendor(pub String);

impl GpuVendor {
    pub const KNOWN: [GpuVendor; 3] = [GpuVendor::Nvidia, GpuVendor::Amd, GpuVendor::Intel];

    /// Extracts the vendor from a device name such as `NVIDIA GeForce RTX 3080`.
    pub fn from_device_name(name: &str) -> GpuVendor {
        let name = name.to_lowercase();
        GpuVendor::KNOWN
            .iter()
            .copied()
            .find(|vendor| name.contains(vendor.as_str()))
            .unwrap_or(GpuVendor::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GpuVendor::Nvidia => "nvidia",
            GpuVendor::Amd => "amd",
            GpuVendor::Intel => "intel",
            GpuVendor::Unknown => "unknown",
        }
    }
}

impl Display for GpuVendor {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result { fmt.write_str(self.as_str()) }
}

impl FromStr for GpuVendor {
    type Err = UnknownGpuVendor;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "nvidia" => Ok(GpuVendor::Nvidia),
            "amd" => Ok(GpuVendor::Amd),
            "intel" => Ok(GpuVendor::Intel),
            "unknown" => Ok(GpuVendor::Unknown),
            _ => Err(UnknownGpuVendor(input.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("AMD Radeon RX 6800" => GpuVendor::Amd ; "amd")]
    #[test_case("NVIDIA GeForce RTX 3080" => GpuVendor::Nvidia ; "nvidia")]
    #[test_case("Intel(R) UHD Graphics 620" => GpuVendor::Intel ; "intel")]
    #[test_case("nvidia geforce gtx 1060" => GpuVendor::Nvidia ; "lowercase")]
    #[test_case("Generic Display Adapter" => GpuVendor::Unknown ; "unknown")]
    #[test_case("" => GpuVendor::Unknown ; "empty")]
    fn from_device_name(name: &str) -> GpuVendor { GpuVendor::from_device_name(name) }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("NVIDIA".parse::<GpuVendor>(), Ok(GpuVendor::Nvidia));
        assert_eq!("matrox".parse::<GpuVendor>(), Err(UnknownGpuVendor("matrox".into())));
    }
}
