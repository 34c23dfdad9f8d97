use super::icd::join_paths;
use crate::host::CommandRunner;
use serde_derive::Serialize;
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Display, Formatter},
    io,
    path::PathBuf,
};
use thiserror::Error;

pub const VULKANINFO: &str = "vulkaninfo";

/// What `vulkaninfo` reported as the name of the active device.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DeviceName {
    /// `vulkaninfo` is not installed.
    ToolMissing,
    NoDeviceFound,
    /// The loader or driver reported an error instead of a device.
    DriverError(String),
    Detected(String),
}

impl DeviceName {
    pub fn name(&self) -> Option<&str> {
        match self {
            DeviceName::Detected(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for DeviceName {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            DeviceName::ToolMissing => fmt.write_str("Unknown GPU"),
            DeviceName::NoDeviceFound => fmt.write_str("No GPU"),
            DeviceName::DriverError(message) => fmt.write_str(message),
            DeviceName::Detected(name) => fmt.write_str(name),
        }
    }
}

#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("vulkaninfo tool not found")]
    ToolMissing,
    #[error("failed to execute vulkaninfo")]
    Exec(#[source] io::Error),
}

/// Reads the device name from `vulkaninfo --summary` output.
///
/// The first `deviceName = ...` line wins, and a trailing parenthesized driver detail
/// such as `(RADV NAVI21)` is removed.
pub fn parse_device_name(stdout: &str, stderr: &str) -> DeviceName {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("deviceName") && line.contains('='));

    if let Some(line) = line {
        let name = strip_driver_detail(line.splitn(2, '=').nth(1).unwrap_or(""));

        return if name.is_empty() {
            DeviceName::NoDeviceFound
        } else {
            DeviceName::Detected(name.to_owned())
        };
    }

    stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .find(|line| line.contains("ERROR"))
        .map_or(DeviceName::NoDeviceFound, |line| DeviceName::DriverError(line.to_owned()))
}

fn strip_driver_detail(value: &str) -> &str {
    let value = value.trim();
    if !value.ends_with(')') {
        return value;
    }

    // Walk back to the parenthesis that opens the trailing group.
    let mut depth = 0usize;
    for (start, c) in value.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return value[..start].trim_end();
                }
            }
            _ => (),
        }
    }

    value
}

/// Memoizes `vulkaninfo` queries for the lifetime of a detection session.
pub struct VulkanInfo<R> {
    runner:  R,
    program: String,
    names:   RefCell<HashMap<(Vec<PathBuf>, bool), DeviceName>>,
}

impl<R: CommandRunner> VulkanInfo<R> {
    pub fn new(runner: R) -> Self { Self::with_program(runner, VULKANINFO) }

    pub fn with_program(runner: R, program: impl Into<String>) -> Self {
        VulkanInfo { runner, program: program.into(), names: RefCell::new(HashMap::new()) }
    }

    /// The name of the device the loader selects, optionally restricted to the given
    /// ICD manifests, and optionally on the discrete GPU via `DRI_PRIME=1`.
    pub fn device_name(&self, icd_files: &[PathBuf], discrete: bool) -> DeviceName {
        let key = (icd_files.to_vec(), discrete);
        if let Some(name) = self.names.borrow().get(&key) {
            return name.clone();
        }

        let name = self.query_name(icd_files, discrete);
        info!("vulkan device (discrete: {}): {}", discrete, name);
        self.names.borrow_mut().insert(key, name.clone());
        name
    }

    fn query_name(&self, icd_files: &[PathBuf], discrete: bool) -> DeviceName {
        let icd = join_paths(icd_files);
        let mut envs = Vec::new();
        if discrete {
            envs.push(("DRI_PRIME", "1"));
        }

        if !icd.is_empty() {
            envs.push(("VK_ICD_FILENAMES", icd.as_str()));
            envs.push(("VK_DRIVER_FILES", icd.as_str()));
        }

        match self.runner.run(&self.program, &["--summary"], &envs) {
            Ok(output) => parse_device_name(&output.stdout, &output.stderr),
            Err(ref why) if why.kind() == io::ErrorKind::NotFound => {
                info!("{} tool not found", self.program);
                DeviceName::ToolMissing
            }
            Err(why) => {
                warn!("failed to execute {}: {}", self.program, why);
                DeviceName::DriverError(why.to_string())
            }
        }
    }

    /// The complete diagnostic output of `vulkaninfo`.
    ///
    /// When it fails, the loader errors from stderr follow whatever was printed.
    pub fn raw_dump(&self) -> Result<String, DiagnosticError> {
        match self.runner.run(&self.program, &[], &[]) {
            Ok(output) if output.success => Ok(output.stdout),
            Ok(output) => {
                warn!("{} exited with an error", self.program);
                let mut dump = output.stdout;
                if !dump.is_empty() && !dump.ends_with('\n') {
                    dump.push('\n');
                }
                dump.push_str(&output.stderr);
                Ok(dump)
            }
            Err(ref why) if why.kind() == io::ErrorKind::NotFound => Err(DiagnosticError::ToolMissing),
            Err(why) => Err(DiagnosticError::Exec(why)),
        }
    }
}
