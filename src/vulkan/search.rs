//! Resolution of the directories which the Vulkan loader scans for driver manifests.
//!
//! Follows the driver discovery order of the Khronos loader on Linux
//! (`LoaderDriverInterface.md`, "Driver Discovery on Linux"), followed by a handful of
//! locations which distributions and vendor packages use outside of that standard.

use crate::environment::HostEnv;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// SYSCONFDIR and EXTRASYSCONFDIR, whose compiled-in defaults are identical.
pub const SYSCONF_DIRS: &[&str] = &["/etc"];

/// Searched after everything the loader itself would search.
pub const FALLBACK_DIRS: &[&str] = &[
    "/usr/local/etc",
    "/usr/local/share",
    "/etc",
    "/usr/share",
    // Flatpak GL extensions
    "/usr/lib/x86_64-linux-gnu/GL",
    "/usr/lib/i386-linux-gnu/GL",
    // AMDGPU-PRO
    "/opt/amdgpu-pro/etc",
];

const XDG_CONFIG_DIRS_DEFAULT: &str = "/etc/xdg";
const XDG_DATA_DIRS_DEFAULT: &str = "/usr/local/share:/usr/share";

/// The hardcoded system locations that are combined with the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct IcdSearch {
    pub sysconf_dirs:  Vec<PathBuf>,
    pub fallback_dirs: Vec<PathBuf>,
}

impl Default for IcdSearch {
    fn default() -> Self {
        IcdSearch {
            sysconf_dirs:  SYSCONF_DIRS.iter().map(PathBuf::from).collect(),
            fallback_dirs: FALLBACK_DIRS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl IcdSearch {
    /// Base directories in priority order, before `vulkan` is appended and before
    /// existence checks or deduplication.
    pub fn base_dirs(&self, env: &HostEnv) -> Vec<PathBuf> {
        let home = env.home();
        let home_dir = |relative: &str| home.as_ref().map(|home| home.join(relative));

        let mut bases = Vec::new();
        bases.extend(env_paths(env, "XDG_CONFIG_HOME", home_dir(".config")));
        bases.extend(env_paths(env, "XDG_CONFIG_DIRS", split_paths(XDG_CONFIG_DIRS_DEFAULT)));
        bases.extend(self.sysconf_dirs.iter().cloned());
        bases.extend(env_paths(env, "XDG_DATA_HOME", home_dir(".local/share")));
        bases.extend(env_paths(env, "XDG_DATA_DIRS", split_paths(XDG_DATA_DIRS_DEFAULT)));
        bases.extend(self.fallback_dirs.iter().cloned());
        bases
    }

    /// Existing `<dir>/vulkan` directories, deduplicated, in search order.
    pub fn directories(&self, env: &HostEnv) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = Vec::new();

        for base in self.base_dirs(env) {
            let path = base.join("vulkan");
            if !found.contains(&path) && path.is_dir() {
                found.push(path);
            }
        }

        debug!("vulkan search directories: {:?}", found);
        found
    }

    /// Every `icd.d/*.json` manifest beneath the search directories.
    ///
    /// Files are sorted within each directory, as directory enumeration order is not
    /// stable; directories keep their search order.
    pub fn icd_files(&self, env: &HostEnv) -> Vec<PathBuf> {
        self.directories(env).iter().flat_map(|dir| manifests_in(&dir.join("icd.d"))).collect()
    }
}

/// Paths from a colon-delimited variable, or the defaults when it is unset.
fn env_paths<D>(env: &HostEnv, var: &str, default: D) -> Vec<PathBuf>
where
    D: IntoIterator<Item = PathBuf>,
{
    match env.get(var) {
        Some(value) => split_paths(value).collect(),
        None => default.into_iter().collect(),
    }
}

fn split_paths(value: &str) -> impl Iterator<Item = PathBuf> + '_ {
    value.split(':').filter(|segment| !segment.is_empty()).map(PathBuf::from)
}

fn manifests_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name().and_then(|name| name.to_str()).map_or(false, |name| {
                !name.starts_with('.') && name.ends_with(".json")
            })
        })
        .collect::<Vec<_>>();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn empty_search() -> IcdSearch { IcdSearch { sysconf_dirs: Vec::new(), fallback_dirs: Vec::new() } }

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    #[test]
    fn defaults_follow_loader_order() {
        let env = HostEnv::from_pairs(vec![("HOME", "/home/user")]);
        let search = IcdSearch {
            sysconf_dirs:  vec![PathBuf::from("/etc")],
            fallback_dirs: vec![PathBuf::from("/opt/amdgpu-pro/etc")],
        };

        let expected: Vec<PathBuf> = vec![
            "/home/user/.config",
            "/etc/xdg",
            "/etc",
            "/home/user/.local/share",
            "/usr/local/share",
            "/usr/share",
            "/opt/amdgpu-pro/etc",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect();

        assert_eq!(search.base_dirs(&env), expected);
    }

    #[test]
    fn variables_override_defaults() {
        let env = HostEnv::from_pairs(vec![
            ("HOME", "/home/user"),
            ("XDG_CONFIG_HOME", "/cfg"),
            ("XDG_CONFIG_DIRS", "/a::/b"),
            ("XDG_DATA_HOME", "/data"),
            ("XDG_DATA_DIRS", "/c:/d"),
        ]);

        let expected: Vec<PathBuf> =
            vec!["/cfg", "/a", "/b", "/data", "/c", "/d"].into_iter().map(PathBuf::from).collect();

        assert_eq!(empty_search().base_dirs(&env), expected);
    }

    #[test]
    fn missing_home_skips_home_defaults() {
        let env = HostEnv::default();
        let expected: Vec<PathBuf> =
            vec!["/etc/xdg", "/usr/local/share", "/usr/share"].into_iter().map(PathBuf::from).collect();

        assert_eq!(empty_search().base_dirs(&env), expected);
    }

    #[test]
    fn directories_exist_and_are_unique() {
        let root = TempDir::new().unwrap();
        let root_path = root.path();
        mkdirs(root_path, &["one/vulkan", "two/vulkan", "three"]);

        let one = root_path.join("one");
        let two = root_path.join("two");
        let three = root_path.join("three");
        let data_dirs = [&two, &one, &three, &two]
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(":");

        let env = HostEnv::from_pairs(vec![
            ("XDG_CONFIG_HOME", one.display().to_string()),
            ("XDG_CONFIG_DIRS", root_path.join("missing").display().to_string()),
            ("XDG_DATA_HOME", root_path.join("missing").display().to_string()),
            ("XDG_DATA_DIRS", data_dirs),
        ]);

        let search = IcdSearch { sysconf_dirs: vec![one.clone()], fallback_dirs: vec![two.clone()] };

        assert_eq!(search.directories(&env), vec![one.join("vulkan"), two.join("vulkan")]);
        assert_eq!(search.directories(&env), search.directories(&env));
    }

    #[test]
    fn manifests_are_sorted_per_directory() {
        let root = TempDir::new().unwrap();
        let root_path = root.path();
        mkdirs(root_path, &["first/vulkan/icd.d", "second/vulkan/icd.d"]);

        for file in &[
            "first/vulkan/icd.d/radeon_icd.x86_64.json",
            "first/vulkan/icd.d/intel_icd.x86_64.json",
            "first/vulkan/icd.d/README",
            "first/vulkan/icd.d/.hidden.json",
            "second/vulkan/icd.d/amd_icd64.json",
        ] {
            fs::write(root_path.join(file), "{}").unwrap();
        }

        let env = HostEnv::from_pairs(vec![
            ("XDG_CONFIG_HOME", root_path.join("second").display().to_string()),
            ("XDG_CONFIG_DIRS", root_path.join("first").display().to_string()),
            ("XDG_DATA_HOME", root_path.join("none").display().to_string()),
            ("XDG_DATA_DIRS", root_path.join("none").display().to_string()),
        ]);

        assert_eq!(empty_search().icd_files(&env), vec![
            root_path.join("second/vulkan/icd.d/amd_icd64.json"),
            root_path.join("first/vulkan/icd.d/intel_icd.x86_64.json"),
            root_path.join("first/vulkan/icd.d/radeon_icd.x86_64.json"),
        ]);
    }
}
