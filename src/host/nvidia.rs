use super::runner::CommandRunner;
use std::{
    io,
    path::{Path, PathBuf},
};

const GLX_LIBRARY: &str = "libGLX_nvidia.so.0";

/// `ldconfig` is frequently outside of an unprivileged user's `PATH`.
const LDCONFIG: &[&str] = &["ldconfig", "/sbin/ldconfig"];

/// Locates the directory holding the NVIDIA `nvngx.dll` libraries (DLSS), which the
/// proprietary driver installs as `nvidia/wine` beside its GLX library.
pub fn nvngx_dir<R: CommandRunner>(runner: &R) -> Option<PathBuf> {
    let cache = match ldconfig_cache(runner) {
        Ok(cache) => cache,
        Err(why) => {
            debug!("unable to read the linker cache: {}", why);
            return None;
        }
    };

    let library = glx_library(&cache)?;
    let dir = library.parent()?.join("nvidia/wine");

    if dir.join("nvngx.dll").exists() {
        Some(dir)
    } else {
        debug!("{} has no nvngx.dll", dir.display());
        None
    }
}

fn ldconfig_cache<R: CommandRunner>(runner: &R) -> io::Result<String> {
    let mut last_error = io::Error::new(io::ErrorKind::NotFound, "ldconfig was not found");

    for program in LDCONFIG {
        match runner.run(program, &["-p"], &[]).and_then(|output| output.into_result(program)) {
            Ok(output) => return Ok(output.stdout),
            Err(why) => last_error = why,
        }
    }

    Err(last_error)
}

/// Finds the path of the GLX library in `ldconfig -p` output, preferring the 64-bit one.
fn glx_library(cache: &str) -> Option<&Path> {
    let mut fallback = None;

    for line in cache.lines().map(str::trim).filter(|line| line.starts_with(GLX_LIBRARY)) {
        let path = match line.split("=>").nth(1) {
            Some(path) => Path::new(path.trim()),
            None => continue,
        };

        if line.contains("x86-64") {
            return Some(path);
        }

        fallback = fallback.or(Some(path));
    }

    fallback
}
