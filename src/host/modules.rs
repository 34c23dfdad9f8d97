use super::runner::CommandRunner;

/// Names of the kernel modules reported by `lsmod`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelModules(Vec<String>);

impl KernelModules {
    /// Lists loaded modules. When `lsmod` cannot be run, no modules are reported.
    pub fn loaded<R: CommandRunner>(runner: &R) -> Self {
        match runner.run("lsmod", &[], &[]).and_then(|output| output.into_result("lsmod")) {
            Ok(output) => Self::parse(&output.stdout),
            Err(why) => {
                warn!("unable to list kernel modules: {}", why);
                KernelModules::default()
            }
        }
    }

    pub fn parse(output: &str) -> Self {
        let modules = output
            .lines()
            .skip_while(|line| line.starts_with("Module"))
            .filter_map(|line| line.split_ascii_whitespace().next())
            .map(String::from)
            .collect();

        KernelModules(modules)
    }

    pub fn is_loaded(&self, module: &str) -> bool { self.0.iter().any(|loaded| loaded == module) }
}

/// Checks whether the open source `nouveau` driver is in use.
pub fn is_nouveau<R: CommandRunner>(runner: &R) -> bool {
    let nouveau = KernelModules::loaded(runner).is_loaded("nouveau");
    if nouveau {
        warn!("Nouveau driver detected, this may cause issues");
    }

    nouveau
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::runner::{fake::FakeRunner, Captured};

    const LSMOD: &str = "Module                  Size  Used by
nouveau              2289664  1
mxm_wmi                16384  1 nouveau
drm_ttm_helper         16384  1 nouveau
i915                 3608576  12
";

    #[test]
    fn parses_first_column() {
        let modules = KernelModules::parse(LSMOD);

        assert!(modules.is_loaded("nouveau"));
        assert!(modules.is_loaded("i915"));
        assert!(!modules.is_loaded("Module"));
        assert!(!modules.is_loaded("nvidia"));
    }

    #[test]
    fn nouveau_detection() {
        let runner = FakeRunner::default().respond("lsmod", false, Captured::ok(LSMOD));
        assert!(is_nouveau(&runner));

        let runner = FakeRunner::default().respond("lsmod", false, Captured::ok("Module Size Used by\nnvidia 1 0\nnvidia_drm 1 0\n"));
        assert!(!is_nouveau(&runner));

        assert!(!is_nouveau(&FakeRunner::default()));
    }
}
