use std::{collections::HashMap, env, path::PathBuf};

/// A snapshot of the environment variables that the detection routines consult.
///
/// Values which are set but empty are reported as unset, which mirrors how the Vulkan
/// loader treats the `XDG_*` variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostEnv {
    vars: HashMap<String, String>,
}

impl HostEnv {
    /// Captures the environment of the current process.
    pub fn capture() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();

        HostEnv { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        HostEnv { vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    pub fn home(&self) -> Option<PathBuf> { self.get("HOME").map(PathBuf::from) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_unset() {
        let env = HostEnv::from_pairs(vec![("XDG_DATA_DIRS", ""), ("HOME", "/home/user")]);

        assert_eq!(env.get("XDG_DATA_DIRS"), None);
        assert_eq!(env.get("XDG_CONFIG_HOME"), None);
        assert_eq!(env.home(), Some(PathBuf::from("/home/user")));
    }
}
