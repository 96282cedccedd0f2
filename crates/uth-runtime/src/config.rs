use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ScriptError;
use crate::paths::{BOOTSTRAP_SCRIPT, ScriptPaths};

/// Top-level configuration, usually read from `config.toml`.
///
/// ```toml
/// [paths]
/// plugin_dir = "/opt/uth"
/// project_dir = "/srv/game"
/// log_dir = "/var/log/game"
///
/// [build]
/// configuration = "shipping"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct UthConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// Base directories plus optional per-root overrides.
///
/// When `plugin_dir` is unset it is looked up next to the running
/// executable: first `<bin>/`, then `<bin>/../share/uth/`, whichever holds
/// `lua/uth/init.lua`. If neither does, the source checkout this crate was
/// built from is used, which only exists on the build machine. Installed
/// copies that live elsewhere must set `plugin_dir` explicitly.
#[derive(Debug, Default, Deserialize)]
pub struct PathsConfig {
    pub plugin_dir: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub bundled_scripts: Option<PathBuf>,
    pub runtime_scripts: Option<PathBuf>,
    pub runtime_natives: Option<PathBuf>,
    pub project_scripts: Option<PathBuf>,
    pub project_natives: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub configuration: BuildConfiguration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildConfiguration {
    Debug,
    #[default]
    Development,
    Test,
    Shipping,
}

impl BuildConfiguration {
    pub fn is_shipping_or_test(self) -> bool {
        matches!(self, BuildConfiguration::Shipping | BuildConfiguration::Test)
    }
}

impl UthConfig {
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// `<config_dir>/uth/config.toml`, e.g. `~/.config/uth/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("uth")
            .join("config.toml")
    }

    /// Resolve every script root, filling unset ones from the base dirs.
    pub fn script_paths(&self) -> ScriptPaths {
        let paths = &self.paths;
        let plugin = paths.plugin_dir.clone().unwrap_or_else(default_plugin_dir);
        let project = paths
            .project_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let torch = plugin.join("third_party").join("torch");
        let content = project.join("Content").join("Lua");

        ScriptPaths {
            bundled_scripts: paths
                .bundled_scripts
                .clone()
                .unwrap_or_else(|| plugin.join("lua")),
            runtime_scripts: paths
                .runtime_scripts
                .clone()
                .unwrap_or_else(|| torch.join("lua")),
            runtime_natives: paths
                .runtime_natives
                .clone()
                .unwrap_or_else(|| torch.join("bin")),
            project_scripts: paths
                .project_scripts
                .clone()
                .unwrap_or_else(|| content.clone()),
            project_natives: paths
                .project_natives
                .clone()
                .unwrap_or_else(|| content.join("bin")),
            log_dir: paths
                .log_dir
                .clone()
                .unwrap_or_else(|| project.join("Saved").join("Logs")),
        }
    }
}

fn default_plugin_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| installed_plugin_dir(&exe))
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

fn installed_plugin_dir(exe: &Path) -> Option<PathBuf> {
    let bin_dir = exe.parent()?;
    [bin_dir.to_path_buf(), bin_dir.join("..").join("share").join("uth")]
        .into_iter()
        .find(|dir| dir.join("lua").join(BOOTSTRAP_SCRIPT).is_file())
}
