use std::sync::Arc;

use uth_host::ModuleManager;

use crate::config::{BuildConfiguration, UthConfig};
use crate::names::NameRegistry;
use crate::paths::ScriptPaths;

/// Name under which the runtime registers with the host [`ModuleManager`].
pub const MODULE_NAME: &str = "uth";

/// Everything a script state needs from its surroundings.
///
/// Constructed once and shared by every state the host creates. Holds the
/// host module manager (readiness), the name registry, and the resolved
/// script roots.
pub struct RuntimeContext {
    pub modules: Arc<ModuleManager>,
    pub names: Arc<NameRegistry>,
    pub paths: ScriptPaths,
    pub build: BuildConfiguration,
}

impl RuntimeContext {
    /// Context using the process-wide name registry.
    pub fn new(config: &UthConfig, modules: Arc<ModuleManager>) -> Self {
        Self::with_registry(config, modules, NameRegistry::global())
    }

    pub fn with_registry(
        config: &UthConfig,
        modules: Arc<ModuleManager>,
        names: Arc<NameRegistry>,
    ) -> Self {
        let paths = config.script_paths();
        tracing::debug!(
            bundled = %paths.bundled_scripts.display(),
            project = %paths.project_scripts.display(),
            "RuntimeContext initialized"
        );
        Self {
            modules,
            names,
            paths,
            build: config.build.configuration,
        }
    }

    /// True once the runtime module has finished starting up.
    pub fn is_ready(&self) -> bool {
        self.modules.is_module_loaded(MODULE_NAME)
    }

    pub fn start_module(&self) {
        self.modules.mark_loaded(MODULE_NAME);
    }

    pub fn stop_module(&self) {
        self.modules.mark_unloaded(MODULE_NAME);
    }
}
