use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

/// Tracks which host modules have finished starting up.
///
/// Objects owned by a module consult this before doing any real work, since
/// the host may instantiate them while the module is still offline.
#[derive(Debug, Default)]
pub struct ModuleManager {
    loaded: Mutex<BTreeSet<String>>,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_loaded(&self, module: &str) {
        let inserted = self.lock().insert(module.to_string());
        if inserted {
            tracing::info!(module, "Module loaded");
        }
    }

    pub fn mark_unloaded(&self, module: &str) {
        if self.lock().remove(module) {
            tracing::info!(module, "Module unloaded");
        }
    }

    pub fn is_module_loaded(&self, module: &str) -> bool {
        self.lock().contains(module)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
