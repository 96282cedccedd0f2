use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Set of script-state names currently in use.
///
/// Every operation takes the internal lock, so concurrent constructions on
/// different threads can never claim the same name. The raw set is never
/// exposed.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: Mutex<BTreeSet<String>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every [`RuntimeContext`](crate::RuntimeContext)
    /// that does not bring its own.
    pub fn global() -> Arc<NameRegistry> {
        static GLOBAL: OnceLock<Arc<NameRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(NameRegistry::new())).clone()
    }

    /// Claim `name`. Returns false, changing nothing, if it is already taken.
    pub fn reserve(&self, name: &str) -> bool {
        self.lock().insert(name.to_string())
    }

    /// Give `name` back. Releasing a name that is not reserved is a no-op.
    pub fn release(&self, name: &str) {
        self.lock().remove(name);
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Return `base` if free, otherwise the first free `base_1`, `base_2`, …
    ///
    /// Does not reserve the result. Use [`claim_unique`](Self::claim_unique)
    /// when the search and the reservation must not race.
    pub fn make_unique(&self, base: &str) -> String {
        unique_in(&self.lock(), base)
    }

    /// Number of names currently reserved.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Search for a unique name derived from `base` and reserve it under the
    /// same lock acquisition.
    pub fn claim_unique(self: &Arc<Self>, base: &str) -> NameLease {
        let mut names = self.lock();
        let name = unique_in(&names, base);
        names.insert(name.clone());
        NameLease {
            registry: Arc::clone(self),
            name,
        }
    }

    /// Reserve exactly `name`, or return `None` if it is taken.
    pub fn try_claim(self: &Arc<Self>, name: &str) -> Option<NameLease> {
        self.reserve(name).then(|| NameLease {
            registry: Arc::clone(self),
            name: name.to_string(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unique_in(names: &BTreeSet<String>, base: &str) -> String {
    if !names.contains(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|suffix| format!("{base}_{suffix}"))
        .find(|candidate| !names.contains(candidate))
        .expect("suffix space exhausted")
}

/// A reserved name. Dropping the lease releases the name.
#[derive(Debug)]
pub struct NameLease {
    registry: Arc<NameRegistry>,
    name: String,
}

impl NameLease {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NameLease {
    fn drop(&mut self) {
        self.registry.release(&self.name);
    }
}
