use crate::base::Base;
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Named store of [Base] objects.
///
/// An explicit registry object rather than a process-global: callers create
/// one (typically with process lifetime) and hand references to consumers,
/// which keeps tests isolated and ownership visible. Reads may happen
/// concurrently; writes are serialized by the lock.
#[derive(Default)]
pub struct BaseRegistry {
    bases: RwLock<HashMap<String, Arc<Base>>>,
}

impl BaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `base` under `name`.
    ///
    /// Fails with a `Value` error when the name is taken and `overwrite` is
    /// false.
    pub fn register(&self, name: &str, base: Base, overwrite: bool) -> Result<(), CoreError> {
        let mut map = self.bases.write().expect("base registry lock poisoned");
        if !overwrite && map.contains_key(name) {
            return Err(CoreError::BaseTaken(name.to_owned()));
        }
        map.insert(name.to_owned(), Arc::new(base));
        Ok(())
    }

    /// Remove and return the base registered under `name`.
    pub fn deregister(&self, name: &str) -> Result<Arc<Base>, CoreError> {
        let mut map = self.bases.write().expect("base registry lock poisoned");
        map.remove(name)
            .ok_or_else(|| CoreError::BaseUnknown(name.to_owned()))
    }

    /// Look up the base registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<Base>, CoreError> {
        let map = self.bases.read().expect("base registry lock poisoned");
        map.get(name)
            .cloned()
            .ok_or_else(|| CoreError::BaseUnknown(name.to_owned()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        let map = self.bases.read().expect("base registry lock poisoned");
        map.contains_key(name)
    }

    /// Explicit teardown: drop every registered base.
    pub fn clear(&self) {
        let mut map = self.bases.write().expect("base registry lock poisoned");
        map.clear();
    }
}
