// src/modules/registry.rs
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use lazy_static::lazy_static;
use log::debug;
use crate::modules::{Module, ModuleType};

/// Module ID -> executable module. Registration replaces any module already
/// stored under the same ID.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Arc<dyn Module>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, module: Arc<dyn Module>) {
        let id = module.info().id;
        let mut modules = self.modules.write().unwrap_or_else(|e| e.into_inner());
        if modules.insert(id.clone(), module).is_some() {
            debug!("Module {} overridden", id);
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Module>> {
        self.read().get(id).cloned()
    }

    pub fn all(&self) -> Vec<Arc<dyn Module>> {
        self.read().values().cloned().collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<Arc<dyn Module>> {
        self.read()
            .values()
            .filter(|m| m.info().tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .cloned()
            .collect()
    }

    pub fn by_type(&self, module_type: ModuleType) -> Vec<Arc<dyn Module>> {
        self.read()
            .values()
            .filter(|m| m.module_type() == module_type)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Removes every module. Only meant for test harnesses.
    pub fn clear(&self) {
        self.modules.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn Module>>> {
        self.modules.read().unwrap_or_else(|e| e.into_inner())
    }
}

lazy_static! {
    static ref REGISTRY: ModuleRegistry = ModuleRegistry::new();
}

/// The process-wide registry populated at start-up.
pub fn global() -> &'static ModuleRegistry {
    &REGISTRY
}

pub fn register(module: Arc<dyn Module>) {
    REGISTRY.register(module);
}

pub fn get(id: &str) -> Option<Arc<dyn Module>> {
    REGISTRY.get(id)
}

pub fn all() -> Vec<Arc<dyn Module>> {
    REGISTRY.all()
}

pub fn by_tag(tag: &str) -> Vec<Arc<dyn Module>> {
    REGISTRY.by_tag(tag)
}

pub fn by_type(module_type: ModuleType) -> Vec<Arc<dyn Module>> {
    REGISTRY.by_type(module_type)
}

pub fn count() -> usize {
    REGISTRY.count()
}

pub fn clear() {
    REGISTRY.clear();
}
