//! A registry backed by in-process maps.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use super::{ModuleNode, ModuleRegistry, RegistryError, TransformResult};

/// In-memory [`ModuleRegistry`].
///
/// Iteration follows insertion order. Transforms are whatever was registered
/// with [`MemoryRegistry::set_transform`]; [`MemoryRegistry::fail_transform`]
/// makes a key reject instead.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    root: String,
    modules: RwLock<Vec<Arc<ModuleNode>>>,
    by_id: DashMap<String, Arc<ModuleNode>>,
    by_url: DashMap<String, Arc<ModuleNode>>,
    transforms: DashMap<String, TransformResult>,
    failing: DashMap<String, String>,
}

impl MemoryRegistry {
    pub fn new(root: impl Into<String>) -> Self {
        MemoryRegistry {
            root: root.into(),
            ..MemoryRegistry::default()
        }
    }

    /// Add a module, indexing it by id and url. A later module with the same
    /// id or url shadows the earlier one in lookups but both stay iterable.
    pub fn insert(&self, module: ModuleNode) -> Arc<ModuleNode> {
        let module = Arc::new(module);
        if let Some(id) = module.id.as_deref().filter(|id| !id.is_empty()) {
            self.by_id.insert(id.to_owned(), Arc::clone(&module));
        }
        if !module.url.is_empty() {
            self.by_url.insert(module.url.clone(), Arc::clone(&module));
        }
        self.modules.write().push(Arc::clone(&module));
        module
    }

    pub fn set_transform(&self, key: impl Into<String>, result: TransformResult) {
        self.transforms.insert(key.into(), result);
    }

    pub fn fail_transform(&self, key: impl Into<String>, message: impl Into<String>) {
        self.failing.insert(key.into(), message.into());
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl ModuleRegistry for MemoryRegistry {
    fn get_module_by_id(&self, id: &str) -> Result<Option<Arc<ModuleNode>>, RegistryError> {
        Ok(self.by_id.get(id).map(|m| Arc::clone(m.value())))
    }

    fn get_module_by_url(&self, url: &str) -> Result<Option<Arc<ModuleNode>>, RegistryError> {
        Ok(self.by_url.get(url).map(|m| Arc::clone(m.value())))
    }

    fn modules(&self) -> Vec<Arc<ModuleNode>> {
        self.modules.read().clone()
    }

    async fn transform_request(&self, id: &str) -> Result<Option<TransformResult>, RegistryError> {
        if let Some(message) = self.failing.get(id) {
            return Err(RegistryError::Transform {
                id: id.to_owned(),
                message: message.value().clone(),
            });
        }
        Ok(self.transforms.get(id).map(|r| r.value().clone()))
    }

    fn root(&self) -> &str {
        &self.root
    }
}
