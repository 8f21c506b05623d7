//! The dev server's module graph, as seen by the overlay.
//!
//! [`ModuleRegistry`] is the only way the overlay reaches live server state.
//! Lookups are synchronous, transforms are async and may fail; a failure is
//! always treated as "not found" by callers.

mod memory;

use std::future::Future;
use std::sync::Arc;

use overlay_sourcemap::RawSourceMap;

pub use memory::MemoryRegistry;

/// Errors a registry may report. Callers never propagate these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("lookup of `{key}` failed: {message}")]
    Lookup { key: String, message: String },
    #[error("transform of `{id}` failed: {message}")]
    Transform { id: String, message: String },
    #[error("failed to read `{path}`: {message}")]
    Read { path: String, message: String },
}

/// Output of a module transform.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransformResult {
    pub code: String,
    pub map: Option<RawSourceMap>,
}

impl TransformResult {
    pub fn new(code: impl Into<String>) -> Self {
        TransformResult {
            code: code.into(),
            map: None,
        }
    }

    #[must_use]
    pub fn with_map(mut self, map: RawSourceMap) -> Self {
        self.map = Some(map);
        self
    }
}

/// One entry of the module graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleNode {
    /// Resolved id, usually the absolute file path plus any query.
    pub id: Option<String>,
    /// Public URL the browser requested.
    pub url: String,
    /// Absolute file path without query.
    pub file: Option<String>,
    /// Last transform, if the server kept it.
    pub transform_result: Option<TransformResult>,
}

impl ModuleNode {
    pub fn new(url: impl Into<String>) -> Self {
        ModuleNode {
            url: url.into(),
            ..ModuleNode::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_transform_result(mut self, result: TransformResult) -> Self {
        self.transform_result = Some(result);
        self
    }

    /// The paths this module can be matched by: file, id, url. Empty ones
    /// are skipped.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        [self.file.as_deref(), self.id.as_deref(), Some(self.url.as_str())]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
    }

    /// Source map of the cached transform.
    pub fn cached_map(&self) -> Option<&RawSourceMap> {
        self.transform_result.as_ref()?.map.as_ref()
    }

    /// Code of the cached transform.
    pub fn cached_code(&self) -> Option<&str> {
        self.transform_result.as_ref().map(|r| r.code.as_str())
    }

    /// Key to request a fresh transform with: the id, else the url.
    pub fn transform_key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.url.as_str()).filter(|url| !url.is_empty()))
    }
}

/// Read access to the module graph plus on-demand transforms.
pub trait ModuleRegistry: Send + Sync {
    fn get_module_by_id(&self, id: &str) -> Result<Option<Arc<ModuleNode>>, RegistryError>;

    fn get_module_by_url(&self, url: &str) -> Result<Option<Arc<ModuleNode>>, RegistryError>;

    /// Every module, in the registry's iteration order.
    fn modules(&self) -> Vec<Arc<ModuleNode>>;

    /// Transform the module identified by `id` (an id or a url). `Ok(None)`
    /// means the registry does not know the module.
    fn transform_request(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<TransformResult>, RegistryError>> + Send;

    /// Read a file from disk.
    fn read_file(&self, path: &str) -> impl Future<Output = Result<String, RegistryError>> + Send {
        async move {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| RegistryError::Read {
                    path: path.to_owned(),
                    message: e.to_string(),
                })
        }
    }

    /// Project root; root-relative paths are resolved against it.
    fn root(&self) -> &str;
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
