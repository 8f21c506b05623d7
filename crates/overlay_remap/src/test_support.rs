//! Registry fakes and source map fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use overlay_sourcemap::RawSourceMap;

use crate::{MemoryRegistry, ModuleNode, ModuleRegistry, RegistryError, TransformResult};

/// Wraps a [`MemoryRegistry`] and counts every call into it.
#[derive(Debug, Default)]
pub(crate) struct CountingRegistry {
    pub inner: MemoryRegistry,
    pub id_lookups: AtomicUsize,
    pub url_lookups: AtomicUsize,
    pub scans: AtomicUsize,
    pub transforms: AtomicUsize,
    /// Make every direct lookup fail.
    pub fail_lookups: bool,
}

impl CountingRegistry {
    pub fn new(inner: MemoryRegistry) -> Self {
        CountingRegistry {
            inner,
            ..CountingRegistry::default()
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn lookup_error(&self, key: &str) -> Option<RegistryError> {
        self.fail_lookups.then(|| RegistryError::Lookup {
            key: key.to_owned(),
            message: "registry unavailable".to_owned(),
        })
    }
}

impl ModuleRegistry for CountingRegistry {
    fn get_module_by_id(&self, id: &str) -> Result<Option<Arc<ModuleNode>>, RegistryError> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        match self.lookup_error(id) {
            Some(error) => Err(error),
            None => self.inner.get_module_by_id(id),
        }
    }

    fn get_module_by_url(&self, url: &str) -> Result<Option<Arc<ModuleNode>>, RegistryError> {
        self.url_lookups.fetch_add(1, Ordering::SeqCst);
        match self.lookup_error(url) {
            Some(error) => Err(error),
            None => self.inner.get_module_by_url(url),
        }
    }

    fn modules(&self) -> Vec<Arc<ModuleNode>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.modules()
    }

    async fn transform_request(&self, id: &str) -> Result<Option<TransformResult>, RegistryError> {
        self.transforms.fetch_add(1, Ordering::SeqCst);
        self.inner.transform_request(id).await
    }

    fn root(&self) -> &str {
        self.inner.root()
    }
}

/// Compiled line 3 maps to original line 10 of `source`: generated columns
/// 0..8 land on original column 2, columns 8.. on original column 10.
pub(crate) const LINE_THREE_MAPPINGS: &str = ";;AASE,QAAQ";

pub(crate) fn source_map(source: &str, mappings: &str, content: Option<&str>) -> RawSourceMap {
    RawSourceMap {
        version: 3,
        sources: vec![Some(source.to_owned())],
        sources_content: content.map(|c| vec![Some(c.to_owned())]),
        mappings: mappings.to_owned(),
        ..RawSourceMap::default()
    }
}

/// `count` numbered lines: `line 1`, `line 2`, ...
pub(crate) fn numbered_lines(count: u32) -> String {
    (1..=count)
        .map(|n| format!("line {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}
