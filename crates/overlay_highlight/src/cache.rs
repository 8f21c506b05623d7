//! Lazily-created, process-lifetime highlighter instances.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tokio::sync::OnceCell;

use crate::{HighlightError, Highlighter, HtmlHighlighterFactory, Language, Themes};

/// Builds a highlighter the first time one is needed.
pub trait HighlighterFactory: Send + Sync {
    type Output: Highlighter;

    fn create(
        &self,
        themes: &Themes,
    ) -> impl Future<Output = Result<Self::Output, HighlightError>> + Send;
}

/// One highlighter per cache, created on first request and never torn down.
///
/// Languages are loaded on demand and remembered, so each is loaded at most
/// once. A failed creation is not cached; the next request tries again.
pub struct HighlighterCache<F: HighlighterFactory> {
    factory: F,
    themes: Themes,
    instance: OnceCell<Arc<F::Output>>,
    loaded: Mutex<FxHashSet<Language>>,
}

impl<F: HighlighterFactory> HighlighterCache<F> {
    pub fn new(factory: F, themes: Themes) -> Self {
        HighlighterCache {
            factory,
            themes,
            instance: OnceCell::new(),
            loaded: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn themes(&self) -> &Themes {
        &self.themes
    }

    /// Whether the highlighter has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.instance.initialized()
    }

    /// The highlighter, with every language in `langs` loaded.
    pub async fn get(&self, langs: &[Language]) -> Result<Arc<F::Output>, HighlightError> {
        let instance = self
            .instance
            .get_or_try_init(|| async {
                tracing::debug!("creating syntax highlighter");
                self.factory.create(&self.themes).await.map(Arc::new)
            })
            .await?;

        let mut loaded = self.loaded.lock();
        for &lang in langs {
            if loaded.contains(&lang) {
                continue;
            }
            instance.load_language(lang)?;
            loaded.insert(lang);
        }

        Ok(Arc::clone(instance))
    }
}

static SHARED_HTML: OnceLock<HighlighterCache<HtmlHighlighterFactory>> = OnceLock::new();

/// Process-wide cache around the built-in HTML highlighter, using the
/// default themes.
pub fn shared_html_highlighter() -> &'static HighlighterCache<HtmlHighlighterFactory> {
    SHARED_HTML.get_or_init(|| HighlighterCache::new(HtmlHighlighterFactory, Themes::default()))
}
