//! One request in, one [`ErrorProcessingResult`] out.
//!
//! ```text
//! NORMALIZE ─► ADAPT? ─► LOCATE_COMPILED ─► LOCATE_ORIGINAL ─► RETRIEVE_TEXT ─► BUILD_FRAMES
//!     │
//!     └─ hydration diff ─► diff frame ──────────────────────────────────────────► done
//! ```
//!
//! Every stage degrades instead of failing, so whatever was learned before a
//! miss is still returned and later fields keep their defaults. A stage that
//! panics anyway ends the request early with the fields filled so far.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use overlay_highlight::{
    infer_language, shared_html_highlighter, HighlighterCache, HighlighterFactory,
    HtmlHighlighterFactory, Language,
};
use overlay_ir::{
    format_stack, parse_stack, ErrorLike, ErrorProcessingResult, ErrorRecord, ResolvedLocation,
    StackFrame, StackHeader, ViteErrorData,
};
use tracing::Instrument;

use crate::candidates::url::{is_http_url, parse_http_url, query};
use crate::frame::{build_code_frames, build_fix_prompt, extract_snippet, FrameRequest, Snippet};
use crate::{
    adapter_for, hydration_diff, normalize_errors, normalize_identifier, remap_stack,
    resolve_location, resolve_module, retrieve_source_texts, DefaultPromptGenerator,
    FixPromptGenerator, ModuleRegistry, PromptSnippets, RemapConfig,
};

/// Everything about a request besides the error itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorRequest<'a> {
    /// Which normalized record to report on. Clamped to the last record.
    pub error_index: usize,
    /// Selects a framework adapter, e.g. `"vue"`.
    pub framework: Option<&'a str>,
    /// Location and plugin reported by the build pipeline.
    pub vite_error_data: Option<&'a ViteErrorData>,
    /// The whole cause chain, scanned for query strings.
    pub all_errors: &'a [ErrorLike],
}

/// Builds [`ErrorProcessingResult`]s against one registry and highlighter.
pub struct ErrorProcessor<'a, R, F: HighlighterFactory = HtmlHighlighterFactory> {
    registry: &'a R,
    highlighter: &'a HighlighterCache<F>,
    prompt_generator: &'a dyn FixPromptGenerator,
    config: RemapConfig,
}

impl<'a, R: ModuleRegistry> ErrorProcessor<'a, R> {
    /// A processor using the process-wide HTML highlighter.
    pub fn new(registry: &'a R) -> Self {
        ErrorProcessor::with_highlighter(registry, shared_html_highlighter())
    }
}

impl<'a, R: ModuleRegistry, F: HighlighterFactory> ErrorProcessor<'a, R, F> {
    pub fn with_highlighter(registry: &'a R, highlighter: &'a HighlighterCache<F>) -> Self {
        ErrorProcessor {
            registry,
            highlighter,
            prompt_generator: &DefaultPromptGenerator,
            config: RemapConfig::default(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: RemapConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn prompt_generator(mut self, generator: &'a dyn FixPromptGenerator) -> Self {
        self.prompt_generator = generator;
        self
    }

    /// Remap a formatted stack with this processor's registry and settings.
    pub async fn remap_stack(&self, stack: &str, header: Option<&StackHeader>) -> String {
        remap_stack(self.registry, stack, header, &self.config).await
    }

    /// Resolve `error` back to original source. Always returns a result.
    pub async fn build_extended_error_data(
        &self,
        error: &ErrorLike,
        request: &ErrorRequest<'_>,
    ) -> ErrorProcessingResult {
        let span = tracing::debug_span!(
            "build_extended_error_data",
            error_index = request.error_index,
            framework = request.framework,
        );
        let mut result = ErrorProcessingResult::default();
        let outcome = AssertUnwindSafe(self.process(error, request, &mut result))
            .catch_unwind()
            .instrument(span)
            .await;
        if outcome.is_err() {
            tracing::warn!(
                compiled_file_path = %result.compiled_file_path,
                "error processing panicked; returning partial result"
            );
        }
        result
    }

    async fn process(
        &self,
        error: &ErrorLike,
        request: &ErrorRequest<'_>,
        result: &mut ErrorProcessingResult,
    ) {
        let records = normalize_errors(error);
        let index = request.error_index.min(records.len().saturating_sub(1));
        let Some(primary) = records.get(index) else {
            return;
        };

        let header = StackHeader::new(&primary.name, &primary.message);
        let raw_stack = primary.stack.as_deref().unwrap_or_default();
        let frames = parse_stack(raw_stack, self.config.frame_limit);
        *result = ErrorProcessingResult {
            name: primary.name.clone(),
            message: primary.message.clone(),
            compiled_stack: format_stack(&frames, Some(&header)),
            error_count: records.len(),
            plugin: request.vite_error_data.and_then(|data| data.plugin.clone()),
            ..ErrorProcessingResult::default()
        };

        if let Some(diff) = hydration_diff(&primary.message) {
            self.finish_hydration(result, primary, &frames, diff).await;
            return;
        }

        result.original_stack = self.remap_stack(raw_stack, Some(&header)).await;

        let adapted = request
            .framework
            .and_then(adapter_for)
            .and_then(|adapter| adapter(&primary.message));
        let compiled = match &adapted {
            Some(hit) => Some((hit.file.clone(), hit.line, hit.column)),
            None => compiled_location(request.vite_error_data, &frames),
        };
        let Some((compiled_path, line, column)) = compiled else {
            tracing::debug!("no compiled location; reporting the message only");
            result.fix_prompt = build_fix_prompt(
                self.prompt_generator,
                primary,
                "",
                0,
                Language::Text,
                &PromptSnippets::default(),
            );
            return;
        };

        let compiled_path =
            self.with_consistent_query(compiled_path, &records, index, request.all_errors);
        result.compiled_file_path.clone_from(&compiled_path);
        result.compiled_line = line;
        result.compiled_column = column;

        let prefix = self.config.virtual_fs_prefix.as_str();
        let compiled_candidates = normalize_identifier(&compiled_path, prefix);
        let compiled_module =
            resolve_module(self.registry, &compiled_candidates, &self.config.scoring)
                .map(|found| found.module);

        // An adapter location already points at the user's file.
        let original = match (&adapted, &compiled_module) {
            (None, Some(module)) => {
                resolve_location(self.registry, module, &compiled_path, line, column).await
            }
            _ => ResolvedLocation::new(compiled_path.as_str(), line, column),
        };
        let original_path = original.original_file_path.as_str();
        result.original_file_path = original.original_file_path.clone();
        result.original_line = original.original_file_line;
        result.original_column = original.original_file_column;

        let same_file = original_path == compiled_path;
        let original_candidates = normalize_identifier(original_path, prefix);
        let original_module = if same_file {
            None
        } else {
            resolve_module(self.registry, &original_candidates, &self.config.scoring)
                .map(|found| found.module)
        };
        let (compiled_texts, original_texts) = tokio::join!(
            retrieve_source_texts(
                self.registry,
                compiled_module.as_deref(),
                &compiled_path,
                &compiled_candidates,
            ),
            async {
                if same_file {
                    return None;
                }
                let module = original_module.as_deref();
                let texts =
                    retrieve_source_texts(self.registry, module, original_path, &original_candidates)
                        .await;
                Some(texts)
            },
        );
        let original_text = original_texts
            .and_then(|texts| texts.original_source_text)
            .or(compiled_texts.original_source_text);
        let compiled_text = compiled_texts.compiled_source_text;

        let context = self.config.snippet_context_lines;
        let original_snippet = original_text
            .as_deref()
            .and_then(|text| extract_snippet(text, original.original_file_line, context));
        let compiled_snippet = compiled_text
            .as_deref()
            .and_then(|text| extract_snippet(text, line, context));
        result.original_snippet = snippet_text(original_snippet.as_ref());
        result.compiled_snippet = snippet_text(compiled_snippet.as_ref());

        let code_frames = build_code_frames(
            self.highlighter,
            FrameRequest::for_path(original_path, original_snippet.as_ref()),
            FrameRequest::for_path(&compiled_path, compiled_snippet.as_ref()),
        )
        .await;
        result.original_code_frame_content = code_frames.original;
        result.compiled_code_frame_content = code_frames.compiled;

        result.fix_prompt = build_fix_prompt(
            self.prompt_generator,
            primary,
            original_path,
            original.original_file_line,
            infer_language(original_path),
            &PromptSnippets {
                original: original_snippet.as_ref(),
                source_text: compiled_text.as_deref(),
                line,
                context_lines: self.config.prompt_context_lines,
            },
        );
    }

    /// Hydration mismatches carry their own before/after text, so the diff
    /// is the snippet and the raw stack gives the location. The registry is
    /// never consulted.
    async fn finish_hydration(
        &self,
        result: &mut ErrorProcessingResult,
        primary: &ErrorRecord,
        frames: &[StackFrame],
        diff: String,
    ) {
        tracing::debug!("hydration mismatch; using the diff as the code frame");
        let (file, line, column) = frames
            .iter()
            .find_map(StackFrame::position)
            .map_or((String::new(), 0, 0), |(file, line, column)| (file.to_owned(), line, column));

        result.compiled_file_path.clone_from(&file);
        result.compiled_line = line;
        result.compiled_column = column;
        result.original_file_path.clone_from(&file);
        result.original_line = line;
        result.original_column = column;
        result.original_stack.clone_from(&result.compiled_stack);

        // No line of a diff is "the" error line.
        let snippet = Snippet {
            text: diff,
            start_line: 1,
            error_line: 0,
        };
        let frames = build_code_frames(
            self.highlighter,
            FrameRequest {
                snippet: Some(&snippet),
                lang: Language::Diff,
            },
            FrameRequest {
                snippet: None,
                lang: Language::Diff,
            },
        )
        .await;
        result.original_code_frame_content = frames.original;
        result.fix_prompt = build_fix_prompt(
            self.prompt_generator,
            primary,
            &file,
            line,
            Language::Diff,
            &PromptSnippets {
                original: Some(&snippet),
                ..PromptSnippets::default()
            },
        );
        result.original_snippet = snippet.text;
    }

    /// Give `path` the query string the browser used for the same file, if
    /// another error in the chain shows one and `path` has none.
    fn with_consistent_query(
        &self,
        path: String,
        records: &[ErrorRecord],
        primary: usize,
        all_errors: &[ErrorLike],
    ) -> String {
        if path.contains('?') {
            return path;
        }
        let chain: Vec<ErrorRecord> = all_errors.iter().flat_map(normalize_errors).collect();
        let stacks = records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != primary)
            .map(|(_, record)| record)
            .chain(&chain)
            .filter_map(|record| record.stack.as_deref());
        let query = {
            let own_path = if is_http_url(&path) {
                parse_http_url(&path).map(|url| url.path().to_owned())
            } else {
                Some(path.clone())
            };
            own_path
                .filter(|p| p.len() >= self.config.scoring.min_substring_len)
                .and_then(|own| matching_query(&own, stacks, self.config.frame_limit))
        };
        match query {
            Some(query) => {
                tracing::debug!(path = %path, query = %query, "borrowed query string from another error");
                format!("{path}?{query}")
            }
            None => path,
        }
    }
}

/// Resolve `error` with the process-wide highlighter and default settings.
pub async fn build_extended_error_data<R: ModuleRegistry>(
    error: &ErrorLike,
    registry: &R,
    request: &ErrorRequest<'_>,
) -> ErrorProcessingResult {
    ErrorProcessor::new(registry)
        .build_extended_error_data(error, request)
        .await
}

/// Where the error happened in compiled code: the build pipeline's report
/// first, then the first usable stack frame.
fn compiled_location(
    vite_error_data: Option<&ViteErrorData>,
    frames: &[StackFrame],
) -> Option<(String, u32, u32)> {
    vite_error_data
        .and_then(ViteErrorData::position)
        .or_else(|| frames.iter().find_map(StackFrame::position))
        .map(|(file, line, column)| (file.to_owned(), line, column))
}

/// The query of the first URL frame in `stacks` pointing at `own_path`.
fn matching_query<'s>(
    own_path: &str,
    stacks: impl Iterator<Item = &'s str>,
    frame_limit: usize,
) -> Option<String> {
    for stack in stacks {
        for frame in parse_stack(stack, frame_limit) {
            let Some(url) = frame
                .file
                .as_deref()
                .filter(|file| is_http_url(file))
                .and_then(parse_http_url)
            else {
                continue;
            };
            let Some(query) = query(&url) else {
                continue;
            };
            let path = url.path();
            if own_path == path || own_path.ends_with(path) || path.ends_with(own_path) {
                return Some(query.to_owned());
            }
        }
    }
    None
}

fn snippet_text(snippet: Option<&Snippet>) -> String {
    snippet.map(|s| s.text.clone()).unwrap_or_default()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
