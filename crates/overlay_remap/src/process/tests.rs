use std::fs;

use overlay_highlight::Themes;
use overlay_ir::{CompilerDiagnostic, JsError};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::{numbered_lines, source_map, CountingRegistry, LINE_THREE_MAPPINGS};
use crate::{MemoryRegistry, ModuleNode, PromptContext, TransformResult};

fn html_cache() -> HighlighterCache<HtmlHighlighterFactory> {
    HighlighterCache::new(HtmlHighlighterFactory, Themes::default())
}

fn app_registry() -> MemoryRegistry {
    let registry = MemoryRegistry::new("/home/me/app");
    registry.insert(
        ModuleNode::new("/src/App.tsx")
            .with_id("/home/me/app/src/App.tsx")
            .with_file("/home/me/app/src/App.tsx")
            .with_transform_result(
                TransformResult::new("c1\nc2\nc3\nc4").with_map(source_map(
                    "App.tsx",
                    LINE_THREE_MAPPINGS,
                    Some(&numbered_lines(20)),
                )),
            ),
    );
    registry
}

fn type_error(stack_location: &str) -> ErrorLike {
    JsError::new("TypeError", "boom")
        .with_stack(format!("TypeError: boom\n    at App ({stack_location})"))
        .into()
}

#[tokio::test]
async fn test_mapped_error_end_to_end() {
    let registry = app_registry();
    let cache = html_cache();
    let processor = ErrorProcessor::with_highlighter(&registry, &cache);

    let error = type_error("http://localhost:5173/src/App.tsx?t=1:3:9");
    let result = processor
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;

    assert_eq!(result.name, "TypeError");
    assert_eq!(result.message, "boom");
    assert_eq!(result.error_count, 1);
    assert_eq!(
        (result.compiled_file_path.as_str(), result.compiled_line, result.compiled_column),
        ("http://localhost:5173/src/App.tsx?t=1", 3, 9)
    );
    assert_eq!(
        (result.original_file_path.as_str(), result.original_line, result.original_column),
        ("http://localhost:5173/src/App.tsx", 10, 11)
    );
    assert_eq!(result.original_snippet, "line 8\nline 9\nline 10\nline 11\nline 12");
    assert_eq!(result.compiled_snippet, "c1\nc2\nc3\nc4");
    assert_eq!(
        result.compiled_stack,
        "TypeError: boom\n    at App (http://localhost:5173/src/App.tsx?t=1:3:9)"
    );
    assert_eq!(
        result.original_stack,
        "TypeError: boom\n    at App (http://localhost:5173/src/App.tsx:10:11)"
    );

    let original_frame = result.original_code_frame_content.unwrap_or_default();
    assert!(original_frame.contains("data-lang=\"tsx\""), "{original_frame}");
    assert!(
        original_frame.contains("<span class=\"line highlighted error\" data-line=\"10\">line 10</span>"),
        "{original_frame}"
    );
    assert!(result.compiled_code_frame_content.is_some());
    assert!(
        result.fix_prompt.starts_with(
            "Fix the following TypeError in `http://localhost:5173/src/App.tsx` at line 10."
        ),
        "{}",
        result.fix_prompt
    );
    assert_eq!(result.plugin, None);
}

#[tokio::test]
async fn test_diagnostic_array() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let error = ErrorLike::Diagnostics(vec![
        CompilerDiagnostic::new("ESBuild error 1").at("/src/file1.ts", 10, 5),
        CompilerDiagnostic::new("ESBuild error 2").at("/src/file2.ts", 20, 3),
    ]);

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;
    assert_eq!(result.error_count, 2);
    assert_eq!(result.message, "ESBuild error 1");
    assert_eq!(
        (result.compiled_file_path.as_str(), result.compiled_line, result.compiled_column),
        ("/src/file1.ts", 10, 5)
    );
    // Nothing to map against: the original location is the compiled one.
    assert_eq!(
        (result.original_file_path.as_str(), result.original_line, result.original_column),
        ("/src/file1.ts", 10, 5)
    );
    assert_eq!(result.original_snippet, "");
    assert_eq!(result.original_code_frame_content, None);
    assert!(result.fix_prompt.contains("ESBuild error 1 (at /src/file1.ts:10)"));

    let second = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(
            &error,
            &ErrorRequest {
                error_index: 1,
                ..ErrorRequest::default()
            },
        )
        .await;
    assert_eq!(second.compiled_file_path, "/src/file2.ts");
}

#[tokio::test]
async fn test_aggregate_borrows_query_from_later_cause() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let error = ErrorLike::Aggregate {
        error: JsError::new("AggregateError", "2 errors"),
        causes: vec![
            JsError::new("Error", "A")
                .with_stack("Error: A\n    at http://localhost:5173/src/App.tsx:3:1")
                .into(),
            JsError::new("Error", "B")
                .with_stack("Error: B\n    at http://localhost:5173/src/App.tsx?x=1:7:2")
                .into(),
        ],
    };

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;
    assert_eq!(result.error_count, 2);
    assert_eq!(result.message, "A");
    assert_eq!(result.compiled_file_path, "http://localhost:5173/src/App.tsx?x=1");
    assert_eq!(result.compiled_line, 3);
}

#[tokio::test]
async fn test_query_from_all_errors_needs_matching_path() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let primary = type_error("http://localhost:5173/src/App.tsx:3:1");
    let all_errors = [
        type_error("http://localhost:5173/src/Other.tsx?x=9:1:1"),
        type_error("http://localhost:5173/src/App.tsx?v=2:1:1"),
    ];

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(
            &primary,
            &ErrorRequest {
                all_errors: &all_errors,
                ..ErrorRequest::default()
            },
        )
        .await;
    assert_eq!(result.compiled_file_path, "http://localhost:5173/src/App.tsx?v=2");
}

#[tokio::test]
async fn test_vite_error_data_seeds_location_and_plugin() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let data = ViteErrorData {
        file: Some("/src/main.ts".to_owned()),
        line: Some(2),
        column: Some(4),
        plugin: Some("vite:esbuild".to_owned()),
    };
    let error = type_error("/src/ignored.ts:9:9");

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(
            &error,
            &ErrorRequest {
                vite_error_data: Some(&data),
                ..ErrorRequest::default()
            },
        )
        .await;
    assert_eq!(
        (result.compiled_file_path.as_str(), result.compiled_line, result.compiled_column),
        ("/src/main.ts", 2, 4)
    );
    assert_eq!(result.plugin.as_deref(), Some("vite:esbuild"));
}

#[tokio::test]
async fn test_framework_adapter_skips_source_map() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("App.vue");
    fs::write(&file, "<template>\n  <div>\n    {{ broken( }}\n  </div>\n</template>").unwrap();
    let file = file.to_str().unwrap().to_owned();

    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let error: ErrorLike = JsError::new(
        "SyntaxError",
        format!("[vue/compiler-sfc] Unexpected token (3:16)\n\n{file}"),
    )
    .with_stack("SyntaxError\n    at /src/compiled.js:1:1")
    .into();

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(
            &error,
            &ErrorRequest {
                framework: Some("vue"),
                ..ErrorRequest::default()
            },
        )
        .await;
    assert_eq!(result.compiled_file_path, file);
    assert_eq!(result.original_file_path, file);
    assert_eq!((result.original_line, result.original_column), (3, 16));
    assert_eq!(
        result.original_snippet,
        "<template>\n  <div>\n    {{ broken( }}\n  </div>\n</template>"
    );
    let frame = result.original_code_frame_content.unwrap_or_default();
    assert!(frame.contains("data-lang=\"vue\""), "{frame}");
}

#[tokio::test]
async fn test_unmapped_file_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.ts"), "const a = 1;\nthrow new Error('x');\n").unwrap();
    let registry = MemoryRegistry::new(dir.path().to_str().unwrap());
    let cache = html_cache();
    let error = type_error("http://localhost:5173/src/main.ts:2:7");

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;
    assert_eq!(result.original_file_path, "http://localhost:5173/src/main.ts");
    assert_eq!(result.original_snippet, "const a = 1;\nthrow new Error('x');");
    assert_eq!(result.compiled_snippet, "");
    assert!(result.fix_prompt.contains("```typescript\nconst a = 1;"), "{}", result.fix_prompt);
}

#[tokio::test]
async fn test_hydration_diff_never_touches_registry() {
    let registry = CountingRegistry::default();
    let cache = html_cache();
    let error: ErrorLike = JsError::new(
        "Error",
        "Hydration failed because the server rendered HTML didn't match the client.\n  <p>\n+   client\n-   server",
    )
    .with_stack("Error: Hydration failed\n    at hydrate (http://localhost:5173/src/main.tsx:12:3)")
    .into();

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;
    assert_eq!(result.original_snippet, "+   client\n-   server");
    assert_eq!(result.original_file_path, "http://localhost:5173/src/main.tsx");
    assert_eq!((result.original_line, result.original_column), (12, 3));
    assert_eq!(result.original_stack, result.compiled_stack);
    let frame = result.original_code_frame_content.unwrap_or_default();
    assert!(frame.contains("data-lang=\"diff\""), "{frame}");
    assert!(result.fix_prompt.contains("```diff\n+   client"), "{}", result.fix_prompt);

    assert_eq!(CountingRegistry::count(&registry.id_lookups), 0);
    assert_eq!(CountingRegistry::count(&registry.url_lookups), 0);
    assert_eq!(CountingRegistry::count(&registry.scans), 0);
    assert_eq!(CountingRegistry::count(&registry.transforms), 0);
}

#[tokio::test]
async fn test_no_location_still_gives_result() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let error = ErrorLike::Unknown {
        message: "something odd".to_owned(),
    };

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;
    assert_eq!(result.error_count, 1);
    assert_eq!(result.compiled_file_path, "");
    assert_eq!(result.original_line, 0);
    assert_eq!(result.compiled_stack, "Error: something odd");
    assert!(result.fix_prompt.contains("Error: something odd"));
}

#[tokio::test]
async fn test_error_index_is_clamped() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let error = type_error("/src/a.ts:1:1");

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(
            &error,
            &ErrorRequest {
                error_index: 7,
                ..ErrorRequest::default()
            },
        )
        .await;
    assert_eq!(result.name, "TypeError");
    assert_eq!(result.compiled_file_path, "/src/a.ts");
}

struct OneLine;

impl FixPromptGenerator for OneLine {
    fn generate(&self, error: &ErrorRecord, context: &PromptContext<'_>) -> String {
        format!("{} at {}:{}", error.message, context.file, context.line)
    }
}

#[tokio::test]
async fn test_custom_prompt_generator_and_config() {
    let registry = app_registry();
    let cache = html_cache();
    let processor = ErrorProcessor::with_highlighter(&registry, &cache)
        .prompt_generator(&OneLine)
        .config(RemapConfig {
            snippet_context_lines: 0,
            ..RemapConfig::default()
        });

    let result = processor
        .build_extended_error_data(
            &type_error("http://localhost:5173/src/App.tsx:3:9"),
            &ErrorRequest::default(),
        )
        .await;
    assert_eq!(result.original_snippet, "line 10");
    assert_eq!(result.fix_prompt, "boom at http://localhost:5173/src/App.tsx:10");
}

#[tokio::test]
async fn test_free_function_uses_shared_highlighter() {
    let registry = MemoryRegistry::default();
    let error = ErrorLike::from_value(&serde_json::json!({
        "name": "ReferenceError",
        "message": "x is not defined",
        "stack": "ReferenceError: x is not defined\n    at /src/a.ts:1:1"
    }));

    let result = build_extended_error_data(&error, &registry, &ErrorRequest::default()).await;
    assert_eq!(result.name, "ReferenceError");
    assert_eq!(result.compiled_file_path, "/src/a.ts");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["compiledFilePath"], "/src/a.ts");
    assert_eq!(json["errorCount"], 1);
}

/// Finds modules but blows up when asked to transform one.
struct PanickingTransforms(MemoryRegistry);

impl ModuleRegistry for PanickingTransforms {
    fn get_module_by_id(
        &self,
        id: &str,
    ) -> Result<Option<std::sync::Arc<ModuleNode>>, crate::RegistryError> {
        self.0.get_module_by_id(id)
    }

    fn get_module_by_url(
        &self,
        url: &str,
    ) -> Result<Option<std::sync::Arc<ModuleNode>>, crate::RegistryError> {
        self.0.get_module_by_url(url)
    }

    fn modules(&self) -> Vec<std::sync::Arc<ModuleNode>> {
        self.0.modules()
    }

    async fn transform_request(
        &self,
        id: &str,
    ) -> Result<Option<TransformResult>, crate::RegistryError> {
        panic!("transform pipeline crashed for {id}");
    }

    fn root(&self) -> &str {
        self.0.root()
    }
}

#[tokio::test]
async fn test_panicking_stage_returns_partial_result() {
    let inner = MemoryRegistry::new("/home/me/app");
    inner.insert(ModuleNode::new("/src/App.tsx"));
    let registry = PanickingTransforms(inner);
    let cache = html_cache();

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(
            &type_error("http://localhost:5173/src/App.tsx:3:9"),
            &ErrorRequest::default(),
        )
        .await;

    assert_eq!(result.name, "TypeError");
    assert_eq!(result.message, "boom");
    assert_eq!(result.error_count, 1);
    assert_eq!(
        result.compiled_stack,
        "TypeError: boom\n    at App (http://localhost:5173/src/App.tsx:3:9)"
    );
    assert_eq!(result.original_stack, "");
    assert_eq!(result.original_code_frame_content, None);
}

#[tokio::test]
async fn test_multiline_diagnostic_keeps_its_location() {
    let registry = MemoryRegistry::default();
    let cache = html_cache();
    let error = ErrorLike::Diagnostics(vec![CompilerDiagnostic::new(
        "Transform failed\n    at /node_modules/esbuild/lib/main.js:1:1",
    )
    .at("/src/file1.ts", 10, 5)]);

    let result = ErrorProcessor::with_highlighter(&registry, &cache)
        .build_extended_error_data(&error, &ErrorRequest::default())
        .await;
    assert_eq!(
        (result.compiled_file_path.as_str(), result.compiled_line, result.compiled_column),
        ("/src/file1.ts", 10, 5)
    );
    assert!(result.compiled_stack.ends_with("\n    at /src/file1.ts:10:5"));
}
