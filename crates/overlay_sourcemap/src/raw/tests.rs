use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_from_json_reads_camel_case_fields() {
    let map = RawSourceMap::from_json(
        r#"{"version":3,"sourceRoot":"src","sources":["App.tsx",null],"sourcesContent":["let a = 1;"],"names":[],"mappings":"AAAA"}"#,
    );
    let Ok(map) = map else {
        panic!("map should decode: {map:?}");
    };

    assert_eq!(map.version, 3);
    assert_eq!(map.first_source_content(), Some("let a = 1;"));
    assert_eq!(map.resolved_source(0).as_deref(), Some("src/App.tsx"));
    assert_eq!(map.resolved_source(1), None);
    assert_eq!(map.resolved_source(2), None);
}

#[test]
fn test_resolved_source_keeps_absolute_names() {
    let map = RawSourceMap {
        source_root: Some("/root/".to_owned()),
        sources: vec![
            Some("a.ts".to_owned()),
            Some("/abs/b.ts".to_owned()),
            Some("http://localhost:5173/c.ts".to_owned()),
        ],
        ..RawSourceMap::default()
    };

    assert_eq!(map.resolved_source(0).as_deref(), Some("/root/a.ts"));
    assert_eq!(map.resolved_source(1).as_deref(), Some("/abs/b.ts"));
    assert_eq!(
        map.resolved_source(2).as_deref(),
        Some("http://localhost:5173/c.ts")
    );
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(matches!(
        RawSourceMap::from_json("not json"),
        Err(SourceMapError::Json(_))
    ));
}

#[test]
fn test_first_source_content_absent() {
    assert_eq!(RawSourceMap::default().first_source_content(), None);
}
