//! Reduction of key types to finite string sets.

use bumpalo::Bump;
use rshape_parser::{parse_type_expression, DeclarationParser};
use rshape_resolver::*;

const MAIN: &str = "/src/main.ts";

/// Helper: resolve the keys of `text` written in the context of `source`.
fn resolve(source: &str, text: &str) -> Result<Vec<String>, ResolveError> {
    let arena = Bump::new();
    let fs = MemoryFileSystem::with_files([(MAIN, source)]);
    let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
    let scope = ctx.file_scope(MAIN);
    let node = match parse_type_expression(&arena, MAIN, text) {
        Ok(node) => node,
        Err(diagnostics) => panic!("failed to parse {text:?}: {:?}", diagnostics.diagnostics()),
    };
    let keys = ctx.resolve_keys(node, &scope, &Bindings::empty())?;
    Ok(keys.into_iter().collect())
}

fn keys(source: &str, text: &str) -> Vec<String> {
    resolve(source, text).unwrap_or_else(|error| panic!("resolving keys of {text:?} failed: {error}"))
}

fn error(source: &str, text: &str) -> ResolveError {
    match resolve(source, text) {
        Ok(keys) => panic!("expected {text:?} to fail, got {keys:?}"),
        Err(error) => error,
    }
}

// ============================================================================
// Literals and keywords
// ============================================================================

#[test]
fn test_literal_keys() {
    assert_eq!(keys("", "'a'"), vec!["a"]);
    assert_eq!(keys("", "1"), vec!["1"]);
    assert_eq!(keys("", "true"), vec!["true"]);
    assert_eq!(keys("", "'a' | 'b' | 'a'"), vec!["a", "b"]);
}

#[test]
fn test_keyword_keys() {
    assert!(keys("", "never").is_empty());
    assert_eq!(keys("", "boolean"), vec!["false", "true"]);
    assert_eq!(keys("", "null | undefined"), vec!["null", "undefined"]);
}

#[test]
fn test_open_keywords_are_not_finite() {
    for text in ["string", "number", "symbol", "any", "unknown"] {
        let error = error("", text);
        assert!(matches!(error, ResolveError::NonFiniteKeys { .. }), "{text}: {error:?}");
        assert_eq!(error.code(), 9003);
    }
    assert!(matches!(error("", "10n"), ResolveError::NonFiniteKeys { .. }));
}

#[test]
fn test_unsupported_index_type() {
    let error = error("", "{ a: string }");
    assert!(matches!(error, ResolveError::UnsupportedIndexType { ref kind, .. } if kind == "TypeLiteral"));
    assert_eq!(error.code(), 9004);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_keyof() {
    let source = r#"
        interface Base { base: 1 }
        interface Props extends Base { a: string; 'b-c'?: number; 0: boolean }
    "#;
    assert_eq!(keys(source, "keyof Props"), vec!["a", "b-c", "0", "base"]);
    assert_eq!(keys(source, "keyof Props | 'extra'"), vec!["a", "b-c", "0", "base", "extra"]);
}

#[test]
fn test_keyof_open_types_is_not_finite() {
    let source = r#"
        interface Dict { [key: string]: number; size: number }
        type Loose = { [key: number]: string };
        type Anything = any;
    "#;
    for text in ["keyof any", "keyof string", "keyof number", "keyof symbol", "keyof Anything", "keyof Dict", "keyof Loose"] {
        let error = error(source, text);
        assert!(matches!(error, ResolveError::NonFiniteKeys { .. }), "{text}: {error:?}");
    }
}

#[test]
fn test_numeric_literal_keys_are_normalized() {
    assert_eq!(keys("", "0x10 | 1.0 | 1_000"), vec!["16", "1", "1000"]);
    assert_eq!(keys("interface Codes { 0x10: string; 2.50: number }", "keyof Codes"), vec!["16", "2.5"]);
}

#[test]
fn test_intersection_keeps_common_keys() {
    assert_eq!(keys("", "('a' | 'b' | 'c') & ('c' | 'b')"), vec!["b", "c"]);
    assert_eq!(keys("", "'a' & string"), vec!["a"]);
    assert!(matches!(error("", "string & number"), ResolveError::NonFiniteKeys { .. }));
}

#[test]
fn test_template_literal_product() {
    assert_eq!(keys("", "`${'a' | 'b'}-${'x' | 'y'}`"), vec!["a-x", "a-y", "b-x", "b-y"]);
    assert_eq!(keys("", "`plain`"), vec!["plain"]);
    assert!(matches!(error("", "`id-${string}`"), ResolveError::NonFiniteKeys { .. }));
}

#[test]
fn test_case_transforms() {
    assert_eq!(keys("", "`get${Capitalize<'id' | 'name'>}`"), vec!["getId", "getName"]);
    assert_eq!(keys("", "Uppercase<'a' | 'b'>"), vec!["A", "B"]);
    assert_eq!(keys("", "Lowercase<'AB'>"), vec!["ab"]);
    assert_eq!(keys("", "Uncapitalize<'Click'>"), vec!["click"]);
}

#[test]
fn test_extract_exclude_non_nullable() {
    let source = "type Events = 'click' | 'focus' | 'blur' | null;";
    assert_eq!(keys(source, "Exclude<Events, 'focus' | null>"), vec!["click", "blur"]);
    assert_eq!(keys(source, "Extract<Events, 'focus' | 'blur'>"), vec!["focus", "blur"]);
    assert_eq!(keys(source, "NonNullable<Events>"), vec!["click", "focus", "blur"]);
}

#[test]
fn test_indexed_access_keys() {
    let source = r#"
        interface Config { mode: 'a' | 'b'; level: 1 | 2 }
        type Modes = ['x', 'y'];
    "#;
    assert_eq!(keys(source, "Config['mode']"), vec!["a", "b"]);
    assert_eq!(keys(source, "Config['mode' | 'level']"), vec!["a", "b", "1", "2"]);
    assert_eq!(keys(source, "Modes[number]"), vec!["x", "y"]);
}

#[test]
fn test_conditional_keys() {
    let source = "type OnlyStrings<T> = T extends string ? T : never;";
    assert_eq!(keys(source, "OnlyStrings<'a' | 1 | 'b'>"), vec!["a", "b"]);
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_alias_and_generic_alias() {
    let source = r#"
        type Size = 'small' | 'large';
        type Prefixed<P extends string> = `${P}-${Size}`;
    "#;
    assert_eq!(keys(source, "Size"), vec!["small", "large"]);
    assert_eq!(keys(source, "Prefixed<'btn'>"), vec!["btn-small", "btn-large"]);
}

#[test]
fn test_enum_keys() {
    let source = r#"
        enum Direction { Up, Down = 5, Left }
        enum Mode { Light = 'light', Dark = 'dark' }
        enum Mixed { A = 'a', B = compute() }
    "#;
    assert_eq!(keys(source, "Direction"), vec!["0", "5", "6"]);
    assert_eq!(keys(source, "Mode"), vec!["light", "dark"]);
    assert_eq!(keys(source, "Mode.Dark"), vec!["dark"]);
    assert!(matches!(error(source, "Mixed"), ResolveError::NonFiniteKeys { .. }));
}

#[test]
fn test_unbound_type_parameter() {
    let source = "type Keys<T> = { [K in T]: 1 };";
    let error = error(source, "keyof Keys");
    assert!(matches!(error, ResolveError::UnboundTypeParameter { ref name, .. } if name == "T"));
}

#[test]
fn test_unknown_reference() {
    let error = error("", "Missing");
    assert!(matches!(error, ResolveError::UnresolvableReference { ref name, .. } if name == "Missing"));
}

#[test]
fn test_recursive_alias_terminates() {
    assert!(keys("type A = 'a' | B; type B = A;", "A") == vec!["a"]);
}
