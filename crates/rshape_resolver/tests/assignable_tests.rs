//! The assignability relation behind conditional types.

use bumpalo::Bump;
use rshape_parser::{parse_type_expression, DeclarationParser};
use rshape_resolver::*;

const MAIN: &str = "/src/main.ts";

/// Helper: check `candidate` against `target`, both written in the context
/// of `source`.
fn assignable(source: &str, candidate: &str, target: &str) -> bool {
    let arena = Bump::new();
    let fs = MemoryFileSystem::with_files([(MAIN, source)]);
    let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
    let scope = ctx.file_scope(MAIN);
    let parse = |text: &str| match parse_type_expression(&arena, MAIN, text) {
        Ok(node) => node,
        Err(diagnostics) => panic!("failed to parse {text:?}: {:?}", diagnostics.diagnostics()),
    };
    ctx.is_assignable(parse(candidate), parse(target), &scope, &Bindings::empty())
}

fn yes(candidate: &str, target: &str) {
    assert!(assignable("", candidate, target), "{candidate} should be assignable to {target}");
}

fn no(candidate: &str, target: &str) {
    assert!(!assignable("", candidate, target), "{candidate} should not be assignable to {target}");
}

// ============================================================================
// Top, bottom and keywords
// ============================================================================

#[test]
fn test_top_and_bottom_types() {
    yes("string", "any");
    yes("{ a: 1 }", "unknown");
    yes("never", "string");
    yes("any", "number");
    no("string", "never");
}

#[test]
fn test_literals_widen_to_keywords() {
    yes("'a'", "string");
    yes("1", "number");
    yes("true", "boolean");
    yes("`x-${number}`", "string");
    no("'a'", "number");
    no("string", "'a'");
    yes("'a'", "'a'");
    no("'a'", "'b'");
}

#[test]
fn test_nullish_keywords() {
    yes("undefined", "void");
    yes("null", "null");
    no("null", "string");
    no("undefined", "object");
    no("null", "{ a?: string }");
}

#[test]
fn test_object_keyword() {
    yes("{ a: 1 }", "object");
    yes("string[]", "object");
    yes("() => void", "object");
    no("string", "object");
}

// ============================================================================
// Unions and intersections
// ============================================================================

#[test]
fn test_union_candidate_needs_every_member() {
    yes("'a' | 'b'", "string");
    no("'a' | 1", "string");
}

#[test]
fn test_union_target_needs_one_member() {
    yes("'a'", "'a' | 'b'");
    yes("1", "string | number");
    no("true", "string | number");
}

#[test]
fn test_intersections() {
    yes("{ a: 1 } & { b: 2 }", "{ a: 1 }");
    yes("{ a: 1; b: 2 }", "{ a: 1 } & { b: 2 }");
    no("{ a: 1 }", "{ a: 1 } & { b: 2 }");
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_structural_objects() {
    yes("{ a: string; b: number }", "{ a: string }");
    yes("{ a: string }", "{ a: string; b?: number }");
    no("{ a: string }", "{ a: string; b: number }");
    no("{ a: number }", "{ a: string }");
    yes("{ a: 'x' }", "{ a: string }");
    yes("{ m(): void }", "{ m(): number }");
}

#[test]
fn test_interfaces_compare_structurally() {
    let source = r#"
        interface Named { name: string }
        interface Person { name: string; age: number }
        class Box { value = 1 }
    "#;
    assert!(assignable(source, "Person", "Named"));
    assert!(!assignable(source, "Named", "Person"));
    assert!(assignable(source, "{ name: 'x' }", "Named"));
    assert!(assignable(source, "{ value: number }", "Box"));
}

#[test]
fn test_arrays_and_tuples() {
    yes("string[]", "string[]");
    yes("'a'[]", "string[]");
    no("number[]", "string[]");
    yes("['a', 'b']", "string[]");
    yes("[string, number]", "[string, number]");
    no("[string]", "[string, number]");
    yes("Array<string>", "readonly string[]");
    yes("ReadonlyArray<1>", "number[]");
}

#[test]
fn test_functions_compare_return_types() {
    yes("() => 'a'", "() => string");
    no("() => number", "() => string");
    yes("(a: string) => void", "(a: number) => void");
    yes("() => void", "Function");
    no("{ a: 1 }", "Function");
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_aliases_expand_on_both_sides() {
    let source = r#"
        type Str = string;
        type Pair = ['a', 1];
        type Union = 'x' | 'y';
    "#;
    assert!(assignable(source, "'a'", "Str"));
    assert!(assignable(source, "Pair", "[string, number]"));
    assert!(assignable(source, "Union", "string"));
    assert!(!assignable(source, "Str", "Union"));
}

#[test]
fn test_enums() {
    let source = r#"
        enum Color { Red = 'red', Blue = 'blue' }
        enum Level { Low, High }
    "#;
    assert!(assignable(source, "Color.Red", "Color"));
    assert!(assignable(source, "Color", "string"));
    assert!(assignable(source, "Level", "number"));
    assert!(!assignable(source, "Level", "string"));
    assert!(!assignable(source, "Color", "Level"));
}

#[test]
fn test_same_reference_with_arguments() {
    let source = "interface Box<T> { value: T }";
    assert!(assignable(source, "Box<'a'>", "Box<string>"));
    assert!(!assignable(source, "Box<number>", "Box<string>"));
    assert!(assignable(source, "Promise<'a'>", "Promise<string>"));
    assert!(!assignable(source, "Promise<1>", "Set<1>"));
}

#[test]
fn test_templates_as_key_sets() {
    yes("'on-click'", "`on-${'click' | 'focus'}`");
    no("'on-blur'", "`on-${'click' | 'focus'}`");
    yes("`on-${'click'}`", "`on-${'click' | 'focus'}`");
}

#[test]
fn test_resolution_failure_is_not_assignable() {
    no("Missing", "{ a: string }");
}

// ============================================================================
// Conditional types through decomposition
// ============================================================================

#[test]
fn test_infer_captures() {
    let source = r#"
        type ElementOf<T> = T extends (infer U)[] ? U : never;
        type Resolved<T> = T extends Promise<infer V> ? V : T;
        type Result<F> = F extends (...args: any[]) => infer R ? R : never;
        type First<T> = T extends [infer Head, ...unknown[]] ? Head : never;
    "#;
    let arena = Bump::new();
    let fs = MemoryFileSystem::with_files([(MAIN, source)]);
    let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
    let scope = ctx.file_scope(MAIN);
    let infer = |text: &str| {
        let node = parse_type_expression(&arena, MAIN, text).unwrap();
        ctx.infer_runtime_tags(node, &scope, &Bindings::empty())
    };
    let set = |tags: &[RuntimeTag]| tags.iter().copied().collect::<RuntimeTags>();

    assert_eq!(infer("ElementOf<Date[]>"), set(&[RuntimeTag::Date]));
    assert_eq!(infer("Resolved<Promise<number>>"), set(&[RuntimeTag::Number]));
    assert_eq!(infer("Resolved<string>"), set(&[RuntimeTag::String]));
    assert_eq!(infer("Result<() => boolean>"), set(&[RuntimeTag::Boolean]));
    assert_eq!(infer("First<[Map<string, 1>, string]>"), set(&[RuntimeTag::Map]));
}
