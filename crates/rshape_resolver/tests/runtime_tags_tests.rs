//! Runtime-tag inference.

use bumpalo::Bump;
use rshape_parser::{parse_type_expression, DeclarationParser};
use rshape_resolver::*;

use RuntimeTag::*;

const MAIN: &str = "/src/main.ts";

/// Helper: infer the tags of `text` written in the context of `source`.
fn infer(source: &str, text: &str) -> RuntimeTags {
    let arena = Bump::new();
    let fs = MemoryFileSystem::with_files([(MAIN, source)]);
    let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
    let scope = ctx.file_scope(MAIN);
    let node = match parse_type_expression(&arena, MAIN, text) {
        Ok(node) => node,
        Err(diagnostics) => panic!("failed to parse {text:?}: {:?}", diagnostics.diagnostics()),
    };
    ctx.infer_runtime_tags(node, &scope, &Bindings::empty())
}

fn set<const N: usize>(tags: [RuntimeTag; N]) -> RuntimeTags {
    tags.into_iter().collect()
}

/// Helper: tags as an ordered list, for checks that care about order.
fn ordered(tags: &RuntimeTags) -> Vec<RuntimeTag> {
    tags.iter().copied().collect()
}

// ============================================================================
// Keywords and literals
// ============================================================================

#[test]
fn test_keyword_tags() {
    assert_eq!(infer("", "string"), set([String]));
    assert_eq!(infer("", "number"), set([Number]));
    assert_eq!(infer("", "boolean"), set([Boolean]));
    assert_eq!(infer("", "symbol"), set([Symbol]));
    assert_eq!(infer("", "object"), set([Object]));
    assert_eq!(infer("", "null"), set([Null]));
    assert_eq!(infer("", "undefined"), set([Null]));
    assert_eq!(infer("", "void"), set([Null]));
    assert_eq!(infer("", "any"), set([Unknown]));
    assert_eq!(infer("", "unknown"), set([Unknown]));
    assert_eq!(infer("", "bigint"), set([Unknown]));
}

#[test]
fn test_literal_tags() {
    assert_eq!(infer("", "'a'"), set([String]));
    assert_eq!(infer("", "-1"), set([Number]));
    assert_eq!(infer("", "false"), set([Boolean]));
    assert_eq!(infer("", "`x-${number}`"), set([String]));
}

#[test]
fn test_union_of_primitives_has_one_tag_each() {
    let tags = infer("", "string | number | boolean");
    assert_eq!(tags.len(), 3);
    assert_eq!(ordered(&tags), vec![String, Number, Boolean]);
    assert_eq!(infer("", "'a' | 'b' | 1"), set([String, Number]));
    assert_eq!(infer("", "string | null"), set([String, Null]));
}

// ============================================================================
// Structural types
// ============================================================================

#[test]
fn test_object_function_array_tags() {
    assert_eq!(infer("", "{ a: string }"), set([Object]));
    assert_eq!(infer("", "{}"), set([Object]));
    assert_eq!(infer("", "{ (): void }"), set([Function]));
    assert_eq!(infer("", "{ (): void; a: string }"), set([Function, Object]));
    assert_eq!(infer("", "() => void"), set([Function]));
    assert_eq!(infer("", "new () => object"), set([Function]));
    assert_eq!(infer("", "string[]"), set([Array]));
    assert_eq!(infer("", "readonly string[]"), set([Array]));
    assert_eq!(infer("", "[string, number]"), set([Array]));
    assert_eq!(infer("", "{ [K in 'a']: 1 }"), set([Object]));
}

#[test]
fn test_intersection_drops_unknown() {
    assert_eq!(infer("", "{ a: 1 } & unknown"), set([Object]));
    assert_eq!(infer("", "any & unknown"), set([Unknown]));
    assert_eq!(infer("", "(() => void) & { a: 1 }"), set([Function, Object]));
}

#[test]
fn test_keyof_tags() {
    let source = r#"
        interface Named { a: 1; 0: 2 }
        interface Indexed { [key: string]: number }
    "#;
    assert_eq!(infer(source, "keyof Named"), set([String, Number]));
    assert_eq!(infer(source, "keyof Indexed"), set([String]));
    assert_eq!(infer(source, "keyof any"), set([String, Number, Symbol]));
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_declaration_tags() {
    let source = r#"
        interface Props { a: string }
        interface Callable { (): void }
        type Handler = (event: Event) => void;
        type Maybe<T> = T | null;
        class Store {}
        enum Direction { Up, Down }
        enum Mode { Light = 'light' }
        enum Mixed { A = 1, B = 'b' }
    "#;
    assert_eq!(infer(source, "Props"), set([Object]));
    assert_eq!(infer(source, "Callable"), set([Function]));
    assert_eq!(infer(source, "Handler"), set([Function]));
    assert_eq!(infer(source, "Maybe<string>"), set([String, Null]));
    assert_eq!(infer(source, "Store"), set([Object]));
    assert_eq!(infer(source, "Direction"), set([Number]));
    assert_eq!(infer(source, "Mode"), set([String]));
    assert_eq!(infer(source, "Mode.Light"), set([String]));
    assert_eq!(infer(source, "Mixed"), set([Number, String]));
}

#[test]
fn test_builtin_tags() {
    assert_eq!(infer("", "Array<string>"), set([Array]));
    assert_eq!(infer("", "ReadonlyArray<string>"), set([Array]));
    assert_eq!(infer("", "Function"), set([Function]));
    assert_eq!(infer("", "Date"), set([Date]));
    assert_eq!(infer("", "Set<string>"), set([Set]));
    assert_eq!(infer("", "Map<string, number>"), set([Map]));
    assert_eq!(infer("", "WeakMap<object, number>"), set([Object]));
    assert_eq!(infer("", "Promise<string>"), set([Object]));
    assert_eq!(infer("", "Error"), set([Error]));
    assert_eq!(infer("", "Record<string, number>"), set([Object]));
    assert_eq!(infer("", "Partial<{ a: 1 }>"), set([Object]));
    assert_eq!(infer("", "Capitalize<'a'>"), set([String]));
    assert_eq!(infer("", "HTMLElement"), set([Unknown]));
}

#[test]
fn test_utility_tags() {
    let source = "declare function load(): Promise<number>;";
    assert_eq!(infer(source, "NonNullable<string | null | undefined>"), set([String]));
    assert_eq!(infer(source, "Extract<string | number, number>"), set([Number]));
    assert_eq!(infer(source, "Exclude<string | number, number>"), set([String, Number]));
    assert_eq!(infer(source, "Awaited<Promise<string>>"), set([String]));
    assert_eq!(infer(source, "ReturnType<typeof load>"), set([Object]));
    assert_eq!(infer(source, "Parameters<typeof load>"), set([Array]));
}

#[test]
fn test_type_queries() {
    let source = r#"
        function handler() {}
        class Store {}
        declare const count: number;
        enum Flags { A }
    "#;
    assert_eq!(infer(source, "typeof handler"), set([Function]));
    assert_eq!(infer(source, "typeof Store"), set([Function]));
    assert_eq!(infer(source, "typeof count"), set([Number]));
    assert_eq!(infer(source, "typeof Flags"), set([Object]));
}

#[test]
fn test_indexed_access_and_conditional_tags() {
    let source = r#"
        interface Config { mode: 'a' | 'b'; level: number; nested: { x: Date } }
        type List = boolean[];
        type IsString<T> = T extends string ? 'yes' : 0;
    "#;
    assert_eq!(infer(source, "Config['mode']"), set([String]));
    assert_eq!(infer(source, "Config['mode' | 'level']"), set([String, Number]));
    assert_eq!(infer(source, "Config['nested']['x']"), set([Date]));
    assert_eq!(infer(source, "List[number]"), set([Boolean]));
    assert_eq!(infer(source, "IsString<'x'>"), set([String]));
    assert_eq!(infer(source, "IsString<1>"), set([Number]));
    assert_eq!(infer(source, "IsString<'x' | 1>"), set([String, Number]));
}

#[test]
fn test_failures_degrade_to_unknown() {
    assert_eq!(infer("", "Missing['key']"), set([Unknown]));
    assert_eq!(infer("type A = B; type B = A;", "A"), set([Unknown]));
    assert_eq!(infer("import { X } from './nowhere';", "X"), set([Unknown]));
}

#[test]
fn test_failing_member_degrades_alone() {
    let source = r#"
        import type { Ext } from 'ext-pkg';
        import type { Gone } from './missing';
        type Choose<T> = T extends string ? Ext : boolean;
    "#;
    assert_eq!(infer(source, "Ext & { a: 1 }"), set([Object]));
    assert_eq!(infer(source, "Ext | boolean"), set([Unknown, Boolean]));
    assert_eq!(infer(source, "Gone | string"), set([Unknown, String]));
    assert_eq!(infer(source, "(() => void) | Ext"), set([Function, Unknown]));
    assert_eq!(infer(source, "Choose<'a' | 1>"), set([Unknown, Boolean]));
}

#[test]
fn test_property_tags() {
    let arena = Bump::new();
    let source = r#"
        interface Props {
            name: string;
            count?: number;
            onClick(): void;
            untyped;
        }
        type Both = { value: string | number } & { value: string };
    "#;
    let fs = MemoryFileSystem::with_files([(MAIN, source)]);
    let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
    let scope = ctx.file_scope(MAIN);

    let shape = ctx.decompose_named(&scope, "Props").unwrap();
    let tags: Vec<RuntimeTags> = shape.props.values().map(|p| ctx.infer_property_tags(p)).collect();
    assert_eq!(tags, vec![set([String]), set([Number]), set([Function]), set([Unknown])]);

    let both = ctx.decompose_named(&scope, "Both").unwrap();
    let value = both.get("value").unwrap();
    assert!(matches!(value.ty, PropertyType::Merged(MergeKind::Intersection, _)));
    assert_eq!(ctx.infer_property_tags(value), set([String, Number]));
}
