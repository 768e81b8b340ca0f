//! Structural decomposition of declared and inline types.

use std::rc::Rc;

use bumpalo::Bump;
use rshape_ast::node::TypeNode;
use rshape_parser::{parse_type_expression, DeclarationParser};
use rshape_resolver::*;

const MAIN: &str = "/src/main.ts";

/// Helper: a context over an in-memory project.
fn context<'a>(arena: &'a Bump, files: &[(&str, &str)]) -> TypeResolutionContext<'a> {
    let fs = MemoryFileSystem::with_files(files.iter().copied());
    TypeResolutionContext::new(arena, fs, DeclarationParser::new())
}

/// Helper: parse a standalone type expression.
fn type_expr<'a>(arena: &'a Bump, text: &str) -> &'a TypeNode<'a> {
    match parse_type_expression(arena, MAIN, text) {
        Ok(node) => node,
        Err(diagnostics) => panic!("failed to parse {text:?}: {:?}", diagnostics.diagnostics()),
    }
}

/// Helper: decompose a type expression written in the context of `source`.
fn decompose_in<'a>(arena: &'a Bump, source: &str, text: &str) -> Result<(TypeResolutionContext<'a>, Vec<String>), ResolveError> {
    let ctx = context(arena, &[(MAIN, source)]);
    let scope = ctx.file_scope(MAIN);
    let shape = ctx.decompose(type_expr(arena, text), &scope, &Bindings::empty())?;
    let keys = shape.props.keys().cloned().collect();
    Ok((ctx, keys))
}

fn keys_of(source: &str, text: &str) -> Vec<String> {
    let arena = Bump::new();
    let result = decompose_in(&arena, source, text);
    match result {
        Ok((_, keys)) => keys,
        Err(error) => panic!("decomposing {text:?} failed: {error}"),
    }
}

fn error_of(source: &str, text: &str) -> ResolveError {
    let arena = Bump::new();
    let result = decompose_in(&arena, source, text);
    match result {
        Ok((_, keys)) => panic!("expected {text:?} to fail, got keys {keys:?}"),
        Err(error) => error,
    }
}

/// Helper: `(key, optional)` pairs of a named type.
fn optionality<'a>(ctx: &TypeResolutionContext<'a>, scope: &Rc<FileScope<'a>>, name: &str) -> Vec<(String, bool)> {
    let shape = ctx.decompose_named(scope, name).unwrap();
    shape.props.values().map(|p| (p.key.clone(), p.optional)).collect()
}

// ============================================================================
// Type literals and interfaces
// ============================================================================

#[test]
fn test_type_literal_members() {
    let arena = Bump::new();
    let ctx = context(&arena, &[(MAIN, "")]);
    let scope = ctx.file_scope(MAIN);
    let node = type_expr(
        &arena,
        "{ foo: string; bar?: number; readonly baz: boolean; 'quoted-key': 1; 2: string; method(): void; get acc(): Date; (): void; new (): object; [key: string]: unknown }",
    );
    let shape = ctx.decompose(node, &scope, &Bindings::empty()).unwrap();
    assert_eq!(shape.keys(), vec!["foo", "bar", "baz", "quoted-key", "2", "method", "acc"]);
    assert!(shape.get("bar").unwrap().optional);
    assert!(!shape.get("foo").unwrap().optional);
    assert!(shape.get("baz").unwrap().readonly);
    assert!(matches!(shape.get("method").unwrap().ty, PropertyType::Signature(_)));
    assert!(matches!(shape.get("acc").unwrap().ty, PropertyType::Type(_)));
    assert_eq!(shape.calls.len(), 1);
}

#[test]
fn test_computed_literal_keys_are_accepted() {
    assert_eq!(keys_of("", "{ ['a']: string; [1]: number }"), vec!["a", "1"]);
}

#[test]
fn test_computed_expression_key_is_an_error() {
    let error = error_of("declare const key: 'a';", "{ [key]: string }");
    assert!(matches!(error, ResolveError::UnsupportedComputedKey { .. }));
    assert_eq!(error.code(), 9002);
}

#[test]
fn test_interface_heritage_own_members_win() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(
            MAIN,
            r#"
            interface A { a: string; shared: string }
            interface B { b: number; shared?: number }
            interface C extends A, B { c: boolean; shared: boolean }
            "#,
        )],
    );
    let scope = ctx.file_scope(MAIN);
    let shape = ctx.decompose_named(&scope, "C").unwrap();
    assert_eq!(shape.keys(), vec!["c", "shared", "a", "b"]);
    let shared = shape.get("shared").unwrap();
    assert!(!shared.optional);
    assert_eq!(ctx.infer_property_tags(shared), [RuntimeTag::Boolean].into_iter().collect::<RuntimeTags>());
}

#[test]
fn test_generic_interface_heritage() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(
            MAIN,
            r#"
            interface Base<T> { value: T }
            interface Props extends Base<number> { label: string }
            "#,
        )],
    );
    let scope = ctx.file_scope(MAIN);
    let shape = ctx.decompose_named(&scope, "Props").unwrap();
    assert_eq!(shape.keys(), vec!["label", "value"]);
    let tags = ctx.infer_property_tags(shape.get("value").unwrap());
    assert_eq!(tags, [RuntimeTag::Number].into_iter().collect::<RuntimeTags>());
}

#[test]
fn test_ignored_self_referential_heritage_never_raises() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(MAIN, "interface Props extends /* @rshape-ignore */ Props, /* @rshape-ignore */ Missing { ok: string }")],
    );
    let scope = ctx.file_scope(MAIN);
    let shape = ctx.decompose_named(&scope, "Props").unwrap();
    assert_eq!(shape.keys(), vec!["ok"]);
}

#[test]
fn test_failed_heritage_wraps_the_cause() {
    let error = error_of("interface Props extends Missing { ok: string }", "Props");
    let ResolveError::ExtendsBaseType { source, .. } = &error else {
        panic!("expected an extends error, got {error:?}");
    };
    assert!(matches!(**source, ResolveError::UnresolvableReference { ref name, .. } if name == "Missing"));
    let diagnostic = error.to_diagnostic();
    assert_eq!(diagnostic.code_string(), "RS9008");
}

#[test]
fn test_bare_import_heritage_without_resolver_is_not_wrapped() {
    let source = r#"
        import type { BaseProps } from 'ui-kit';
        interface Middle extends BaseProps { mid: string }
        interface Props extends Middle { ok: string }
    "#;
    for name in ["Middle", "Props"] {
        let error = error_of(source, name);
        assert!(
            matches!(error, ResolveError::ModuleResolverNotRegistered { ref specifier, .. } if specifier == "ui-kit"),
            "{name}: {error:?}"
        );
        assert_eq!(error.code(), 9005);
    }
}

#[test]
fn test_self_extending_interface_terminates() {
    assert_eq!(keys_of("interface A extends A { a: string }", "A"), vec!["a"]);
}

// ============================================================================
// Aliases, classes, generics
// ============================================================================

#[test]
fn test_type_alias_with_defaults_and_constraints() {
    let source = r#"
        type WithDefault<T = { d: string }> = T & { own: number };
        type WithConstraint<T extends { c: string }> = T;
    "#;
    assert_eq!(keys_of(source, "WithDefault"), vec!["d", "own"]);
    assert_eq!(keys_of(source, "WithDefault<{ x: 1 }>"), vec!["x", "own"]);
    assert_eq!(keys_of(source, "WithConstraint"), vec!["c"]);
}

#[test]
fn test_type_arguments_keep_their_own_scope() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            (MAIN, "import { Wrap } from './wrap';\ninterface Local { local: string }\ntype P = Wrap<Local>;"),
            ("/src/wrap.ts", "interface Local { wrong: string }\nexport type Wrap<T> = T & { wrapped: true };"),
        ],
    );
    let scope = ctx.file_scope(MAIN);
    assert_eq!(ctx.decompose_named(&scope, "P").unwrap().keys(), vec!["local", "wrapped"]);
}

#[test]
fn test_class_instance_members() {
    let source = r#"
        class Widget<T> {
            static count = 0;
            private secret = 1;
            protected internal = 2;
            #hidden = 3;
            name: string;
            value?: T;
            readonly fixed = 4;
            constructor(public size: number, private token: string, readonly id: string, plain: boolean) {}
            render(): void {}
            get label(): string { return '' }
            static create(): Widget<number> { return new Widget(1, '', '', true) }
        }
    "#;
    assert_eq!(keys_of(source, "Widget"), vec!["name", "value", "fixed", "size", "id", "render", "label"]);
}

#[test]
fn test_unresolvable_reference_is_an_error() {
    let error = error_of("", "{ a: string } & Missing");
    assert!(matches!(error, ResolveError::UnresolvableReference { ref name, .. } if name == "Missing"));
    assert_eq!(error.to_string(), "Unresolvable type reference or unsupported built-in utility type 'Missing'.");
}

#[test]
fn test_ignored_reference_is_empty() {
    assert_eq!(keys_of("", "{ a: string } & /* @rshape-ignore */ Missing"), vec!["a"]);
}

#[test]
fn test_alias_cycle_terminates() {
    assert!(keys_of("type A = B; type B = A;", "A").is_empty());
}

#[test]
fn test_depth_limit_reports_too_complex() {
    let arena = Bump::new();
    let options = ResolveOptions { max_depth: 8, ..ResolveOptions::default() };
    let source = "type Nest<T> = { inner: Nest<T> }['inner'] & T;\ntype P = Nest<{ a: string }>;";
    let fs = MemoryFileSystem::with_files([(MAIN, source)]);
    let ctx = TypeResolutionContext::with_options(&arena, fs, DeclarationParser::new(), options);
    let scope = ctx.file_scope(MAIN);
    match ctx.decompose_named(&scope, "P") {
        Err(ResolveError::TooComplex { max_depth, .. }) => assert_eq!(max_depth, 8),
        other => panic!("expected too complex, got {other:?}"),
    }
}

// ============================================================================
// Unions, intersections, tuples
// ============================================================================

#[test]
fn test_intersection_ands_optionality() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(MAIN, "type P = { a?: string; b?: string } & { a: string; c?: number };")],
    );
    let scope = ctx.file_scope(MAIN);
    assert_eq!(
        optionality(&ctx, &scope, "P"),
        vec![("a".into(), false), ("b".into(), true), ("c".into(), true)]
    );
}

#[test]
fn test_intersection_is_commutative_on_keys() {
    let mut left = keys_of("", "{ a: 1 } & { b: 2 } & { c: 3 }");
    let mut right = keys_of("", "{ c: 3 } & ({ b: 2 } & { a: 1 })");
    left.sort();
    right.sort();
    assert_eq!(left, right);
}

#[test]
fn test_union_is_conservative() {
    assert!(keys_of("", "{ a: string } | { a: string; b: number }").is_empty());
    assert_eq!(keys_of("", "{ a: string } | null | undefined"), vec!["a"]);
}

#[test]
fn test_tuple_elements() {
    assert_eq!(keys_of("", "[string, number?, ...boolean[]]"), vec!["0", "1"]);
    assert_eq!(keys_of("", "[first: string, second?: number]"), vec!["0", "1"]);
}

#[test]
fn test_function_and_typeof() {
    let arena = Bump::new();
    let source = "function handler(a: string): number { return 1 }\ndeclare const config: { debug: boolean };";
    let ctx = context(&arena, &[(MAIN, source)]);
    let scope = ctx.file_scope(MAIN);
    let shape = ctx.decompose(type_expr(&arena, "typeof handler"), &scope, &Bindings::empty()).unwrap();
    assert!(shape.props.is_empty());
    assert_eq!(shape.calls.len(), 1);
    let shape = ctx.decompose(type_expr(&arena, "typeof config"), &scope, &Bindings::empty()).unwrap();
    assert_eq!(shape.keys(), vec!["debug"]);
    let shape = ctx.decompose(type_expr(&arena, "(x: number) => void"), &scope, &Bindings::empty()).unwrap();
    assert_eq!(shape.calls.len(), 1);
}

#[test]
fn test_keyword_and_array_types_are_empty() {
    assert!(keys_of("", "string").is_empty());
    assert!(keys_of("", "string[]").is_empty());
    assert!(keys_of("", "'literal'").is_empty());
}

// ============================================================================
// Mapped, indexed access, conditional
// ============================================================================

#[test]
fn test_mapped_type_over_literal_keys() {
    let arena = Bump::new();
    let ctx = context(&arena, &[(MAIN, "type Flags = { [K in 'a' | 'b']: boolean };")]);
    let scope = ctx.file_scope(MAIN);
    let shape = ctx.decompose_named(&scope, "Flags").unwrap();
    assert_eq!(shape.keys(), vec!["a", "b"]);
    for property in shape.props.values() {
        assert!(!property.optional);
        assert_eq!(ctx.infer_property_tags(property), [RuntimeTag::Boolean].into_iter().collect::<RuntimeTags>());
    }
}

#[test]
fn test_mapped_type_modifiers() {
    let arena = Bump::new();
    let source = r#"
        interface Source { a?: string; b: number }
        type Keep = { [K in keyof Source]: Source[K] };
        type AllOptional = { [K in keyof Source]?: Source[K] };
        type AllRequired = { [K in keyof Source]-?: Source[K] };
        type Listed = { [K in 'a' | 'b']: string };
    "#;
    let ctx = context(&arena, &[(MAIN, source)]);
    let scope = ctx.file_scope(MAIN);
    assert_eq!(optionality(&ctx, &scope, "Keep"), vec![("a".into(), true), ("b".into(), false)]);
    assert_eq!(optionality(&ctx, &scope, "AllOptional"), vec![("a".into(), true), ("b".into(), true)]);
    assert_eq!(optionality(&ctx, &scope, "AllRequired"), vec![("a".into(), false), ("b".into(), false)]);
    assert_eq!(optionality(&ctx, &scope, "Listed"), vec![("a".into(), false), ("b".into(), false)]);

    let keep = ctx.decompose_named(&scope, "Keep").unwrap();
    let tags = ctx.infer_property_tags(keep.get("b").unwrap());
    assert_eq!(tags, [RuntimeTag::Number].into_iter().collect::<RuntimeTags>());
}

#[test]
fn test_mapped_type_key_remapping() {
    let source = "interface Source { id: number; name: string }";
    assert_eq!(
        keys_of(source, "{ [K in keyof Source as `get${Capitalize<K>}`]: () => Source[K] }"),
        vec!["getId", "getName"]
    );
}

#[test]
fn test_indexed_access() {
    let source = r#"
        interface Nested { inner: { deep: string; other: number } }
        type List = { item: string }[];
        type Pair = [{ first: 1 }, { first: 2 }];
    "#;
    assert_eq!(keys_of(source, "Nested['inner']"), vec!["deep", "other"]);
    assert_eq!(keys_of(source, "List[number]"), vec!["item"]);
    assert_eq!(keys_of(source, "Pair[0]"), vec!["first"]);
    assert_eq!(keys_of(source, "Pair[number]"), vec!["first"]);
}

#[test]
fn test_conditional_types() {
    let source = r#"
        type Pick1<T> = T extends string ? { str: T } : { other: T };
        type Unwrap<T> = T extends Array<infer U> ? U : never;
    "#;
    assert_eq!(keys_of(source, "Pick1<'x'>"), vec!["str"]);
    assert_eq!(keys_of(source, "Pick1<number>"), vec!["other"]);
    assert_eq!(keys_of(source, "Unwrap<{ el: string }[]>"), vec!["el"]);
}

#[test]
fn test_distributive_conditional_union_merges_branches() {
    let source = r#"
        type Box<T> = T extends string ? { value: string; s: 1 } : { value: string; n: 1 };
    "#;
    assert_eq!(keys_of(source, "Box<'a' | 1>"), vec!["value"]);
}

// ============================================================================
// Utility types
// ============================================================================

#[test]
fn test_partial_required_readonly() {
    let arena = Bump::new();
    let source = r#"
        interface T { a: string; b?: number }
        type P = Partial<T>;
        type R = Required<Partial<T>>;
        type RO = Readonly<T>;
    "#;
    let ctx = context(&arena, &[(MAIN, source)]);
    let scope = ctx.file_scope(MAIN);
    assert_eq!(optionality(&ctx, &scope, "P"), vec![("a".into(), true), ("b".into(), true)]);
    assert_eq!(optionality(&ctx, &scope, "R"), vec![("a".into(), false), ("b".into(), false)]);
    let readonly = ctx.decompose_named(&scope, "RO").unwrap();
    assert!(readonly.props.values().all(|p| p.readonly));
}

#[test]
fn test_pick_and_omit_partition() {
    let source = "interface T { a: string; b: number; c: boolean }";
    assert_eq!(keys_of(source, "Pick<T, 'c' | 'a'>"), vec!["c", "a"]);
    assert_eq!(keys_of(source, "Omit<T, 'c' | 'a'>"), vec!["b"]);
}

#[test]
fn test_record() {
    assert_eq!(keys_of("", "Record<'x' | 'y', number>"), vec!["x", "y"]);
    let error = error_of("", "Record<string, number>");
    assert!(matches!(error, ResolveError::NonFiniteKeys { .. }));
}

#[test]
fn test_extract_exclude_nonnullable() {
    let source = "type U = { kind: 'a' } | string | null;";
    assert_eq!(keys_of(source, "Exclude<U, string>"), vec!["kind"]);
    assert_eq!(keys_of(source, "Extract<U, object>"), vec!["kind"]);
    assert_eq!(keys_of("", "NonNullable<{ a: 1 } | undefined>"), vec!["a"]);
}

#[test]
fn test_instance_type_awaited_parameters_return_type() {
    let source = r#"
        class Store { state = 1; commit(): void {} }
        declare function load(id: string, force?: boolean): { loaded: true };
        type Pending = Promise<PromiseLike<{ done: 1 }>>;
    "#;
    assert_eq!(keys_of(source, "InstanceType<typeof Store>"), vec!["state", "commit"]);
    assert_eq!(keys_of(source, "ReturnType<typeof load>"), vec!["loaded"]);
    assert_eq!(keys_of(source, "Awaited<Pending>"), vec!["done"]);
    assert_eq!(keys_of(source, "Parameters<typeof load>"), vec!["0", "1"]);
}

#[test]
fn test_local_declaration_shadows_utility() {
    assert_eq!(keys_of("type Partial<T> = { shadowed: T };", "Partial<{ a: 1 }>"), vec!["shadowed"]);
}

#[test]
fn test_decompose_property_and_memoization() {
    let arena = Bump::new();
    let ctx = context(&arena, &[(MAIN, "interface Outer { inner: { x: number } }")]);
    let scope = ctx.file_scope(MAIN);
    let outer = ctx.decompose_named(&scope, "Outer").unwrap();
    let inner = ctx.decompose_property(outer.get("inner").unwrap()).unwrap();
    assert_eq!(inner.keys(), vec!["x"]);
    let again = ctx.decompose_named(&scope, "Outer").unwrap();
    assert_eq!(again.keys(), outer.keys());
}
