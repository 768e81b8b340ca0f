//! Scope building and name resolution across files.

use bumpalo::Bump;
use rshape_parser::DeclarationParser;
use rshape_resolver::*;

/// Helper: a context over an in-memory project.
fn context<'a>(arena: &'a Bump, files: &[(&str, &str)]) -> TypeResolutionContext<'a> {
    let fs = MemoryFileSystem::with_files(files.iter().copied());
    TypeResolutionContext::new(arena, fs, DeclarationParser::new())
}

fn resolved_kind(ctx: &TypeResolutionContext<'_>, file: &str, name: &str) -> Option<&'static str> {
    let scope = ctx.file_scope(file);
    match ctx.resolve_type_name(name, &scope) {
        Ok(found) => found.map(|reference| reference.declaration.kind_name()),
        Err(error) => panic!("resolving {name} failed: {error}"),
    }
}

fn keys(shape: &DecomposedType<'_>) -> Vec<String> {
    shape.props.keys().cloned().collect()
}

// ============================================================================
// Scope builder
// ============================================================================

#[test]
fn test_scope_records_declarations_by_space() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(
            "/src/main.ts",
            r#"
            interface Props { a: string }
            type Alias = Props;
            class Widget { x = 1 }
            enum Size { Small, Large }
            namespace Shapes { export interface Circle { r: number } }
            function make(): Props { return { a: '' } }
            declare const config: { debug: boolean };
            "#,
        )],
    );
    let scope = ctx.file_scope("/src/main.ts");
    let types: Vec<&str> = scope.types.keys().copied().collect();
    assert_eq!(types, vec!["Alias", "Widget", "Size", "Props"]);
    let values: Vec<&str> = scope.values.keys().copied().collect();
    assert_eq!(values, vec!["Widget", "Size", "make", "config"]);
    assert!(scope.namespaces.contains_key("Shapes"));
    assert!(scope.exports.is_empty());
}

#[test]
fn test_scope_merges_interface_declarations() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[("/src/main.ts", "interface Props { a: string }\ninterface Props { b: number }")],
    );
    let scope = ctx.file_scope("/src/main.ts");
    let Some(Declaration::Interface(group)) = scope.types.get("Props") else {
        panic!("expected an interface group");
    };
    assert_eq!(group.len(), 2);
    let shape = ctx.decompose_named(&scope, "Props").unwrap();
    assert_eq!(keys(&shape), vec!["a", "b"]);
}

#[test]
fn test_scope_records_imports_and_exports() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(
            "/src/main.ts",
            r#"
            import Default, { A, B as C, type D } from './types';
            import * as NS from './ns';
            export interface Props {}
            export { C as Renamed };
            export { E } from './e';
            export * from './all';
            export * as Grouped from './grouped';
            "#,
        )],
    );
    let scope = ctx.file_scope("/src/main.ts");

    let imports: Vec<&str> = scope.imports.keys().copied().collect();
    assert_eq!(imports, vec!["Default", "A", "C", "D", "NS"]);
    assert!(matches!(scope.imports["Default"].imported, ImportedName::Default));
    assert!(matches!(scope.imports["C"].imported, ImportedName::Named("B")));
    assert!(scope.imports["D"].is_type_only);
    assert!(matches!(scope.imports["NS"].imported, ImportedName::Namespace));
    assert_eq!(scope.imports["A"].source.specifier, "./types");

    assert!(matches!(scope.exports["Props"], ExportBinding::Local("Props")));
    assert!(matches!(scope.exports["Renamed"], ExportBinding::Local("C")));
    assert!(matches!(scope.exports["E"], ExportBinding::ReExport { name: "E", .. }));
    assert!(matches!(scope.exports["Grouped"], ExportBinding::Namespace { .. }));
    assert_eq!(scope.export_all_sources.len(), 1);
    assert_eq!(scope.export_all_sources[0].specifier, "./all");
}

#[test]
fn test_scope_default_exports() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/a.ts", "export default interface Props { a: string }"),
            ("/src/b.ts", "interface Props { b: string }\nexport default Props;"),
        ],
    );
    let a = ctx.file_scope("/src/a.ts");
    assert!(matches!(a.exports["default"], ExportBinding::Local("Props")));
    let b = ctx.file_scope("/src/b.ts");
    assert!(matches!(b.exports["default"], ExportBinding::Local("Props")));
}

#[test]
fn test_scope_is_built_once_per_file() {
    let arena = Bump::new();
    let ctx = context(&arena, &[("/src/main.ts", "export type A = string;")]);
    let first = ctx.file_scope("/src/main.ts");
    let second = ctx.file_scope("/src/./main.ts");
    assert_eq!(first.id(), second.id());
}

#[test]
fn test_declaration_file_members_are_exported() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/types.d.ts", "declare interface Ambient { a: string }\ninterface Plain { b: number }"),
            ("/src/main.ts", "import { Ambient } from './types';\ntype P = Ambient;"),
        ],
    );
    let scope = ctx.file_scope("/src/types.d.ts");
    assert!(scope.exports.contains_key("Ambient"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "P"), Some("type alias"));
    let main = ctx.file_scope("/src/main.ts");
    assert_eq!(keys(&ctx.decompose_named(&main, "P").unwrap()), vec!["a"]);
}

// ============================================================================
// Name resolution
// ============================================================================

#[test]
fn test_resolve_local_and_missing_names() {
    let arena = Bump::new();
    let ctx = context(&arena, &[("/src/main.ts", "interface Props {}\ntype Alias = Props;")]);
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Props"), Some("interface"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Alias"), Some("type alias"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Missing"), None);
}

#[test]
fn test_resolve_named_import() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/main.ts", "import { Props as Local } from './types';"),
            ("/src/types.ts", "export interface Props { size: number }"),
        ],
    );
    let scope = ctx.file_scope("/src/main.ts");
    let reference = ctx.resolve_type_name("Local", &scope).unwrap().unwrap();
    assert_eq!(reference.declaration.kind_name(), "interface");
    assert_eq!(reference.scope.file_name, "/src/types.ts");
    assert_eq!(ctx.dependencies(), vec!["/src/types.ts".to_string()]);
}

#[test]
fn test_resolve_import_candidates() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/main.ts", "import { A } from './dir';\nimport { B } from './decl';\nimport { C } from './js.js';"),
            ("/src/dir/index.ts", "export type A = string;"),
            ("/src/decl.d.ts", "export type B = string;"),
            ("/src/js.ts", "export type C = string;"),
        ],
    );
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "A"), Some("type alias"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "B"), Some("type alias"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "C"), Some("type alias"));
}

#[test]
fn test_resolve_through_reexports() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/main.ts", "import { Renamed, Deep, Default } from './index';"),
            ("/src/index.ts", "export { Props as Renamed } from './props';\nexport * from './deep';\nexport { default as Default } from './def';"),
            ("/src/props.ts", "export interface Props { a: string }"),
            ("/src/deep.ts", "export * from './deeper';"),
            ("/src/deeper.ts", "export type Deep = { d: number };"),
            ("/src/def.ts", "export default interface Whatever { w: boolean }"),
        ],
    );
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Renamed"), Some("interface"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Deep"), Some("type alias"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Default"), Some("interface"));
}

#[test]
fn test_export_star_does_not_forward_default() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/main.ts", "import Thing from './index';"),
            ("/src/index.ts", "export * from './thing';"),
            ("/src/thing.ts", "export default interface Thing {}"),
        ],
    );
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Thing"), None);
}

#[test]
fn test_resolve_qualified_names() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            (
                "/src/main.ts",
                r#"
                import * as Types from './types';
                namespace Outer { export namespace Inner { export interface Leaf { l: string } } }
                enum Color { Red = 'red' }
                type A = Types.Props;
                type B = Outer.Inner.Leaf;
                type C = Color.Red;
                "#,
            ),
            ("/src/types.ts", "export interface Props { p: number }"),
        ],
    );
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Types.Props"), Some("interface"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Outer.Inner.Leaf"), Some("interface"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Color.Red"), Some("enum member"));
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Outer.Missing"), None);
}

#[test]
fn test_namespace_members_see_enclosing_scope() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[(
            "/src/main.ts",
            r#"
            interface Base { base: string }
            namespace NS { export interface Child extends Base { child: number } }
            type P = NS.Child;
            "#,
        )],
    );
    let scope = ctx.file_scope("/src/main.ts");
    let shape = ctx.decompose_named(&scope, "P").unwrap();
    assert_eq!(keys(&shape), vec!["child", "base"]);
}

#[test]
fn test_bare_import_requires_module_resolver() {
    let arena = Bump::new();
    let ctx = context(&arena, &[("/src/main.ts", "import { Props } from 'some-lib';\ntype P = Props;")]);
    let scope = ctx.file_scope("/src/main.ts");
    let error = ctx.decompose_named(&scope, "P").unwrap_err();
    assert!(matches!(error, ResolveError::ModuleResolverNotRegistered { ref specifier, .. } if specifier == "some-lib"));
    assert_eq!(error.code(), 9005);
}

#[test]
fn test_bare_import_through_registered_resolver() {
    let arena = Bump::new();
    let mut ctx = context(
        &arena,
        &[
            ("/src/main.ts", "import { Props } from 'some-lib';\ntype P = Props;"),
            ("/node_modules/some-lib/index.d.ts", "export interface Props { fromLib: string }"),
        ],
    );
    ctx.register_module_resolver(|specifier: &str, _importer: &str| {
        (specifier == "some-lib").then(|| "/node_modules/some-lib/index.d.ts".to_string())
    });
    let scope = ctx.file_scope("/src/main.ts");
    let shape = ctx.decompose_named(&scope, "P").unwrap();
    assert_eq!(keys(&shape), vec!["fromLib"]);
    assert_eq!(ctx.dependencies(), vec!["/node_modules/some-lib/index.d.ts".to_string()]);
}

#[test]
fn test_missing_relative_import_is_an_error() {
    let arena = Bump::new();
    let ctx = context(&arena, &[("/src/main.ts", "import { Props } from './nowhere';\ntype P = Props;")]);
    let scope = ctx.file_scope("/src/main.ts");
    let error = ctx.decompose_named(&scope, "P").unwrap_err();
    assert!(matches!(error, ResolveError::ImportSourceNotFound { .. }));
}

#[test]
fn test_global_type_files() {
    let arena = Bump::new();
    let mut ctx = context(
        &arena,
        &[
            ("/src/main.ts", "type P = GlobalProps & AugmentedProps;"),
            ("/types/globals.d.ts", "interface GlobalProps { g: string }"),
            ("/types/augment.ts", "export {};\ndeclare global { interface AugmentedProps { aug: number } }\ninterface Hidden {}"),
        ],
    );
    ctx.add_global_type_file("/types/globals.d.ts");
    ctx.add_global_type_file("/types/augment.ts");
    let scope = ctx.file_scope("/src/main.ts");
    let shape = ctx.decompose_named(&scope, "P").unwrap();
    assert_eq!(keys(&shape), vec!["g", "aug"]);
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "Hidden"), None);
}

#[test]
fn test_local_declaration_shadows_global() {
    let arena = Bump::new();
    let mut ctx = context(
        &arena,
        &[
            ("/src/main.ts", "interface Props { local: string }"),
            ("/types/globals.d.ts", "interface Props { global: string }"),
        ],
    );
    ctx.add_global_type_file("/types/globals.d.ts");
    let scope = ctx.file_scope("/src/main.ts");
    assert_eq!(keys(&ctx.decompose_named(&scope, "Props").unwrap()), vec!["local"]);
}

#[test]
fn test_import_cycle_does_not_recurse_forever() {
    let arena = Bump::new();
    let ctx = context(
        &arena,
        &[
            ("/src/a.ts", "export { X } from './b';"),
            ("/src/b.ts", "export { X } from './a';"),
            ("/src/main.ts", "import { X } from './a';"),
        ],
    );
    assert_eq!(resolved_kind(&ctx, "/src/main.ts", "X"), None);
}

// ============================================================================
// Invalidation
// ============================================================================

#[test]
fn test_invalidate_picks_up_changed_file() {
    let arena = Bump::new();
    let fs = MemoryFileSystem::with_files([
        ("/src/main.ts", "import { Props } from './types';\ntype P = Props;"),
        ("/src/types.ts", "export interface Props { before: string }"),
    ]);
    let ctx = TypeResolutionContext::new(&arena, fs.clone(), DeclarationParser::new());
    let scope = ctx.file_scope("/src/main.ts");
    assert_eq!(keys(&ctx.decompose_named(&scope, "P").unwrap()), vec!["before"]);

    fs.write_file("/src/types.ts", "export interface Props { after: number }");
    // Still cached until invalidated.
    assert_eq!(keys(&ctx.decompose_named(&scope, "P").unwrap()), vec!["before"]);
    ctx.invalidate("/src/types.ts");
    assert_eq!(keys(&ctx.decompose_named(&scope, "P").unwrap()), vec!["after"]);
}
