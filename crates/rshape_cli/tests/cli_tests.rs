use std::fs;
use std::path::Path;

use clap::Parser as ClapParser;
use rshape_cli::{report, run, Cli, CliError, Outcome};
use rshape_resolver::OsFileSystem;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, content) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn path_in(dir: &Path, relative: &str) -> String {
    dir.join(relative).to_str().unwrap().to_string()
}

/// Helper: run with the given arguments, returning the outcome and stdout.
fn run_cli(args: &[&str]) -> (Result<Outcome, CliError>, String) {
    let cli = Cli::try_parse_from(std::iter::once("rshape").chain(args.iter().copied())).unwrap();
    let mut out = Vec::new();
    let result = run(&cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

const BUTTON: &str = r#"
import type { BaseProps } from './base'

export interface ButtonProps extends BaseProps {
    label: string
    size?: 'small' | 'large'
    readonly count: number
    onClick: () => void
}
"#;

const BASE: &str = "export interface BaseProps { disabled?: boolean }";

// ============================================================================
// props
// ============================================================================

#[test]
fn test_props_text_output() {
    let dir = project(&[("src/Button.ts", BUTTON), ("src/base.ts", BASE)]);
    let (result, out) = run_cli(&["props", &path_in(dir.path(), "src/Button.ts"), "ButtonProps"]);
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(
        out,
        "label: String\nsize?: String\nreadonly count: Number\nonClick: Function\ndisabled?: Boolean\n"
    );
}

#[test]
fn test_props_json_output() {
    let dir = project(&[("src/Button.ts", BUTTON), ("src/base.ts", BASE)]);
    let (result, out) = run_cli(&["props", &path_in(dir.path(), "src/Button.ts"), "Pick<ButtonProps, 'label' | 'disabled'>", "--json"]);
    assert_eq!(result.unwrap(), Outcome::Success);

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let props = value["props"].as_array().unwrap();
    let keys: Vec<&str> = props.iter().map(|prop| prop["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["label", "disabled"]);
    assert_eq!(props[0]["types"], serde_json::json!(["String"]));
    assert_eq!(props[1]["optional"], true);
    assert_eq!(value["call_signatures"], 0);
    assert_eq!(value["dependencies"].as_array().unwrap().len(), 1);
}

#[test]
fn test_props_through_tsconfig_paths_and_packages() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["src/*"] } } }"#),
        ("src/types.ts", "export interface Shared { id: string }"),
        ("node_modules/ui/package.json", r#"{ "types": "index.d.ts" }"#),
        ("node_modules/ui/index.d.ts", "export interface Theme { color: string; dark: boolean }"),
        (
            "src/components/Card.ts",
            "import type { Shared } from '@/types'\nimport type { Theme } from 'ui'\nexport type Props = Shared & Partial<Theme>",
        ),
    ]);
    let (result, out) = run_cli(&["props", &path_in(dir.path(), "src/components/Card.ts"), "Props"]);
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(out, "id: String\ncolor?: String\ndark?: Boolean\n");
}

// ============================================================================
// keys and assignable
// ============================================================================

#[test]
fn test_keys() {
    let dir = project(&[("src/Button.ts", BUTTON), ("src/base.ts", BASE)]);
    let file = path_in(dir.path(), "src/Button.ts");

    let (result, out) = run_cli(&["keys", &file, "keyof ButtonProps"]);
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(out, "label\nsize\ncount\nonClick\ndisabled\n");

    let (result, out) = run_cli(&["keys", &file, "`${ButtonProps['size']}-btn`", "--json"]);
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(out, "[\"small-btn\",\"large-btn\"]\n");
}

#[test]
fn test_assignable() {
    let dir = project(&[("src/Button.ts", BUTTON), ("src/base.ts", BASE)]);
    let file = path_in(dir.path(), "src/Button.ts");

    let (result, out) = run_cli(&["assignable", &file, "ButtonProps", "{ label: string }"]);
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(out, "true\n");

    let (result, out) = run_cli(&["assignable", &file, "number", "string", "--json"]);
    assert_eq!(result.unwrap(), Outcome::NotAssignable);
    assert_eq!(out, "{\"assignable\":false}\n");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unresolvable_reference_reports_diagnostic() {
    let dir = project(&[("src/a.ts", "export interface Props extends Missing { id: string }")]);
    let file = path_in(dir.path(), "src/a.ts");
    let (result, out) = run_cli(&["props", &file, "Props"]);
    let error = result.unwrap_err();
    assert!(out.is_empty());

    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, 9008);
    let rendered = report::render(&diagnostics[0], &OsFileSystem, false);
    assert!(rendered.contains("RS9008"));
    assert!(rendered.contains("RS9001"));
    assert!(rendered.contains("@rshape-ignore"));
}

#[test]
fn test_missing_file_and_invalid_type() {
    let dir = project(&[("src/a.ts", "export type A = 1")]);
    let (result, _) = run_cli(&["props", &path_in(dir.path(), "src/missing.ts"), "A"]);
    assert!(matches!(result, Err(CliError::FileNotFound(_))));

    let (result, _) = run_cli(&["keys", &path_in(dir.path(), "src/a.ts"), "A |"]);
    let error = result.unwrap_err();
    assert!(matches!(error, CliError::InvalidType { .. }));
    assert!(!error.diagnostics().is_empty());
}

#[test]
fn test_max_depth_option() {
    let dir = project(&[(
        "src/deep.ts",
        "type Nest<T> = { inner: Nest<T> }['inner'] & T;\nexport type Deep = Nest<{ a: string }>;",
    )]);
    let (result, _) = run_cli(&["props", &path_in(dir.path(), "src/deep.ts"), "Deep", "--maxDepth", "8"]);
    match result {
        Err(CliError::Resolve(error)) => assert_eq!(error.code(), 9007),
        other => panic!("expected too-complex error, got {other:?}"),
    }
}
