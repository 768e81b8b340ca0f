//! rshape: inspect how TypeScript types reduce to runtime prop shapes.
//!
//! Usage:
//!   rshape props <FILE> <TYPE>
//!   rshape keys <FILE> <TYPE>
//!   rshape assignable <FILE> <CANDIDATE> <TARGET>
//!
//! `TYPE` is a name declared in or imported into `FILE` (`Props`,
//! `Types.Props`) or any type expression (`Partial<Props> & { id: string }`).

pub mod report;
pub mod tracing_config;

use std::io::Write;
use std::rc::Rc;

use bumpalo::Bump;
use clap::{Args, Parser as ClapParser, Subcommand};
use rshape_ast::node::TypeNode;
use rshape_diagnostics::Diagnostic;
use rshape_module::{load_tsconfig, ConfigError, ModuleResolutionKind, ModuleResolutionOptions, NodeModuleResolver};
use rshape_parser::{parse_type_expression, DeclarationParser};
use rshape_resolver::{
    Bindings, DecomposedType, FileScope, FileSystem, OsFileSystem, ResolveError, ResolveOptions, RuntimeTag,
    TypeResolutionContext, DEFAULT_MAX_DEPTH,
};
use rshape_tspath::{combine_paths, get_directory_path, is_rooted, normalize_path};
use serde::Serialize;
use tracing::{debug, info_span};

#[derive(ClapParser, Debug)]
#[command(name = "rshape", about = "rshape - Reduce TypeScript types to runtime prop shapes", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub options: SharedOptions,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the properties of a type with their runtime types.
    Props {
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "TYPE")]
        type_text: String,
    },
    /// List the finite set of string keys a type denotes.
    Keys {
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "TYPE")]
        type_text: String,
    },
    /// Check whether CANDIDATE is assignable to TARGET.
    Assignable {
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "CANDIDATE")]
        candidate: String,
        #[arg(value_name = "TARGET")]
        target: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SharedOptions {
    /// Path to tsconfig.json. Defaults to the nearest one above FILE.
    #[arg(short = 'p', long = "project", global = true)]
    pub project: Option<String>,

    /// Override the module resolution strategy.
    #[arg(long = "moduleResolution", global = true)]
    pub module_resolution: Option<ModuleResolutionKind>,

    /// Maximum nesting depth before a type counts as too complex.
    #[arg(long = "maxDepth", global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Declaration files whose globals are visible everywhere.
    #[arg(long = "globalTypes", value_name = "FILE", global = true)]
    pub global_types: Vec<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("File '{0}' not found.")]
    FileNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid type expression '{text}'.")]
    InvalidType { text: String, diagnostics: Vec<Diagnostic> },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Diagnostics to render with source snippets, if the error has any.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            CliError::InvalidType { diagnostics, .. } => diagnostics.clone(),
            CliError::Resolve(error) => vec![error.to_diagnostic()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PropReport {
    pub key: String,
    pub optional: bool,
    pub readonly: bool,
    pub types: Vec<RuntimeTag>,
}

#[derive(Debug, Serialize)]
pub struct ShapeReport {
    pub props: Vec<PropReport>,
    pub call_signatures: usize,
    pub dependencies: Vec<String>,
}

/// Process exit status of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// `assignable` answered no.
    NotAssignable,
}

/// Run a command, writing results to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let file = match &cli.command {
        Command::Props { file, .. } | Command::Keys { file, .. } | Command::Assignable { file, .. } => {
            absolute_path(file)?
        }
    };
    let fs = OsFileSystem;
    if !fs.file_exists(&file) {
        return Err(CliError::FileNotFound(file));
    }

    let arena = Bump::new();
    let ctx = create_context(&arena, &cli.options, &file)?;
    let scope = ctx.file_scope(&file);
    let _span = info_span!("rshape", file = %file).entered();

    match &cli.command {
        Command::Props { type_text, .. } => {
            let shape = decompose(&ctx, &scope, type_text)?;
            let report = shape_report(&ctx, &shape);
            if cli.options.json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                write_shape(out, &report)?;
            }
            Ok(Outcome::Success)
        }
        Command::Keys { type_text, .. } => {
            let node = parse_type(&arena, type_text)?;
            let keys = ctx.resolve_keys(node, &scope, &Bindings::empty())?;
            if cli.options.json {
                serde_json::to_writer(&mut *out, &keys.iter().collect::<Vec<_>>())?;
                writeln!(out)?;
            } else {
                for key in &keys {
                    writeln!(out, "{key}")?;
                }
            }
            Ok(Outcome::Success)
        }
        Command::Assignable { candidate, target, .. } => {
            let candidate = parse_type(&arena, candidate)?;
            let target = parse_type(&arena, target)?;
            let assignable = ctx.is_assignable(candidate, target, &scope, &Bindings::empty());
            if cli.options.json {
                writeln!(out, "{}", serde_json::json!({ "assignable": assignable }))?;
            } else {
                writeln!(out, "{assignable}")?;
            }
            Ok(if assignable { Outcome::Success } else { Outcome::NotAssignable })
        }
    }
}

fn create_context<'a>(arena: &'a Bump, options: &SharedOptions, file: &str) -> Result<TypeResolutionContext<'a>, CliError> {
    let fs = OsFileSystem;
    let tsconfig = match &options.project {
        Some(project) => Some(absolute_path(project)?),
        None => find_tsconfig(&fs, file),
    };
    let mut module_options = match &tsconfig {
        Some(path) => {
            debug!(tsconfig = %path, "using project config");
            load_tsconfig(&fs, path)?
        }
        None => ModuleResolutionOptions::default(),
    };
    if let Some(kind) = options.module_resolution {
        module_options.kind = kind;
    }

    let resolve_options = ResolveOptions {
        max_depth: options.max_depth,
        global_type_files: options.global_types.iter().map(|path| absolute_path(path)).collect::<Result<_, _>>()?,
    };
    let mut ctx = TypeResolutionContext::with_options(arena, fs, DeclarationParser::new(), resolve_options);
    ctx.register_module_resolver(NodeModuleResolver::new(fs, module_options));
    Ok(ctx)
}

/// The nearest `tsconfig.json` in the directories above `file`.
fn find_tsconfig(fs: &impl FileSystem, file: &str) -> Option<String> {
    let mut dir = get_directory_path(file);
    loop {
        let candidate = combine_paths(&dir, "tsconfig.json");
        if fs.file_exists(&candidate) {
            return Some(candidate);
        }
        let parent = get_directory_path(&dir);
        if parent == dir || parent.is_empty() {
            return None;
        }
        dir = parent;
    }
}

fn absolute_path(path: &str) -> Result<String, CliError> {
    if is_rooted(path) {
        return Ok(normalize_path(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize_path(&combine_paths(&cwd.to_string_lossy(), path)))
}

fn parse_type<'a>(arena: &'a Bump, text: &str) -> Result<&'a TypeNode<'a>, CliError> {
    parse_type_expression(arena, "<type>", text)
        .map_err(|diagnostics| CliError::InvalidType { text: text.to_string(), diagnostics: diagnostics.into_diagnostics() })
}

fn is_entity_name(text: &str) -> bool {
    text.split('.').all(|part| {
        let mut chars = part.chars();
        chars.next().is_some_and(|c| c == '_' || c == '$' || c.is_alphabetic())
            && chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
    })
}

fn decompose<'a>(
    ctx: &TypeResolutionContext<'a>,
    scope: &Rc<FileScope<'a>>,
    type_text: &str,
) -> Result<DecomposedType<'a>, CliError> {
    if is_entity_name(type_text) {
        return Ok(ctx.decompose_named(scope, type_text)?);
    }
    let node = parse_type(ctx.arena(), type_text)?;
    Ok(ctx.decompose(node, scope, &Bindings::empty())?)
}

fn shape_report<'a>(ctx: &TypeResolutionContext<'a>, shape: &DecomposedType<'a>) -> ShapeReport {
    let props = shape
        .props
        .values()
        .map(|property| PropReport {
            key: property.key.clone(),
            optional: property.optional,
            readonly: property.readonly,
            types: ctx.infer_property_tags(property).into_iter().collect(),
        })
        .collect();
    ShapeReport { props, call_signatures: shape.calls.len(), dependencies: ctx.dependencies() }
}

fn write_shape(out: &mut dyn Write, report: &ShapeReport) -> std::io::Result<()> {
    for prop in &report.props {
        let types: Vec<&str> = prop.types.iter().map(|tag| tag.as_str()).collect();
        let readonly = if prop.readonly { "readonly " } else { "" };
        let optional = if prop.optional { "?" } else { "" };
        writeln!(out, "{readonly}{}{optional}: {}", prop.key, types.join(" | "))?;
    }
    if report.call_signatures > 0 {
        writeln!(out, "({} call signature{})", report.call_signatures, if report.call_signatures == 1 { "" } else { "s" })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_entity_name() {
        assert!(is_entity_name("Props"));
        assert!(is_entity_name("Types.Props"));
        assert!(is_entity_name("$_internal"));
        assert!(!is_entity_name("Partial<Props>"));
        assert!(!is_entity_name("'a' | 'b'"));
        assert!(!is_entity_name("Types."));
    }

    #[test]
    fn test_cli_parses_shared_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rshape",
            "props",
            "src/a.ts",
            "Props",
            "--moduleResolution",
            "node16",
            "--maxDepth",
            "20",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.options.module_resolution, Some(ModuleResolutionKind::Node16));
        assert_eq!(cli.options.max_depth, 20);
        assert!(cli.options.json);
        assert!(matches!(cli.command, Command::Props { ref type_text, .. } if type_text == "Props"));
    }

    #[test]
    fn test_cli_rejects_unknown_module_resolution() {
        assert!(Cli::try_parse_from(["rshape", "keys", "a.ts", "K", "--moduleResolution", "amd"]).is_err());
    }

    #[test]
    fn test_write_shape() {
        let report = ShapeReport {
            props: vec![
                PropReport { key: "id".into(), optional: false, readonly: true, types: vec![RuntimeTag::String] },
                PropReport {
                    key: "size".into(),
                    optional: true,
                    readonly: false,
                    types: vec![RuntimeTag::String, RuntimeTag::Number],
                },
            ],
            call_signatures: 1,
            dependencies: vec![],
        };
        let mut out = Vec::new();
        write_shape(&mut out, &report).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "readonly id: String\nsize?: String | Number\n(1 call signature)\n"
        );
    }
}
