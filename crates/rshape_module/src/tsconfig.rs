//! Reading module-resolution settings from tsconfig.json.

use std::collections::BTreeMap;

use rshape_resolver::FileSystem;
use rshape_tspath::{combine_paths, get_directory_path, is_relative_specifier, is_rooted, normalize_path};
use serde::Deserialize;
use tracing::debug;

use crate::{ModuleResolutionKind, ModuleResolutionOptions};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read file '{path}'.")]
    NotFound { path: String },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Circularity detected while resolving configuration: {path}")]
    CircularExtends { path: String },

    #[error("Argument for '--moduleResolution' option must be: 'node10', 'node16', 'nodenext', 'bundler', 'classic'; got '{value}' in '{path}'.")]
    UnknownModuleResolution { value: String, path: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TsConfigJson {
    extends: Option<Extends>,
    compiler_options: CompilerOptionsJson,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompilerOptionsJson {
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Vec<String>>>,
    module_resolution: Option<String>,
}

/// Load `baseUrl`, `paths` and `moduleResolution` from a tsconfig file,
/// following `extends`. Relative settings resolve against the directory of
/// the config that declares them.
pub fn load_tsconfig<F: FileSystem>(fs: &F, path: &str) -> Result<ModuleResolutionOptions, ConfigError> {
    let mut options = ModuleResolutionOptions::default();
    let mut visiting = Vec::new();
    load_into(fs, &normalize_path(path), &mut options, &mut visiting)?;
    Ok(options)
}

fn load_into<F: FileSystem>(
    fs: &F,
    path: &str,
    options: &mut ModuleResolutionOptions,
    visiting: &mut Vec<String>,
) -> Result<(), ConfigError> {
    if visiting.iter().any(|seen| seen == path) {
        return Err(ConfigError::CircularExtends { path: path.to_string() });
    }
    let text = fs.read_file(path).ok_or_else(|| ConfigError::NotFound { path: path.to_string() })?;
    let config: TsConfigJson = serde_json::from_str(&strip_json_comments(&text))
        .map_err(|source| ConfigError::Parse { path: path.to_string(), source })?;
    debug!(path, "loaded tsconfig");

    visiting.push(path.to_string());
    let bases = match &config.extends {
        Some(Extends::One(base)) => vec![base.as_str()],
        Some(Extends::Many(bases)) => bases.iter().map(String::as_str).collect(),
        None => Vec::new(),
    };
    for base in bases {
        match resolve_extends(fs, path, base) {
            Some(base_path) => load_into(fs, &base_path, options, visiting)?,
            None => return Err(ConfigError::NotFound { path: base.to_string() }),
        }
    }
    visiting.pop();

    let directory = get_directory_path(path);
    let compiler_options = config.compiler_options;
    if let Some(base_url) = compiler_options.base_url {
        options.base_url = Some(normalize_path(&combine_paths(&directory, &base_url)));
    }
    if let Some(paths) = compiler_options.paths {
        options.paths = paths.into_iter().collect();
        options.paths_base = Some(directory.clone());
    }
    if let Some(value) = compiler_options.module_resolution {
        options.kind = value
            .parse()
            .map_err(|_| ConfigError::UnknownModuleResolution { value, path: path.to_string() })?;
    }
    Ok(())
}

/// The file an `extends` entry names: a path, or a package in `node_modules`.
fn resolve_extends<F: FileSystem>(fs: &F, config_path: &str, base: &str) -> Option<String> {
    let directory = get_directory_path(config_path);
    let candidates: Vec<String> = if is_relative_specifier(base) || is_rooted(base) {
        let path = normalize_path(&combine_paths(&directory, base));
        vec![path.clone(), format!("{path}.json")]
    } else {
        let mut candidates = Vec::new();
        let mut dir = directory;
        loop {
            let path = normalize_path(&combine_paths(&combine_paths(&dir, "node_modules"), base));
            candidates.push(path.clone());
            candidates.push(format!("{path}.json"));
            candidates.push(format!("{path}/tsconfig.json"));
            let parent = get_directory_path(&dir);
            if parent == dir || parent.is_empty() {
                break;
            }
            dir = parent;
        }
        candidates
    };
    candidates.into_iter().find(|candidate| fs.file_exists(candidate))
}

/// tsconfig files are JSON with comments and trailing commas.
pub fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => out.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    remove_trailing_commas(&out)
}

fn remove_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            out.push(c);
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_string = false,
                _ => {}
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        }
        if c == ',' {
            let rest = text[i + 1..].trim_start();
            if rest.starts_with('}') || rest.starts_with(']') {
                continue;
            }
        }
        out.push(c);
    }
    out
}

impl std::str::FromStr for ModuleResolutionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "classic" => Ok(ModuleResolutionKind::Classic),
            "node" | "node10" => Ok(ModuleResolutionKind::Node10),
            "node16" => Ok(ModuleResolutionKind::Node16),
            "nodenext" => Ok(ModuleResolutionKind::NodeNext),
            "bundler" => Ok(ModuleResolutionKind::Bundler),
            other => Err(format!("unknown module resolution '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rshape_resolver::MemoryFileSystem;

    #[test]
    fn test_strip_json_comments() {
        let text = r#"{
            // line comment
            "a": "http://not-a-comment", /* block */
            "b": [1, 2,],
            "c": "quote \" // still string",
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_json_comments(text)).unwrap();
        assert_eq!(value["a"], "http://not-a-comment");
        assert_eq!(value["b"], serde_json::json!([1, 2]));
        assert_eq!(value["c"], "quote \" // still string");
    }

    #[test]
    fn test_module_resolution_kind_from_str() {
        assert_eq!("NodeNext".parse::<ModuleResolutionKind>(), Ok(ModuleResolutionKind::NodeNext));
        assert_eq!("node".parse::<ModuleResolutionKind>(), Ok(ModuleResolutionKind::Node10));
        assert!("amd".parse::<ModuleResolutionKind>().is_err());
    }

    #[test]
    fn test_load_tsconfig_with_extends() {
        let fs = MemoryFileSystem::with_files([
            (
                "/project/tsconfig.json",
                r#"{
                    // project config
                    "extends": "./configs/base",
                    "compilerOptions": { "paths": { "@/*": ["./src/*"] }, },
                }"#,
            ),
            (
                "/project/configs/base.json",
                r#"{ "compilerOptions": { "baseUrl": "..", "moduleResolution": "Bundler", "paths": { "x": ["y"] } } }"#,
            ),
        ]);
        let options = load_tsconfig(&fs, "/project/tsconfig.json").unwrap();
        assert_eq!(options.kind, ModuleResolutionKind::Bundler);
        assert_eq!(options.base_url.as_deref(), Some("/project"));
        assert_eq!(options.paths, vec![("@/*".to_string(), vec!["./src/*".to_string()])]);
        assert_eq!(options.paths_base.as_deref(), Some("/project"));
    }

    #[test]
    fn test_load_tsconfig_errors() {
        let fs = MemoryFileSystem::with_files([
            ("/a/tsconfig.json", r#"{ "extends": "./b.json" }"#),
            ("/a/b.json", r#"{ "extends": "./tsconfig.json" }"#),
            ("/bad/tsconfig.json", r#"{ "compilerOptions": { "moduleResolution": "amd" } }"#),
        ]);
        assert!(matches!(load_tsconfig(&fs, "/a/tsconfig.json"), Err(ConfigError::CircularExtends { .. })));
        assert!(matches!(load_tsconfig(&fs, "/missing.json"), Err(ConfigError::NotFound { .. })));
        assert!(matches!(
            load_tsconfig(&fs, "/bad/tsconfig.json"),
            Err(ConfigError::UnknownModuleResolution { .. })
        ));
    }
}
