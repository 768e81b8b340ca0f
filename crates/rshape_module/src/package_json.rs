//! The package.json fields module resolution reads.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

/// Conditions matched against `exports` maps, in priority order.
pub const EXPORT_CONDITIONS: &[&str] = &["types", "import", "require", "node", "default"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub module: Option<String>,
    pub types: Option<String>,
    pub typings: Option<String>,
    pub exports: Option<PackageExports>,
    #[serde(rename = "type")]
    pub type_field: Option<String>,
}

impl PackageJson {
    /// The declaration entry point: `types`, else `typings`.
    pub fn types_entry(&self) -> Option<&str> {
        self.types.as_deref().or(self.typings.as_deref())
    }
}

/// The `exports` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PackageExports {
    String(String),
    Array(Vec<PackageExports>),
    /// Either a subpath map (keys start with `.`) or a condition map.
    Map(BTreeMap<String, PackageExports>),
    /// `null`: the subpath is deliberately not exported.
    Excluded,
}

impl PackageExports {
    /// The target of `subpath` (`"."` or `"./sub"`), relative to the package
    /// directory.
    pub fn resolve(&self, subpath: &str, conditions: &[&str]) -> Option<String> {
        match self {
            PackageExports::Map(map) if map.keys().any(|key| key.starts_with('.')) => {
                if let Some(entry) = map.get(subpath) {
                    return entry.target(conditions, "");
                }
                // The most specific pattern wins.
                let mut patterns: Vec<(&str, &str, &PackageExports)> = map
                    .iter()
                    .filter_map(|(key, entry)| key.split_once('*').map(|(prefix, suffix)| (prefix, suffix, entry)))
                    .collect();
                patterns.sort_by_key(|(prefix, ..)| std::cmp::Reverse(prefix.len()));
                patterns
                    .into_iter()
                    .find_map(|(prefix, suffix, entry)| {
                        let star = subpath.strip_prefix(prefix)?.strip_suffix(suffix)?;
                        Some(entry.target(conditions, star))
                    })
                    .flatten()
            }
            // Sugar for `{ ".": ... }`.
            other if subpath == "." => other.target(conditions, ""),
            _ => None,
        }
    }

    fn target(&self, conditions: &[&str], star: &str) -> Option<String> {
        match self {
            PackageExports::String(target) => Some(target.replace('*', star)),
            PackageExports::Array(entries) => entries.iter().find_map(|entry| entry.target(conditions, star)),
            PackageExports::Map(map) => conditions
                .iter()
                .find_map(|condition| map.get(*condition).and_then(|entry| entry.target(conditions, star))),
            PackageExports::Excluded => None,
        }
    }
}

/// Parse a package.json. Malformed files yield `None`.
pub fn parse_package_json(content: &str) -> Option<PackageJson> {
    match serde_json::from_str(content) {
        Ok(package) => Some(package),
        Err(error) => {
            debug!(%error, "ignoring malformed package.json");
            None
        }
    }
}
