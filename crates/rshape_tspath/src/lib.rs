//! rshape_tspath: Path normalization and import-source probing.
//!
//! All paths handled by the resolver are `/`-separated strings. Scope caches are
//! keyed by the normalized absolute path, so `normalize_path` must collapse
//! `.` and `..` segments: `./a/../b.ts` and `./b.ts` name the same scope.

/// File extensions the resolver knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Ts,
    Tsx,
    Dts,
    Js,
    Jsx,
    Json,
}

impl Extension {
    /// The extension including the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Ts => ".ts",
            Extension::Tsx => ".tsx",
            Extension::Dts => ".d.ts",
            Extension::Js => ".js",
            Extension::Jsx => ".jsx",
            Extension::Json => ".json",
        }
    }

    /// Whether a file with this extension carries type declarations.
    pub fn is_typescript(&self) -> bool {
        matches!(self, Extension::Ts | Extension::Tsx | Extension::Dts)
    }

    pub fn from_path(path: &str) -> Option<Extension> {
        // `.d.ts` must be tested before `.ts`.
        [
            Extension::Dts,
            Extension::Ts,
            Extension::Tsx,
            Extension::Js,
            Extension::Jsx,
            Extension::Json,
        ]
        .into_iter()
        .find(|ext| path.ends_with(ext.as_str()))
    }
}

/// Candidate suffixes tried, in order, for a relative import source.
pub const RELATIVE_IMPORT_SUFFIXES: &[&str] = &[
    "",
    ".ts",
    ".tsx",
    ".d.ts",
    "/index.ts",
    "/index.tsx",
    "/index.d.ts",
];

/// Convert backslashes to forward slashes.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalize separators and collapse `.`, `..` and repeated `/` segments.
///
/// Leading `..` segments of a relative path are kept; `..` above the root of an
/// absolute path is dropped.
pub fn normalize_path(path: &str) -> String {
    let path = normalize_slashes(path);
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }
    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether a path is absolute (`/x`, `C:/x`).
pub fn is_rooted(path: &str) -> bool {
    let bytes = path.as_bytes();
    match bytes {
        [] => false,
        [b'/' | b'\\', ..] => true,
        [drive, b':', b'/' | b'\\', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Join `relative` onto `base`. A rooted `relative` replaces `base`.
pub fn combine_paths(base: &str, relative: &str) -> String {
    if base.is_empty() || is_rooted(relative) {
        return relative.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{relative}")
    } else {
        format!("{base}/{relative}")
    }
}

/// The directory containing `path`, without a trailing separator.
pub fn get_directory_path(path: &str) -> String {
    let path = normalize_slashes(path);
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Whether an import specifier is relative to the importing file.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// The absolute path a relative specifier points at, before extension probing.
pub fn resolve_relative_specifier(containing_file: &str, specifier: &str) -> String {
    normalize_path(&combine_paths(&get_directory_path(containing_file), specifier))
}

/// The ordered list of files probed for a relative import of `base`.
///
/// A trailing `.js` is stripped first: TypeScript sources import their siblings
/// by the emitted name.
pub fn relative_import_candidates(base: &str) -> Vec<String> {
    let base = base.strip_suffix(".js").unwrap_or(base);
    RELATIVE_IMPORT_SUFFIXES
        .iter()
        .map(|suffix| format!("{base}{suffix}"))
        .collect()
}

/// Remove a recognized extension from a path.
pub fn remove_extension(path: &str) -> &str {
    match Extension::from_path(path) {
        Some(ext) => &path[..path.len() - ext.as_str().len()],
        None => path,
    }
}

/// Whether a path names a file that can declare types.
pub fn has_ts_file_extension(path: &str) -> bool {
    Extension::from_path(path).is_some_and(|ext| ext.is_typescript())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_path() {
        assert_eq!(Extension::from_path("foo.ts"), Some(Extension::Ts));
        assert_eq!(Extension::from_path("foo.d.ts"), Some(Extension::Dts));
        assert_eq!(Extension::from_path("foo.tsx"), Some(Extension::Tsx));
        assert_eq!(Extension::from_path("foo.js"), Some(Extension::Js));
        assert_eq!(Extension::from_path("foo.txt"), None);
    }

    #[test]
    fn test_normalize_path_collapses_dot_segments() {
        assert_eq!(normalize_path("a\\b\\c"), "a/b/c");
        assert_eq!(normalize_path("/src/a/../b.ts"), "/src/b.ts");
        assert_eq!(normalize_path("/src/./types//props.ts"), "/src/types/props.ts");
        assert_eq!(normalize_path("../x/../y"), "../y");
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("a/.."), ".");
    }

    #[test]
    fn test_get_directory_path() {
        assert_eq!(get_directory_path("/a/b/c.ts"), "/a/b");
        assert_eq!(get_directory_path("/c.ts"), "/");
        assert_eq!(get_directory_path("file.ts"), "");
    }

    #[test]
    fn test_is_rooted() {
        assert!(is_rooted("/usr/bin"));
        assert!(is_rooted("C:/Users"));
        assert!(!is_rooted("relative/path"));
        assert!(!is_rooted(""));
    }

    #[test]
    fn test_combine_paths() {
        assert_eq!(combine_paths("/a/b", "c.ts"), "/a/b/c.ts");
        assert_eq!(combine_paths("/a/b/", "c.ts"), "/a/b/c.ts");
        assert_eq!(combine_paths("", "c.ts"), "c.ts");
        assert_eq!(combine_paths("/a", "/b/c.ts"), "/b/c.ts");
    }

    #[test]
    fn test_relative_specifiers() {
        assert!(is_relative_specifier("./a"));
        assert!(is_relative_specifier("../a"));
        assert!(is_relative_specifier(".."));
        assert!(!is_relative_specifier("vue"));
        assert!(!is_relative_specifier(".hidden"));
        assert_eq!(
            resolve_relative_specifier("/src/comp/Foo.ts", "../types/props"),
            "/src/types/props"
        );
    }

    #[test]
    fn test_relative_import_candidates() {
        let candidates = relative_import_candidates("/src/types.js");
        assert_eq!(
            candidates,
            vec![
                "/src/types",
                "/src/types.ts",
                "/src/types.tsx",
                "/src/types.d.ts",
                "/src/types/index.ts",
                "/src/types/index.tsx",
                "/src/types/index.d.ts",
            ]
        );
    }

    #[test]
    fn test_remove_extension() {
        assert_eq!(remove_extension("foo.ts"), "foo");
        assert_eq!(remove_extension("foo.d.ts"), "foo");
        assert_eq!(remove_extension("foo/bar.js"), "foo/bar");
        assert_eq!(remove_extension("foo"), "foo");
        assert!(has_ts_file_extension("x.d.ts"));
        assert!(!has_ts_file_extension("x.js"));
    }
}
