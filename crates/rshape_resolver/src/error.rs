//! Resolution errors.
//!
//! Every failure that aborts a decomposition is a `ResolveError`. Each variant
//! maps onto a message in the diagnostics catalogue, so hosts can report it
//! with a stable code through [`ResolveError::to_diagnostic`].

use std::fmt;

use rshape_ast::IGNORE_DIRECTIVE;
use rshape_core::text::TextRange;
use rshape_diagnostics::{messages, Diagnostic, DiagnosticMessage};

/// The file and source range of the node an error is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub range: TextRange,
}

impl Location {
    pub fn new(file: impl Into<String>, range: TextRange) -> Self {
        Self { file: file.into(), range }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.file, self.range.pos)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("Unresolvable type reference or unsupported built-in utility type '{name}'.")]
    UnresolvableReference { name: String, location: Location },

    #[error("Unsupported computed key in type literal.")]
    UnsupportedComputedKey { location: Location },

    #[error("Failed to resolve index type into finite keys.")]
    NonFiniteKeys { location: Location },

    #[error("Unsupported type '{kind}' when resolving index type.")]
    UnsupportedIndexType { kind: String, location: Location },

    #[error("Failed to resolve import source '{specifier}': no module resolver is registered for non-relative imports.")]
    ModuleResolverNotRegistered { specifier: String, location: Location },

    #[error("Failed to resolve import source '{specifier}'.")]
    ImportSourceNotFound { specifier: String, location: Location },

    #[error("Type is too complex to resolve: maximum depth of {max_depth} exceeded.")]
    TooComplex { max_depth: u32, location: Location },

    #[error("Failed to resolve extends base type.")]
    ExtendsBaseType {
        location: Location,
        #[source]
        source: Box<ResolveError>,
    },

    #[error("Type parameter '{name}' has no type argument, default or constraint.")]
    UnboundTypeParameter { name: String, location: Location },
}

impl ResolveError {
    pub fn location(&self) -> &Location {
        match self {
            ResolveError::UnresolvableReference { location, .. }
            | ResolveError::UnsupportedComputedKey { location }
            | ResolveError::NonFiniteKeys { location }
            | ResolveError::UnsupportedIndexType { location, .. }
            | ResolveError::ModuleResolverNotRegistered { location, .. }
            | ResolveError::ImportSourceNotFound { location, .. }
            | ResolveError::TooComplex { location, .. }
            | ResolveError::ExtendsBaseType { location, .. }
            | ResolveError::UnboundTypeParameter { location, .. } => location,
        }
    }

    fn message(&self) -> (&'static DiagnosticMessage, Vec<String>) {
        match self {
            ResolveError::UnresolvableReference { name, .. } => {
                (&messages::UNRESOLVABLE_TYPE_REFERENCE, vec![name.clone()])
            }
            ResolveError::UnsupportedComputedKey { .. } => (&messages::UNSUPPORTED_COMPUTED_KEY, vec![]),
            ResolveError::NonFiniteKeys { .. } => (&messages::FAILED_TO_RESOLVE_FINITE_KEYS, vec![]),
            ResolveError::UnsupportedIndexType { kind, .. } => {
                (&messages::UNSUPPORTED_INDEX_TYPE, vec![kind.clone()])
            }
            ResolveError::ModuleResolverNotRegistered { specifier, .. } => {
                (&messages::MODULE_RESOLVER_NOT_REGISTERED, vec![specifier.clone()])
            }
            ResolveError::ImportSourceNotFound { specifier, .. } => {
                (&messages::FAILED_TO_RESOLVE_IMPORT_SOURCE, vec![specifier.clone()])
            }
            ResolveError::TooComplex { max_depth, .. } => {
                (&messages::TYPE_TOO_COMPLEX, vec![max_depth.to_string()])
            }
            ResolveError::ExtendsBaseType { .. } => (&messages::FAILED_TO_RESOLVE_EXTENDS_BASE_TYPE, vec![]),
            ResolveError::UnboundTypeParameter { name, .. } => {
                (&messages::UNBOUND_TYPE_PARAMETER, vec![name.clone()])
            }
        }
    }

    /// The catalogue code, e.g. `9001`.
    pub fn code(&self) -> u32 {
        self.message().0.code
    }

    /// Convert into a located diagnostic. A failed heritage clause carries the
    /// ignore-directive hint and its cause as related information.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, args) = self.message();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let location = self.location();
        let diagnostic = Diagnostic::with_location(location.file.clone(), location.range.to_span(), message, &args);
        match self {
            ResolveError::ExtendsBaseType { source, .. } => {
                let hint = Diagnostic::new(&messages::IGNORE_DIRECTIVE_HINT, &[IGNORE_DIRECTIVE]);
                diagnostic.with_help(hint.message_text).with_related(source.to_diagnostic())
            }
            _ => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location::new("/src/a.ts", TextRange::new(10, 14))
    }

    #[test]
    fn test_display_matches_catalogue() {
        let error = ResolveError::UnresolvableReference { name: "Foo".into(), location: location() };
        assert_eq!(error.to_diagnostic().message_text, error.to_string());
        assert_eq!(error.code(), 9001);

        let error = ResolveError::TooComplex { max_depth: 100, location: location() };
        assert_eq!(error.to_diagnostic().message_text, error.to_string());
    }

    #[test]
    fn test_extends_error_carries_hint_and_cause() {
        let cause = ResolveError::UnresolvableReference { name: "Base".into(), location: location() };
        let error = ResolveError::ExtendsBaseType { location: location(), source: Box::new(cause) };
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, 9008);
        assert!(diagnostic.help.as_deref().is_some_and(|help| help.contains(IGNORE_DIRECTIVE)));
        assert_eq!(diagnostic.related_information[0].code, 9001);
        assert_eq!(diagnostic.file.as_deref(), Some("/src/a.ts"));
        assert_eq!(diagnostic.span.map(|s| s.start), Some(10));
    }
}
