//! Flag types attached to nodes and tokens.

bitflags::bitflags! {
    /// Flags for syntax nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        const NONE                          = 0;
        const LET                           = 1 << 0;
        const CONST                         = 1 << 1;
        /// Created by the resolver rather than parsed (e.g. literal key types
        /// bound to a mapped type's iteration variable).
        const SYNTHESIZED                   = 1 << 2;
        const NAMESPACE                     = 1 << 3;
        const NESTED_NAMESPACE              = 1 << 4;
        /// `declare global { ... }`.
        const GLOBAL_AUGMENTATION           = 1 << 5;
        /// The node was preceded by the ignore directive comment; resolution
        /// failures of this reference or heritage clause are skipped.
        const IGNORE_DIRECTIVE              = 1 << 6;
        /// A function, method or constructor had a body that was skipped.
        const HAS_BODY                      = 1 << 7;
        /// Parsed as part of a `type` modifier (`import type`, `export type`).
        const TYPE_ONLY                     = 1 << 8;
        const THIS_NODE_HAS_ERROR           = 1 << 9;

        const BLOCK_SCOPED = Self::LET.bits() | Self::CONST.bits();
    }
}

bitflags::bitflags! {
    /// Modifier flags for declarations and class members.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u32 {
        const NONE              = 0;
        const EXPORT            = 1 << 0;
        /// `declare`, or any declaration inside an ambient context.
        const AMBIENT           = 1 << 1;
        const PUBLIC            = 1 << 2;
        const PRIVATE           = 1 << 3;
        const PROTECTED         = 1 << 4;
        const STATIC            = 1 << 5;
        const READONLY          = 1 << 6;
        const ACCESSOR          = 1 << 7;
        const ABSTRACT          = 1 << 8;
        const ASYNC             = 1 << 9;
        const DEFAULT           = 1 << 10;
        const CONST             = 1 << 11;
        const OVERRIDE          = 1 << 12;
        const IN                = 1 << 13;
        const OUT               = 1 << 14;

        const ACCESSIBILITY_MODIFIER = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        const PARAMETER_PROPERTY_MODIFIER = Self::ACCESSIBILITY_MODIFIER.bits() | Self::READONLY.bits() | Self::OVERRIDE.bits();
        const NON_PUBLIC_ACCESSIBILITY_MODIFIER = Self::PRIVATE.bits() | Self::PROTECTED.bits();
        const EXPORT_DEFAULT = Self::EXPORT.bits() | Self::DEFAULT.bits();
    }
}

impl ModifierFlags {
    /// Map a modifier keyword to its flag.
    pub fn from_modifier_kind(kind: crate::SyntaxKind) -> ModifierFlags {
        use crate::SyntaxKind;
        match kind {
            SyntaxKind::ExportKeyword => ModifierFlags::EXPORT,
            SyntaxKind::DeclareKeyword => ModifierFlags::AMBIENT,
            SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
            SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
            SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
            SyntaxKind::StaticKeyword => ModifierFlags::STATIC,
            SyntaxKind::ReadonlyKeyword => ModifierFlags::READONLY,
            SyntaxKind::AccessorKeyword => ModifierFlags::ACCESSOR,
            SyntaxKind::AbstractKeyword => ModifierFlags::ABSTRACT,
            SyntaxKind::AsyncKeyword => ModifierFlags::ASYNC,
            SyntaxKind::DefaultKeyword => ModifierFlags::DEFAULT,
            SyntaxKind::ConstKeyword => ModifierFlags::CONST,
            SyntaxKind::OverrideKeyword => ModifierFlags::OVERRIDE,
            SyntaxKind::InKeyword => ModifierFlags::IN,
            SyntaxKind::OutKeyword => ModifierFlags::OUT,
            _ => ModifierFlags::NONE,
        }
    }
}

bitflags::bitflags! {
    /// Flags set by the scanner on the current token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenFlags: u16 {
        const NONE                              = 0;
        const PRECEDING_LINE_BREAK              = 1 << 0;
        const UNTERMINATED                      = 1 << 1;
        const SCIENTIFIC                        = 1 << 2;
        const OCTAL                             = 1 << 3;
        const HEX_SPECIFIER                     = 1 << 4;
        const BINARY_SPECIFIER                  = 1 << 5;
        const OCTAL_SPECIFIER                   = 1 << 6;
        const CONTAINS_SEPARATOR                = 1 << 7;
        const UNICODE_ESCAPE                    = 1 << 8;
        const CONTAINS_INVALID_ESCAPE           = 1 << 9;
        /// A comment containing the ignore directive appeared in the trivia
        /// before this token.
        const PRECEDING_IGNORE_DIRECTIVE        = 1 << 10;

        const NUMERIC_LITERAL_FLAGS = Self::SCIENTIFIC.bits()
            | Self::OCTAL.bits()
            | Self::HEX_SPECIFIER.bits()
            | Self::BINARY_SPECIFIER.bits()
            | Self::OCTAL_SPECIFIER.bits()
            | Self::CONTAINS_SEPARATOR.bits();
    }
}
