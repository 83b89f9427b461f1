//! Error types for the pattern compiler
//!
//! This module provides error handling using the `thiserror` crate.
//! Every failure is one of two kinds: a syntax error in the dialect text
//! (or its flags), or a type error in the values handed to the builder.

use thiserror::Error;

/// The main error type for pattern compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed dialect input
    #[error("SyntaxError: {0}")]
    Syntax(#[from] SyntaxError),

    /// A value of the wrong shape was handed to the builder
    #[error("TypeError: {0}")]
    Type(#[from] TypeError),
}

/// The two error categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Type,
}

impl Error {
    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::Type(_) => ErrorKind::Type,
        }
    }

    /// Check if this is a syntax error
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    /// Check if this is a type error
    pub fn is_type(&self) -> bool {
        self.kind() == ErrorKind::Type
    }
}

/// Dialect-level malformed input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// Characters left over after reading a flag string
    #[error("unrecognised characters in flags: \"{0}\"")]
    UnrecognizedFlags(String),

    /// `(?<` not followed by a `name>`
    #[error("invalid group structure, expected named group")]
    ExpectedGroupName,

    /// `(?` followed by a character that starts no group form
    #[error("invalid group structure \"{0}\"")]
    InvalidGroup(String),

    /// A group name that is not an identifier
    #[error("invalid group name \"{0}\"")]
    InvalidGroupName(String),

    /// A group name starting with a digit
    #[error("invalid group structure, group name \"{0}\" must not begin with a digit")]
    GroupNameStartsWithDigit(String),

    /// A group name declared twice
    #[error("duplicate group name \"{0}\"")]
    DuplicateGroupName(String),

    /// `$<` or `\k<` not followed by a `name>`
    #[error("invalid group reference, expected group name after \"{0}\"")]
    ExpectedReferenceName(String),

    /// A reference to a group that is not declared (yet)
    #[error("reference to non-existent sub pattern \"{0}\"")]
    UnresolvedReference(String),

    /// A backslash-digit sequence other than `\0`
    #[error("octal escapes are not allowed: \"{0}\"")]
    OctalEscape(String),

    /// A backslash-letter escape rejected by the strict flag
    #[error("unnecessary escape of character \"{0}\"")]
    UnnecessaryEscape(char),

    /// A braced escape that needs the unicode flag
    #[error("unnecessary escape of character \"{0}\" (u flag required)")]
    UnicodeFlagRequired(char),

    /// `(?>` without a matching `)`
    #[error("unterminated atomic group")]
    UnterminatedAtomicGroup,

    /// A possessive quantifier with no atom before it
    #[error("nothing to repeat before \"{0}\"")]
    NothingToRepeat(String),

    /// The trailing-flags delimiter appeared twice
    #[error("unexpected second flags delimiter '{0}'")]
    DuplicateFlagsDelimiter(char),

    /// An error reported by the native engine
    #[error("invalid regular expression: {0}")]
    Native(String),
}

/// Values of the wrong shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    /// A substitution value that cannot be rendered
    #[error("substitution #{position} has unsupported type {kind}")]
    InvalidSubstitution {
        /// Index of the substitution in the template
        position: usize,
        /// Description of the offending value
        kind: String,
    },

    /// An option record key that names no flag
    #[error("unrecognised option \"{0}\"")]
    UnrecognizedOption(String),

    /// Literal segments and substitutions do not interleave
    #[error("template with {literals} literal segments needs {} substitutions, got {substitutions}", .literals.saturating_sub(1))]
    TemplateArity {
        /// Number of literal segments
        literals: usize,
        /// Number of substitution values
        substitutions: usize,
    },

    /// An attempt to recompile a compiled pattern in place
    #[error("compiled patterns can not be recompiled")]
    Recompile,
}

impl From<regress::Error> for SyntaxError {
    fn from(err: regress::Error) -> Self {
        SyntaxError::Native(err.to_string())
    }
}

impl From<regress::Error> for Error {
    fn from(err: regress::Error) -> Self {
        Error::Syntax(err.into())
    }
}

/// Result type alias for compiler operations
pub type Result<T> = std::result::Result<T, Error>;
