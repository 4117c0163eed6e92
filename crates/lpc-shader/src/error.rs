//! Error types for shader compilation.

use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::{ast::Stage, glsl::Dialect, location::SourceLocation};

/// Result type for shader compilation operations.
pub type ShaderResult<T> = Result<T, ShaderError>;

/// What went wrong during a compile request.
///
/// Every kind is fatal to the request that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A name was declared twice in the same scope
    #[error("redeclaring variable: {name}")]
    Redeclaration { name: String },

    /// The base name of a declarator is not a known type
    #[error("unknown type: {name}")]
    UnknownType { name: String },

    /// A vector/matrix arity or an array length is out of range
    #[error("invalid arity in '{declarator}': {reason}")]
    InvalidArity {
        declarator: String,
        reason: &'static str,
    },

    /// A name was used without being declared in any enclosing scope
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// A call names neither a function, a builtin, nor a constructible type
    #[error("undefined function: {name}")]
    UndefinedFunction { name: String },

    /// A numeric literal or binding identifier could not be read
    #[error("invalid literal: {text}")]
    InvalidLiteral { text: String },

    /// Two parameters of one list claim the same binding identifier
    #[error("binding {id} claimed by both '{first}' and '{second}'")]
    BindingConflict {
        id: u32,
        first: String,
        second: String,
    },

    /// A node has no translation for the requested dialect
    #[error("{construct} is not supported by {dialect}")]
    UnsupportedConstruct { construct: String, dialect: Dialect },

    /// The shader lacks a stage required for code generation
    #[error("shader has no {stage} stage")]
    MissingStage { stage: Stage },
}

/// A compile error with an optional source location.
///
/// The location is absent for errors raised on synthesized nodes or
/// on the shader as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it went wrong, when known
    pub location: Option<SourceLocation>,
}

impl ShaderError {
    /// Create an error at an optional location.
    pub fn new(kind: ErrorKind, location: Option<SourceLocation>) -> Self {
        ShaderError { kind, location }
    }

    /// Create a redeclaration error.
    pub fn redeclaration(name: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(ErrorKind::Redeclaration { name: name.into() }, location)
    }

    /// Create an unknown type error.
    pub fn unknown_type(name: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(ErrorKind::UnknownType { name: name.into() }, location)
    }

    /// Create an invalid arity error.
    pub fn invalid_arity(
        declarator: impl Into<String>,
        reason: &'static str,
        location: Option<SourceLocation>,
    ) -> Self {
        Self::new(
            ErrorKind::InvalidArity {
                declarator: declarator.into(),
                reason,
            },
            location,
        )
    }

    /// Create an undefined variable error.
    pub fn undefined_variable(name: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(ErrorKind::UndefinedVariable { name: name.into() }, location)
    }

    /// Create an undefined function error.
    pub fn undefined_function(name: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(ErrorKind::UndefinedFunction { name: name.into() }, location)
    }

    /// Create an invalid literal error.
    pub fn invalid_literal(text: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(ErrorKind::InvalidLiteral { text: text.into() }, location)
    }

    /// Create an unsupported construct error.
    pub fn unsupported(
        construct: impl Into<String>,
        dialect: Dialect,
        location: Option<SourceLocation>,
    ) -> Self {
        Self::new(
            ErrorKind::UnsupportedConstruct {
                construct: construct.into(),
                dialect,
            },
            location,
        )
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{}: {}", location, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl core::error::Error for ShaderError {}

impl From<ErrorKind> for ShaderError {
    fn from(kind: ErrorKind) -> Self {
        ShaderError::new(kind, None)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;

    #[test]
    fn test_display_with_location() {
        let err = ShaderError::redeclaration("color", Some(SourceLocation::new(3, 8)));
        assert_eq!(err.to_string(), "3:8: redeclaring variable: color");
    }

    #[test]
    fn test_display_without_location() {
        let err = ShaderError::from(ErrorKind::MissingStage {
            stage: Stage::Fragment,
        });
        assert_eq!(err.to_string(), "shader has no fragment stage");
    }

    #[test]
    fn test_binding_conflict_names_both_parameters() {
        let err = ShaderError::from(ErrorKind::BindingConflict {
            id: 2,
            first: "a".to_string(),
            second: "b".to_string(),
        });
        let msg = format!("{err}");
        assert!(msg.contains("binding 2"), "missing id in: {msg}");
        assert!(msg.contains("'a'") && msg.contains("'b'"), "missing names in: {msg}");
    }

    #[test]
    fn test_unsupported_names_dialect() {
        let err = ShaderError::unsupported("non-square matrix mat2x3", Dialect::WebGl1, None);
        assert_eq!(
            err.to_string(),
            "non-square matrix mat2x3 is not supported by webgl1"
        );
    }
}
