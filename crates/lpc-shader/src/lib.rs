//! Shader description compiler.
//!
//! This crate takes the parse tree of a shader description, resolves it into
//! a typed AST and generates GLSL source for desktop GL, GL ES and WebGL
//! from that one description. Shader parameters are gated by named
//! properties, so one description yields a family of variants.

#![no_std]

extern crate alloc;

use alloc::string::String;

pub mod ast;
mod binder;
mod builder;
mod declarator;
mod error;
pub mod glsl;
mod location;
mod symbols;
pub mod syntax;
mod types;
mod variant;

pub use binder::{parameter, parameters, shader_parameter, shader_parameters};
pub use builder::{builtin_function, ShaderBuilder, BUILTIN_FUNCTIONS, BUILTIN_VARIABLES};
pub use declarator::{resolve, MAX_ARRAY_LENGTH};
pub use error::{ErrorKind, ShaderError, ShaderResult};
pub use glsl::{
    generate, Binding, BindingKind, BindingTable, Dialect, DialectInfo, GlslProgram,
    UnknownDialect,
};
pub use location::SourceLocation;
pub use symbols::{Scope, SymbolTable, Variable, VariableInfo, VariableTable};
pub use types::{BaseType, Precision, ScalarKind, Type};
pub use variant::{fold, is_active, PropertySet};

/// Per-request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub dialect: Dialect,
    /// Properties enabled for the variant
    pub properties: PropertySet,
}

impl CompileOptions {
    /// Options for `dialect` with every property disabled.
    pub fn new(dialect: Dialect) -> Self {
        CompileOptions {
            dialect,
            properties: PropertySet::new(),
        }
    }

    /// Same options with `properties` enabled.
    pub fn with_properties<S, I>(mut self, properties: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.properties.extend(properties);
        self
    }
}

/// Resolve a parse tree into a typed shader.
pub fn build_shader(syntax: &syntax::SyntaxShader) -> ShaderResult<ast::Shader> {
    ShaderBuilder::new().build(syntax)
}

/// Build a parse tree and generate one variant of it.
pub fn compile(syntax: &syntax::SyntaxShader, options: &CompileOptions) -> ShaderResult<GlslProgram> {
    let shader = build_shader(syntax)?;
    generate(&shader, options.dialect, &options.properties)
}
