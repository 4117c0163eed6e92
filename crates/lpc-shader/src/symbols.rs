//! Symbol table for name resolution.
//!
//! This module provides lexical scoping for declared names and the table of
//! variables issued during one compile request.

use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};

use crate::{
    error::{ShaderError, ShaderResult},
    location::SourceLocation,
    types::Type,
};

/// Opaque handle identifying one declared variable.
///
/// Handles are unique within a compile request and index into the
/// [`VariableTable`] of the shader they were issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(u32);

impl Variable {
    /// Position of this variable in its table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What is known about a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    /// Name as declared
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// GLSL spelling for builtin variables (`gl_Position`, ...)
    pub builtin: Option<&'static str>,
}

/// All variables issued during one compile request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    entries: Vec<VariableInfo>,
}

impl VariableTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh handle.
    pub fn allocate(&mut self, info: VariableInfo) -> Variable {
        let variable = Variable(self.entries.len() as u32);
        self.entries.push(info);
        variable
    }

    /// Look up a variable.
    ///
    /// Handles from another table may index out of range and yield `None`.
    pub fn get(&self, variable: Variable) -> Option<&VariableInfo> {
        self.entries.get(variable.index())
    }

    /// Declared name of a variable, or `"?"` for a foreign handle.
    pub fn name(&self, variable: Variable) -> &str {
        self.get(variable).map(|info| info.name.as_str()).unwrap_or("?")
    }

    /// Number of issued variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable was issued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all variables in issue order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, &VariableInfo)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, info)| (Variable(index as u32), info))
    }
}

/// One lexical block.
///
/// A scope only checks its own entries, so declaring a name that exists in
/// an enclosing scope shadows it.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: BTreeMap<String, Variable>,
}

impl Scope {
    /// Create a new empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `variable` under `name`.
    ///
    /// Returns a redeclaration error if the name is already declared in
    /// this scope.
    pub fn declare(
        &mut self,
        name: &str,
        variable: Variable,
        location: Option<SourceLocation>,
    ) -> ShaderResult<()> {
        if self.variables.contains_key(name) {
            return Err(ShaderError::redeclaration(name, location));
        }
        self.variables.insert(String::from(name), variable);
        Ok(())
    }

    /// Look up a variable declared in this scope.
    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.variables.get(name).copied()
    }
}

/// Scope stack plus the table of issued variables.
///
/// The outermost (global) scope always exists.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    variables: VariableTable,
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Create a symbol table holding only the global scope.
    pub fn new() -> Self {
        Self {
            variables: VariableTable::new(),
            scopes: vec![Scope::new()],
        }
    }

    /// Push a new scope onto the scope stack.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare a variable in the current scope and issue its handle.
    pub fn declare(
        &mut self,
        name: &str,
        ty: Type,
        location: Option<SourceLocation>,
    ) -> ShaderResult<Variable> {
        self.declare_info(
            VariableInfo {
                name: String::from(name),
                ty,
                builtin: None,
            },
            location,
        )
    }

    /// Declare a builtin variable in the current scope.
    pub fn declare_builtin(
        &mut self,
        name: &str,
        glsl_name: &'static str,
        ty: Type,
    ) -> ShaderResult<Variable> {
        self.declare_info(
            VariableInfo {
                name: String::from(name),
                ty,
                builtin: Some(glsl_name),
            },
            None,
        )
    }

    fn declare_info(
        &mut self,
        info: VariableInfo,
        location: Option<SourceLocation>,
    ) -> ShaderResult<Variable> {
        let declared = self
            .scopes
            .last()
            .and_then(|scope| scope.lookup(&info.name));
        if declared.is_some() {
            return Err(ShaderError::redeclaration(info.name.as_str(), location));
        }
        let name = info.name.clone();
        let variable = self.variables.allocate(info);
        if let Some(scope) = self.scopes.last_mut() {
            scope.declare(&name, variable, location)?;
        }
        Ok(variable)
    }

    /// Look up a variable, searching from the current scope outward.
    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Get the number of active scopes.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Type of a declared variable.
    pub fn variable_type(&self, variable: Variable) -> Option<Type> {
        self.variables.get(variable).map(|info| info.ty)
    }

    /// Variables issued so far.
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Give up the scopes and keep the issued variables.
    pub fn into_variables(self) -> VariableTable {
        self.variables
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
