//! AST construction: turns a [`SyntaxShader`] into a resolved [`Shader`].
//!
//! Every name is resolved against the scope stack while the tree is walked,
//! so a reference always points at a variable whose scope is still live.

use alloc::{
    boxed::Box,
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};

use log::{debug, warn};

use crate::{
    ast::{
        Callee, Expr, ExprKind, Function, Shader, ShaderParameter, ShaderStage, Stage, Stmt,
        StmtKind,
    },
    binder, declarator,
    error::{ShaderError, ShaderResult},
    location::SourceLocation,
    symbols::{SymbolTable, Variable},
    syntax::{
        SyntaxExpr, SyntaxExprKind, SyntaxFunction, SyntaxShader, SyntaxShaderParameter,
        SyntaxStage, SyntaxStmt, SyntaxStmtKind, Token,
    },
    types::{BaseType, ScalarKind, Type},
};

/// Library functions callable from a shader description.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "sign",
    "floor",
    "ceil",
    "fract",
    "mod",
    "min",
    "max",
    "clamp",
    "mix",
    "step",
    "smoothstep",
    "length",
    "distance",
    "dot",
    "cross",
    "normalize",
    "reflect",
    "pow",
    "exp",
    "log",
    "sqrt",
    "inversesqrt",
    "sin",
    "cos",
    "tan",
    "asin",
    "acos",
    "atan",
    "texture",
];

/// Builtin variables: description-language name, GLSL spelling and the
/// stage that can see them.
pub const BUILTIN_VARIABLES: &[(&str, &str, Stage)] = &[
    ("out_Position", "gl_Position", Stage::Vertex),
    ("varying_Fragment", "gl_FragCoord", Stage::Fragment),
];

/// Find a library function by name.
pub fn builtin_function(name: &str) -> Option<&'static str> {
    BUILTIN_FUNCTIONS
        .iter()
        .copied()
        .find(|builtin| *builtin == name)
}

/// Builds one shader. Holds the scope stack for the duration of the walk.
pub struct ShaderBuilder {
    symbols: SymbolTable,
    properties: BTreeSet<String>,
    functions: BTreeSet<String>,
    /// Variables only one stage declares: attributes, outputs, builtins
    owners: BTreeMap<Variable, Stage>,
    /// Stage whose body is being built
    stage: Option<Stage>,
}

impl ShaderBuilder {
    pub fn new() -> Self {
        ShaderBuilder {
            symbols: SymbolTable::new(),
            properties: BTreeSet::new(),
            functions: BTreeSet::new(),
            owners: BTreeMap::new(),
            stage: None,
        }
    }

    /// Resolve a whole shader description.
    ///
    /// Shader parameters, builtin variables and global declarations share the
    /// global scope. Attributes, outputs and builtins are only visible to the
    /// body of the stage that declares them; functions and global
    /// declarations are emitted in both stages and cannot see them at all.
    /// Function names are registered before any body is built, so bodies may
    /// call functions declared later in the description.
    pub fn build(mut self, syntax: &SyntaxShader) -> ShaderResult<Shader> {
        let position = Type::vector(ScalarKind::Float, 4);
        for &(name, glsl_name, stage) in BUILTIN_VARIABLES {
            let variable = self.symbols.declare_builtin(name, glsl_name, position)?;
            self.owners.insert(variable, stage);
        }

        let mut properties = Vec::with_capacity(syntax.properties.len());
        for property in &syntax.properties {
            if !self.properties.insert(property.text.clone()) {
                return Err(ShaderError::redeclaration(
                    property.text.as_str(),
                    property.location,
                ));
            }
            properties.push(property.text.clone());
        }

        let uniforms = self.shader_parameters(&syntax.uniforms)?;
        let attributes = match &syntax.vertex {
            Some(stage) => Some(self.shader_parameters(&stage.inputs)?),
            None => None,
        };
        let varyings = match &syntax.fragment {
            Some(stage) => Some(self.shader_parameters(&stage.inputs)?),
            None => None,
        };
        let outputs = self.shader_parameters(&syntax.outputs)?;
        for (parameters, stage) in [
            (attributes.as_deref().unwrap_or(&[]), Stage::Vertex),
            (outputs.as_slice(), Stage::Fragment),
        ] {
            for parameter in parameters {
                self.owners.insert(parameter.variable, stage);
            }
        }

        let declarations = syntax
            .declarations
            .iter()
            .map(|stmt| self.stmt(stmt))
            .collect::<ShaderResult<Vec<_>>>()?;

        for function in &syntax.functions {
            if !self.functions.insert(function.name.text.clone()) {
                return Err(ShaderError::redeclaration(
                    function.name.text.as_str(),
                    function.name.location,
                ));
            }
        }
        let functions = syntax
            .functions
            .iter()
            .map(|function| self.function(function))
            .collect::<ShaderResult<Vec<_>>>()?;

        let vertex = match (attributes, &syntax.vertex) {
            (Some(inputs), Some(stage)) => Some(self.stage(Stage::Vertex, inputs, stage)?),
            _ => None,
        };
        let fragment = match (varyings, &syntax.fragment) {
            (Some(inputs), Some(stage)) => Some(self.stage(Stage::Fragment, inputs, stage)?),
            _ => None,
        };

        debug!(
            "built shader: {} properties, {} uniforms, {} functions, vertex={}, fragment={}",
            properties.len(),
            uniforms.len(),
            functions.len(),
            vertex.is_some(),
            fragment.is_some()
        );

        Ok(Shader {
            properties,
            uniforms,
            declarations,
            functions,
            vertex,
            fragment,
            outputs,
            variables: self.symbols.into_variables(),
        })
    }

    fn shader_parameters(
        &mut self,
        decls: &[SyntaxShaderParameter],
    ) -> ShaderResult<Vec<ShaderParameter>> {
        let parameters = binder::shader_parameters(decls, &mut self.symbols)?;
        for parameter in &parameters {
            if let ExprKind::Property(name) = &parameter.available.kind {
                self.check_property(name, parameter.available.location);
            }
        }
        Ok(parameters)
    }

    fn check_property(&self, name: &str, location: Option<SourceLocation>) {
        if !self.properties.contains(name) {
            match location {
                Some(location) => warn!("{}: property '{}' is never declared", location, name),
                None => warn!("property '{}' is never declared", name),
            }
        }
    }

    fn function(&mut self, function: &SyntaxFunction) -> ShaderResult<Function> {
        let return_type = declarator::resolve(
            &function.return_declarator.text,
            function.return_declarator.location,
        )?;

        // Parameters and top-level body statements share one scope
        self.symbols.push_scope();
        let parameters = binder::parameters(&function.parameters, &mut self.symbols)?;
        let body = self.stmts(&function.body)?;
        self.symbols.pop_scope();

        Ok(Function {
            name: function.name.text.clone(),
            return_type,
            parameters,
            body,
            location: function.name.location,
        })
    }

    fn stage(
        &mut self,
        which: Stage,
        inputs: Vec<ShaderParameter>,
        stage: &SyntaxStage,
    ) -> ShaderResult<ShaderStage> {
        self.stage = Some(which);
        self.symbols.push_scope();
        let body = self.stmts(&stage.body);
        self.symbols.pop_scope();
        self.stage = None;
        Ok(ShaderStage {
            inputs,
            body: body?,
        })
    }

    /// Resolve a name, hiding variables that belong to another stage.
    fn lookup(&self, token: &Token) -> ShaderResult<Variable> {
        let visible = self.symbols.lookup(&token.text).filter(|variable| {
            match self.owners.get(variable) {
                Some(owner) => self.stage == Some(*owner),
                None => true,
            }
        });
        visible.ok_or_else(|| ShaderError::undefined_variable(token.text.as_str(), token.location))
    }

    fn stmts(&mut self, stmts: &[SyntaxStmt]) -> ShaderResult<Vec<Stmt>> {
        stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn stmt(&mut self, stmt: &SyntaxStmt) -> ShaderResult<Stmt> {
        let kind = match &stmt.kind {
            SyntaxStmtKind::Expression(expr) => StmtKind::Expression(self.expr(expr)?),
            SyntaxStmtKind::Declaration {
                declarator,
                name,
                initializer,
            } => {
                let ty = declarator::resolve(&declarator.text, declarator.location)?;
                // `float x = x;` refers to an outer `x`
                let initializer = initializer
                    .as_ref()
                    .map(|expr| self.expr(expr))
                    .transpose()?;
                let variable = self.symbols.declare(&name.text, ty, name.location)?;
                StmtKind::Declaration {
                    variable,
                    ty,
                    initializer,
                }
            }
            SyntaxStmtKind::If {
                condition,
                then,
                otherwise,
            } => StmtKind::If {
                condition: self.expr(condition)?,
                then: Box::new(self.stmt(then)?),
                otherwise: match otherwise {
                    Some(otherwise) => Some(Box::new(self.stmt(otherwise)?)),
                    None => None,
                },
            },
            SyntaxStmtKind::Loop {
                index,
                start,
                end,
                body,
            } => {
                let start = self.expr(start)?;
                let end = self.expr(end)?;
                self.symbols.push_scope();
                let index = self.symbols.declare(
                    &index.text,
                    Type::scalar(ScalarKind::Int),
                    index.location,
                )?;
                let body = self.stmt(body)?;
                self.symbols.pop_scope();
                StmtKind::Loop {
                    index,
                    start,
                    end,
                    body: Box::new(body),
                }
            }
            SyntaxStmtKind::Block(stmts) => {
                self.symbols.push_scope();
                let stmts = self.stmts(stmts)?;
                self.symbols.pop_scope();
                StmtKind::Block(stmts)
            }
            SyntaxStmtKind::Return(value) => {
                StmtKind::Return(value.as_ref().map(|expr| self.expr(expr)).transpose()?)
            }
            SyntaxStmtKind::Discard => StmtKind::Discard,
        };
        Ok(Stmt::new(kind, stmt.location))
    }

    fn expr(&mut self, expr: &SyntaxExpr) -> ShaderResult<Expr> {
        let kind = match &expr.kind {
            SyntaxExprKind::BoolLiteral(value) => ExprKind::Bool(*value),
            SyntaxExprKind::IntLiteral(token) => ExprKind::Int(int_literal(token)?),
            SyntaxExprKind::FloatLiteral(token) => ExprKind::Float(float_literal(token)?),
            SyntaxExprKind::Identifier(token) => ExprKind::Variable(self.lookup(token)?),
            SyntaxExprKind::Property(token) => {
                self.check_property(&token.text, token.location);
                ExprKind::Property(token.text.clone())
            }
            SyntaxExprKind::Unary { op, operand } => ExprKind::Unary {
                op: *op,
                operand: Box::new(self.expr(operand)?),
            },
            SyntaxExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: Box::new(self.expr(lhs)?),
                rhs: Box::new(self.expr(rhs)?),
            },
            SyntaxExprKind::Assign { op, target, value } => ExprKind::Assign {
                op: *op,
                target: Box::new(self.expr(target)?),
                value: Box::new(self.expr(value)?),
            },
            SyntaxExprKind::Ternary {
                condition,
                then,
                otherwise,
            } => ExprKind::Ternary {
                condition: Box::new(self.expr(condition)?),
                then: Box::new(self.expr(then)?),
                otherwise: Box::new(self.expr(otherwise)?),
            },
            SyntaxExprKind::Call { name, args } => {
                let callee = self.callee(name)?;
                let args = args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<ShaderResult<Vec<_>>>()?;
                ExprKind::Call { callee, args }
            }
            SyntaxExprKind::Member { base, field } => ExprKind::Member {
                base: Box::new(self.expr(base)?),
                field: field.text.clone(),
            },
            SyntaxExprKind::Index { base, index } => ExprKind::Index {
                base: Box::new(self.expr(base)?),
                index: Box::new(self.expr(index)?),
            },
        };
        Ok(Expr::new(kind, expr.location))
    }

    /// Shader functions win over constructors, constructors over builtins.
    fn callee(&self, name: &Token) -> ShaderResult<Callee> {
        if self.functions.contains(&name.text) {
            return Ok(Callee::Function(name.text.clone()));
        }
        if let Ok(ty) = declarator::resolve(&name.text, name.location) {
            if !matches!(ty.base, BaseType::Void | BaseType::Sampler2D) {
                return Ok(Callee::Constructor(ty));
            }
        }
        match builtin_function(&name.text) {
            Some(builtin) => Ok(Callee::Builtin(builtin)),
            None => Err(ShaderError::undefined_function(
                name.text.as_str(),
                name.location,
            )),
        }
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decimal or `0x` hexadecimal literal that fits a 32-bit `int`.
fn int_literal(token: &Token) -> ShaderResult<i32> {
    let text = token.text.as_str();
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) if !digits.starts_with(['+', '-']) => i32::from_str_radix(digits, 16),
        Some(_) => return Err(ShaderError::invalid_literal(text, token.location)),
        None => text.parse::<i32>(),
    };
    value.map_err(|_| ShaderError::invalid_literal(text, token.location))
}

fn float_literal(token: &Token) -> ShaderResult<f64> {
    let text = token.text.trim_end_matches(['f', 'F']);
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ShaderError::invalid_literal(
            token.text.as_str(),
            token.location,
        )),
    }
}
