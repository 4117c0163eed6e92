//! GLSL source emission.
//!
//! Output is a direct structural translation of the AST. The only
//! rewriting is variant selection: inactive parameters are left out,
//! property references print as `true`/`false` and an `if` whose condition
//! folds to a constant keeps only the selected branch. A function called
//! before its definition gets a prototype.

use alloc::{
    collections::BTreeSet,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use log::debug;

use crate::{
    ast::{
        Callee, Expr, ExprKind, Function, Shader, ShaderParameter, ShaderStage, Stage, Stmt,
        StmtKind, UnaryOp,
    },
    error::{ErrorKind, ShaderError, ShaderResult},
    location::SourceLocation,
    symbols::Variable,
    types::{BaseType, ScalarKind, Type},
    variant::{fold, is_active, PropertySet},
};

use super::{
    binding::{assign_bindings, BindingTable},
    dialect::{Dialect, DialectInfo},
};

const INDENT: &str = "    ";
const FRAG_COLOR: &str = "gl_FragColor";

/// Generated source for one variant of a shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlslProgram {
    pub vertex: String,
    pub fragment: String,
    /// Identifiers of all declared parameters
    pub bindings: BindingTable,
}

/// Generate the vertex and fragment source of one variant.
///
/// # Errors
///
/// `MissingStage` when the shader lacks a stage, `BindingConflict` from
/// identifier assignment (checked before any text is produced),
/// `UndefinedVariable` when emitted code refers to a parameter the variant
/// leaves out, and `UnsupportedConstruct` when the variant uses something
/// `dialect` cannot express.
pub fn generate(
    shader: &Shader,
    dialect: Dialect,
    enabled: &PropertySet,
) -> ShaderResult<GlslProgram> {
    let vertex = shader.vertex.as_ref().ok_or(ErrorKind::MissingStage {
        stage: Stage::Vertex,
    })?;
    let fragment = shader.fragment.as_ref().ok_or(ErrorKind::MissingStage {
        stage: Stage::Fragment,
    })?;

    let bindings = assign_bindings(shader, enabled)?;
    let writer = GlslWriter::new(shader, dialect, enabled, &bindings)?;

    let program = GlslProgram {
        vertex: writer.vertex(vertex)?,
        fragment: writer.fragment(fragment)?,
        bindings,
    };
    debug!(
        "generated {} variant [{}]: {} + {} bytes",
        dialect,
        enabled.iter().collect::<Vec<_>>().join(", "),
        program.vertex.len(),
        program.fragment.len()
    );
    Ok(program)
}

/// Emits both stages of one variant.
struct GlslWriter<'a> {
    shader: &'a Shader,
    dialect: Dialect,
    info: &'static DialectInfo,
    enabled: &'a PropertySet,
    bindings: &'a BindingTable,
    /// Outputs rewritten to `gl_FragColor` on legacy dialects
    frag_color: BTreeSet<Variable>,
    /// Parameters the variant leaves out
    inactive: BTreeSet<Variable>,
}

impl<'a> GlslWriter<'a> {
    fn new(
        shader: &'a Shader,
        dialect: Dialect,
        enabled: &'a PropertySet,
        bindings: &'a BindingTable,
    ) -> ShaderResult<Self> {
        let info = dialect.info();
        let mut frag_color = BTreeSet::new();
        if info.legacy_io {
            let mut outputs = shader
                .outputs
                .iter()
                .filter(|output| is_active(&output.available, enabled));
            if let Some(output) = outputs.next() {
                frag_color.insert(output.variable);
            }
            if let Some(extra) = outputs.next() {
                return Err(ShaderError::unsupported(
                    "multiple fragment outputs",
                    dialect,
                    extra.location,
                ));
            }
        }
        let inactive = [
            shader.uniforms.as_slice(),
            shader.attributes(),
            shader.varyings(),
            shader.outputs.as_slice(),
        ]
        .into_iter()
        .flatten()
        .filter(|parameter| !is_active(&parameter.available, enabled))
        .map(|parameter| parameter.variable)
        .collect();
        Ok(GlslWriter {
            shader,
            dialect,
            info,
            enabled,
            bindings,
            frag_color,
            inactive,
        })
    }

    fn vertex(&self, stage: &ShaderStage) -> ShaderResult<String> {
        let mut sections = vec![self.header(), self.uniforms()?];

        let mut attributes = String::new();
        for attribute in self.active(&stage.inputs) {
            self.check_io_type(attribute, "attribute")?;
            if !self.info.integer_attributes && attribute.ty.is_integral() {
                return Err(self.unsupported(
                    format!("integer attribute {}", self.name(attribute.variable)),
                    attribute.location,
                ));
            }
            let storage = if self.info.legacy_io { "attribute" } else { "in" };
            attributes += &self.parameter_line(attribute, storage, self.info.attribute_locations)?;
        }
        sections.push(attributes);

        sections.push(self.varyings(if self.info.legacy_io { "varying" } else { "out" })?);
        sections.push(self.declarations()?);
        sections.push(self.prototypes()?);
        sections.extend(self.functions()?);
        sections.push(self.main(&stage.body)?);
        Ok(join_sections(sections))
    }

    fn fragment(&self, stage: &ShaderStage) -> ShaderResult<String> {
        let mut sections = vec![self.header()];
        if let Some(precision) = self.info.default_fragment_precision {
            sections.push(format!("precision {} float;\n", precision.keyword()));
        }
        sections.push(self.uniforms()?);
        sections.push(self.varyings(if self.info.legacy_io { "varying" } else { "in" })?);

        let mut outputs = String::new();
        if !self.info.legacy_io {
            for output in self.active(&self.shader.outputs) {
                self.check_io_type(output, "output")?;
                outputs += &self.parameter_line(output, "out", self.info.attribute_locations)?;
            }
        }
        sections.push(outputs);

        sections.push(self.declarations()?);
        sections.push(self.prototypes()?);
        sections.extend(self.functions()?);
        sections.push(self.main(&stage.body)?);
        Ok(join_sections(sections))
    }

    fn header(&self) -> String {
        let mut header = String::from(self.info.version);
        header.push('\n');
        for extension in self.info.extensions {
            header.push_str(extension);
            header.push('\n');
        }
        header
    }

    fn uniforms(&self) -> ShaderResult<String> {
        let mut uniforms = String::new();
        for uniform in self.active(&self.shader.uniforms) {
            uniforms += &self.parameter_line(uniform, "uniform", self.info.uniform_locations)?;
        }
        Ok(uniforms)
    }

    /// Varyings as written by the vertex stage or read by the fragment
    /// stage; they never carry a location.
    fn varyings(&self, storage: &str) -> ShaderResult<String> {
        let mut varyings = String::new();
        for varying in self.active(self.shader.varyings()) {
            self.check_io_type(varying, "varying")?;
            if varying.ty.is_integral() {
                if self.info.legacy_io {
                    return Err(self.unsupported(
                        format!("integer varying {}", self.name(varying.variable)),
                        varying.location,
                    ));
                }
                varyings += &self.parameter_line(varying, &format!("flat {}", storage), false)?;
            } else {
                varyings += &self.parameter_line(varying, storage, false)?;
            }
        }
        Ok(varyings)
    }

    fn declarations(&self) -> ShaderResult<String> {
        let mut out = String::new();
        for stmt in &self.shader.declarations {
            self.stmt(&mut out, stmt, 0)?;
        }
        Ok(out)
    }

    /// Prototypes of functions some earlier function calls.
    fn prototypes(&self) -> ShaderResult<String> {
        let mut defined = BTreeSet::new();
        let mut forward = BTreeSet::new();
        for function in &self.shader.functions {
            defined.insert(function.name.as_str());
            let mut calls = BTreeSet::new();
            for stmt in &function.body {
                stmt_calls(stmt, &mut calls);
            }
            forward.extend(calls.into_iter().filter(|name| !defined.contains(name)));
        }

        let mut out = String::new();
        for function in &self.shader.functions {
            if forward.contains(function.name.as_str()) {
                out += &format!("{};\n", self.signature(function)?);
            }
        }
        Ok(out)
    }

    fn functions(&self) -> ShaderResult<Vec<String>> {
        self.shader
            .functions
            .iter()
            .map(|function| self.function(function))
            .collect()
    }

    /// `type name(parameters)`
    fn signature(&self, function: &Function) -> ShaderResult<String> {
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| self.declarator(&parameter.ty, parameter.variable, function.location))
            .collect::<ShaderResult<Vec<_>>>()?;
        Ok(format!(
            "{} {}({})",
            self.type_name(&function.return_type, function.location)?,
            function.name,
            parameters.join(", ")
        ))
    }

    fn function(&self, function: &Function) -> ShaderResult<String> {
        let mut out = format!("{} {{\n", self.signature(function)?);
        for stmt in &function.body {
            self.stmt(&mut out, stmt, 1)?;
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn main(&self, body: &[Stmt]) -> ShaderResult<String> {
        let mut out = String::from("void main(void) {\n");
        for stmt in body {
            self.stmt(&mut out, stmt, 1)?;
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn active<'s>(
        &'s self,
        parameters: &'s [ShaderParameter],
    ) -> impl Iterator<Item = &'s ShaderParameter> + 's {
        let enabled: &'s PropertySet = self.enabled;
        parameters
            .iter()
            .filter(move |parameter| is_active(&parameter.available, enabled))
    }

    fn parameter_line(
        &self,
        parameter: &ShaderParameter,
        storage: &str,
        location: bool,
    ) -> ShaderResult<String> {
        let declarator = self.declarator(&parameter.ty, parameter.variable, parameter.location)?;
        match self.bindings.id(parameter.variable) {
            Some(id) if location => Ok(format!(
                "layout(location = {}) {} {};\n",
                id, storage, declarator
            )),
            _ => Ok(format!("{} {};\n", storage, declarator)),
        }
    }

    fn check_io_type(&self, parameter: &ShaderParameter, what: &str) -> ShaderResult<()> {
        if parameter.ty.base.scalar_kind() == Some(ScalarKind::Bool) {
            return Err(self.unsupported(
                format!("boolean {} {}", what, self.name(parameter.variable)),
                parameter.location,
            ));
        }
        Ok(())
    }

    /// `[const] [precision] base name[[length]]`
    fn declarator(
        &self,
        ty: &Type,
        variable: Variable,
        location: Option<SourceLocation>,
    ) -> ShaderResult<String> {
        let mut out = String::new();
        if ty.constant {
            out.push_str("const ");
        }
        out.push_str(&self.type_name(ty, location)?);
        out.push(' ');
        out.push_str(self.name(variable));
        if let Some(length) = ty.array {
            out.push_str(&format!("[{}]", length));
        }
        Ok(out)
    }

    /// Precision (when the dialect writes them) and base type.
    fn type_name(&self, ty: &Type, location: Option<SourceLocation>) -> ShaderResult<String> {
        self.check_base(ty.base, location)?;
        Ok(match ty.precision {
            Some(precision) if self.info.precision_qualifiers => {
                format!("{} {}", precision.keyword(), ty.base)
            }
            _ => ty.base.to_string(),
        })
    }

    fn check_base(&self, base: BaseType, location: Option<SourceLocation>) -> ShaderResult<()> {
        if base.is_non_square_matrix() && !self.info.non_square_matrices {
            return Err(self.unsupported(format!("non-square matrix {}", base), location));
        }
        Ok(())
    }

    fn name(&self, variable: Variable) -> &str {
        if self.frag_color.contains(&variable) {
            return FRAG_COLOR;
        }
        match self.shader.variables.get(variable) {
            Some(info) => info.builtin.unwrap_or(info.name.as_str()),
            None => "?",
        }
    }

    fn unsupported(&self, construct: String, location: Option<SourceLocation>) -> ShaderError {
        ShaderError::unsupported(construct, self.dialect, location)
    }

    fn stmt(&self, out: &mut String, stmt: &Stmt, level: usize) -> ShaderResult<()> {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                let expr = self.expr(expr)?;
                line(out, level, &format!("{};", expr));
            }
            StmtKind::Declaration {
                variable,
                ty,
                initializer,
            } => {
                let declarator = self.declarator(ty, *variable, stmt.location)?;
                match initializer {
                    Some(init) => {
                        let init = self.expr(init)?;
                        line(out, level, &format!("{} = {};", declarator, init));
                    }
                    None => line(out, level, &format!("{};", declarator)),
                }
            }
            StmtKind::If {
                condition,
                then,
                otherwise,
            } => match fold(condition, self.enabled) {
                Some(true) => self.selected(out, then, level)?,
                Some(false) => {
                    if let Some(otherwise) = otherwise {
                        self.selected(out, otherwise, level)?;
                    }
                }
                None => {
                    let condition = self.expr(condition)?;
                    line(out, level, &format!("if ({}) {{", condition));
                    self.body(out, then, level)?;
                    if let Some(otherwise) = otherwise {
                        line(out, level, "} else {");
                        self.body(out, otherwise, level)?;
                    }
                    line(out, level, "}");
                }
            },
            StmtKind::Loop {
                index,
                start,
                end,
                body,
            } => {
                if self.info.constant_loop_bounds {
                    for bound in [start, end] {
                        if !self.is_constant(bound) {
                            return Err(self.unsupported(
                                String::from("non-constant loop bound"),
                                bound.location.or(stmt.location),
                            ));
                        }
                    }
                }
                let name = self.name(*index);
                let start = self.expr(start)?;
                let end = self.expr(end)?;
                line(
                    out,
                    level,
                    &format!(
                        "for (int {name} = {start}; {name} < {end}; ++{name}) {{"
                    ),
                );
                self.body(out, body, level)?;
                line(out, level, "}");
            }
            StmtKind::Block(stmts) => {
                line(out, level, "{");
                for stmt in stmts {
                    self.stmt(out, stmt, level + 1)?;
                }
                line(out, level, "}");
            }
            StmtKind::Return(Some(value)) => {
                let value = self.expr(value)?;
                line(out, level, &format!("return {};", value));
            }
            StmtKind::Return(None) => line(out, level, "return;"),
            StmtKind::Discard => line(out, level, "discard;"),
        }
        Ok(())
    }

    /// Statements of a braced body, one level deeper than its opener.
    fn body(&self, out: &mut String, stmt: &Stmt, level: usize) -> ShaderResult<()> {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.stmt(out, stmt, level + 1)?;
                }
                Ok(())
            }
            _ => self.stmt(out, stmt, level + 1),
        }
    }

    /// Branch kept by a constant `if`. Its block is flattened into the
    /// enclosing one unless it declares names.
    fn selected(&self, out: &mut String, stmt: &Stmt, level: usize) -> ShaderResult<()> {
        match &stmt.kind {
            StmtKind::Block(stmts)
                if !stmts
                    .iter()
                    .any(|stmt| matches!(stmt.kind, StmtKind::Declaration { .. })) =>
            {
                for stmt in stmts {
                    self.stmt(out, stmt, level)?;
                }
                Ok(())
            }
            _ => self.stmt(out, stmt, level),
        }
    }

    fn expr(&self, expr: &Expr) -> ShaderResult<String> {
        Ok(match &expr.kind {
            ExprKind::Bool(value) => value.to_string(),
            ExprKind::Int(value) => value.to_string(),
            ExprKind::Float(value) => float_literal(*value),
            ExprKind::Variable(variable) => {
                if self.inactive.contains(variable) {
                    return Err(ShaderError::undefined_variable(
                        self.name(*variable),
                        expr.location,
                    ));
                }
                String::from(self.name(*variable))
            }
            ExprKind::Property(_) => is_active(expr, self.enabled).to_string(),
            ExprKind::Unary { op, operand } => {
                if *op == UnaryOp::BitNot && !self.info.integer_operators {
                    return Err(self.unsupported(format!("operator {}", op.symbol()), expr.location));
                }
                let operand = self.operand(operand)?;
                if op.is_postfix() {
                    format!("{}{}", operand, op.symbol())
                } else {
                    format!("{}{}", op.symbol(), operand)
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                if op.is_integer_only() && !self.info.integer_operators {
                    return Err(self.unsupported(format!("operator {}", op.symbol()), expr.location));
                }
                format!(
                    "{} {} {}",
                    self.operand(lhs)?,
                    op.symbol(),
                    self.operand(rhs)?
                )
            }
            ExprKind::Assign { op, target, value } => {
                if op.is_integer_only() && !self.info.integer_operators {
                    return Err(self.unsupported(format!("operator {}", op.symbol()), expr.location));
                }
                format!(
                    "{} {} {}",
                    self.operand(target)?,
                    op.symbol(),
                    self.expr(value)?
                )
            }
            ExprKind::Ternary {
                condition,
                then,
                otherwise,
            } => format!(
                "{} ? {} : {}",
                self.operand(condition)?,
                self.operand(then)?,
                self.operand(otherwise)?
            ),
            ExprKind::Call { callee, args } => {
                let callee = match callee {
                    Callee::Function(name) => name.clone(),
                    Callee::Builtin("texture") => String::from(self.info.texture_function),
                    Callee::Builtin(name) => String::from(*name),
                    Callee::Constructor(ty) => {
                        self.check_base(ty.base, expr.location)?;
                        ty.base.to_string()
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<ShaderResult<Vec<_>>>()?;
                format!("{}({})", callee, args.join(", "))
            }
            ExprKind::Member { base, field } => format!("{}.{}", self.operand(base)?, field),
            ExprKind::Index { base, index } => {
                format!("{}[{}]", self.operand(base)?, self.expr(index)?)
            }
        })
    }

    /// Whether `expr` is a constant expression: literals, properties and
    /// `const` variables combined by operators and constructors.
    fn is_constant(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Property(_) => {
                true
            }
            ExprKind::Variable(variable) => self
                .shader
                .variables
                .get(*variable)
                .is_some_and(|info| info.ty.constant),
            ExprKind::Unary { op, operand } => {
                matches!(op, UnaryOp::Plus | UnaryOp::Negate | UnaryOp::Not | UnaryOp::BitNot)
                    && self.is_constant(operand)
            }
            ExprKind::Binary { lhs, rhs, .. } => self.is_constant(lhs) && self.is_constant(rhs),
            ExprKind::Ternary {
                condition,
                then,
                otherwise,
            } => {
                self.is_constant(condition)
                    && self.is_constant(then)
                    && self.is_constant(otherwise)
            }
            ExprKind::Call {
                callee: Callee::Constructor(_),
                args,
            } => args.iter().all(|arg| self.is_constant(arg)),
            ExprKind::Member { base, .. } => self.is_constant(base),
            ExprKind::Index { base, index } => self.is_constant(base) && self.is_constant(index),
            ExprKind::Assign { .. } | ExprKind::Call { .. } => false,
        }
    }

    /// An operand, parenthesized unless it is an atom.
    fn operand(&self, expr: &Expr) -> ShaderResult<String> {
        let text = self.expr(expr)?;
        Ok(match expr.kind {
            ExprKind::Unary { .. }
            | ExprKind::Binary { .. }
            | ExprKind::Assign { .. }
            | ExprKind::Ternary { .. } => format!("({})", text),
            _ => text,
        })
    }
}

/// Collect the names of shader functions called in `stmt`.
fn stmt_calls<'s>(stmt: &'s Stmt, calls: &mut BTreeSet<&'s str>) {
    match &stmt.kind {
        StmtKind::Expression(expr) | StmtKind::Return(Some(expr)) => expr_calls(expr, calls),
        StmtKind::Declaration { initializer, .. } => {
            if let Some(initializer) = initializer {
                expr_calls(initializer, calls);
            }
        }
        StmtKind::If {
            condition,
            then,
            otherwise,
        } => {
            expr_calls(condition, calls);
            stmt_calls(then, calls);
            if let Some(otherwise) = otherwise {
                stmt_calls(otherwise, calls);
            }
        }
        StmtKind::Loop {
            start, end, body, ..
        } => {
            expr_calls(start, calls);
            expr_calls(end, calls);
            stmt_calls(body, calls);
        }
        StmtKind::Block(stmts) => {
            for stmt in stmts {
                stmt_calls(stmt, calls);
            }
        }
        StmtKind::Return(None) | StmtKind::Discard => {}
    }
}

fn expr_calls<'s>(expr: &'s Expr, calls: &mut BTreeSet<&'s str>) {
    match &expr.kind {
        ExprKind::Call { callee, args } => {
            if let Callee::Function(name) = callee {
                calls.insert(name.as_str());
            }
            for arg in args {
                expr_calls(arg, calls);
            }
        }
        ExprKind::Unary { operand, .. } => expr_calls(operand, calls),
        ExprKind::Binary { lhs, rhs, .. } => {
            expr_calls(lhs, calls);
            expr_calls(rhs, calls);
        }
        ExprKind::Assign { target, value, .. } => {
            expr_calls(target, calls);
            expr_calls(value, calls);
        }
        ExprKind::Ternary {
            condition,
            then,
            otherwise,
        } => {
            expr_calls(condition, calls);
            expr_calls(then, calls);
            expr_calls(otherwise, calls);
        }
        ExprKind::Member { base, .. } => expr_calls(base, calls),
        ExprKind::Index { base, index } => {
            expr_calls(base, calls);
            expr_calls(index, calls);
        }
        ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Variable(_)
        | ExprKind::Property(_) => {}
    }
}

fn line(out: &mut String, level: usize, text: &str) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

/// Non-empty sections separated by single blank lines.
fn join_sections(sections: Vec<String>) -> String {
    sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Float literal that GLSL reads as a float: always has a `.` or exponent.
fn float_literal(value: f64) -> String {
    let text = format!("{:?}", value);
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{}.0", text)
    }
}
