//! Typed, resolved AST.
//!
//! Names are resolved to [`Variable`] handles and declarators to [`Type`]s.
//! Every node is built with its optional source location; nodes the
//! compiler synthesizes (such as the default parameter gate) have none.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use crate::{
    location::SourceLocation,
    symbols::{Variable, VariableTable},
    types::Type,
};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
    Xor,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Xor => "^^",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        }
    }

    /// Integer-only operators (`%`, bitwise and shifts).
    pub fn is_integer_only(self) -> bool {
        matches!(
            self,
            BinaryOp::Mod
                | BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::BitXor
                | BinaryOp::ShiftLeft
                | BinaryOp::ShiftRight
        )
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::ShiftLeft => "<<=",
            AssignOp::ShiftRight => ">>=",
        }
    }

    pub fn is_integer_only(self) -> bool {
        matches!(
            self,
            AssignOp::Mod
                | AssignOp::BitAnd
                | AssignOp::BitOr
                | AssignOp::BitXor
                | AssignOp::ShiftLeft
                | AssignOp::ShiftRight
        )
    }
}

/// Call target of a call expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    /// Function defined by the shader
    Function(String),
    /// Library function, by its description-language name
    Builtin(&'static str),
    /// Type constructor such as `vec4(...)`
    Constructor(Type),
}

/// Resolved expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Int(i32),
    Float(f64),
    Variable(Variable),
    /// Named property, resolved when a variant is generated
    Property(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, location: Option<SourceLocation>) -> Self {
        Expr { kind, location }
    }

    /// Boolean literal with no location.
    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Bool(value), None)
    }

    /// Property reference.
    pub fn property(name: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(ExprKind::Property(name.into()), location)
    }
}

/// Resolved statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    Declaration {
        variable: Variable,
        ty: Type,
        initializer: Option<Expr>,
    },
    If {
        condition: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    /// Counts `index` from `start` up to, not including, `end`
    Loop {
        index: Variable,
        start: Expr,
        end: Expr,
        body: Box<Stmt>,
    },
    Block(Vec<Stmt>),
    Return(Option<Expr>),
    Discard,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Option<SourceLocation>) -> Self {
        Stmt { kind, location }
    }
}

/// An ordinary function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: Type,
    pub variable: Variable,
}

/// A shader-level parameter: attribute, varying, uniform or output.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderParameter {
    pub ty: Type,
    pub variable: Variable,
    /// Explicit binding identifier; `None` means assign automatically
    pub id: Option<u32>,
    /// Gate deciding whether the parameter exists in a variant
    pub available: Expr,
    pub location: Option<SourceLocation>,
}

impl ShaderParameter {
    /// Sentinel used by the description language for "assign automatically".
    pub const AUTO_ID: i32 = -1;

    /// Binding identifier in the description language's encoding.
    pub fn raw_id(&self) -> i64 {
        self.id
            .map(i64::from)
            .unwrap_or(i64::from(Self::AUTO_ID))
    }
}

/// A function defined by the shader.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Stmt>,
    pub location: Option<SourceLocation>,
}

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => write!(f, "vertex"),
            Stage::Fragment => write!(f, "fragment"),
        }
    }
}

/// One stage's inputs and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderStage {
    pub inputs: Vec<ShaderParameter>,
    pub body: Vec<Stmt>,
}

/// A fully resolved shader description.
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    /// Property names the shader declares
    pub properties: Vec<String>,
    pub uniforms: Vec<ShaderParameter>,
    /// Global constant declarations
    pub declarations: Vec<Stmt>,
    pub functions: Vec<Function>,
    pub vertex: Option<ShaderStage>,
    pub fragment: Option<ShaderStage>,
    pub outputs: Vec<ShaderParameter>,
    /// Every variable referenced anywhere in the shader
    pub variables: VariableTable,
}

impl Shader {
    /// Vertex attributes (vertex stage inputs).
    pub fn attributes(&self) -> &[ShaderParameter] {
        self.vertex
            .as_ref()
            .map(|stage| stage.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Varyings (fragment stage inputs).
    pub fn varyings(&self) -> &[ShaderParameter] {
        self.fragment
            .as_ref()
            .map(|stage| stage.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Declared name of a variable.
    pub fn name(&self, variable: Variable) -> &str {
        self.variables.name(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        assert_eq!(BinaryOp::ShiftLeft.symbol(), "<<");
        assert_eq!(BinaryOp::Xor.symbol(), "^^");
        assert_eq!(AssignOp::ShiftRight.symbol(), ">>=");
        assert_eq!(UnaryOp::PostIncrement.symbol(), "++");
        assert!(UnaryOp::PostDecrement.is_postfix());
        assert!(!UnaryOp::PreDecrement.is_postfix());
    }

    #[test]
    fn test_integer_only_operators() {
        assert!(BinaryOp::Mod.is_integer_only());
        assert!(BinaryOp::BitXor.is_integer_only());
        assert!(!BinaryOp::Xor.is_integer_only());
        assert!(!BinaryOp::Div.is_integer_only());
        assert!(AssignOp::BitOr.is_integer_only());
        assert!(!AssignOp::Mul.is_integer_only());
    }

    #[test]
    fn test_raw_id_sentinel() {
        let mut variables = VariableTable::new();
        let variable = variables.allocate(crate::symbols::VariableInfo {
            name: String::from("a"),
            ty: Type::scalar(crate::types::ScalarKind::Float),
            builtin: None,
        });
        let mut parameter = ShaderParameter {
            ty: Type::scalar(crate::types::ScalarKind::Float),
            variable,
            id: None,
            available: Expr::boolean(true),
            location: None,
        };
        assert_eq!(parameter.raw_id(), i64::from(ShaderParameter::AUTO_ID));
        parameter.id = Some(3);
        assert_eq!(parameter.raw_id(), 3);
        parameter.id = Some(u32::MAX);
        assert_eq!(parameter.raw_id(), i64::from(u32::MAX));
    }
}
