//! Parse tree contract with the external front end.
//!
//! The front end turns shader description text into these plain data
//! nodes. Nothing here is resolved: names are raw token text and types are
//! declarator text. The [`ShaderBuilder`](crate::builder::ShaderBuilder)
//! turns a [`SyntaxShader`] into a typed [`Shader`](crate::ast::Shader).

use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    ast::{AssignOp, BinaryOp, UnaryOp},
    location::SourceLocation,
};

/// A leaf of the parse tree: token text and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub location: Option<SourceLocation>,
}

impl Token {
    /// Create a token at `line:column`.
    pub fn new(text: impl Into<String>, line: u32, column: u32) -> Self {
        Token {
            text: text.into(),
            location: Some(SourceLocation::new(line, column)),
        }
    }

    /// Create a token with no source location.
    pub fn synthetic(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            location: None,
        }
    }
}

/// An ordinary parameter declaration.
///
/// Implemented by parse tree nodes that can hand out the declared name and
/// its declarator text.
pub trait ParameterSource {
    /// Declared name
    fn identifier(&self) -> &Token;
    /// Type declarator text
    fn declarator(&self) -> &Token;
}

/// A shader parameter declaration (attribute, varying, uniform or output).
pub trait ShaderParameterSource: ParameterSource {
    /// Optional integer literal giving an explicit binding identifier
    fn id_literal(&self) -> Option<&Token>;
    /// Optional property name gating the parameter
    fn property(&self) -> Option<&Token>;
}

/// `<declarator> <identifier>`
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxParameter {
    pub declarator: Token,
    pub identifier: Token,
}

impl ParameterSource for SyntaxParameter {
    fn identifier(&self) -> &Token {
        &self.identifier
    }

    fn declarator(&self) -> &Token {
        &self.declarator
    }
}

/// `[<id>] <declarator> <identifier> [if $<property>]`
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxShaderParameter {
    pub id: Option<Token>,
    pub declarator: Token,
    pub identifier: Token,
    pub property: Option<Token>,
}

impl SyntaxShaderParameter {
    /// Parameter with no explicit id and no property gate.
    pub fn new(declarator: Token, identifier: Token) -> Self {
        SyntaxShaderParameter {
            id: None,
            declarator,
            identifier,
            property: None,
        }
    }

    /// Same parameter with an explicit id literal.
    pub fn with_id(mut self, id: Token) -> Self {
        self.id = Some(id);
        self
    }

    /// Same parameter gated by a property.
    pub fn with_property(mut self, property: Token) -> Self {
        self.property = Some(property);
        self
    }
}

impl ParameterSource for SyntaxShaderParameter {
    fn identifier(&self) -> &Token {
        &self.identifier
    }

    fn declarator(&self) -> &Token {
        &self.declarator
    }
}

impl ShaderParameterSource for SyntaxShaderParameter {
    fn id_literal(&self) -> Option<&Token> {
        self.id.as_ref()
    }

    fn property(&self) -> Option<&Token> {
        self.property.as_ref()
    }
}

/// Unresolved expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxExpr {
    pub kind: SyntaxExprKind,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxExprKind {
    BoolLiteral(bool),
    IntLiteral(Token),
    FloatLiteral(Token),
    Identifier(Token),
    /// Reference to a named property (`$name` in the description language)
    Property(Token),
    Unary {
        op: UnaryOp,
        operand: Box<SyntaxExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<SyntaxExpr>,
        rhs: Box<SyntaxExpr>,
    },
    Assign {
        op: AssignOp,
        target: Box<SyntaxExpr>,
        value: Box<SyntaxExpr>,
    },
    Ternary {
        condition: Box<SyntaxExpr>,
        then: Box<SyntaxExpr>,
        otherwise: Box<SyntaxExpr>,
    },
    Call {
        name: Token,
        args: Vec<SyntaxExpr>,
    },
    Member {
        base: Box<SyntaxExpr>,
        field: Token,
    },
    Index {
        base: Box<SyntaxExpr>,
        index: Box<SyntaxExpr>,
    },
}

impl SyntaxExpr {
    pub fn new(kind: SyntaxExprKind, location: Option<SourceLocation>) -> Self {
        SyntaxExpr { kind, location }
    }

    pub fn identifier(token: Token) -> Self {
        let location = token.location;
        Self::new(SyntaxExprKind::Identifier(token), location)
    }

    pub fn property(token: Token) -> Self {
        let location = token.location;
        Self::new(SyntaxExprKind::Property(token), location)
    }

    pub fn int(token: Token) -> Self {
        let location = token.location;
        Self::new(SyntaxExprKind::IntLiteral(token), location)
    }

    pub fn float(token: Token) -> Self {
        let location = token.location;
        Self::new(SyntaxExprKind::FloatLiteral(token), location)
    }

    pub fn boolean(value: bool, location: Option<SourceLocation>) -> Self {
        Self::new(SyntaxExprKind::BoolLiteral(value), location)
    }

    pub fn call(name: Token, args: Vec<SyntaxExpr>) -> Self {
        let location = name.location;
        Self::new(SyntaxExprKind::Call { name, args }, location)
    }

    /// Binary expression located at its left operand.
    pub fn binary(op: BinaryOp, lhs: SyntaxExpr, rhs: SyntaxExpr) -> Self {
        let location = lhs.location;
        Self::new(
            SyntaxExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            location,
        )
    }

    /// Assignment located at its target.
    pub fn assign(op: AssignOp, target: SyntaxExpr, value: SyntaxExpr) -> Self {
        let location = target.location;
        Self::new(
            SyntaxExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            location,
        )
    }
}

/// Unresolved statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxStmt {
    pub kind: SyntaxStmtKind,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxStmtKind {
    Expression(SyntaxExpr),
    Declaration {
        declarator: Token,
        name: Token,
        initializer: Option<SyntaxExpr>,
    },
    If {
        condition: SyntaxExpr,
        then: Box<SyntaxStmt>,
        otherwise: Option<Box<SyntaxStmt>>,
    },
    /// `for (<index> in <start>..<end>) <body>`
    Loop {
        index: Token,
        start: SyntaxExpr,
        end: SyntaxExpr,
        body: Box<SyntaxStmt>,
    },
    Block(Vec<SyntaxStmt>),
    Return(Option<SyntaxExpr>),
    Discard,
}

impl SyntaxStmt {
    pub fn new(kind: SyntaxStmtKind, location: Option<SourceLocation>) -> Self {
        SyntaxStmt { kind, location }
    }

    /// Expression statement located at its expression.
    pub fn expression(expr: SyntaxExpr) -> Self {
        let location = expr.location;
        Self::new(SyntaxStmtKind::Expression(expr), location)
    }

    /// Declaration located at its declarator.
    pub fn declaration(declarator: Token, name: Token, initializer: Option<SyntaxExpr>) -> Self {
        let location = declarator.location;
        Self::new(
            SyntaxStmtKind::Declaration {
                declarator,
                name,
                initializer,
            },
            location,
        )
    }
}

/// `<return declarator> <name>(<parameters>) { <body> }`
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxFunction {
    pub return_declarator: Token,
    pub name: Token,
    pub parameters: Vec<SyntaxParameter>,
    pub body: Vec<SyntaxStmt>,
}

/// A shader stage: its input parameter list and its body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyntaxStage {
    pub inputs: Vec<SyntaxShaderParameter>,
    pub body: Vec<SyntaxStmt>,
}

/// Root of the parse tree for one shader description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyntaxShader {
    /// Declared property names
    pub properties: Vec<Token>,
    pub uniforms: Vec<SyntaxShaderParameter>,
    /// Global constant declarations
    pub declarations: Vec<SyntaxStmt>,
    pub functions: Vec<SyntaxFunction>,
    /// Vertex stage; its inputs are the vertex attributes
    pub vertex: Option<SyntaxStage>,
    /// Fragment stage; its inputs are the varyings written by the vertex stage
    pub fragment: Option<SyntaxStage>,
    /// Fragment outputs
    pub outputs: Vec<SyntaxShaderParameter>,
}
