//! Parser for shader descriptions in file tests.
//!
//! Stands in for the production front end: reads the description text and
//! hands back the parse tree with a location on every token. Lines are
//! counted from 1 and columns from 0, both relative to the whole file, so
//! diagnostics point into the test file itself.
//!
//! ```text
//! property tinted;
//! uniform [id] <declarator> <name> [if $<property>];
//! const <declarator> <name> = <expr>;
//! <declarator> <name>(<declarator> <name>, ...) { ... }
//! vertex(<shader parameters>) { ... }
//! fragment(<shader parameters>) { ... }
//! outputs(<shader parameters>);
//! ```

use lpc_shader::{
    ast::{AssignOp, BinaryOp, UnaryOp},
    syntax::{
        SyntaxExpr, SyntaxExprKind, SyntaxFunction, SyntaxParameter, SyntaxShader,
        SyntaxShaderParameter, SyntaxStage, SyntaxStmt, SyntaxStmtKind, Token,
    },
    SourceLocation,
};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{
        alpha1, alphanumeric1, char, digit0, digit1, hex_digit1, multispace1, not_line_ending,
        one_of, satisfy, space0,
    },
    combinator::{map, not, opt, recognize, value, verify},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

type PResult<'s, O> = IResult<&'s str, O>;

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "in", "return", "discard", "true", "false", "const", "property",
    "uniform", "vertex", "fragment", "outputs",
];

/// Longest first, so that `<<=` wins over `<<` and `<`.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "^^", "+=", "-=",
    "*=", "/=", "%=", "&=", "|=", "^=", "+", "-", "*", "/", "%", "<", ">", "!", "~", "&", "|",
    "^", "=", "?", ":",
];

const BINARY_LEVELS: &[&[(&str, BinaryOp)]] = &[
    &[("||", BinaryOp::Or)],
    &[("^^", BinaryOp::Xor)],
    &[("&&", BinaryOp::And)],
    &[("|", BinaryOp::BitOr)],
    &[("^", BinaryOp::BitXor)],
    &[("&", BinaryOp::BitAnd)],
    &[("==", BinaryOp::Equal), ("!=", BinaryOp::NotEqual)],
    &[
        ("<", BinaryOp::Less),
        (">", BinaryOp::Greater),
        ("<=", BinaryOp::LessEqual),
        (">=", BinaryOp::GreaterEqual),
    ],
    &[("<<", BinaryOp::ShiftLeft), (">>", BinaryOp::ShiftRight)],
    &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
    &[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("%", BinaryOp::Mod)],
];

const ASSIGN_OPS: &[(&str, AssignOp)] = &[
    ("=", AssignOp::Assign),
    ("+=", AssignOp::Add),
    ("-=", AssignOp::Sub),
    ("*=", AssignOp::Mul),
    ("/=", AssignOp::Div),
    ("%=", AssignOp::Mod),
    ("&=", AssignOp::BitAnd),
    ("|=", AssignOp::BitOr),
    ("^=", AssignOp::BitXor),
    ("<<=", AssignOp::ShiftLeft),
    (">>=", AssignOp::ShiftRight),
];

const PREFIX_OPS: &[(&str, UnaryOp)] = &[
    ("+", UnaryOp::Plus),
    ("-", UnaryOp::Negate),
    ("!", UnaryOp::Not),
    ("~", UnaryOp::BitNot),
    ("++", UnaryOp::PreIncrement),
    ("--", UnaryOp::PreDecrement),
];

/// Parse a whole shader description.
pub fn parse_shader(source: &str) -> Result<SyntaxShader, String> {
    FixtureParser { source }.shader()
}

enum Item {
    Property(Token),
    Uniform(SyntaxShaderParameter),
    Declaration(SyntaxStmt),
    Function(SyntaxFunction),
    Vertex(SyntaxStage),
    Fragment(SyntaxStage),
    Outputs(Vec<SyntaxShaderParameter>),
}

/// Skip whitespace and `//` comments.
fn ws(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0(alt((multispace1, preceded(tag("//"), not_line_ending)))),
    )(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn sym<'s>(text: &'static str) -> impl FnMut(&'s str) -> PResult<'s, &'s str> {
    preceded(ws, tag(text))
}

fn keyword<'s>(word: &'static str) -> impl FnMut(&'s str) -> PResult<'s, &'s str> {
    preceded(ws, terminated(tag(word), not(satisfy(is_identifier_char))))
}

fn hex_literal(input: &str) -> PResult<'_, &str> {
    recognize(pair(alt((tag("0x"), tag("0X"))), hex_digit1))(input)
}

fn raw_identifier(input: &str) -> PResult<'_, &str> {
    verify(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |text: &str| !KEYWORDS.contains(&text),
    )(input)
}

/// Next operator by maximal munch.
fn operator(input: &str) -> PResult<'_, &'static str> {
    let (input, _) = ws(input)?;
    match OPERATORS.iter().find(|op| input.starts_with(**op)) {
        Some(op) => Ok((&input[op.len()..], *op)),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn lookup<T: Copy>(table: &[(&str, T)], op: &str) -> Option<T> {
    table
        .iter()
        .find(|(symbol, _)| *symbol == op)
        .map(|(_, value)| *value)
}

struct FixtureParser<'s> {
    source: &'s str,
}

impl<'s> FixtureParser<'s> {
    fn location(&self, input: &str) -> SourceLocation {
        let offset = self.source.len() - input.len();
        let consumed = &self.source[..offset];
        let line = consumed.matches('\n').count() as u32 + 1;
        let line_start = consumed.rfind('\n').map(|index| index + 1).unwrap_or(0);
        let column = consumed[line_start..].chars().count() as u32;
        SourceLocation::new(line, column)
    }

    fn token(&self, text: &str, start: &str) -> Token {
        let location = self.location(start);
        Token::new(text, location.line, location.column)
    }

    fn shader(&self) -> Result<SyntaxShader, String> {
        let mut shader = SyntaxShader::default();
        let mut input = self.source;
        loop {
            let (start, _) = ws(input).map_err(|e| e.to_string())?;
            if start.is_empty() {
                return Ok(shader);
            }
            let (rest, item) = self
                .item(start)
                .map_err(|_| format!("{}: expected a shader item", self.location(start)))?;
            match item {
                Item::Property(token) => shader.properties.push(token),
                Item::Uniform(uniform) => shader.uniforms.push(uniform),
                Item::Declaration(stmt) => shader.declarations.push(stmt),
                Item::Function(function) => shader.functions.push(function),
                Item::Vertex(stage) => {
                    if shader.vertex.replace(stage).is_some() {
                        return Err(format!("{}: second vertex stage", self.location(start)));
                    }
                }
                Item::Fragment(stage) => {
                    if shader.fragment.replace(stage).is_some() {
                        return Err(format!("{}: second fragment stage", self.location(start)));
                    }
                }
                Item::Outputs(outputs) => shader.outputs.extend(outputs),
            }
            input = rest;
        }
    }

    fn item(&self, input: &'s str) -> PResult<'s, Item> {
        alt((
            map(
                delimited(keyword("property"), |i| self.identifier(i), sym(";")),
                Item::Property,
            ),
            map(
                delimited(keyword("uniform"), |i| self.shader_parameter(i), sym(";")),
                Item::Uniform,
            ),
            map(
                preceded(keyword("vertex"), |i| self.stage(i)),
                Item::Vertex,
            ),
            map(
                preceded(keyword("fragment"), |i| self.stage(i)),
                Item::Fragment,
            ),
            map(
                delimited(
                    keyword("outputs"),
                    |i| self.shader_parameters(i),
                    sym(";"),
                ),
                Item::Outputs,
            ),
            map(|i| self.declaration(i), Item::Declaration),
            map(|i| self.function(i), Item::Function),
        ))(input)
    }

    fn identifier(&self, input: &'s str) -> PResult<'s, Token> {
        let (input, _) = ws(input)?;
        let start = input;
        let (input, text) = raw_identifier(input)?;
        Ok((input, self.token(text, start)))
    }

    /// `[const] [precision] base [\[length\]]`, kept as text.
    fn declarator(&self, input: &'s str) -> PResult<'s, Token> {
        let (input, _) = ws(input)?;
        let start = input;
        let (input, text) = recognize(tuple((
            opt(terminated(tag("const"), multispace1)),
            opt(terminated(
                alt((tag("lowp"), tag("mediump"), tag("highp"))),
                multispace1,
            )),
            raw_identifier,
            opt(preceded(
                space0,
                delimited(char('['), delimited(space0, digit1, space0), char(']')),
            )),
        )))(input)?;
        Ok((input, self.token(text, start)))
    }

    /// `$name`, located at the `$`.
    fn property(&self, input: &'s str) -> PResult<'s, Token> {
        let (input, _) = ws(input)?;
        let start = input;
        let (input, text) = preceded(char('$'), raw_identifier)(input)?;
        Ok((input, self.token(text, start)))
    }

    fn shader_parameter(&self, input: &'s str) -> PResult<'s, SyntaxShaderParameter> {
        let (input, _) = ws(input)?;
        let start = input;
        let (input, id) = opt(terminated(
            recognize(pair(opt(char('-')), digit1)),
            multispace1,
        ))(input)?;
        let (input, declarator) = self.declarator(input)?;
        let (input, identifier) = self.identifier(input)?;
        let (input, property) = opt(preceded(keyword("if"), |i| self.property(i)))(input)?;
        Ok((
            input,
            SyntaxShaderParameter {
                id: id.map(|text| self.token(text, start)),
                declarator,
                identifier,
                property,
            },
        ))
    }

    fn shader_parameters(&self, input: &'s str) -> PResult<'s, Vec<SyntaxShaderParameter>> {
        delimited(
            sym("("),
            separated_list0(sym(","), |i| self.shader_parameter(i)),
            sym(")"),
        )(input)
    }

    fn stage(&self, input: &'s str) -> PResult<'s, SyntaxStage> {
        let (input, inputs) = self.shader_parameters(input)?;
        let (input, body) = self.body(input)?;
        Ok((input, SyntaxStage { inputs, body }))
    }

    fn function(&self, input: &'s str) -> PResult<'s, SyntaxFunction> {
        let (input, return_declarator) = self.declarator(input)?;
        let (input, name) = self.identifier(input)?;
        let (input, parameters) = delimited(
            sym("("),
            separated_list0(sym(","), |i| {
                let (i, declarator) = self.declarator(i)?;
                let (i, identifier) = self.identifier(i)?;
                Ok((
                    i,
                    SyntaxParameter {
                        declarator,
                        identifier,
                    },
                ))
            }),
            sym(")"),
        )(input)?;
        let (input, body) = self.body(input)?;
        Ok((
            input,
            SyntaxFunction {
                return_declarator,
                name,
                parameters,
                body,
            },
        ))
    }

    fn body(&self, input: &'s str) -> PResult<'s, Vec<SyntaxStmt>> {
        delimited(sym("{"), many0(|i| self.stmt(i)), sym("}"))(input)
    }

    fn stmt(&self, input: &'s str) -> PResult<'s, SyntaxStmt> {
        let (input, _) = ws(input)?;
        let start = input;
        let location = Some(self.location(start));
        alt((
            map(
                |i| self.body(i),
                move |stmts| SyntaxStmt::new(SyntaxStmtKind::Block(stmts), location),
            ),
            map(
                tuple((
                    keyword("if"),
                    delimited(sym("("), |i| self.expr(i), sym(")")),
                    |i| self.stmt(i),
                    opt(preceded(keyword("else"), |i| self.stmt(i))),
                )),
                move |(_, condition, then, otherwise)| {
                    SyntaxStmt::new(
                        SyntaxStmtKind::If {
                            condition,
                            then: Box::new(then),
                            otherwise: otherwise.map(Box::new),
                        },
                        location,
                    )
                },
            ),
            map(
                tuple((
                    keyword("for"),
                    sym("("),
                    |i| self.identifier(i),
                    keyword("in"),
                    |i| self.expr(i),
                    sym(".."),
                    |i| self.expr(i),
                    sym(")"),
                    |i| self.stmt(i),
                )),
                move |(_, _, index, _, start, _, end, _, body)| {
                    SyntaxStmt::new(
                        SyntaxStmtKind::Loop {
                            index,
                            start,
                            end,
                            body: Box::new(body),
                        },
                        location,
                    )
                },
            ),
            map(
                delimited(keyword("return"), opt(|i| self.expr(i)), sym(";")),
                move |value| SyntaxStmt::new(SyntaxStmtKind::Return(value), location),
            ),
            map(pair(keyword("discard"), sym(";")), move |_| {
                SyntaxStmt::new(SyntaxStmtKind::Discard, location)
            }),
            |i| self.declaration(i),
            map(terminated(|i| self.expr(i), sym(";")), SyntaxStmt::expression),
        ))(input)
    }

    fn declaration(&self, input: &'s str) -> PResult<'s, SyntaxStmt> {
        let (input, declarator) = self.declarator(input)?;
        let (input, name) = self.identifier(input)?;
        let (input, initializer) = opt(preceded(
            verify(operator, |op: &str| op == "="),
            |i| self.expr(i),
        ))(input)?;
        let (input, _) = sym(";")(input)?;
        Ok((input, SyntaxStmt::declaration(declarator, name, initializer)))
    }

    fn expr(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        self.assignment(input)
    }

    fn assignment(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        let (input, target) = self.ternary(input)?;
        match operator(input) {
            Ok((rest, op)) => match lookup(ASSIGN_OPS, op) {
                Some(op) => {
                    let (rest, value) = self.assignment(rest)?;
                    Ok((rest, SyntaxExpr::assign(op, target, value)))
                }
                None => Ok((input, target)),
            },
            Err(_) => Ok((input, target)),
        }
    }

    fn ternary(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        let (input, condition) = self.binary(input, 0)?;
        match operator(input) {
            Ok((rest, "?")) => {
                let (rest, then) = self.expr(rest)?;
                let (rest, _) = verify(operator, |op: &str| op == ":")(rest)?;
                let (rest, otherwise) = self.assignment(rest)?;
                let location = condition.location;
                Ok((
                    rest,
                    SyntaxExpr::new(
                        SyntaxExprKind::Ternary {
                            condition: Box::new(condition),
                            then: Box::new(then),
                            otherwise: Box::new(otherwise),
                        },
                        location,
                    ),
                ))
            }
            _ => Ok((input, condition)),
        }
    }

    fn binary(&self, input: &'s str, level: usize) -> PResult<'s, SyntaxExpr> {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.unary(input);
        };
        let (mut input, mut lhs) = self.binary(input, level + 1)?;
        loop {
            let found = operator(input)
                .ok()
                .and_then(|(rest, op)| lookup(ops, op).map(|op| (rest, op)));
            match found {
                Some((rest, op)) => {
                    let (rest, rhs) = self.binary(rest, level + 1)?;
                    lhs = SyntaxExpr::binary(op, lhs, rhs);
                    input = rest;
                }
                None => return Ok((input, lhs)),
            }
        }
    }

    fn unary(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        let (input, _) = ws(input)?;
        let start = input;
        if let Ok((rest, op)) = operator(input) {
            if let Some(op) = lookup(PREFIX_OPS, op) {
                let (rest, operand) = self.unary(rest)?;
                return Ok((
                    rest,
                    SyntaxExpr::new(
                        SyntaxExprKind::Unary {
                            op,
                            operand: Box::new(operand),
                        },
                        Some(self.location(start)),
                    ),
                ));
            }
        }
        self.postfix(input)
    }

    fn postfix(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        let (mut input, mut expr) = self.primary(input)?;
        loop {
            let location = expr.location;
            if let Ok((rest, index)) = delimited(sym("["), |i| self.expr(i), sym("]"))(input) {
                expr = SyntaxExpr::new(
                    SyntaxExprKind::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    },
                    location,
                );
                input = rest;
            } else if let Ok((rest, field)) = preceded(sym("."), |i| self.identifier(i))(input) {
                expr = SyntaxExpr::new(
                    SyntaxExprKind::Member {
                        base: Box::new(expr),
                        field,
                    },
                    location,
                );
                input = rest;
            } else if let Ok((rest, op @ ("++" | "--"))) = operator(input) {
                let op = if op == "++" {
                    UnaryOp::PostIncrement
                } else {
                    UnaryOp::PostDecrement
                };
                expr = SyntaxExpr::new(
                    SyntaxExprKind::Unary {
                        op,
                        operand: Box::new(expr),
                    },
                    location,
                );
                input = rest;
            } else {
                return Ok((input, expr));
            }
        }
    }

    fn primary(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        let (input, _) = ws(input)?;
        let start = input;
        let location = Some(self.location(start));
        alt((
            delimited(sym("("), |i| self.expr(i), sym(")")),
            map(keyword("true"), move |_| SyntaxExpr::boolean(true, location)),
            map(keyword("false"), move |_| SyntaxExpr::boolean(false, location)),
            |i| self.number(i),
            map(|i| self.property(i), SyntaxExpr::property),
            map(
                pair(
                    |i| self.identifier(i),
                    opt(delimited(
                        sym("("),
                        separated_list0(sym(","), |i| self.expr(i)),
                        sym(")"),
                    )),
                ),
                |(name, args)| match args {
                    Some(args) => SyntaxExpr::call(name, args),
                    None => SyntaxExpr::identifier(name),
                },
            ),
        ))(input)
    }

    /// Integer, `0x` hexadecimal or float literal. `0..4` reads as `0`
    /// followed by `..`.
    fn number(&self, input: &'s str) -> PResult<'s, SyntaxExpr> {
        let (input, _) = ws(input)?;
        let start = input;
        if let Ok((input, text)) = hex_literal(input) {
            return Ok((input, SyntaxExpr::int(self.token(text, start))));
        }
        let (input, text) = recognize(tuple((
            digit1,
            opt(pair(terminated(char('.'), not(char('.'))), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
            opt(one_of("fF")),
        )))(input)?;
        let token = self.token(text, start);
        if text.contains(['.', 'e', 'E', 'f', 'F']) {
            Ok((input, SyntaxExpr::float(token)))
        } else {
            Ok((input, SyntaxExpr::int(token)))
        }
    }
}
