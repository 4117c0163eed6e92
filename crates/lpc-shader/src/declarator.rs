//! Declarator resolution: maps declarator text to canonical types.
//!
//! Grammar: `["const"] [precision] base [arity] ["[" length "]"]`, where the
//! arity is a digit suffix (`vec3`, `ivec2`, `mat4`) or `CxR` for
//! non-square matrices (`mat2x3`).

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, terminated},
    IResult,
};

use crate::{
    error::{ShaderError, ShaderResult},
    location::SourceLocation,
    types::{BaseType, Precision, ScalarKind, Type},
};

/// Largest accepted array length.
pub const MAX_ARRAY_LENGTH: u32 = 1024;

/// Declarator split into its syntactic parts, before validation.
struct RawDeclarator<'a> {
    constant: bool,
    precision: Option<Precision>,
    name: &'a str,
    array: Option<&'a str>,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn precision(input: &str) -> IResult<&str, Precision> {
    alt((
        map(tag("lowp"), |_| Precision::Low),
        map(tag("mediump"), |_| Precision::Medium),
        map(tag("highp"), |_| Precision::High),
    ))(input)
}

fn raw_declarator(input: &str) -> IResult<&str, RawDeclarator<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, constant) = opt(terminated(tag("const"), multispace1))(input)?;
    let (input, precision) = opt(terminated(precision, multispace1))(input)?;
    let (input, name) = identifier(input)?;
    let (input, array) = opt(delimited(
        pair(multispace0, char('[')),
        delimited(multispace0, digit1, multispace0),
        char(']'),
    ))(input)?;
    let (input, _) = multispace0(input)?;

    Ok((
        input,
        RawDeclarator {
            constant: constant.is_some(),
            precision,
            name,
            array,
        },
    ))
}

/// Resolve declarator text to a type.
///
/// # Errors
///
/// Returns `UnknownType` when the text is malformed or the base name is not
/// a known type, and `InvalidArity` when a vector/matrix arity is missing or
/// outside 2..=4, or an array length is outside 1..=[`MAX_ARRAY_LENGTH`].
pub fn resolve(declarator: &str, location: Option<SourceLocation>) -> ShaderResult<Type> {
    let raw = match all_consuming(raw_declarator)(declarator) {
        Ok((_, raw)) => raw,
        Err(_) => return Err(ShaderError::unknown_type(declarator.trim(), location)),
    };

    let base = base_type(raw.name, declarator, location)?;
    let array = raw
        .array
        .map(|text| array_length(text, declarator, location))
        .transpose()?;

    Ok(Type {
        base,
        array,
        precision: raw.precision,
        constant: raw.constant,
    })
}

fn base_type(
    name: &str,
    declarator: &str,
    location: Option<SourceLocation>,
) -> ShaderResult<BaseType> {
    match name {
        "void" => return Ok(BaseType::Void),
        "bool" => return Ok(BaseType::Scalar(ScalarKind::Bool)),
        "int" => return Ok(BaseType::Scalar(ScalarKind::Int)),
        "float" => return Ok(BaseType::Scalar(ScalarKind::Float)),
        "sampler2D" => return Ok(BaseType::Sampler2D),
        _ => {}
    }

    let split = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    let (prefix, arity) = name.split_at(split);

    let kind = match prefix {
        "vec" => Some(ScalarKind::Float),
        "ivec" => Some(ScalarKind::Int),
        "bvec" => Some(ScalarKind::Bool),
        "mat" => None,
        _ => return Err(ShaderError::unknown_type(name, location)),
    };

    match kind {
        Some(kind) => Ok(BaseType::Vector(
            kind,
            component_count(arity, declarator, location)?,
        )),
        None => {
            let (columns, rows) = match arity.split_once('x') {
                Some((columns, rows)) => (
                    component_count(columns, declarator, location)?,
                    component_count(rows, declarator, location)?,
                ),
                None => {
                    let size = component_count(arity, declarator, location)?;
                    (size, size)
                }
            };
            Ok(BaseType::Matrix { columns, rows })
        }
    }
}

fn component_count(
    text: &str,
    declarator: &str,
    location: Option<SourceLocation>,
) -> ShaderResult<u8> {
    if text.is_empty() {
        return Err(ShaderError::invalid_arity(
            declarator.trim(),
            "missing arity",
            location,
        ));
    }
    match text.parse::<u8>() {
        Ok(size @ 2..=4) => Ok(size),
        _ => Err(ShaderError::invalid_arity(
            declarator.trim(),
            "arity must be between 2 and 4",
            location,
        )),
    }
}

fn array_length(
    text: &str,
    declarator: &str,
    location: Option<SourceLocation>,
) -> ShaderResult<u32> {
    match text.parse::<u32>() {
        Ok(length) if (1..=MAX_ARRAY_LENGTH).contains(&length) => Ok(length),
        _ => Err(ShaderError::invalid_arity(
            declarator.trim(),
            "array length out of range",
            location,
        )),
    }
}
