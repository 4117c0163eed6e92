//! Parameter binding: resolves parameter declarations into typed,
//! scope-registered parameters.

use alloc::vec::Vec;

use log::trace;

use crate::{
    ast::{Expr, Parameter, ShaderParameter},
    declarator,
    error::{ShaderError, ShaderResult},
    symbols::SymbolTable,
    syntax::{ParameterSource, ShaderParameterSource, Token},
};

/// Resolve an ordinary parameter and declare it in the current scope.
pub fn parameter<P: ParameterSource + ?Sized>(
    decl: &P,
    symbols: &mut SymbolTable,
) -> ShaderResult<Parameter> {
    let declarator = decl.declarator();
    let ty = declarator::resolve(&declarator.text, declarator.location)?;
    let identifier = decl.identifier();
    let variable = symbols.declare(&identifier.text, ty, identifier.location)?;
    Ok(Parameter { ty, variable })
}

/// Resolve a shader parameter and declare it in the current scope.
///
/// A missing id literal, or the literal `-1`, leaves the binding to be
/// assigned during code generation. A missing property clause gates the
/// parameter with an always-true expression.
pub fn shader_parameter<P: ShaderParameterSource + ?Sized>(
    decl: &P,
    symbols: &mut SymbolTable,
) -> ShaderResult<ShaderParameter> {
    let declarator = decl.declarator();
    let ty = declarator::resolve(&declarator.text, declarator.location)?;
    let id = match decl.id_literal() {
        Some(token) => binding_id(token)?,
        None => None,
    };
    let identifier = decl.identifier();
    let variable = symbols.declare(&identifier.text, ty, identifier.location)?;
    let available = match decl.property() {
        Some(property) => Expr::property(property.text.as_str(), property.location),
        None => Expr::boolean(true),
    };

    trace!(
        "shader parameter {} {} id={:?} gate={:?}",
        ty,
        identifier.text,
        id,
        decl.property().map(|property| property.text.as_str())
    );

    Ok(ShaderParameter {
        ty,
        variable,
        id,
        available,
        location: identifier.location,
    })
}

/// Resolve a parameter list in declaration order.
///
/// The first failing declaration aborts the whole list.
pub fn parameters<'a, P, I>(decls: I, symbols: &mut SymbolTable) -> ShaderResult<Vec<Parameter>>
where
    P: ParameterSource + 'a,
    I: IntoIterator<Item = &'a P>,
{
    decls.into_iter().try_fold(Vec::new(), |mut resolved, decl| {
        resolved.push(parameter(decl, symbols)?);
        Ok(resolved)
    })
}

/// Resolve a shader parameter list in declaration order.
///
/// Order matters: it decides automatic binding assignment.
pub fn shader_parameters<'a, P, I>(
    decls: I,
    symbols: &mut SymbolTable,
) -> ShaderResult<Vec<ShaderParameter>>
where
    P: ShaderParameterSource + 'a,
    I: IntoIterator<Item = &'a P>,
{
    decls.into_iter().try_fold(Vec::new(), |mut resolved, decl| {
        resolved.push(shader_parameter(decl, symbols)?);
        Ok(resolved)
    })
}

/// Identifiers are non-negative 32-bit ints; `-1` is the auto sentinel.
fn binding_id(token: &Token) -> ShaderResult<Option<u32>> {
    match token.text.trim().parse::<i32>() {
        Ok(ShaderParameter::AUTO_ID) => Ok(None),
        Ok(id) => u32::try_from(id)
            .map(Some)
            .map_err(|_| ShaderError::invalid_literal(token.text.as_str(), token.location)),
        Err(_) => Err(ShaderError::invalid_literal(
            token.text.as_str(),
            token.location,
        )),
    }
}
