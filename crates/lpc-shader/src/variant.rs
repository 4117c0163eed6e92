//! Variant selection: which properties are enabled and which gates hold.

use alloc::{collections::BTreeSet, string::String};

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};

/// The properties enabled for one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    names: BTreeSet<String>,
}

impl PropertySet {
    /// Create an empty set: every property disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a property. Returns whether it was newly enabled.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Enabled names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PropertySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PropertySet {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for PropertySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// Fold a gate expression to a constant under `enabled`.
///
/// Boolean literals and property references are leaves; `!`, `&&`, `||`,
/// `^^`, `==` and `!=` combine them. `&&` and `||` short-circuit on a
/// constant left operand. Anything else (variables, calls, arithmetic)
/// yields `None`.
pub fn fold(expr: &Expr, enabled: &PropertySet) -> Option<bool> {
    match &expr.kind {
        ExprKind::Bool(value) => Some(*value),
        ExprKind::Property(name) => Some(enabled.contains(name)),
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => fold(operand, enabled).map(|value| !value),
        ExprKind::Binary { op, lhs, rhs } => match op {
            BinaryOp::And => match fold(lhs, enabled)? {
                false => Some(false),
                true => fold(rhs, enabled),
            },
            BinaryOp::Or => match fold(lhs, enabled)? {
                true => Some(true),
                false => fold(rhs, enabled),
            },
            BinaryOp::Equal => Some(fold(lhs, enabled)? == fold(rhs, enabled)?),
            BinaryOp::NotEqual | BinaryOp::Xor => {
                Some(fold(lhs, enabled)? != fold(rhs, enabled)?)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Whether a gate holds for the variant described by `enabled`.
///
/// A gate that does not fold to a constant is not active. Property names
/// that are not in `enabled`, declared or not, count as disabled.
pub fn is_active(expr: &Expr, enabled: &PropertySet) -> bool {
    fold(expr, enabled).unwrap_or(false)
}
