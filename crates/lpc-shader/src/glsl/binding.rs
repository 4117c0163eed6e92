//! Binding identifier assignment for shader parameter lists.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::{fmt, ops::RangeInclusive};

use log::{debug, trace};

use crate::{
    ast::{Shader, ShaderParameter},
    error::{ErrorKind, ShaderError, ShaderResult},
    symbols::{Variable, VariableTable},
    types::{BaseType, Type},
    variant::{is_active, PropertySet},
};

/// Uniforms with a fixed slot when declared with an automatic id.
pub const RESERVED_UNIFORMS: &[(&str, u32)] = &[
    ("uniform_ModelViewMatrix", 0),
    ("uniform_ModelViewProjectionMatrix", 1),
    ("uniform_NormalMatrix", 2),
];

/// Which parameter list a binding belongs to.
///
/// Identifiers are unique per kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingKind {
    Uniform,
    Attribute,
    Varying,
    Output,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::Uniform => "uniform",
            BindingKind::Attribute => "attribute",
            BindingKind::Varying => "varying",
            BindingKind::Output => "output",
        })
    }
}

/// One parameter with its assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub kind: BindingKind,
    pub name: String,
    pub variable: Variable,
    pub id: u32,
    /// Whether the parameter exists in the generated variant
    pub active: bool,
}

/// Identifiers of every declared parameter, active or not.
///
/// Assigning over the declared lists keeps an identifier stable across all
/// variants of one shader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Bindings present in the generated variant.
    pub fn active(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|binding| binding.active)
    }

    pub fn of_kind(&self, kind: BindingKind) -> impl Iterator<Item = &Binding> {
        self.bindings
            .iter()
            .filter(move |binding| binding.kind == kind)
    }

    pub fn get(&self, kind: BindingKind, name: &str) -> Option<&Binding> {
        self.of_kind(kind).find(|binding| binding.name == name)
    }

    /// Identifier assigned to the parameter declared as `variable`.
    pub fn id(&self, variable: Variable) -> Option<u32> {
        self.bindings
            .iter()
            .find(|binding| binding.variable == variable)
            .map(|binding| binding.id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for BindingTable {
    /// One `kind id name` line per binding; inactive ones are marked.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for binding in &self.bindings {
            write!(f, "{} {} {}", binding.kind, binding.id, binding.name)?;
            if !binding.active {
                write!(f, " (inactive)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Number of consecutive identifiers a parameter of type `ty` occupies.
///
/// Each array element takes one slot. Matrix attributes, varyings and
/// outputs also take one slot per column; a matrix uniform takes one.
pub fn slot_count(kind: BindingKind, ty: &Type) -> u32 {
    let columns = match ty.base {
        BaseType::Matrix { columns, .. } if kind != BindingKind::Uniform => u32::from(columns),
        _ => 1,
    };
    columns * ty.array.unwrap_or(1)
}

/// Assign identifiers to one parameter list.
///
/// The first pass honors explicit identifiers (and, for uniforms, the
/// reserved slots) and rejects overlapping claims. The second pass hands
/// each remaining parameter the lowest run of free identifiers wide enough
/// for its [`slot_count`], in declaration order, so automatic identifiers
/// are strictly increasing. The returned identifier is the first slot.
pub fn assign_ids(
    kind: BindingKind,
    parameters: &[ShaderParameter],
    variables: &VariableTable,
) -> ShaderResult<Vec<u32>> {
    let mut claimed: BTreeMap<u32, &str> = BTreeMap::new();
    let mut ids: Vec<Option<u32>> = Vec::with_capacity(parameters.len());

    for parameter in parameters {
        let name = variables.name(parameter.variable);
        let claim = match parameter.id {
            Some(id) => Some(id),
            None if kind == BindingKind::Uniform => reserved_id(name),
            None => None,
        };
        if let Some(id) = claim {
            for slot in slots(id, slot_count(kind, &parameter.ty)) {
                if let Some(first) = claimed.insert(slot, name) {
                    return Err(ShaderError::new(
                        ErrorKind::BindingConflict {
                            id: slot,
                            first: String::from(first),
                            second: String::from(name),
                        },
                        parameter.location,
                    ));
                }
            }
        }
        ids.push(claim);
    }

    let mut next = 0;
    let ids = parameters
        .iter()
        .zip(ids)
        .map(|(parameter, claim)| match claim {
            Some(id) => id,
            None => {
                let count = slot_count(kind, &parameter.ty);
                while slots(next, count).any(|slot| claimed.contains_key(&slot)) {
                    next += 1;
                }
                let id = next;
                next = id.saturating_add(count);
                id
            }
        })
        .collect();
    Ok(ids)
}

fn slots(first: u32, count: u32) -> RangeInclusive<u32> {
    first..=first.saturating_add(count.max(1) - 1)
}

fn reserved_id(name: &str) -> Option<u32> {
    RESERVED_UNIFORMS
        .iter()
        .find(|(reserved, _)| *reserved == name)
        .map(|(_, id)| *id)
}

/// Assign identifiers to every parameter list of `shader` and record which
/// parameters are active under `enabled`.
pub fn assign_bindings(shader: &Shader, enabled: &PropertySet) -> ShaderResult<BindingTable> {
    let lists = [
        (BindingKind::Uniform, shader.uniforms.as_slice()),
        (BindingKind::Attribute, shader.attributes()),
        (BindingKind::Varying, shader.varyings()),
        (BindingKind::Output, shader.outputs.as_slice()),
    ];

    let mut bindings = Vec::new();
    for (kind, parameters) in lists {
        let ids = assign_ids(kind, parameters, &shader.variables)?;
        for (parameter, id) in parameters.iter().zip(ids) {
            let binding = Binding {
                kind,
                name: String::from(shader.name(parameter.variable)),
                variable: parameter.variable,
                id,
                active: is_active(&parameter.available, enabled),
            };
            trace!(
                "{} {} -> {}{}",
                kind,
                binding.name,
                id,
                if binding.active { "" } else { " (inactive)" }
            );
            bindings.push(binding);
        }
        debug!("assigned {} {} bindings", parameters.len(), kind);
    }

    Ok(BindingTable { bindings })
}
