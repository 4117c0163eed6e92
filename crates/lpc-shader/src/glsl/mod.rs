//! GLSL-family code generation.

mod binding;
mod dialect;
mod generator;

pub use binding::{
    assign_bindings, assign_ids, slot_count, Binding, BindingKind, BindingTable,
    RESERVED_UNIFORMS,
};
pub use dialect::{Dialect, DialectInfo, UnknownDialect};
pub use generator::{generate, GlslProgram};
