//! Binding identifier assignment through the public pipeline.


use lpc_shader::{
    syntax::{SyntaxShader, SyntaxShaderParameter},
    BindingKind, Dialect, ErrorKind,
};
use shader_test::*;

fn attributes_shader(attributes: Vec<SyntaxShaderParameter>) -> SyntaxShader {
    SyntaxShader {
        vertex: stage(attributes, vec![]),
        fragment: stage(vec![], vec![]),
        ..SyntaxShader::default()
    }
}

#[test]
fn test_auto_id_skips_explicit_claim() {
    let syntax = attributes_shader(vec![param("vec4", "a"), param_id("vec4", "b", "0")]);
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    let table = &program.bindings;
    assert_eq!(table.get(BindingKind::Attribute, "a").map(|b| b.id), Some(1));
    assert_eq!(table.get(BindingKind::Attribute, "b").map(|b| b.id), Some(0));
    assert!(program
        .vertex
        .contains("layout(location = 1) in vec4 a;\nlayout(location = 0) in vec4 b;\n"));
}

#[test]
fn test_minus_one_means_auto() {
    let syntax = attributes_shader(vec![param_id("vec4", "a", "-1"), param("vec4", "b")]);
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    let ids: Vec<_> = program
        .bindings
        .of_kind(BindingKind::Attribute)
        .map(|binding| binding.id)
        .collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn test_duplicate_explicit_id_fails_before_output() {
    let syntax = attributes_shader(vec![param_id("vec4", "a", "2"), param_id("vec4", "b", "2")]);
    let err = compile_with(&syntax, Dialect::Gl330, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::BindingConflict {
            id: 2,
            first: "a".to_string(),
            second: "b".to_string(),
        }
    );
}

#[test]
fn test_conflict_between_inactive_parameters_still_fails() {
    let syntax = attributes_shader(vec![
        param_id("vec4", "a", "2").with_property(tok("x")),
        param_id("vec4", "b", "2").with_property(tok("y")),
    ]);
    assert!(compile_with(&syntax, Dialect::Gl330, &[]).is_err());
}

#[test]
fn test_ids_are_stable_across_variants() {
    let syntax = attributes_shader(vec![
        param_if("vec3", "normal", "lit"),
        param("vec4", "position"),
    ]);
    let lit = compile_ok(&syntax, Dialect::Gl330, &["lit"]);
    let unlit = compile_ok(&syntax, Dialect::Gl330, &[]);

    assert_eq!(lit.bindings.get(BindingKind::Attribute, "position").map(|b| b.id), Some(1));
    assert_eq!(unlit.bindings.get(BindingKind::Attribute, "position").map(|b| b.id), Some(1));
    assert!(unlit.vertex.contains("layout(location = 1) in vec4 position;"));
    assert!(!unlit.vertex.contains("normal"));

    let normal = unlit.bindings.get(BindingKind::Attribute, "normal").unwrap();
    assert!(!normal.active);
    assert_eq!(unlit.bindings.active().count(), 1);
}

#[test]
fn test_reserved_uniform_slots() {
    let syntax = SyntaxShader {
        uniforms: vec![
            param("vec4", "tint"),
            param("mat3", "uniform_NormalMatrix"),
            param("mat4", "uniform_ModelViewMatrix"),
            param("float", "time"),
        ],
        vertex: stage(vec![], vec![]),
        fragment: stage(vec![], vec![]),
        ..SyntaxShader::default()
    };
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    let ids: Vec<_> = program
        .bindings
        .of_kind(BindingKind::Uniform)
        .map(|binding| (binding.name.as_str(), binding.id))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("tint", 1),
            ("uniform_NormalMatrix", 2),
            ("uniform_ModelViewMatrix", 0),
            ("time", 3),
        ]
    );
}

#[test]
fn test_lists_are_numbered_independently() {
    let program = compile_ok(&quad_shader(), Dialect::Gl330, &[]);
    let table = &program.bindings;
    assert_eq!(table.get(BindingKind::Attribute, "position").map(|b| b.id), Some(0));
    assert_eq!(table.get(BindingKind::Varying, "uv").map(|b| b.id), Some(0));
    assert_eq!(table.get(BindingKind::Output, "color").map(|b| b.id), Some(0));
    assert_eq!(
        table.to_string(),
        "\
uniform 1 uniform_ModelViewProjectionMatrix
uniform 0 tint (inactive)
attribute 0 position
attribute 1 texcoord
varying 0 uv
output 0 color
"
    );
}

#[test]
fn test_webgl1_leaves_binding_to_the_table() {
    let syntax = attributes_shader(vec![param("vec4", "position"), param_id("vec2", "uv", "3")]);
    let program = compile_ok(&syntax, Dialect::WebGl1, &[]);
    assert!(!program.vertex.contains("layout"));
    assert_eq!(
        program.bindings.get(BindingKind::Attribute, "uv").map(|b| b.id),
        Some(3)
    );
}

#[test]
fn test_matrix_attribute_locations_do_not_overlap() {
    let syntax = attributes_shader(vec![param("mat4", "instance"), param("vec4", "position")]);
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(program
        .vertex
        .contains("layout(location = 0) in mat4 instance;\nlayout(location = 4) in vec4 position;\n"));
}

#[test]
fn test_array_uniform_claims_a_range() {
    let syntax = fragment_shader(
        vec![param_id("float[4]", "weights", "3"), param_id("float", "bias", "5")],
        vec![],
    );
    let err = compile_with(&syntax, Dialect::Gl330, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::BindingConflict {
            id: 5,
            first: "weights".to_string(),
            second: "bias".to_string(),
        }
    );
}
