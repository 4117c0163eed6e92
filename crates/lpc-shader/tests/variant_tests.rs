//! Property-gated variant selection.


use lpc_shader::{
    ast::{AssignOp, BinaryOp, UnaryOp},
    syntax::{SyntaxExpr, SyntaxStmt, Token},
    Dialect, ErrorKind,
};
use shader_test::*;

fn gated_uniforms() -> lpc_shader::syntax::SyntaxShader {
    let mut syntax = fragment_shader(
        vec![param_if("vec4", "shadow", "shadow"), param_if("vec4", "fog", "fog")],
        vec![],
    );
    syntax.properties = vec![tok("shadow"), tok("fog")];
    syntax
}

#[test]
fn test_only_enabled_gates_are_emitted() {
    let program = compile_ok(&gated_uniforms(), Dialect::Gl330, &["shadow"]);
    assert!(program.fragment.contains("uniform vec4 shadow;"));
    assert!(!program.fragment.contains("fog"));
}

#[test]
fn test_every_variant_compiles() {
    let variants: [&[&str]; 4] = [&[], &["shadow"], &["fog"], &["fog", "shadow"]];
    for properties in variants {
        let program = compile_ok(&gated_uniforms(), Dialect::Gles300, properties);
        for name in ["shadow", "fog"] {
            assert_eq!(
                program.fragment.contains(&format!("uniform vec4 {};", name)),
                properties.contains(&name),
                "variant {:?}",
                properties
            );
        }
    }
}

#[test]
fn test_unknown_property_is_disabled() {
    let syntax = fragment_shader(vec![param_if("vec4", "ghost", "undeclared")], vec![]);
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(!program.fragment.contains("ghost"));

    // Enabling it by name still works
    let program = compile_ok(&syntax, Dialect::Gl330, &["undeclared"]);
    assert!(program.fragment.contains("ghost"));
}

#[test]
fn test_constant_if_keeps_selected_branch() {
    let syntax = fragment_shader(
        vec![],
        vec![if_stmt(
            prop("bright"),
            vec![assign("color", call("vec4", vec![float("1.0")]))],
            Some(vec![assign("color", call("vec4", vec![float("0.0")]))]),
        )],
    );
    let on = compile_ok(&syntax, Dialect::Gl330, &["bright"]);
    assert!(on.fragment.ends_with("void main(void) {\n    color = vec4(1.0);\n}\n"));
    let off = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(off.fragment.ends_with("void main(void) {\n    color = vec4(0.0);\n}\n"));
}

#[test]
fn test_composite_conditions_fold() {
    let condition = binary(
        BinaryOp::And,
        prop("a"),
        unary(UnaryOp::Not, prop("b")),
    );
    let syntax = fragment_shader(
        vec![],
        vec![if_stmt(condition, vec![assign("color", call("vec4", vec![float("1.0")]))], None)],
    );
    let selected = compile_ok(&syntax, Dialect::Gl330, &["a"]);
    assert!(selected.fragment.contains("color = vec4(1.0);"));
    let dropped = compile_ok(&syntax, Dialect::Gl330, &["a", "b"]);
    assert!(!dropped.fragment.contains("color ="));
}

#[test]
fn test_property_in_expression_prints_constant() {
    let syntax = fragment_shader(
        vec![],
        vec![declare("bool", "lit", Some(prop("lighting")))],
    );
    let program = compile_ok(&syntax, Dialect::Gl330, &["lighting"]);
    assert!(program.fragment.contains("bool lit = true;"));
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(program.fragment.contains("bool lit = false;"));
}

#[test]
fn test_block_declaring_names_keeps_braces() {
    let syntax = fragment_shader(
        vec![],
        vec![if_stmt(
            prop("on"),
            vec![declare("float", "x", Some(float("1.0")))],
            None,
        )],
    );
    let program = compile_ok(&syntax, Dialect::Gl330, &["on"]);
    assert!(program
        .fragment
        .contains("    {\n        float x = 1.0;\n    }\n"));
}

#[test]
fn test_gated_uniform_used_without_gate_fails() {
    let mut syntax = fragment_shader(
        vec![param_if("vec4", "fogColor", "fog")],
        vec![SyntaxStmt::expression(SyntaxExpr::assign(
            AssignOp::Assign,
            ident("color"),
            SyntaxExpr::identifier(Token::new("fogColor", 7, 12)),
        ))],
    );
    syntax.properties = vec![tok("fog")];

    let err = compile_with(&syntax, Dialect::Gl330, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UndefinedVariable {
            name: "fogColor".to_string()
        }
    );
    assert_eq!(err.to_string(), "7:12: undefined variable: fogColor");

    let program = compile_ok(&syntax, Dialect::Gl330, &["fog"]);
    assert!(program.fragment.contains("color = fogColor;"));
}

#[test]
fn test_gated_uniform_inside_matching_branch() {
    let mut syntax = fragment_shader(
        vec![param_if("vec4", "fogColor", "fog")],
        vec![if_stmt(
            prop("fog"),
            vec![assign("color", ident("fogColor"))],
            Some(vec![assign("color", call("vec4", vec![float("1.0")]))]),
        )],
    );
    syntax.properties = vec![tok("fog")];
    for properties in [&[][..], &["fog"][..]] {
        for dialect in Dialect::ALL {
            compile_ok(&syntax, dialect, properties);
        }
    }
}

#[test]
fn test_inactive_varying_in_unfolded_condition_fails() {
    let mut syntax = quad_shader();
    if let Some(fragment) = syntax.fragment.as_mut() {
        fragment.inputs.push(param_if("float", "depth", "fog"));
        fragment.body.push(if_stmt(
            binary(BinaryOp::Less, ident("depth"), float("0.5")),
            vec![assign("color", call("vec4", vec![float("0.0")]))],
            None,
        ));
    }
    assert!(compile_with(&syntax, Dialect::Gles300, &["fog"]).is_ok());
    let err = compile_with(&syntax, Dialect::Gles300, &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedVariable { ref name } if name == "depth"));
}
