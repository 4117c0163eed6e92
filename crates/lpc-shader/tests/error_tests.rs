//! Failure modes of the pipeline.


use lpc_shader::{
    ast::{BinaryOp, Stage},
    build_shader,
    syntax::{SyntaxExpr, SyntaxShader, SyntaxStmt, Token},
    Dialect, ErrorKind, SourceLocation,
};
use shader_test::*;

#[test]
fn test_missing_stages() {
    let vertex_only = SyntaxShader {
        vertex: stage(vec![], vec![]),
        ..SyntaxShader::default()
    };
    let err = compile_with(&vertex_only, Dialect::Gl330, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::MissingStage {
            stage: Stage::Fragment
        }
    );
    assert_eq!(err.location, None);

    let err = compile_with(&SyntaxShader::default(), Dialect::Gl330, &[]).unwrap_err();
    assert_eq!(err.to_string(), "shader has no vertex stage");
}

#[test]
fn test_error_locations_point_at_tokens() {
    let syntax = fragment_shader(
        vec![],
        vec![SyntaxStmt::expression(SyntaxExpr::identifier(Token::new(
            "nowhere", 12, 8,
        )))],
    );
    let err = compile_with(&syntax, Dialect::Gl330, &[]).unwrap_err();
    assert_eq!(err.location, Some(SourceLocation::new(12, 8)));
    assert_eq!(err.to_string(), "12:8: undefined variable: nowhere");
}

#[test]
fn test_unknown_type_and_arity() {
    let syntax = fragment_shader(vec![param_at("vec9", "v", 3, 4)], vec![]);
    let err = build_shader(&syntax).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidArity { .. }));
    assert_eq!(err.location, Some(SourceLocation::new(3, 4)));

    let syntax = fragment_shader(vec![param("colour", "v")], vec![]);
    let err = build_shader(&syntax).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnknownType {
            name: "colour".to_string()
        }
    );
}

#[test]
fn test_invalid_binding_literal() {
    let syntax = fragment_shader(vec![param_id("vec4", "v", "-7")], vec![]);
    let err = build_shader(&syntax).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::InvalidLiteral {
            text: "-7".to_string()
        }
    );
}

#[test]
fn test_redeclared_parameter_across_lists() {
    let mut syntax = quad_shader();
    syntax.uniforms.push(param("vec2", "uv"));
    let err = build_shader(&syntax).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Redeclaration { ref name } if name == "uv"));
}

#[test]
fn test_webgl1_rejects_non_square_matrix() {
    let syntax = fragment_shader(vec![param("mat2x3", "m")], vec![]);
    let err = compile_with(&syntax, Dialect::WebGl1, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnsupportedConstruct {
            construct: "non-square matrix mat2x3".to_string(),
            dialect: Dialect::WebGl1,
        }
    );
    assert!(compile_with(&syntax, Dialect::WebGl2, &[]).is_ok());
}

#[test]
fn test_inactive_parameter_is_not_checked() {
    let syntax = fragment_shader(vec![param_if("mat2x3", "m", "skinned")], vec![]);
    assert!(compile_with(&syntax, Dialect::WebGl1, &[]).is_ok());
    assert!(compile_with(&syntax, Dialect::WebGl1, &["skinned"]).is_err());
}

#[test]
fn test_webgl1_rejects_integer_features() {
    let attribute = SyntaxShader {
        vertex: stage(vec![param("ivec2", "cell")], vec![]),
        fragment: stage(vec![], vec![]),
        ..SyntaxShader::default()
    };
    let err = compile_with(&attribute, Dialect::WebGl1, &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedConstruct { .. }));
    assert!(compile_with(&attribute, Dialect::Gl330, &[]).is_ok());

    let shift = fragment_shader(
        vec![param("int", "bits")],
        vec![declare(
            "int",
            "half",
            Some(binary(BinaryOp::ShiftRight, ident("bits"), int("1"))),
        )],
    );
    let err = compile_with(&shift, Dialect::WebGl1, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "1:0: operator >> is not supported by webgl1"
    );
}

#[test]
fn test_webgl1_single_fragment_output() {
    let mut syntax = quad_shader();
    syntax.outputs.push(param_if("vec4", "normal", "deferred"));
    assert!(compile_with(&syntax, Dialect::WebGl1, &[]).is_ok());
    let err = compile_with(&syntax, Dialect::WebGl1, &["deferred"]).unwrap_err();
    assert!(err.to_string().contains("multiple fragment outputs"));
    assert!(compile_with(&syntax, Dialect::Gles300, &["deferred"]).is_ok());
}

#[test]
fn test_boolean_attribute_is_unsupported_everywhere() {
    let syntax = SyntaxShader {
        vertex: stage(vec![param("bool", "flag")], vec![]),
        fragment: stage(vec![], vec![]),
        ..SyntaxShader::default()
    };
    for dialect in Dialect::ALL {
        assert!(compile_with(&syntax, dialect, &[]).is_err(), "{}", dialect);
    }
}

#[test]
fn test_dialect_names() {
    assert_eq!("webgl2".parse::<Dialect>(), Ok(Dialect::WebGl2));
    assert!("es2".parse::<Dialect>().is_err());
}

#[test]
fn test_fragment_cannot_read_vertex_attribute() {
    let syntax = SyntaxShader {
        vertex: stage(vec![param("vec4", "position")], vec![]),
        fragment: stage(
            vec![],
            vec![SyntaxStmt::expression(SyntaxExpr::assign(
                lpc_shader::ast::AssignOp::Assign,
                ident("color"),
                SyntaxExpr::identifier(Token::new("position", 9, 12)),
            ))],
        ),
        outputs: vec![param("vec4", "color")],
        ..SyntaxShader::default()
    };
    let err = build_shader(&syntax).unwrap_err();
    assert_eq!(err.to_string(), "9:12: undefined variable: position");
}

#[test]
fn test_vertex_cannot_write_fragment_output() {
    let mut syntax = quad_shader();
    if let Some(vertex) = syntax.vertex.as_mut() {
        vertex.body.push(assign("color", ident("position")));
    }
    let err = build_shader(&syntax).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedVariable { ref name } if name == "color"));
}

#[test]
fn test_webgl1_rejects_non_constant_loop_bound() {
    let syntax = fragment_shader(
        vec![param("int", "steps")],
        vec![for_stmt(
            "i",
            int("0"),
            SyntaxExpr::identifier(Token::new("steps", 6, 20)),
            vec![],
        )],
    );
    let err = compile_with(&syntax, Dialect::WebGl1, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnsupportedConstruct {
            construct: "non-constant loop bound".to_string(),
            dialect: Dialect::WebGl1,
        }
    );
    assert_eq!(err.location, Some(SourceLocation::new(6, 20)));

    let program = compile_ok(&syntax, Dialect::WebGl2, &[]);
    assert!(program.fragment.contains("for (int i = 0; i < steps; ++i) {"));
}

#[test]
fn test_int_literal_out_of_range() {
    let syntax = fragment_shader(vec![], vec![declare("int", "n", Some(int("9999999999")))]);
    let err = build_shader(&syntax).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::InvalidLiteral {
            text: "9999999999".to_string()
        }
    );
}
