//! End-to-end generation tests: exact output per dialect.


use lpc_shader::{
    ast::{BinaryOp, UnaryOp},
    Dialect,
};
use shader_test::*;

#[test]
fn test_gl330_quad() {
    let program = compile_ok(&quad_shader(), Dialect::Gl330, &[]);
    assert_eq!(
        program.vertex,
        "\
#version 330 core
#extension GL_ARB_explicit_uniform_location : require

layout(location = 1) uniform mat4 uniform_ModelViewProjectionMatrix;

layout(location = 0) in vec4 position;
layout(location = 1) in vec2 texcoord;

out vec2 uv;

void main(void) {
    gl_Position = uniform_ModelViewProjectionMatrix * position;
    uv = texcoord;
}
"
    );
    assert_eq!(
        program.fragment,
        "\
#version 330 core
#extension GL_ARB_explicit_uniform_location : require

layout(location = 1) uniform mat4 uniform_ModelViewProjectionMatrix;

in vec2 uv;

layout(location = 0) out vec4 color;

void main(void) {
    color = vec4(uv, 0.0, 1.0);
}
"
    );
}

#[test]
fn test_gl330_quad_tinted() {
    let program = compile_ok(&quad_shader(), Dialect::Gl330, &["tinted"]);
    assert!(program.fragment.contains(
        "layout(location = 1) uniform mat4 uniform_ModelViewProjectionMatrix;\n\
         layout(location = 0) uniform vec4 tint;\n"
    ));
    assert!(program
        .fragment
        .contains("    color = vec4(uv, 0.0, 1.0);\n    color = color * tint;\n}\n"));
}

#[test]
fn test_webgl1_quad() {
    let program = compile_ok(&quad_shader(), Dialect::WebGl1, &["tinted"]);
    assert_eq!(
        program.vertex,
        "\
#version 100

uniform mat4 uniform_ModelViewProjectionMatrix;
uniform vec4 tint;

attribute vec4 position;
attribute vec2 texcoord;

varying vec2 uv;

void main(void) {
    gl_Position = uniform_ModelViewProjectionMatrix * position;
    uv = texcoord;
}
"
    );
    assert_eq!(
        program.fragment,
        "\
#version 100

precision mediump float;

uniform mat4 uniform_ModelViewProjectionMatrix;
uniform vec4 tint;

varying vec2 uv;

void main(void) {
    gl_FragColor = vec4(uv, 0.0, 1.0);
    gl_FragColor = gl_FragColor * tint;
}
"
    );
}

#[test]
fn test_es_dialects_declare_precision() {
    let gles = compile_ok(&quad_shader(), Dialect::Gles300, &[]);
    assert!(gles
        .fragment
        .starts_with("#version 300 es\n\nprecision mediump float;\n\nuniform mat4"));
    assert!(gles.vertex.contains("layout(location = 0) in vec4 position;"));
    assert!(!gles.vertex.contains("precision"));

    let webgl2 = compile_ok(&quad_shader(), Dialect::WebGl2, &[]);
    assert!(webgl2.fragment.contains("precision highp float;"));
    assert!(webgl2.fragment.contains("layout(location = 0) out vec4 color;"));
}

#[test]
fn test_precision_qualifiers_follow_dialect() {
    let syntax = fragment_shader(
        vec![param("lowp vec4", "shade")],
        vec![assign("color", ident("shade"))],
    );
    let gl = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(gl.fragment.contains("uniform vec4 shade;"));
    let es = compile_ok(&syntax, Dialect::Gles300, &[]);
    assert!(es.fragment.contains("\nuniform lowp vec4 shade;\n"));
}

#[test]
fn test_texture_lookup_is_renamed() {
    let syntax = fragment_shader(
        vec![param("sampler2D", "image")],
        vec![assign(
            "color",
            call("texture", vec![ident("image"), call("vec2", vec![float("0.5"), float("0.5")])]),
        )],
    );
    let gl = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(gl.fragment.contains("color = texture(image, vec2(0.5, 0.5));"));
    let webgl1 = compile_ok(&syntax, Dialect::WebGl1, &[]);
    assert!(webgl1
        .fragment
        .contains("gl_FragColor = texture2D(image, vec2(0.5, 0.5));"));
}

#[test]
fn test_functions_and_declarations_in_both_stages() {
    let mut syntax = quad_shader();
    syntax.declarations = vec![declare("const float", "GAMMA", Some(float("2.2")))];
    syntax.functions = vec![function(
        "vec4",
        "correct",
        &[("vec4", "c")],
        vec![ret(call(
            "pow",
            vec![ident("c"), call("vec4", vec![binary(BinaryOp::Div, float("1.0"), ident("GAMMA"))])],
        ))],
    )];
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    let expected = "\
const float GAMMA = 2.2;

vec4 correct(vec4 c) {
    return pow(c, vec4(1.0 / GAMMA));
}

void main(void) {";
    assert!(program.vertex.contains(expected), "{}", program.vertex);
    assert!(program.fragment.contains(expected), "{}", program.fragment);
}

#[test]
fn test_nested_operands_are_parenthesized() {
    let syntax = fragment_shader(
        vec![param("float", "a"), param("float", "b")],
        vec![assign(
            "color",
            call(
                "vec4",
                vec![binary(
                    BinaryOp::Mul,
                    binary(BinaryOp::Add, ident("a"), ident("b")),
                    member(call("vec2", vec![ident("a")]), "x"),
                )],
            ),
        )],
    );
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(program
        .fragment
        .contains("color = vec4((a + b) * vec2(a).x);"));
}

#[test]
fn test_loops_and_unfolded_if() {
    let syntax = fragment_shader(
        vec![param("float", "limit")],
        vec![
            declare("float", "sum", Some(float("0.0"))),
            for_stmt(
                "i",
                int("0"),
                int("4"),
                vec![if_stmt(
                    binary(BinaryOp::Less, ident("sum"), ident("limit")),
                    vec![assign("sum", binary(BinaryOp::Add, ident("sum"), float("0.25")))],
                    Some(vec![assign("sum", ident("limit"))]),
                )],
            ),
            assign("color", call("vec4", vec![ident("sum")])),
        ],
    );
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    let expected = "\
void main(void) {
    float sum = 0.0;
    for (int i = 0; i < 4; ++i) {
        if (sum < limit) {
            sum = sum + 0.25;
        } else {
            sum = limit;
        }
    }
    color = vec4(sum);
}
";
    assert!(program.fragment.ends_with(expected), "{}", program.fragment);
}

#[test]
fn test_integer_varyings_are_flat() {
    let mut syntax = quad_shader();
    if let Some(fragment) = syntax.fragment.as_mut() {
        fragment.inputs.push(param("int", "material"));
    }
    let program = compile_ok(&syntax, Dialect::Gles300, &[]);
    assert!(program.vertex.contains("flat out int material;"));
    assert!(program.fragment.contains("flat in int material;"));
}

#[test]
fn test_generation_is_deterministic() {
    for dialect in Dialect::ALL {
        let first = compile_ok(&quad_shader(), dialect, &["tinted"]);
        let second = compile_ok(&quad_shader(), dialect, &["tinted"]);
        assert_eq!(first, second);
    }
}

#[test]
fn test_forward_call_gets_prototype() {
    let mut syntax = quad_shader();
    syntax.functions = vec![
        function("float", "f", &[("float", "x")], vec![ret(call("g", vec![ident("x")]))]),
        function("float", "g", &[("float", "y")], vec![ret(ident("y"))]),
        function("float", "h", &[("float", "z")], vec![ret(call("g", vec![ident("z")]))]),
    ];
    let program = compile_ok(&syntax, Dialect::Gles300, &[]);
    let expected = "\
float g(float y);

float f(float x) {
    return g(x);
}

float g(float y) {
    return y;
}

float h(float z) {
    return g(z);
}
";
    assert!(program.vertex.contains(expected), "{}", program.vertex);
    assert!(program.fragment.contains(expected), "{}", program.fragment);
    assert_eq!(program.fragment.matches("float g(float y);").count(), 1);
}

#[test]
fn test_backward_calls_need_no_prototype() {
    let mut syntax = quad_shader();
    syntax.functions = vec![
        function("float", "g", &[("float", "y")], vec![ret(ident("y"))]),
        function("float", "f", &[("float", "x")], vec![ret(call("g", vec![ident("x")]))]),
    ];
    let program = compile_ok(&syntax, Dialect::Gl330, &[]);
    assert!(!program.fragment.contains("float g(float y);"), "{}", program.fragment);
    assert!(program.fragment.contains("float g(float y) {"));
}

#[test]
fn test_constant_loop_bounds() {
    let syntax = fragment_shader(
        vec![],
        vec![
            declare("const int", "COUNT", Some(int("0x4"))),
            declare("float", "sum", Some(float("0.0"))),
            for_stmt(
                "i",
                unary(UnaryOp::Negate, int("1")),
                binary(BinaryOp::Mul, ident("COUNT"), int("2")),
                vec![assign("sum", binary(BinaryOp::Add, ident("sum"), float("1.0")))],
            ),
        ],
    );
    let program = compile_ok(&syntax, Dialect::WebGl1, &[]);
    assert!(program
        .fragment
        .contains("for (int i = -1; i < COUNT * 2; ++i) {"), "{}", program.fragment);
    assert!(program.fragment.contains("const int COUNT = 4;"));
}
