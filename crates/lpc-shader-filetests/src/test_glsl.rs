//! The `glsl` subtest - generate one variant and filecheck its output

use lpc_shader::{compile, CompileOptions, GlslProgram};

use crate::{
    filecheck::match_filecheck,
    fixture::parse_shader,
    parser::{parse_test_file, TestCommand},
};

/// Text the directives are matched against: both stages, then the bindings.
pub fn render_program(program: &GlslProgram) -> String {
    format!(
        "--- vertex ---\n{}--- fragment ---\n{}--- bindings ---\n{}",
        program.vertex, program.fragment, program.bindings
    )
}

/// Run a glsl test file
pub fn run_test_file(content: &str) {
    let file = parse_test_file(content).unwrap_or_else(|e| panic!("Bad test file: {}", e));
    let TestCommand::Glsl {
        dialect,
        properties,
    } = &file.command
    else {
        panic!("Unexpected test command: {:?}", file.command);
    };

    let syntax = parse_shader(&file.source)
        .unwrap_or_else(|e| panic!("Failed to parse shader description: {}", e));
    let options = CompileOptions {
        dialect: *dialect,
        properties: properties.clone(),
    };
    let program =
        compile(&syntax, &options).unwrap_or_else(|e| panic!("Failed to compile shader: {}", e));

    let actual = render_program(&program);
    if let Err(e) = match_filecheck(&actual, &file.expected_text) {
        panic!("Glsl test failed!\n\n{}\n\nActual output:\n{}", e, actual);
    }
}
