//! The `error` subtest - compilation must fail with the expected diagnostic

use lpc_shader::{compile, CompileOptions};

use crate::{
    filecheck::match_filecheck,
    fixture::parse_shader,
    parser::{parse_test_file, TestCommand},
};

/// Run an error test file
pub fn run_test_file(content: &str) {
    let file = parse_test_file(content).unwrap_or_else(|e| panic!("Bad test file: {}", e));
    let TestCommand::Error {
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
    let err = match compile(&syntax, &options) {
        Ok(program) => panic!(
            "Expected a compile error, got:\n{}",
            crate::test_glsl::render_program(&program)
        ),
        Err(err) => err.to_string(),
    };

    if let Err(e) = match_filecheck(&err, &file.expected_text) {
        panic!("Error test failed!\n\n{}\n\nActual error:\n{}", e, err);
    }
}
