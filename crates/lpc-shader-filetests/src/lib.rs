//! File-based tests for the shader compiler.
//!
//! Each `.shader` file under `filetests/` holds:
//! - A test command (`test glsl <dialect> [property...]` or
//!   `test error <dialect> [property...]`)
//! - A shader description
//! - Filecheck directives in `;` comments, matched against the generated
//!   program or the compile error

pub mod filecheck;
pub mod fixture;
pub mod parser;

mod test_error;
mod test_glsl;

pub use self::filecheck::{build_filechecker, match_filecheck};
pub use fixture::parse_shader;
pub use parser::{parse_test_file, TestCommand, TestFile};
pub use test_glsl::render_program;

/// Run a test file of any kind, dispatching on its command.
pub fn run_test_file(content: &str) {
    match parse_test_file(content).map(|file| file.command) {
        Ok(TestCommand::Glsl { .. }) => test_glsl::run_test_file(content),
        Ok(TestCommand::Error { .. }) => test_error::run_test_file(content),
        Err(e) => panic!("Bad test file: {}", e),
    }
}
