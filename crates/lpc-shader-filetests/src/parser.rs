//! Test file parsing

use lpc_shader::{Dialect, PropertySet};

/// What a test file asks for, from its `test` header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCommand {
    /// `test glsl <dialect> [property...]`: compile and check the output
    Glsl {
        dialect: Dialect,
        properties: PropertySet,
    },
    /// `test error <dialect> [property...]`: compilation must fail
    Error {
        dialect: Dialect,
        properties: PropertySet,
    },
}

impl TestCommand {
    pub fn dialect(&self) -> Dialect {
        match self {
            TestCommand::Glsl { dialect, .. } | TestCommand::Error { dialect, .. } => *dialect,
        }
    }

    pub fn properties(&self) -> &PropertySet {
        match self {
            TestCommand::Glsl { properties, .. } | TestCommand::Error { properties, .. } => {
                properties
            }
        }
    }
}

/// A parsed test file
#[derive(Debug, Clone)]
pub struct TestFile {
    pub command: TestCommand,
    /// The shader description, with the header and `;` lines blanked so
    /// that line numbers still match the file
    pub source: String,
    /// The filecheck directives, one per line, `;` stripped
    pub expected_text: String,
}

/// Parse a test file into its command, shader description and directives
pub fn parse_test_file(content: &str) -> Result<TestFile, String> {
    let mut command = None;
    let mut source = String::new();
    let mut expected = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if let Some(directive) = trimmed.strip_prefix(';') {
            expected.push(directive.strip_prefix(' ').unwrap_or(directive));
        } else if trimmed.starts_with("test ") {
            if command.is_some() {
                return Err(format!("line {}: second test command", index + 1));
            }
            command = Some(parse_command(trimmed)?);
        } else {
            source.push_str(line);
        }
        source.push('\n');
    }

    let command = command.ok_or_else(|| String::from("No test command found in test file"))?;
    Ok(TestFile {
        command,
        source,
        expected_text: expected.join("\n"),
    })
}

fn parse_command(line: &str) -> Result<TestCommand, String> {
    let mut words = line.split_whitespace().skip(1);
    let kind = words
        .next()
        .ok_or_else(|| format!("Missing test kind in '{}'", line))?;
    let dialect: Dialect = words
        .next()
        .ok_or_else(|| format!("Missing dialect in '{}'", line))?
        .parse()
        .map_err(|e| format!("{}", e))?;
    let properties: PropertySet = words.collect();

    match kind {
        "glsl" => Ok(TestCommand::Glsl {
            dialect,
            properties,
        }),
        "error" => Ok(TestCommand::Error {
            dialect,
            properties,
        }),
        other => Err(format!("Unknown test command: test {}", other)),
    }
}
