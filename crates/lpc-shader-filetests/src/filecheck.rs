//! Filecheck directive matching using the filecheck crate

use filecheck::{Checker, CheckerBuilder, NO_VARIABLES};

/// Build a filechecker from expected text containing directives
pub fn build_filechecker(expected_text: &str) -> Result<Checker, String> {
    let mut builder = CheckerBuilder::new();

    for line in expected_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        builder
            .directive(trimmed)
            .map_err(|e| format!("Failed to parse filecheck directive '{}': {}", trimmed, e))?;
    }

    Ok(builder.finish())
}

/// Match actual output against filecheck directives
pub fn match_filecheck(actual: &str, expected_text: &str) -> Result<(), String> {
    let checker = build_filechecker(expected_text)?;
    if checker.is_empty() {
        return Err(String::from("No filecheck directives found"));
    }

    if checker
        .check(actual, NO_VARIABLES)
        .map_err(|e| format!("Filecheck error: {}", e))?
    {
        Ok(())
    } else {
        // Get explanation for why matching failed
        let (_, explain) = checker
            .explain(actual, NO_VARIABLES)
            .map_err(|e| format!("Failed to get filecheck explanation: {}", e))?;

        Err(format!("Filecheck failed:\n{}", explain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_in_order() {
        let expected = "check: alpha\nnextln: beta\nnot: gamma";
        assert!(match_filecheck("alpha\nbeta\n", expected).is_ok());
        assert!(match_filecheck("alpha\ndelta\nbeta\n", expected).is_err());
    }

    #[test]
    fn test_no_directives_is_an_error() {
        assert!(match_filecheck("anything", "\n\n").is_err());
    }
}
