//! Target dialects and the capability table driving their differences.

use alloc::string::String;
use core::{fmt, str::FromStr};

use thiserror::Error;

use crate::types::Precision;

/// A GLSL-family output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialect {
    /// Desktop OpenGL 3.3 core
    Gl330,
    /// OpenGL ES 3.0
    Gles300,
    /// WebGL 1 (GLSL ES 1.00)
    WebGl1,
    /// WebGL 2 (GLSL ES 3.00)
    WebGl2,
}

/// What a dialect can express and how it spells things.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectInfo {
    /// Version pragma, first line of every stage
    pub version: &'static str,
    /// Extension pragmas following the version
    pub extensions: &'static [&'static str],
    /// Whether precision qualifiers are written
    pub precision_qualifiers: bool,
    /// Default float precision declared by fragment stages
    pub default_fragment_precision: Option<Precision>,
    /// `layout(location = N)` on attributes and fragment outputs
    pub attribute_locations: bool,
    /// `layout(location = N)` on uniforms
    pub uniform_locations: bool,
    /// `attribute`/`varying` storage and `gl_FragColor` output
    pub legacy_io: bool,
    /// Name of the 2D texture lookup function
    pub texture_function: &'static str,
    pub non_square_matrices: bool,
    pub integer_attributes: bool,
    /// `%`, bitwise operators and shifts
    pub integer_operators: bool,
    /// Loop bounds must be constant expressions
    pub constant_loop_bounds: bool,
}

const GL330: DialectInfo = DialectInfo {
    version: "#version 330 core",
    extensions: &["#extension GL_ARB_explicit_uniform_location : require"],
    precision_qualifiers: false,
    default_fragment_precision: None,
    attribute_locations: true,
    uniform_locations: true,
    legacy_io: false,
    texture_function: "texture",
    non_square_matrices: true,
    integer_attributes: true,
    integer_operators: true,
    constant_loop_bounds: false,
};

const GLES300: DialectInfo = DialectInfo {
    version: "#version 300 es",
    extensions: &[],
    precision_qualifiers: true,
    default_fragment_precision: Some(Precision::Medium),
    attribute_locations: true,
    uniform_locations: false,
    legacy_io: false,
    texture_function: "texture",
    non_square_matrices: true,
    integer_attributes: true,
    integer_operators: true,
    constant_loop_bounds: false,
};

const WEBGL2: DialectInfo = DialectInfo {
    default_fragment_precision: Some(Precision::High),
    ..GLES300
};

const WEBGL1: DialectInfo = DialectInfo {
    version: "#version 100",
    extensions: &[],
    precision_qualifiers: true,
    default_fragment_precision: Some(Precision::Medium),
    attribute_locations: false,
    uniform_locations: false,
    legacy_io: true,
    texture_function: "texture2D",
    non_square_matrices: false,
    integer_attributes: false,
    integer_operators: false,
    constant_loop_bounds: true,
};

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Gl330,
        Dialect::Gles300,
        Dialect::WebGl1,
        Dialect::WebGl2,
    ];

    /// Capability table for this dialect.
    pub fn info(self) -> &'static DialectInfo {
        match self {
            Dialect::Gl330 => &GL330,
            Dialect::Gles300 => &GLES300,
            Dialect::WebGl1 => &WEBGL1,
            Dialect::WebGl2 => &WEBGL2,
        }
    }

    /// Short name, as accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Gl330 => "gl330",
            Dialect::Gles300 => "gles300",
            Dialect::WebGl1 => "webgl1",
            Dialect::WebGl2 => "webgl2",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dialect name that matches none of the known dialects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dialect '{0}' (expected gl330, gles300, webgl1 or webgl2)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|dialect| dialect.name() == s)
            .ok_or_else(|| UnknownDialect(String::from(s)))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "vulkan".parse::<Dialect>().unwrap_err();
        assert_eq!(err, UnknownDialect(String::from("vulkan")));
        assert!(err.to_string().contains("'vulkan'"));
    }

    #[test]
    fn test_es_dialects_share_version() {
        assert_eq!(Dialect::Gles300.info().version, "#version 300 es");
        assert_eq!(Dialect::WebGl2.info().version, "#version 300 es");
        assert_eq!(
            Dialect::WebGl2.info().default_fragment_precision,
            Some(Precision::High)
        );
        assert!(!Dialect::Gl330.info().precision_qualifiers);
    }

    #[test]
    fn test_webgl1_capabilities() {
        let info = Dialect::WebGl1.info();
        assert!(info.legacy_io);
        assert_eq!(info.texture_function, "texture2D");
        assert!(!info.non_square_matrices);
        assert!(!info.integer_attributes);
        assert!(!info.integer_operators);
        assert!(info.constant_loop_bounds);
        assert!(!Dialect::WebGl2.info().constant_loop_bounds);
    }
}
