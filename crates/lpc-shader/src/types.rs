//! Shader type system.
//!
//! Types are canonical, immutable descriptors compared structurally. The
//! textual form produced by `Display` is the GLSL spelling, which is also
//! what the declarator resolver accepts.

use core::fmt;

/// Scalar component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
}

impl ScalarKind {
    /// Scalar type name.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
        }
    }

    /// Prefix used for vectors of this kind (`bvec`, `ivec`, `vec`).
    pub fn vector_prefix(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bvec",
            ScalarKind::Int => "ivec",
            ScalarKind::Float => "vec",
        }
    }
}

/// The shape of a value, without array or qualifier information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseType {
    /// Only valid as a function return type
    Void,
    Scalar(ScalarKind),
    /// Vector of 2 to 4 components
    Vector(ScalarKind, u8),
    /// Float matrix with 2 to 4 columns and rows
    Matrix { columns: u8, rows: u8 },
    Sampler2D,
}

impl BaseType {
    /// Scalar kind of the components; `None` for `void` and samplers.
    pub fn scalar_kind(self) -> Option<ScalarKind> {
        match self {
            BaseType::Scalar(kind) | BaseType::Vector(kind, _) => Some(kind),
            BaseType::Matrix { .. } => Some(ScalarKind::Float),
            BaseType::Void | BaseType::Sampler2D => None,
        }
    }

    /// Whether this is a matrix whose column and row counts differ.
    pub fn is_non_square_matrix(self) -> bool {
        matches!(self, BaseType::Matrix { columns, rows } if columns != rows)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BaseType::Void => write!(f, "void"),
            BaseType::Scalar(kind) => write!(f, "{}", kind.name()),
            BaseType::Vector(kind, size) => write!(f, "{}{}", kind.vector_prefix(), size),
            BaseType::Matrix { columns, rows } if columns == rows => write!(f, "mat{}", columns),
            BaseType::Matrix { columns, rows } => write!(f, "mat{}x{}", columns, rows),
            BaseType::Sampler2D => write!(f, "sampler2D"),
        }
    }
}

/// Precision qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Low,
    Medium,
    High,
}

impl Precision {
    /// GLSL keyword for this precision.
    pub fn keyword(self) -> &'static str {
        match self {
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A fully resolved shader type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    /// Value shape
    pub base: BaseType,
    /// Fixed array length, if this is an array
    pub array: Option<u32>,
    /// Precision qualifier, if one was declared
    pub precision: Option<Precision>,
    /// Declared `const`
    pub constant: bool,
}

impl Type {
    /// Create an unqualified, non-array type.
    pub const fn new(base: BaseType) -> Self {
        Type {
            base,
            array: None,
            precision: None,
            constant: false,
        }
    }

    /// Shorthand for an unqualified scalar.
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self::new(BaseType::Scalar(kind))
    }

    /// Shorthand for an unqualified vector.
    pub const fn vector(kind: ScalarKind, size: u8) -> Self {
        Self::new(BaseType::Vector(kind, size))
    }

    /// Same type as an array of `length` elements.
    pub fn with_array(mut self, length: u32) -> Self {
        self.array = Some(length);
        self
    }

    /// Same type with a precision qualifier.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Whether values of this type are integer or boolean based.
    pub fn is_integral(&self) -> bool {
        matches!(
            self.base.scalar_kind(),
            Some(ScalarKind::Int) | Some(ScalarKind::Bool)
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constant {
            write!(f, "const ")?;
        }
        if let Some(precision) = self.precision {
            write!(f, "{} ", precision)?;
        }
        write!(f, "{}", self.base)?;
        if let Some(length) = self.array {
            write!(f, "[{}]", length)?;
        }
        Ok(())
    }
}
