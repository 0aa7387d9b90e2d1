//! Canonical column types.
//!
//! Every native type string a backend reports is normalized into a
//! [`CanonicalType`]. Downstream consumers only ever reason about these
//! kinds, never about an engine's own spelling (`row` vs `struct`,
//! `double` vs `real`, ...).
//!
//! The optional attributes follow the kind:
//! - `length` only for [`TypeKind::Char`] and [`TypeKind::Varchar`]
//! - `precision`/`scale` only for [`TypeKind::Decimal`], always together
//! - `element_type` always for [`TypeKind::Array`] and [`TypeKind::Map`]
//!   (the map's value type), never for anything else
//!
//! The fields are private so the constructors are the only way to build a
//! value. Deserialization goes through the same constructors and refuses
//! attributes that do not fit the kind.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of canonical type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Boolean,
    Float,
    Integer,
    Bigint,
    String,
    Date,
    Timestamp,
    Binary,
    Array,
    Json,
    Struct,
    Map,
    Decimal,
    Char,
    Varchar,
    /// Fallback for anything the normalizer does not recognize.
    Null,
}

impl TypeKind {
    /// Upper-case name used in catalogs and rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Boolean => "BOOLEAN",
            TypeKind::Float => "FLOAT",
            TypeKind::Integer => "INTEGER",
            TypeKind::Bigint => "BIGINT",
            TypeKind::String => "STRING",
            TypeKind::Date => "DATE",
            TypeKind::Timestamp => "TIMESTAMP",
            TypeKind::Binary => "BINARY",
            TypeKind::Array => "ARRAY",
            TypeKind::Json => "JSON",
            TypeKind::Struct => "STRUCT",
            TypeKind::Map => "MAP",
            TypeKind::Decimal => "DECIMAL",
            TypeKind::Char => "CHAR",
            TypeKind::Varchar => "VARCHAR",
            TypeKind::Null => "NULL",
        }
    }

    /// Returns true for nested kinds (ARRAY, STRUCT, MAP).
    pub fn is_complex(&self) -> bool {
        matches!(self, TypeKind::Array | TypeKind::Struct | TypeKind::Map)
    }

    /// Returns true for kinds that carry an element type.
    pub fn has_element(&self) -> bool {
        matches!(self, TypeKind::Array | TypeKind::Map)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-agnostic column type.
///
/// # Examples
///
/// ```
/// use schemascope::model::{CanonicalType, TypeKind};
///
/// let ty = CanonicalType::decimal(10, 2);
/// assert_eq!(ty.kind(), TypeKind::Decimal);
/// assert_eq!(ty.precision(), Some(10));
/// assert_eq!(ty.to_string(), "DECIMAL(10,2)");
///
/// let arr = CanonicalType::array(CanonicalType::scalar(TypeKind::String));
/// assert!(arr.is_complex());
/// assert_eq!(arr.to_string(), "ARRAY<STRING>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CanonicalTypeRepr")]
pub struct CanonicalType {
    kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_type: Option<Box<CanonicalType>>,
    is_complex: bool,
}

impl CanonicalType {
    fn bare(kind: TypeKind) -> Self {
        Self {
            kind,
            length: None,
            precision: None,
            scale: None,
            element_type: None,
            is_complex: kind.is_complex(),
        }
    }

    /// A type with no attributes.
    ///
    /// ARRAY and MAP always carry an element type, so asking for a bare one
    /// gives a STRING element, the same default the normalizer applies to
    /// an element it cannot read.
    pub fn scalar(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Array => Self::array(Self::bare(TypeKind::String)),
            TypeKind::Map => Self::map(Self::bare(TypeKind::String)),
            other => Self::bare(other),
        }
    }

    /// The NULL fallback type.
    pub fn null() -> Self {
        Self::bare(TypeKind::Null)
    }

    /// DECIMAL with explicit precision and scale.
    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::bare(TypeKind::Decimal)
        }
    }

    /// CHAR with an optional length.
    pub fn char(length: Option<u32>) -> Self {
        Self {
            length,
            ..Self::bare(TypeKind::Char)
        }
    }

    /// VARCHAR with an optional length.
    pub fn varchar(length: Option<u32>) -> Self {
        Self {
            length,
            ..Self::bare(TypeKind::Varchar)
        }
    }

    /// ARRAY of `element`.
    pub fn array(element: CanonicalType) -> Self {
        Self {
            element_type: Some(Box::new(element)),
            ..Self::bare(TypeKind::Array)
        }
    }

    /// MAP whose values are `value`.
    pub fn map(value: CanonicalType) -> Self {
        Self {
            element_type: Some(Box::new(value)),
            ..Self::bare(TypeKind::Map)
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn length(&self) -> Option<u32> {
        self.length
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub fn scale(&self) -> Option<u32> {
        self.scale
    }

    pub fn element_type(&self) -> Option<&CanonicalType> {
        self.element_type.as_deref()
    }

    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    /// Returns true for the unrecognized-type fallback.
    pub fn is_null(&self) -> bool {
        self.kind == TypeKind::Null
    }
}

/// Unchecked wire form of [`CanonicalType`].
#[derive(Deserialize)]
struct CanonicalTypeRepr {
    kind: TypeKind,
    #[serde(default)]
    length: Option<u32>,
    #[serde(default)]
    precision: Option<u32>,
    #[serde(default)]
    scale: Option<u32>,
    #[serde(default)]
    element_type: Option<Box<CanonicalType>>,
    #[serde(default)]
    is_complex: Option<bool>,
}

impl TryFrom<CanonicalTypeRepr> for CanonicalType {
    type Error = String;

    fn try_from(repr: CanonicalTypeRepr) -> Result<Self, Self::Error> {
        let kind = repr.kind;
        let ty = match (kind, repr.length, repr.precision, repr.scale, repr.element_type) {
            (TypeKind::Char, length, None, None, None) => Self::char(length),
            (TypeKind::Varchar, length, None, None, None) => Self::varchar(length),
            (TypeKind::Decimal, None, Some(p), Some(s), None) if s <= p => Self::decimal(p, s),
            (TypeKind::Array, None, None, None, Some(element)) => Self::array(*element),
            (TypeKind::Map, None, None, None, Some(value)) => Self::map(*value),
            (kind, None, None, None, None) if !kind.has_element() => Self::bare(kind),
            _ => return Err(format!("attributes do not fit type kind {}", kind)),
        };

        match repr.is_complex {
            Some(flag) if flag != ty.is_complex => {
                Err(format!("is_complex = {} contradicts type kind {}", flag, kind))
            }
            _ => Ok(ty),
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        match (self.precision, self.scale, self.length, self.element_type()) {
            (Some(p), Some(s), _, _) => write!(f, "({},{})", p, s),
            (_, _, Some(n), _) => write!(f, "({})", n),
            (_, _, _, Some(element)) => write!(f, "<{}>", element),
            _ => Ok(()),
        }
    }
}
