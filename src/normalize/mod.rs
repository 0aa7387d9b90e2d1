//! Native type normalization.
//!
//! Maps an engine's type descriptor (`"varchar(10)"`, `"array<string>"`,
//! `"decimal(10,2)"`, ...) onto a [`CanonicalType`].
//!
//! # Pipeline
//!
//! ```text
//! "Array< Decimal(10, 2) >"
//!        │ strip whitespace, lower-case
//!        ▼
//! "array<decimal(10,2)>"
//!        │ parser::parse
//!        ▼
//! TypeExpr { name: "array", args: <decimal(10,2)> }
//!        │ dispatch on name, recurse into the element
//!        ▼
//! ARRAY<DECIMAL(10,2)>
//! ```
//!
//! Normalization never fails outright. Unknown names degrade to
//! [`TypeKind::Null`] and a warning is logged. Malformed arguments follow
//! the configured [`MalformedPolicy`].
//!
//! # Example
//!
//! ```
//! use schemascope::model::TypeKind;
//! use schemascope::normalize::normalize_type;
//!
//! let ty = normalize_type("varchar(255)");
//! assert_eq!(ty.kind(), TypeKind::Varchar);
//! assert_eq!(ty.length(), Some(255));
//!
//! assert!(normalize_type("totally_unknown_type").is_null());
//! ```

mod issue;
pub mod parser;

pub use issue::TypeIssue;

use std::collections::HashMap;
use std::num::IntErrorKind;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{CanonicalType, TypeKind};
use parser::TypeArgs;

/// Exact-name lookup for types that carry no arguments worth keeping.
static KIND_BY_NAME: Lazy<HashMap<&'static str, TypeKind>> = Lazy::new(|| {
    HashMap::from([
        ("boolean", TypeKind::Boolean),
        ("float", TypeKind::Float),
        ("double", TypeKind::Float),
        ("real", TypeKind::Float),
        ("tinyint", TypeKind::Integer),
        ("smallint", TypeKind::Integer),
        ("integer", TypeKind::Integer),
        ("int", TypeKind::Integer),
        ("bigint", TypeKind::Bigint),
        ("string", TypeKind::String),
        ("date", TypeKind::Date),
        ("timestamp", TypeKind::Timestamp),
        ("binary", TypeKind::Binary),
        ("varbinary", TypeKind::Binary),
        ("json", TypeKind::Json),
        ("struct", TypeKind::Struct),
        ("row", TypeKind::Struct),
        ("map", TypeKind::Map),
    ])
});

/// What to do with arguments that cannot be read, e.g. `decimal(10)` or
/// `varchar(abc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// A decimal with a precision but no scale gets scale 0 (the SQL
    /// standard reading of `DECIMAL(p)`). Arguments that cannot be read at
    /// all degrade the type to NULL. Either way an issue is recorded.
    #[default]
    Lenient,
    /// The column is rejected.
    Reject,
}

/// A normalized type plus the non-fatal issues met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub canonical: CanonicalType,
    pub issues: Vec<TypeIssue>,
}

/// Converts native type descriptors into canonical types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeNormalizer {
    policy: MalformedPolicy,
}

impl TypeNormalizer {
    pub fn new(policy: MalformedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    /// Normalize a native type, never failing.
    ///
    /// A column that [`resolve`](Self::resolve) would reject comes back as
    /// NULL here.
    pub fn normalize(&self, native: &str) -> CanonicalType {
        match self.resolve(native) {
            Ok(resolution) => resolution.canonical,
            Err(_) => CanonicalType::null(),
        }
    }

    /// Normalize a native type, reporting every issue.
    ///
    /// Each issue is also logged at WARN. `Err` is returned only under
    /// [`MalformedPolicy::Reject`], for a column that must be dropped.
    pub fn resolve(&self, native: &str) -> Result<Resolution, TypeIssue> {
        let cleaned = clean(native);
        let mut issues = Vec::new();

        let canonical = match self.resolve_cleaned(native, &cleaned, &mut issues) {
            Ok(Some(canonical)) => canonical,
            Ok(None) => {
                issues.push(TypeIssue::Unrecognized {
                    native: native.to_string(),
                });
                CanonicalType::null()
            }
            Err(issue) => {
                warn!(native_type = native, "{}", issue);
                return Err(issue);
            }
        };

        for issue in &issues {
            warn!(native_type = native, "{}", issue);
        }

        Ok(Resolution { canonical, issues })
    }

    /// `Ok(None)` means the name itself was not recognized.
    fn resolve_cleaned(
        &self,
        native: &str,
        cleaned: &str,
        issues: &mut Vec<TypeIssue>,
    ) -> Result<Option<CanonicalType>, TypeIssue> {
        let expr = parser::parse(cleaned);

        match expr.name {
            "decimal" => self.decimal(native, expr.args.as_ref(), issues).map(Some),
            "char" => self
                .sized(native, expr.args.as_ref(), CanonicalType::char, issues)
                .map(Some),
            "varchar" => self
                .sized(native, expr.args.as_ref(), CanonicalType::varchar, issues)
                .map(Some),
            _ if cleaned.starts_with("array") => {
                let element = match (&expr.args, expr.name) {
                    (Some(args), "array") => match args.split().as_slice() {
                        [element] => self.element(native, element, issues)?,
                        _ => unrecognized_element(native, args.inner, issues),
                    },
                    (None, "array") => CanonicalType::scalar(TypeKind::String),
                    // "array" glued to text the parser could not split
                    _ => unrecognized_element(native, cleaned, issues),
                };
                Ok(Some(CanonicalType::array(element)))
            }
            "map" => {
                let value = match &expr.args {
                    Some(args) => match args.split().as_slice() {
                        [_, value] => self.element(native, value, issues)?,
                        _ => unrecognized_element(native, args.inner, issues),
                    },
                    None => CanonicalType::scalar(TypeKind::String),
                };
                Ok(Some(CanonicalType::map(value)))
            }
            name => Ok(KIND_BY_NAME.get(name).map(|kind| CanonicalType::scalar(*kind))),
        }
    }

    /// Resolve a nested element, falling back to STRING for anything that
    /// would otherwise be NULL.
    fn element(
        &self,
        native: &str,
        element: &str,
        issues: &mut Vec<TypeIssue>,
    ) -> Result<CanonicalType, TypeIssue> {
        match self.resolve_cleaned(native, element, issues)? {
            Some(canonical) if !canonical.is_null() => Ok(canonical),
            _ => Ok(unrecognized_element(native, element, issues)),
        }
    }

    fn decimal(
        &self,
        native: &str,
        args: Option<&TypeArgs<'_>>,
        issues: &mut Vec<TypeIssue>,
    ) -> Result<CanonicalType, TypeIssue> {
        let Some(args) = args else {
            return Ok(CanonicalType::scalar(TypeKind::Decimal));
        };

        match args.split().as_slice() {
            [precision, scale] => {
                let parsed = parse_number(precision, "decimal precision")
                    .and_then(|p| parse_number(scale, "decimal scale").map(|s| (p, s)));
                match parsed {
                    Ok((p, s)) if s <= p => Ok(CanonicalType::decimal(p, s)),
                    Ok(_) => self.malformed(
                        TypeIssue::malformed(native, "decimal scale exceeds precision"),
                        issues,
                    ),
                    Err(reason) => self.malformed(TypeIssue::malformed(native, reason), issues),
                }
            }
            [precision] => match parse_number(precision, "decimal precision") {
                Ok(p) => match self.policy {
                    MalformedPolicy::Lenient => {
                        issues.push(TypeIssue::ScaleDefaulted {
                            native: native.to_string(),
                        });
                        Ok(CanonicalType::decimal(p, 0))
                    }
                    MalformedPolicy::Reject => Err(TypeIssue::malformed(
                        native,
                        "decimal precision given without scale",
                    )),
                },
                Err(reason) => self.malformed(TypeIssue::malformed(native, reason), issues),
            },
            _ => self.malformed(
                TypeIssue::malformed(native, "decimal takes precision and scale"),
                issues,
            ),
        }
    }

    /// CHAR/VARCHAR with an optional single length argument.
    fn sized(
        &self,
        native: &str,
        args: Option<&TypeArgs<'_>>,
        build: fn(Option<u32>) -> CanonicalType,
        issues: &mut Vec<TypeIssue>,
    ) -> Result<CanonicalType, TypeIssue> {
        let Some(args) = args else {
            return Ok(build(None));
        };

        match args.split().as_slice() {
            [length] => match parse_number(length, "length") {
                Ok(n) => Ok(build(Some(n))),
                Err(reason) => self.malformed(TypeIssue::malformed(native, reason), issues),
            },
            _ => self.malformed(
                TypeIssue::malformed(native, "expected a single length"),
                issues,
            ),
        }
    }

    /// Apply the policy to unreadable arguments.
    fn malformed(
        &self,
        issue: TypeIssue,
        issues: &mut Vec<TypeIssue>,
    ) -> Result<CanonicalType, TypeIssue> {
        match self.policy {
            MalformedPolicy::Lenient => {
                issues.push(issue);
                Ok(CanonicalType::null())
            }
            MalformedPolicy::Reject => Err(issue),
        }
    }
}

/// Read a numeric type argument, telling overflow apart from garbage.
fn parse_number(text: &str, what: &str) -> Result<u32, String> {
    text.parse::<u32>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => format!("{} {} is out of range", what, text),
        _ => format!("{} must be an integer", what),
    })
}

fn unrecognized_element(
    native: &str,
    element: &str,
    issues: &mut Vec<TypeIssue>,
) -> CanonicalType {
    issues.push(TypeIssue::UnrecognizedElement {
        native: native.to_string(),
        element: element.to_string(),
    });
    CanonicalType::scalar(TypeKind::String)
}

/// Normalize with the default (lenient) policy.
pub fn normalize_type(native: &str) -> CanonicalType {
    TypeNormalizer::default().normalize(native)
}

fn clean(native: &str) -> String {
    native
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
