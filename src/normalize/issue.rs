//! Diagnostics raised while normalizing a native type.

use serde::Serialize;
use thiserror::Error;

/// Something the normalizer could not map cleanly.
///
/// `MalformedArguments` is the only variant that can reject a column, and
/// only under [`MalformedPolicy::Reject`](super::MalformedPolicy::Reject).
/// Every other issue is informational: the type was degraded or defaulted
/// and normalization carried on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum TypeIssue {
    /// No known type name matched.
    #[error("did not recognize type '{native}'")]
    Unrecognized { native: String },

    /// An array element or map value type did not match; STRING was used.
    #[error("did not recognize element type '{element}' in '{native}', using STRING")]
    UnrecognizedElement { native: String, element: String },

    /// `decimal(p)` was given without a scale; scale 0 was used.
    #[error("decimal '{native}' has a precision but no scale, using scale 0")]
    ScaleDefaulted { native: String },

    /// Arguments of a parameterized type could not be read.
    #[error("malformed type arguments in '{native}': {reason}")]
    MalformedArguments { native: String, reason: String },
}

impl TypeIssue {
    pub(crate) fn malformed(native: &str, reason: impl Into<String>) -> Self {
        Self::MalformedArguments {
            native: native.to_string(),
            reason: reason.into(),
        }
    }

    /// The native type string the issue is about.
    pub fn native(&self) -> &str {
        match self {
            Self::Unrecognized { native }
            | Self::UnrecognizedElement { native, .. }
            | Self::ScaleDefaulted { native }
            | Self::MalformedArguments { native, .. } => native,
        }
    }
}
