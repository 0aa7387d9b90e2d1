//! Structural parsing of native type descriptors.
//!
//! Input is expected to be already stripped of whitespace and lower-cased.
//! The grammar is small:
//!
//! ```text
//! type  := name [ '(' args ')' | '<' args '>' ]
//! args  := arg { ',' arg }
//! arg   := any text with balanced () and <>
//! ```
//!
//! Anything that does not fit is returned as a bare name, which the
//! normalizer then fails to find in its lookup table.

use once_cell::sync::Lazy;
use regex::Regex;

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][a-z0-9_]*)(?:([(<])(.*)([)>]))?$").expect("type pattern is valid")
});

/// Which bracket pair surrounded the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brackets {
    Paren,
    Angle,
}

/// A parsed `name(args)` / `name<args>` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr<'a> {
    pub name: &'a str,
    pub args: Option<TypeArgs<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeArgs<'a> {
    pub brackets: Brackets,
    pub inner: &'a str,
}

impl<'a> TypeArgs<'a> {
    /// Arguments split on top-level commas.
    pub fn split(&self) -> Vec<&'a str> {
        split_top_level(self.inner)
    }
}

/// Parse a cleaned type descriptor.
pub fn parse(input: &str) -> TypeExpr<'_> {
    let bare = TypeExpr {
        name: input,
        args: None,
    };

    let Some(caps) = TYPE_PATTERN.captures(input) else {
        return bare;
    };
    let Some(name) = caps.get(1) else {
        return bare;
    };

    let (Some(open), Some(inner), Some(close)) = (caps.get(2), caps.get(3), caps.get(4)) else {
        return TypeExpr {
            name: name.as_str(),
            args: None,
        };
    };

    let brackets = match (open.as_str(), close.as_str()) {
        ("(", ")") => Brackets::Paren,
        ("<", ">") => Brackets::Angle,
        _ => return bare,
    };

    if !is_balanced(inner.as_str()) {
        return bare;
    }

    TypeExpr {
        name: name.as_str(),
        args: Some(TypeArgs {
            brackets,
            inner: inner.as_str(),
        }),
    }
}

/// Split on commas that are not nested inside brackets.
pub fn split_top_level(s: &str) -> Vec<&str> {
    if s.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' | '<' => depth += 1,
            ')' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Brackets never close below depth zero and end at depth zero.
fn is_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' | '<' => depth += 1,
            ')' | '>' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
