//! Literal values.
//!
//! Numeric and string literals keep their exact source text so no precision
//! or formatting information is lost between parse and emit.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lit {
    /// String literal, stored without the surrounding quotes.
    Str(String),
    /// Numeric literal, stored as written in the source.
    Num(String),
    Bool(bool),
}

impl Lit {
    pub fn str(value: impl Into<String>) -> Self {
        Lit::Str(value.into())
    }

    pub fn num(value: impl Into<String>) -> Self {
        Lit::Num(value.into())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Lit::Num(_))
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Str(value) => write!(f, "\"{}\"", value),
            Lit::Num(value) => write!(f, "{}", value),
            Lit::Bool(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_source_text() {
        assert_eq!(Lit::num("0x10").to_string(), "0x10");
        assert_eq!(Lit::num("1.50").to_string(), "1.50");
        assert_eq!(Lit::str("hello").to_string(), "\"hello\"");
        assert_eq!(Lit::Bool(true).to_string(), "true");
    }
}
