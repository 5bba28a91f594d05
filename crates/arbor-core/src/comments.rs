//! Comment attachment for declarations and members.
//!
//! Comments are carried verbatim and never interpreted; transformation
//! passes use them to leave human-readable traces (for example the rendered
//! original initializer after type inference).

use serde::{Deserialize, Serialize};

/// A single attached comment, stored as raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comment {
    Raw(String),
}

impl Comment {
    pub fn raw(text: impl Into<String>) -> Self {
        Comment::Raw(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Comment::Raw(text) => text,
        }
    }
}

/// An ordered, possibly empty list of comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comments(Vec<Comment>);

impl Comments {
    pub fn new() -> Self {
        Comments(Vec::new())
    }

    pub fn of(comment: Comment) -> Self {
        Comments(vec![comment])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.0.iter()
    }

    /// Pure append: returns a new list with `comment` at the end.
    pub fn plus(&self, comment: Comment) -> Self {
        let mut out = self.0.clone();
        out.push(comment);
        Comments(out)
    }

    /// Pure concatenation of two comment lists.
    pub fn concat(&self, other: &Comments) -> Self {
        let mut out = self.0.clone();
        out.extend(other.0.iter().cloned());
        Comments(out)
    }

    /// True if any attached comment contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|c| c.text().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_is_pure() {
        let a = Comments::new();
        let b = a.plus(Comment::raw("/* one */"));
        assert!(a.is_empty());
        assert!(!b.is_empty());
        assert!(b.contains("one"));
    }
}
