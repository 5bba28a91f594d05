//! Canonical name representations.
//!
//! Four name shapes cover the whole declaration surface:
//!
//! - [`Ident`]: a simple name (`Pod`, `constructor`).
//! - [`QIdent`]: a dotted path of simple names (`A.B.C`), possibly empty.
//! - [`ModuleName`]: a module path with an optional scope
//!   (`@scope/frag1/frag2` or `frag1/frag2`).
//! - [`LibraryName`]: a library, either simple (`react`) or scoped
//!   (`@angular/core`), with a collision-safe encoded form
//!   (`angular__core`) for use in file systems and flat namespaces.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An opaque simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident(String);

impl Ident {
    pub fn new(value: impl Into<String>) -> Self {
        Ident(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sentinel name under which call signatures are grouped.
    pub fn apply() -> Self {
        Ident::new("<apply>")
    }

    /// Sentinel name under which constructor signatures are grouped.
    pub fn constructor() -> Self {
        Ident::new("constructor")
    }

    pub fn global() -> Self {
        Ident::new("<global>")
    }

    pub fn default_export() -> Self {
        Ident::new("default")
    }

    pub fn namespaced() -> Self {
        Ident::new("^")
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Ident::new(value)
    }
}

/// An ordered, possibly empty sequence of simple names denoting a dotted
/// path. The empty path is a legal explicit value, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QIdent {
    parts: Vec<Ident>,
}

impl QIdent {
    pub fn new(parts: Vec<Ident>) -> Self {
        QIdent { parts }
    }

    pub fn empty() -> Self {
        QIdent { parts: Vec::new() }
    }

    /// Convenience constructor from string slices: `QIdent::of(&["A", "B"])`.
    pub fn of(parts: &[&str]) -> Self {
        QIdent {
            parts: parts.iter().map(|p| Ident::new(*p)).collect(),
        }
    }

    pub fn single(part: impl Into<String>) -> Self {
        QIdent {
            parts: vec![Ident::new(part)],
        }
    }

    pub fn parts(&self) -> &[Ident] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn head(&self) -> Option<&Ident> {
        self.parts.first()
    }

    pub fn last(&self) -> Option<&Ident> {
        self.parts.last()
    }

    /// Pure append: returns a new path with `part` at the end.
    pub fn push(&self, part: Ident) -> Self {
        let mut parts = self.parts.clone();
        parts.push(part);
        QIdent { parts }
    }

    /// Pure concatenation of two paths.
    pub fn concat(&self, other: &QIdent) -> Self {
        let mut parts = self.parts.clone();
        parts.extend(other.parts.iter().cloned());
        QIdent { parts }
    }

    /// Pure prefixing: `b.prefixed_by(a)` is `a.b`.
    pub fn prefixed_by(&self, prefix: &QIdent) -> Self {
        prefix.concat(self)
    }
}

impl fmt::Display for QIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Ident> for QIdent {
    fn from(part: Ident) -> Self {
        QIdent { parts: vec![part] }
    }
}

/// A module path: optional scope plus a non-empty list of path fragments.
///
/// Display form is `@scope/frag1/frag2` when scoped, `frag1/frag2`
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleName {
    scope: Option<String>,
    fragments: Vec<String>,
}

impl ModuleName {
    pub fn new(scope: Option<String>, fragments: Vec<String>) -> Self {
        ModuleName { scope, fragments }
    }

    /// Parse a raw module string, e.g. `@scope/lib/sub` or `lib/sub`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::EmptyModuleName);
        }
        let (scope, rest) = match raw.strip_prefix('@') {
            Some(rest) => match rest.split_once('/') {
                Some((scope, tail)) => (Some(scope.to_string()), tail),
                None => (Some(rest.to_string()), ""),
            },
            None => (None, raw),
        };
        let fragments: Vec<String> = rest
            .split('/')
            .filter(|f| !f.is_empty())
            .map(|f| f.to_string())
            .collect();
        if fragments.is_empty() && scope.is_none() {
            return Err(CoreError::EmptyModuleName);
        }
        Ok(ModuleName { scope, fragments })
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Pure update of the fragment list.
    pub fn with_fragments(&self, fragments: Vec<String>) -> Self {
        ModuleName {
            scope: self.scope.clone(),
            fragments,
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "@{}", scope)?;
            if !self.fragments.is_empty() {
                write!(f, "/")?;
            }
        }
        write!(f, "{}", self.fragments.join("/"))
    }
}

/// A library name, simple or scoped.
///
/// Scoped libraries round-trip between the display form `@scope/name` and
/// the encoded form `scope__name`. The `@types` scope is special: it only
/// exists to host declaration packages, so `@types/node` and `types__node`
/// both collapse to the simple name `node`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LibraryName {
    Simple(String),
    Scoped { scope: String, name: String },
}

impl LibraryName {
    pub fn simple(name: impl Into<String>) -> Self {
        LibraryName::Simple(name.into())
    }

    pub fn scoped(scope: impl Into<String>, name: impl Into<String>) -> Self {
        LibraryName::Scoped {
            scope: scope.into(),
            name: name.into(),
        }
    }

    /// Construct from raw text, recognizing all four accepted forms:
    /// `@scope/name`, `scope__name`, `@types/name` and `types__name`
    /// (the last two collapse to `Simple(name)`).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::EmptyLibraryName);
        }
        if let Some(rest) = raw.strip_prefix('@') {
            let (scope, name) = rest.split_once('/').unwrap_or((rest, ""));
            return Ok(Self::from_scope_and_name(scope, name));
        }
        if let Some((scope, name)) = raw.split_once("__") {
            return Ok(Self::from_scope_and_name(scope, name));
        }
        Ok(LibraryName::Simple(raw.to_string()))
    }

    fn from_scope_and_name(scope: &str, name: &str) -> Self {
        if scope == "types" {
            LibraryName::Simple(name.to_string())
        } else {
            LibraryName::Scoped {
                scope: scope.to_string(),
                name: name.to_string(),
            }
        }
    }

    /// Display form: `name` or `@scope/name`.
    pub fn value(&self) -> String {
        self.to_string()
    }

    /// Collision-safe encoded form: `name` or `scope__name`.
    pub fn encoded(&self) -> String {
        match self {
            LibraryName::Simple(name) => name.clone(),
            LibraryName::Scoped { scope, name } => format!("{}__{}", scope, name),
        }
    }
}

impl fmt::Display for LibraryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryName::Simple(name) => write!(f, "{}", name),
            LibraryName::Scoped { scope, name } => write!(f, "@{}/{}", scope, name),
        }
    }
}

/// A name bound by an import, carrying the module it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportedName {
    pub from: ModuleName,
}

impl ImportedName {
    pub fn new(from: ModuleName) -> Self {
        ImportedName { from }
    }
}

impl fmt::Display for ImportedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.from)
    }
}
