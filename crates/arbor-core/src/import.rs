//! Import and export statements.
//!
//! An import is "what is imported" crossed with "where it comes from";
//! exports are the symmetric structures. Whether an import source counts
//! as external (and so makes its container module-like) is decided here.

use std::fmt;

use serde::Serialize;

use crate::comments::Comments;
use crate::ident::{Ident, ModuleName, QIdent};
use crate::tree::TreeItem;

/// What an import binds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Imported {
    /// `import x from "m"`.
    Ident(Ident),
    /// `import { a, b as c } from "m"`.
    Destructured(Vec<(Ident, Option<Ident>)>),
    /// `import * as ns from "m"` (alias optional in re-export position).
    Star(Option<Ident>),
}

/// Where an import comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportSource {
    /// `from "m"`.
    Module(ModuleName),
    /// `= require("m")`.
    Required(ModuleName),
    /// `= A.B.C`, a purely local re-qualification.
    Local(QIdent),
}

impl ImportSource {
    /// Local re-qualifications do not make their container module-like.
    pub fn is_local(&self) -> bool {
        matches!(self, ImportSource::Local(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub type_only: bool,
    pub imported: Vec<Imported>,
    pub from: ImportSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportKind {
    Named,
    Defaulted,
    Namespaced,
}

/// What an export exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Exportee {
    /// `export { a, b as c }` with an optional re-export source.
    Names {
        names: Vec<(QIdent, Option<Ident>)>,
        from: Option<ModuleName>,
    },
    /// `export <declaration>`.
    Tree(TreeItem),
    /// `export * as ns from "m"`.
    Star {
        alias: Option<Ident>,
        from: ModuleName,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Export {
    pub comments: Comments,
    pub type_only: bool,
    pub kind: ExportKind,
    pub exported: Exportee,
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import ")?;
        let mut first = true;
        for imported in &self.imported {
            if !first {
                write!(f, ", ")?;
            }
            match imported {
                Imported::Ident(name) => write!(f, "{}", name)?,
                Imported::Destructured(names) => {
                    write!(f, "{{")?;
                    let mut inner_first = true;
                    for (name, alias) in names {
                        if !inner_first {
                            write!(f, ", ")?;
                        }
                        match alias {
                            Some(alias) => write!(f, "{} as {}", name, alias)?,
                            None => write!(f, "{}", name)?,
                        }
                        inner_first = false;
                    }
                    write!(f, "}}")?;
                }
                Imported::Star(alias) => match alias {
                    Some(alias) => write!(f, "* as {}", alias)?,
                    None => write!(f, "*")?,
                },
            }
            first = false;
        }
        match &self.from {
            ImportSource::Module(name) => write!(f, " from \"{}\"", name),
            ImportSource::Required(name) => write!(f, " = require(\"{}\")", name),
            ImportSource::Local(name) => write!(f, " = {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_locality() {
        let external = ImportSource::Module(ModuleName::parse("react").unwrap());
        let required = ImportSource::Required(ModuleName::parse("fs").unwrap());
        let local = ImportSource::Local(QIdent::of(&["A", "B"]));
        assert!(!external.is_local());
        assert!(!required.is_local());
        assert!(local.is_local());
    }

    #[test]
    fn test_render() {
        let import = Import {
            type_only: false,
            imported: vec![Imported::Destructured(vec![
                (Ident::new("a"), None),
                (Ident::new("b"), Some(Ident::new("c"))),
            ])],
            from: ImportSource::Module(ModuleName::parse("@angular/core").unwrap()),
        };
        assert_eq!(import.to_string(), "import {a, b as c} from \"@angular/core\"");
    }
}
