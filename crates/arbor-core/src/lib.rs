//! Immutable declaration-tree model and rewriting engine.
//!
//! The crate models the declaration surface of a typed module system as an
//! immutable tree: named declarations, nested containers, an algebraic type
//! grammar and a small initializer-expression grammar. Every composite node
//! sits behind an [`Arc`](std::sync::Arc), so rewriting is non-destructive
//! and unchanged subtrees are shared by pointer between the old and new
//! trees.
//!
//! On top of the model sits [`transform::TreeTransformation`], a
//! context-threaded visitor with per-kind enter/leave hooks, plus the
//! bundled passes in [`passes`] and the type algebra in [`algebra`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use arbor_core::comments::Comments;
//! use arbor_core::passes::{InferTypes, SimplifyTypes};
//! use arbor_core::transform::{Then, TreeTransformation};
//! use arbor_core::tree::SourceFile;
//!
//! let file = Arc::new(SourceFile::new(Comments::new(), vec![], vec![]));
//! let pipeline = InferTypes.then(SimplifyTypes);
//! let rewritten = pipeline.run(&(), file.clone());
//! assert!(Arc::ptr_eq(&file, &rewritten));
//! ```

pub mod algebra;
pub mod comments;
pub mod error;
pub mod expr;
pub mod ident;
pub mod import;
pub mod index;
pub mod lit;
pub mod member;
pub mod passes;
pub mod transform;
pub mod tree;
pub mod ty;

pub use error::CoreError;
pub use ident::{Ident, LibraryName, ModuleName, QIdent};
pub use transform::{Identity, Then, TreeTransformation};
pub use tree::{HasChildren, SourceFile, Tree, TreeItem};
pub use ty::Type;
