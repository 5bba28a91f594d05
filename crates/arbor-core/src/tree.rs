//! Declarations, containers and the source-file root.
//!
//! Everything here is an immutable value object: "mutation" is a pure
//! `with_*` copy-update returning a new node that shares unchanged children
//! by reference. Containers compute their [`ContainerIndex`] in the
//! factory, so an index inconsistent with the current children is not
//! representable; the same holds for class and interface member indices.

use std::fmt;
use std::mem;
use std::sync::Arc;

use serde::Serialize;

use crate::comments::Comments;
use crate::expr::Expr;
use crate::ident::{Ident, ModuleName};
use crate::import::{Export, Import};
use crate::index::{ContainerIndex, MemberIndex};
use crate::member::Member;
use crate::ty::{RefType, Sig, Type, TypeParam};

/// A child of a container: a declaration, a nested container, or an
/// import/export statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TreeItem {
    Class(Arc<ClassDecl>),
    Interface(Arc<InterfaceDecl>),
    Enum(Arc<EnumDecl>),
    Function(Arc<FnDecl>),
    Var(Arc<VarDecl>),
    TypeAlias(Arc<TypeAliasDecl>),
    Namespace(Arc<NamespaceDecl>),
    Module(Arc<ModuleDecl>),
    Augmented(Arc<AugmentedDecl>),
    Global(Arc<GlobalDecl>),
    Import(Arc<Import>),
    Export(Arc<Export>),
}

/// Any tree node, as handed to a transformation's context hook.
#[derive(Debug, Clone)]
pub enum Tree {
    File(Arc<SourceFile>),
    Item(TreeItem),
    Type(Type),
    Member(Member),
    Expr(Expr),
}

/// Directives attached to a parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Directive {
    /// `/// <reference no-default-lib="true"/>`, marking a standard-library file.
    NoStdLib,
    PathRef(String),
    TypesRef(String),
    LibRef(String),
}

/// A parsed source unit: the root container of one tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    pub comments: Comments,
    pub directives: Vec<Directive>,
    children: Vec<TreeItem>,
    lib: bool,
    #[serde(skip)]
    index: ContainerIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceDecl {
    pub comments: Comments,
    pub declared: bool,
    pub name: Ident,
    children: Vec<TreeItem>,
    #[serde(skip)]
    index: ContainerIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDecl {
    pub comments: Comments,
    pub declared: bool,
    pub name: ModuleName,
    children: Vec<TreeItem>,
    #[serde(skip)]
    index: ContainerIndex,
}

/// A module augmentation: `declare module "m" { … }` targeting an existing
/// module. Associations back to the augmented module go through the
/// container index by name; no node owns a back-pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedDecl {
    pub comments: Comments,
    pub name: ModuleName,
    children: Vec<TreeItem>,
    #[serde(skip)]
    index: ContainerIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalDecl {
    pub comments: Comments,
    pub declared: bool,
    children: Vec<TreeItem>,
    #[serde(skip)]
    index: ContainerIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub comments: Comments,
    pub declared: bool,
    pub is_abstract: bool,
    pub name: Ident,
    pub tparams: Vec<TypeParam>,
    pub parent: Option<Arc<RefType>>,
    pub implements: Vec<Arc<RefType>>,
    members: Vec<Member>,
    #[serde(skip)]
    index: MemberIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub comments: Comments,
    pub declared: bool,
    pub name: Ident,
    pub tparams: Vec<TypeParam>,
    pub inheritance: Vec<Arc<RefType>>,
    members: Vec<Member>,
    #[serde(skip)]
    index: MemberIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub comments: Comments,
    pub declared: bool,
    pub is_const: bool,
    pub name: Ident,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub comments: Comments,
    pub name: Ident,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FnDecl {
    pub comments: Comments,
    pub declared: bool,
    pub name: Ident,
    pub sig: Sig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub comments: Comments,
    pub declared: bool,
    pub read_only: bool,
    pub name: Ident,
    pub ty: Option<Type>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAliasDecl {
    pub comments: Comments,
    pub declared: bool,
    pub name: Ident,
    pub tparams: Vec<TypeParam>,
    pub alias: Type,
}

/// Capability of holding an ordered child list with a derived index.
pub trait HasChildren {
    fn children(&self) -> &[TreeItem];
    fn index(&self) -> &ContainerIndex;
}

macro_rules! impl_has_children {
    ($($ty:ty),*) => {
        $(impl HasChildren for $ty {
            fn children(&self) -> &[TreeItem] {
                &self.children
            }
            fn index(&self) -> &ContainerIndex {
                &self.index
            }
        })*
    };
}

impl_has_children!(SourceFile, NamespaceDecl, ModuleDecl, AugmentedDecl, GlobalDecl);

impl SourceFile {
    /// Factory. The standard-library flag and the container index are
    /// derived here from the directive list and the children.
    pub fn new(comments: Comments, directives: Vec<Directive>, children: Vec<TreeItem>) -> Self {
        let lib = directives.iter().any(|d| matches!(d, Directive::NoStdLib));
        let index = ContainerIndex::of(&children);
        SourceFile {
            comments,
            directives,
            children,
            lib,
            index,
        }
    }

    pub fn is_std_lib(&self) -> bool {
        self.lib
    }

    /// Pure update; recomputes the index.
    pub fn with_children(&self, children: Vec<TreeItem>) -> Self {
        SourceFile::new(self.comments.clone(), self.directives.clone(), children)
    }
}

impl NamespaceDecl {
    pub fn new(comments: Comments, declared: bool, name: Ident, children: Vec<TreeItem>) -> Self {
        let index = ContainerIndex::of(&children);
        NamespaceDecl {
            comments,
            declared,
            name,
            children,
            index,
        }
    }

    pub fn with_children(&self, children: Vec<TreeItem>) -> Self {
        NamespaceDecl::new(
            self.comments.clone(),
            self.declared,
            self.name.clone(),
            children,
        )
    }
}

impl ModuleDecl {
    pub fn new(
        comments: Comments,
        declared: bool,
        name: ModuleName,
        children: Vec<TreeItem>,
    ) -> Self {
        let index = ContainerIndex::of(&children);
        ModuleDecl {
            comments,
            declared,
            name,
            children,
            index,
        }
    }

    pub fn with_children(&self, children: Vec<TreeItem>) -> Self {
        ModuleDecl::new(
            self.comments.clone(),
            self.declared,
            self.name.clone(),
            children,
        )
    }
}

impl AugmentedDecl {
    pub fn new(comments: Comments, name: ModuleName, children: Vec<TreeItem>) -> Self {
        let index = ContainerIndex::of(&children);
        AugmentedDecl {
            comments,
            name,
            children,
            index,
        }
    }

    pub fn with_children(&self, children: Vec<TreeItem>) -> Self {
        AugmentedDecl::new(self.comments.clone(), self.name.clone(), children)
    }
}

impl GlobalDecl {
    pub fn new(comments: Comments, declared: bool, children: Vec<TreeItem>) -> Self {
        let index = ContainerIndex::of(&children);
        GlobalDecl {
            comments,
            declared,
            children,
            index,
        }
    }

    pub fn with_children(&self, children: Vec<TreeItem>) -> Self {
        GlobalDecl::new(self.comments.clone(), self.declared, children)
    }
}

impl ClassDecl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        comments: Comments,
        declared: bool,
        is_abstract: bool,
        name: Ident,
        tparams: Vec<TypeParam>,
        parent: Option<Arc<RefType>>,
        implements: Vec<Arc<RefType>>,
        members: Vec<Member>,
    ) -> Self {
        let index = MemberIndex::of(&members);
        ClassDecl {
            comments,
            declared,
            is_abstract,
            name,
            tparams,
            parent,
            implements,
            members,
            index,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn index(&self) -> &MemberIndex {
        &self.index
    }

    pub fn with_members(&self, members: Vec<Member>) -> Self {
        let mut out = self.clone();
        out.index = MemberIndex::of(&members);
        out.members = members;
        out
    }

    /// Renaming produces a new node; the original keeps its name.
    pub fn with_name(&self, name: Ident) -> Self {
        let mut out = self.clone();
        out.name = name;
        out
    }
}

impl InterfaceDecl {
    pub fn new(
        comments: Comments,
        declared: bool,
        name: Ident,
        tparams: Vec<TypeParam>,
        inheritance: Vec<Arc<RefType>>,
        members: Vec<Member>,
    ) -> Self {
        let index = MemberIndex::of(&members);
        InterfaceDecl {
            comments,
            declared,
            name,
            tparams,
            inheritance,
            members,
            index,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn index(&self) -> &MemberIndex {
        &self.index
    }

    pub fn with_members(&self, members: Vec<Member>) -> Self {
        let mut out = self.clone();
        out.index = MemberIndex::of(&members);
        out.members = members;
        out
    }

    pub fn with_name(&self, name: Ident) -> Self {
        let mut out = self.clone();
        out.name = name;
        out
    }
}

impl VarDecl {
    /// Pure copy-update of type and initializer.
    pub fn with_type(&self, ty: Option<Type>, init: Option<Expr>) -> Self {
        VarDecl {
            ty,
            init,
            ..self.clone()
        }
    }
}

impl TreeItem {
    /// The name this child introduces, if it is a named declaration.
    /// Modules and augmentations are named by the display form of their
    /// module name; global scopes, imports and exports are unnamed.
    pub fn name(&self) -> Option<Ident> {
        match self {
            TreeItem::Class(d) => Some(d.name.clone()),
            TreeItem::Interface(d) => Some(d.name.clone()),
            TreeItem::Enum(d) => Some(d.name.clone()),
            TreeItem::Function(d) => Some(d.name.clone()),
            TreeItem::Var(d) => Some(d.name.clone()),
            TreeItem::TypeAlias(d) => Some(d.name.clone()),
            TreeItem::Namespace(d) => Some(d.name.clone()),
            TreeItem::Module(d) => Some(Ident::new(d.name.to_string())),
            TreeItem::Augmented(d) => Some(Ident::new(d.name.to_string())),
            TreeItem::Global(_) | TreeItem::Import(_) | TreeItem::Export(_) => None,
        }
    }

    /// Named-entity equality: same kind and same name.
    pub fn is_same_entity(&self, other: &TreeItem) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
            && self.name().is_some()
            && self.name() == other.name()
    }

    /// Pointer-level sameness, used for structural-sharing checks.
    pub fn same(&self, other: &TreeItem) -> bool {
        match (self, other) {
            (TreeItem::Class(a), TreeItem::Class(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Interface(a), TreeItem::Interface(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Enum(a), TreeItem::Enum(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Function(a), TreeItem::Function(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Var(a), TreeItem::Var(b)) => Arc::ptr_eq(a, b),
            (TreeItem::TypeAlias(a), TreeItem::TypeAlias(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Namespace(a), TreeItem::Namespace(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Module(a), TreeItem::Module(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Augmented(a), TreeItem::Augmented(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Global(a), TreeItem::Global(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Import(a), TreeItem::Import(b)) => Arc::ptr_eq(a, b),
            (TreeItem::Export(a), TreeItem::Export(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            TreeItem::Class(d) => format!("class {}", d.name),
            TreeItem::Interface(d) => format!("interface {}", d.name),
            TreeItem::Enum(d) => format!("enum {}", d.name),
            TreeItem::Function(d) => format!("function {}", d.name),
            TreeItem::Var(d) => format!("var {}", d.name),
            TreeItem::TypeAlias(d) => format!("type {}", d.name),
            TreeItem::Namespace(d) => format!("namespace {}", d.name),
            TreeItem::Module(d) => format!("module {}", d.name),
            TreeItem::Augmented(d) => format!("augmented module {}", d.name),
            TreeItem::Global(_) => "global".to_string(),
            TreeItem::Import(_) => "import".to_string(),
            TreeItem::Export(_) => "export".to_string(),
        }
    }
}

impl Tree {
    pub fn label(&self) -> String {
        match self {
            Tree::File(_) => "file".to_string(),
            Tree::Item(item) => item.label(),
            Tree::Type(ty) => ty.label(),
            Tree::Member(member) => member.label(),
            Tree::Expr(expr) => format!("expr {}", expr),
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Convenience builders used heavily in tests and by parser frontends.
impl VarDecl {
    pub fn plain(name: impl Into<String>, ty: Option<Type>, init: Option<Expr>) -> Self {
        VarDecl {
            comments: Comments::new(),
            declared: false,
            read_only: false,
            name: Ident::new(name),
            ty,
            init,
        }
    }
}

impl TypeAliasDecl {
    pub fn plain(name: impl Into<String>, alias: Type) -> Self {
        TypeAliasDecl {
            comments: Comments::new(),
            declared: false,
            name: Ident::new(name),
            tparams: Vec::new(),
            alias,
        }
    }
}

impl FnDecl {
    pub fn plain(name: impl Into<String>, sig: Sig) -> Self {
        FnDecl {
            comments: Comments::new(),
            declared: false,
            name: Ident::new(name),
            sig,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::QIdent;

    #[test]
    fn test_std_lib_flag_is_derived() {
        let plain = SourceFile::new(Comments::new(), vec![], vec![]);
        assert!(!plain.is_std_lib());

        let lib = SourceFile::new(
            Comments::new(),
            vec![Directive::NoStdLib, Directive::LibRef("es2015".to_string())],
            vec![],
        );
        assert!(lib.is_std_lib());
    }

    #[test]
    fn test_with_children_recomputes_index() {
        let file = SourceFile::new(Comments::new(), vec![], vec![]);
        assert!(file.index().named().is_empty());

        let var = TreeItem::Var(Arc::new(VarDecl::plain("x", None, None)));
        let updated = file.with_children(vec![var]);
        assert_eq!(updated.index().named().len(), 1);
        assert!(file.index().named().is_empty());
    }

    #[test]
    fn test_named_entity_equality() {
        let a = TreeItem::Var(Arc::new(VarDecl::plain("x", None, None)));
        let b = TreeItem::Var(Arc::new(VarDecl::plain(
            "x",
            Some(Type::named(QIdent::single("string"))),
            None,
        )));
        let c = TreeItem::Var(Arc::new(VarDecl::plain("y", None, None)));
        assert!(a.is_same_entity(&b));
        assert!(!a.is_same_entity(&c));

        let iface = TreeItem::Interface(Arc::new(InterfaceDecl::new(
            Comments::new(),
            false,
            Ident::new("x"),
            vec![],
            vec![],
            vec![],
        )));
        assert!(!a.is_same_entity(&iface));
    }

    #[test]
    fn test_rename_is_a_new_node() {
        let class = ClassDecl::new(
            Comments::new(),
            false,
            false,
            Ident::new("A"),
            vec![],
            None,
            vec![],
            vec![],
        );
        let renamed = class.with_name(Ident::new("B"));
        assert_eq!(class.name, Ident::new("A"));
        assert_eq!(renamed.name, Ident::new("B"));
    }
}
