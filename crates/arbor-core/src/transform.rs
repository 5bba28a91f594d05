//! The generic tree-rewriting engine.
//!
//! A [`TreeTransformation`] is a context-threaded visitor with one
//! overridable `enter`/`leave` hook per node kind plus coarser per-category
//! hooks; the default per-kind hook delegates to its category default, so a
//! pass overrides only what it cares about. For every node the engine
//!
//! 1. derives an updated context via [`TreeTransformation::with_tree`],
//! 2. calls the kind-specific `enter` hook,
//! 3. recurses into children under the derived context,
//! 4. calls the kind-specific `leave` hook.
//!
//! Hooks are pure `node -> node` functions: they cannot fail or abort the
//! traversal. A pass that wants to report a problem carries it out-of-band
//! in its context, so one malformed subtree never poisons its siblings.
//!
//! Structural sharing: after recursing, each new child is compared to the
//! old one by pointer; a parent is reallocated iff at least one child
//! actually changed. A transformation whose hooks are all identity returns
//! the original root `Arc` untouched.

use std::sync::Arc;

use crate::expr::{BinaryExpr, CallExpr, CastExpr, Expr, UnaryExpr};
use crate::ident::{Ident, QIdent};
use crate::import::{Export, Exportee, Import};
use crate::lit::Lit;
use crate::member::{
    CallMember, CtorMember, FunctionMember, IndexMember, Indexing, MappedMember, Member,
    PropertyMember,
};
use crate::tree::{
    AugmentedDecl, ClassDecl, EnumDecl, EnumMember, FnDecl, GlobalDecl, HasChildren,
    InterfaceDecl, ModuleDecl, NamespaceDecl, SourceFile, Tree, TreeItem, TypeAliasDecl, VarDecl,
};
use crate::ty::{
    ConditionalType, CtorType, KeyofType, LookupType, ObjectType, Param, PredicateType, RefType,
    RepeatedType, Sig, TupleElem, TupleType, Type, TypeParam,
};

/// A rewriting pass over the tree, generic over a caller-supplied context
/// that is threaded down the traversal.
///
/// Per-kind hooks take the kind's payload and return the category enum, so
/// a hook may rewrite a node into a different kind; the engine re-dispatches
/// recursion and the `leave` hook on whatever kind came back.
#[allow(unused_variables)]
pub trait TreeTransformation<C: Clone> {
    /// Derive the context under which `tree` and its children are visited.
    fn with_tree(&self, ctx: &C, tree: &Tree) -> C {
        ctx.clone()
    }

    // ---- category hooks -------------------------------------------------

    fn enter_file(&self, ctx: &C, file: Arc<SourceFile>) -> Arc<SourceFile> {
        file
    }
    fn leave_file(&self, ctx: &C, file: Arc<SourceFile>) -> Arc<SourceFile> {
        file
    }
    fn enter_item(&self, ctx: &C, item: TreeItem) -> TreeItem {
        item
    }
    fn leave_item(&self, ctx: &C, item: TreeItem) -> TreeItem {
        item
    }
    fn enter_type(&self, ctx: &C, ty: Type) -> Type {
        ty
    }
    fn leave_type(&self, ctx: &C, ty: Type) -> Type {
        ty
    }
    fn enter_member(&self, ctx: &C, member: Member) -> Member {
        member
    }
    fn leave_member(&self, ctx: &C, member: Member) -> Member {
        member
    }
    fn enter_expr(&self, ctx: &C, expr: Expr) -> Expr {
        expr
    }
    fn leave_expr(&self, ctx: &C, expr: Expr) -> Expr {
        expr
    }

    // ---- per-kind hooks: declarations and containers --------------------

    fn enter_class(&self, ctx: &C, x: Arc<ClassDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Class(x))
    }
    fn leave_class(&self, ctx: &C, x: Arc<ClassDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Class(x))
    }
    fn enter_interface(&self, ctx: &C, x: Arc<InterfaceDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Interface(x))
    }
    fn leave_interface(&self, ctx: &C, x: Arc<InterfaceDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Interface(x))
    }
    fn enter_enum_decl(&self, ctx: &C, x: Arc<EnumDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Enum(x))
    }
    fn leave_enum_decl(&self, ctx: &C, x: Arc<EnumDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Enum(x))
    }
    fn enter_fn_decl(&self, ctx: &C, x: Arc<FnDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Function(x))
    }
    fn leave_fn_decl(&self, ctx: &C, x: Arc<FnDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Function(x))
    }
    fn enter_var(&self, ctx: &C, x: Arc<VarDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Var(x))
    }
    fn leave_var(&self, ctx: &C, x: Arc<VarDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Var(x))
    }
    fn enter_type_alias(&self, ctx: &C, x: Arc<TypeAliasDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::TypeAlias(x))
    }
    fn leave_type_alias(&self, ctx: &C, x: Arc<TypeAliasDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::TypeAlias(x))
    }
    fn enter_namespace(&self, ctx: &C, x: Arc<NamespaceDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Namespace(x))
    }
    fn leave_namespace(&self, ctx: &C, x: Arc<NamespaceDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Namespace(x))
    }
    fn enter_module(&self, ctx: &C, x: Arc<ModuleDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Module(x))
    }
    fn leave_module(&self, ctx: &C, x: Arc<ModuleDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Module(x))
    }
    fn enter_augmented(&self, ctx: &C, x: Arc<AugmentedDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Augmented(x))
    }
    fn leave_augmented(&self, ctx: &C, x: Arc<AugmentedDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Augmented(x))
    }
    fn enter_global(&self, ctx: &C, x: Arc<GlobalDecl>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Global(x))
    }
    fn leave_global(&self, ctx: &C, x: Arc<GlobalDecl>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Global(x))
    }
    fn enter_import(&self, ctx: &C, x: Arc<Import>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Import(x))
    }
    fn leave_import(&self, ctx: &C, x: Arc<Import>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Import(x))
    }
    fn enter_export(&self, ctx: &C, x: Arc<Export>) -> TreeItem {
        self.enter_item(ctx, TreeItem::Export(x))
    }
    fn leave_export(&self, ctx: &C, x: Arc<Export>) -> TreeItem {
        self.leave_item(ctx, TreeItem::Export(x))
    }

    // ---- per-kind hooks: types ------------------------------------------

    fn enter_ref(&self, ctx: &C, x: Arc<RefType>) -> Type {
        self.enter_type(ctx, Type::Ref(x))
    }
    fn leave_ref(&self, ctx: &C, x: Arc<RefType>) -> Type {
        self.leave_type(ctx, Type::Ref(x))
    }
    fn enter_literal_type(&self, ctx: &C, x: Lit) -> Type {
        self.enter_type(ctx, Type::Literal(x))
    }
    fn leave_literal_type(&self, ctx: &C, x: Lit) -> Type {
        self.leave_type(ctx, Type::Literal(x))
    }
    fn enter_object(&self, ctx: &C, x: Arc<ObjectType>) -> Type {
        self.enter_type(ctx, Type::Object(x))
    }
    fn leave_object(&self, ctx: &C, x: Arc<ObjectType>) -> Type {
        self.leave_type(ctx, Type::Object(x))
    }
    fn enter_fn_type(&self, ctx: &C, x: Arc<Sig>) -> Type {
        self.enter_type(ctx, Type::Function(x))
    }
    fn leave_fn_type(&self, ctx: &C, x: Arc<Sig>) -> Type {
        self.leave_type(ctx, Type::Function(x))
    }
    fn enter_ctor_type(&self, ctx: &C, x: Arc<CtorType>) -> Type {
        self.enter_type(ctx, Type::Constructor(x))
    }
    fn leave_ctor_type(&self, ctx: &C, x: Arc<CtorType>) -> Type {
        self.leave_type(ctx, Type::Constructor(x))
    }
    fn enter_union(&self, ctx: &C, x: Arc<crate::ty::UnionType>) -> Type {
        self.enter_type(ctx, Type::Union(x))
    }
    fn leave_union(&self, ctx: &C, x: Arc<crate::ty::UnionType>) -> Type {
        self.leave_type(ctx, Type::Union(x))
    }
    fn enter_intersect(&self, ctx: &C, x: Arc<crate::ty::IntersectType>) -> Type {
        self.enter_type(ctx, Type::Intersect(x))
    }
    fn leave_intersect(&self, ctx: &C, x: Arc<crate::ty::IntersectType>) -> Type {
        self.leave_type(ctx, Type::Intersect(x))
    }
    fn enter_tuple(&self, ctx: &C, x: Arc<TupleType>) -> Type {
        self.enter_type(ctx, Type::Tuple(x))
    }
    fn leave_tuple(&self, ctx: &C, x: Arc<TupleType>) -> Type {
        self.leave_type(ctx, Type::Tuple(x))
    }
    fn enter_keyof(&self, ctx: &C, x: Arc<KeyofType>) -> Type {
        self.enter_type(ctx, Type::Keyof(x))
    }
    fn leave_keyof(&self, ctx: &C, x: Arc<KeyofType>) -> Type {
        self.leave_type(ctx, Type::Keyof(x))
    }
    fn enter_lookup(&self, ctx: &C, x: Arc<LookupType>) -> Type {
        self.enter_type(ctx, Type::Lookup(x))
    }
    fn leave_lookup(&self, ctx: &C, x: Arc<LookupType>) -> Type {
        self.leave_type(ctx, Type::Lookup(x))
    }
    fn enter_query(&self, ctx: &C, x: QIdent) -> Type {
        self.enter_type(ctx, Type::Query(x))
    }
    fn leave_query(&self, ctx: &C, x: QIdent) -> Type {
        self.leave_type(ctx, Type::Query(x))
    }
    fn enter_conditional(&self, ctx: &C, x: Arc<ConditionalType>) -> Type {
        self.enter_type(ctx, Type::Conditional(x))
    }
    fn leave_conditional(&self, ctx: &C, x: Arc<ConditionalType>) -> Type {
        self.leave_type(ctx, Type::Conditional(x))
    }
    fn enter_infer(&self, ctx: &C, x: Ident) -> Type {
        self.enter_type(ctx, Type::Infer(x))
    }
    fn leave_infer(&self, ctx: &C, x: Ident) -> Type {
        self.leave_type(ctx, Type::Infer(x))
    }
    fn enter_this(&self, ctx: &C) -> Type {
        self.enter_type(ctx, Type::This)
    }
    fn leave_this(&self, ctx: &C) -> Type {
        self.leave_type(ctx, Type::This)
    }
    fn enter_repeated(&self, ctx: &C, x: Arc<RepeatedType>) -> Type {
        self.enter_type(ctx, Type::Repeated(x))
    }
    fn leave_repeated(&self, ctx: &C, x: Arc<RepeatedType>) -> Type {
        self.leave_type(ctx, Type::Repeated(x))
    }
    fn enter_predicate(&self, ctx: &C, x: Arc<PredicateType>) -> Type {
        self.enter_type(ctx, Type::Predicate(x))
    }
    fn leave_predicate(&self, ctx: &C, x: Arc<PredicateType>) -> Type {
        self.leave_type(ctx, Type::Predicate(x))
    }

    // ---- per-kind hooks: members ----------------------------------------

    fn enter_call_member(&self, ctx: &C, x: Arc<CallMember>) -> Member {
        self.enter_member(ctx, Member::Call(x))
    }
    fn leave_call_member(&self, ctx: &C, x: Arc<CallMember>) -> Member {
        self.leave_member(ctx, Member::Call(x))
    }
    fn enter_ctor_member(&self, ctx: &C, x: Arc<CtorMember>) -> Member {
        self.enter_member(ctx, Member::Ctor(x))
    }
    fn leave_ctor_member(&self, ctx: &C, x: Arc<CtorMember>) -> Member {
        self.leave_member(ctx, Member::Ctor(x))
    }
    fn enter_fn_member(&self, ctx: &C, x: Arc<FunctionMember>) -> Member {
        self.enter_member(ctx, Member::Function(x))
    }
    fn leave_fn_member(&self, ctx: &C, x: Arc<FunctionMember>) -> Member {
        self.leave_member(ctx, Member::Function(x))
    }
    fn enter_property(&self, ctx: &C, x: Arc<PropertyMember>) -> Member {
        self.enter_member(ctx, Member::Property(x))
    }
    fn leave_property(&self, ctx: &C, x: Arc<PropertyMember>) -> Member {
        self.leave_member(ctx, Member::Property(x))
    }
    fn enter_index_member(&self, ctx: &C, x: Arc<IndexMember>) -> Member {
        self.enter_member(ctx, Member::Index(x))
    }
    fn leave_index_member(&self, ctx: &C, x: Arc<IndexMember>) -> Member {
        self.leave_member(ctx, Member::Index(x))
    }
    fn enter_mapped(&self, ctx: &C, x: Arc<MappedMember>) -> Member {
        self.enter_member(ctx, Member::Mapped(x))
    }
    fn leave_mapped(&self, ctx: &C, x: Arc<MappedMember>) -> Member {
        self.leave_member(ctx, Member::Mapped(x))
    }

    // ---- invocation -----------------------------------------------------

    /// Run this pass over a whole source file.
    fn run(&self, ctx: &C, root: Arc<SourceFile>) -> Arc<SourceFile>
    where
        Self: Sized,
    {
        tracing::debug!("running tree transformation");
        visit_file(self, ctx, root)
    }
}

/// Pass composition, blanket-implemented so it is available on any
/// transformation without pinning its context type.
pub trait Then: Sized {
    /// Chain two passes into one: `a.then(b)` runs `a`'s effect followed by
    /// `b`'s at every hook point, with `b` seeing `a`'s context updates.
    fn then<B>(self, second: B) -> Combined<Self, B> {
        Combined {
            first: self,
            second,
        }
    }
}

impl<T: Sized> Then for T {}

/// The do-nothing transformation. Running it returns the original root
/// reference without reallocating anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<C: Clone> TreeTransformation<C> for Identity {}

// ---- the engine ---------------------------------------------------------

pub fn visit_file<C, T>(t: &T, ctx: &C, file: Arc<SourceFile>) -> Arc<SourceFile>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let ctx = t.with_tree(ctx, &Tree::File(file.clone()));
    let file = t.enter_file(&ctx, file);
    let file = match visit_item_list(t, &ctx, file.children()) {
        Some(children) => Arc::new(file.with_children(children)),
        None => file,
    };
    t.leave_file(&ctx, file)
}

pub fn visit_item<C, T>(t: &T, ctx: &C, item: TreeItem) -> TreeItem
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let ctx = t.with_tree(ctx, &Tree::Item(item.clone()));
    let entered = match item {
        TreeItem::Class(x) => t.enter_class(&ctx, x),
        TreeItem::Interface(x) => t.enter_interface(&ctx, x),
        TreeItem::Enum(x) => t.enter_enum_decl(&ctx, x),
        TreeItem::Function(x) => t.enter_fn_decl(&ctx, x),
        TreeItem::Var(x) => t.enter_var(&ctx, x),
        TreeItem::TypeAlias(x) => t.enter_type_alias(&ctx, x),
        TreeItem::Namespace(x) => t.enter_namespace(&ctx, x),
        TreeItem::Module(x) => t.enter_module(&ctx, x),
        TreeItem::Augmented(x) => t.enter_augmented(&ctx, x),
        TreeItem::Global(x) => t.enter_global(&ctx, x),
        TreeItem::Import(x) => t.enter_import(&ctx, x),
        TreeItem::Export(x) => t.enter_export(&ctx, x),
    };
    let recursed = recurse_item(t, &ctx, entered);
    match recursed {
        TreeItem::Class(x) => t.leave_class(&ctx, x),
        TreeItem::Interface(x) => t.leave_interface(&ctx, x),
        TreeItem::Enum(x) => t.leave_enum_decl(&ctx, x),
        TreeItem::Function(x) => t.leave_fn_decl(&ctx, x),
        TreeItem::Var(x) => t.leave_var(&ctx, x),
        TreeItem::TypeAlias(x) => t.leave_type_alias(&ctx, x),
        TreeItem::Namespace(x) => t.leave_namespace(&ctx, x),
        TreeItem::Module(x) => t.leave_module(&ctx, x),
        TreeItem::Augmented(x) => t.leave_augmented(&ctx, x),
        TreeItem::Global(x) => t.leave_global(&ctx, x),
        TreeItem::Import(x) => t.leave_import(&ctx, x),
        TreeItem::Export(x) => t.leave_export(&ctx, x),
    }
}

fn recurse_item<C, T>(t: &T, ctx: &C, item: TreeItem) -> TreeItem
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    match item {
        TreeItem::Class(x) => {
            let tparams = visit_tparam_list(t, ctx, &x.tparams);
            let parent = match &x.parent {
                Some(p) => visit_bounded_ref(t, ctx, p).map(Some),
                None => None,
            };
            let implements = visit_ref_list(t, ctx, &x.implements);
            let members = visit_member_list(t, ctx, x.members());
            if tparams.is_none() && parent.is_none() && implements.is_none() && members.is_none() {
                TreeItem::Class(x)
            } else {
                TreeItem::Class(Arc::new(ClassDecl::new(
                    x.comments.clone(),
                    x.declared,
                    x.is_abstract,
                    x.name.clone(),
                    tparams.unwrap_or_else(|| x.tparams.clone()),
                    parent.unwrap_or_else(|| x.parent.clone()),
                    implements.unwrap_or_else(|| x.implements.clone()),
                    members.unwrap_or_else(|| x.members().to_vec()),
                )))
            }
        }
        TreeItem::Interface(x) => {
            let tparams = visit_tparam_list(t, ctx, &x.tparams);
            let inheritance = visit_ref_list(t, ctx, &x.inheritance);
            let members = visit_member_list(t, ctx, x.members());
            if tparams.is_none() && inheritance.is_none() && members.is_none() {
                TreeItem::Interface(x)
            } else {
                TreeItem::Interface(Arc::new(InterfaceDecl::new(
                    x.comments.clone(),
                    x.declared,
                    x.name.clone(),
                    tparams.unwrap_or_else(|| x.tparams.clone()),
                    inheritance.unwrap_or_else(|| x.inheritance.clone()),
                    members.unwrap_or_else(|| x.members().to_vec()),
                )))
            }
        }
        TreeItem::Enum(x) => {
            let mut changed = false;
            let mut members = Vec::with_capacity(x.members.len());
            for member in &x.members {
                match &member.init {
                    Some(init) => {
                        let visited = visit_expr(t, ctx, init.clone());
                        if visited.same(init) {
                            members.push(member.clone());
                        } else {
                            changed = true;
                            members.push(EnumMember {
                                comments: member.comments.clone(),
                                name: member.name.clone(),
                                init: Some(visited),
                            });
                        }
                    }
                    None => members.push(member.clone()),
                }
            }
            if changed {
                TreeItem::Enum(Arc::new(EnumDecl {
                    members,
                    ..(*x).clone()
                }))
            } else {
                TreeItem::Enum(x)
            }
        }
        TreeItem::Function(x) => match visit_sig(t, ctx, &x.sig) {
            Some(sig) => TreeItem::Function(Arc::new(FnDecl {
                sig,
                ..(*x).clone()
            })),
            None => TreeItem::Function(x),
        },
        TreeItem::Var(x) => {
            let ty = visit_opt_type(t, ctx, &x.ty);
            let init = visit_opt_expr(t, ctx, &x.init);
            if ty.is_none() && init.is_none() {
                TreeItem::Var(x)
            } else {
                TreeItem::Var(Arc::new(x.with_type(
                    ty.unwrap_or_else(|| x.ty.clone()),
                    init.unwrap_or_else(|| x.init.clone()),
                )))
            }
        }
        TreeItem::TypeAlias(x) => {
            let tparams = visit_tparam_list(t, ctx, &x.tparams);
            let alias = visit_type(t, ctx, x.alias.clone());
            if tparams.is_none() && alias.same(&x.alias) {
                TreeItem::TypeAlias(x)
            } else {
                TreeItem::TypeAlias(Arc::new(TypeAliasDecl {
                    tparams: tparams.unwrap_or_else(|| x.tparams.clone()),
                    alias,
                    ..(*x).clone()
                }))
            }
        }
        TreeItem::Namespace(x) => match visit_item_list(t, ctx, x.children()) {
            Some(children) => TreeItem::Namespace(Arc::new(x.with_children(children))),
            None => TreeItem::Namespace(x),
        },
        TreeItem::Module(x) => match visit_item_list(t, ctx, x.children()) {
            Some(children) => TreeItem::Module(Arc::new(x.with_children(children))),
            None => TreeItem::Module(x),
        },
        TreeItem::Augmented(x) => match visit_item_list(t, ctx, x.children()) {
            Some(children) => TreeItem::Augmented(Arc::new(x.with_children(children))),
            None => TreeItem::Augmented(x),
        },
        TreeItem::Global(x) => match visit_item_list(t, ctx, x.children()) {
            Some(children) => TreeItem::Global(Arc::new(x.with_children(children))),
            None => TreeItem::Global(x),
        },
        TreeItem::Import(x) => TreeItem::Import(x),
        TreeItem::Export(x) => match &x.exported {
            Exportee::Tree(inner) => {
                let visited = visit_item(t, ctx, inner.clone());
                if visited.same(inner) {
                    TreeItem::Export(x)
                } else {
                    TreeItem::Export(Arc::new(Export {
                        comments: x.comments.clone(),
                        type_only: x.type_only,
                        kind: x.kind,
                        exported: Exportee::Tree(visited),
                    }))
                }
            }
            _ => TreeItem::Export(x),
        },
    }
}

pub fn visit_type<C, T>(t: &T, ctx: &C, ty: Type) -> Type
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let ctx = t.with_tree(ctx, &Tree::Type(ty.clone()));
    let entered = match ty {
        Type::Ref(x) => t.enter_ref(&ctx, x),
        Type::Literal(x) => t.enter_literal_type(&ctx, x),
        Type::Object(x) => t.enter_object(&ctx, x),
        Type::Function(x) => t.enter_fn_type(&ctx, x),
        Type::Constructor(x) => t.enter_ctor_type(&ctx, x),
        Type::Union(x) => t.enter_union(&ctx, x),
        Type::Intersect(x) => t.enter_intersect(&ctx, x),
        Type::Tuple(x) => t.enter_tuple(&ctx, x),
        Type::Keyof(x) => t.enter_keyof(&ctx, x),
        Type::Lookup(x) => t.enter_lookup(&ctx, x),
        Type::Query(x) => t.enter_query(&ctx, x),
        Type::Conditional(x) => t.enter_conditional(&ctx, x),
        Type::Infer(x) => t.enter_infer(&ctx, x),
        Type::This => t.enter_this(&ctx),
        Type::Repeated(x) => t.enter_repeated(&ctx, x),
        Type::Predicate(x) => t.enter_predicate(&ctx, x),
    };
    let recursed = recurse_type(t, &ctx, entered);
    match recursed {
        Type::Ref(x) => t.leave_ref(&ctx, x),
        Type::Literal(x) => t.leave_literal_type(&ctx, x),
        Type::Object(x) => t.leave_object(&ctx, x),
        Type::Function(x) => t.leave_fn_type(&ctx, x),
        Type::Constructor(x) => t.leave_ctor_type(&ctx, x),
        Type::Union(x) => t.leave_union(&ctx, x),
        Type::Intersect(x) => t.leave_intersect(&ctx, x),
        Type::Tuple(x) => t.leave_tuple(&ctx, x),
        Type::Keyof(x) => t.leave_keyof(&ctx, x),
        Type::Lookup(x) => t.leave_lookup(&ctx, x),
        Type::Query(x) => t.leave_query(&ctx, x),
        Type::Conditional(x) => t.leave_conditional(&ctx, x),
        Type::Infer(x) => t.leave_infer(&ctx, x),
        Type::This => t.leave_this(&ctx),
        Type::Repeated(x) => t.leave_repeated(&ctx, x),
        Type::Predicate(x) => t.leave_predicate(&ctx, x),
    }
}

fn recurse_type<C, T>(t: &T, ctx: &C, ty: Type) -> Type
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    match ty {
        Type::Ref(x) => match visit_type_list(t, ctx, &x.targs) {
            Some(targs) => Type::Ref(Arc::new(RefType {
                name: x.name.clone(),
                targs,
            })),
            None => Type::Ref(x),
        },
        Type::Object(x) => match visit_member_list(t, ctx, x.members()) {
            Some(members) => Type::Object(Arc::new(x.with_members(members))),
            None => Type::Object(x),
        },
        Type::Function(x) => match visit_sig(t, ctx, &x) {
            Some(sig) => Type::Function(Arc::new(sig)),
            None => Type::Function(x),
        },
        Type::Constructor(x) => match visit_sig(t, ctx, &x.sig) {
            Some(sig) => Type::Constructor(Arc::new(CtorType {
                is_abstract: x.is_abstract,
                sig,
            })),
            None => Type::Constructor(x),
        },
        Type::Union(x) => match visit_type_list(t, ctx, &x.types) {
            Some(types) => Type::union(types),
            None => Type::Union(x),
        },
        Type::Intersect(x) => match visit_type_list(t, ctx, &x.types) {
            Some(types) => Type::intersect(types),
            None => Type::Intersect(x),
        },
        Type::Tuple(x) => {
            let mut changed = false;
            let mut elems = Vec::with_capacity(x.elems.len());
            for elem in &x.elems {
                let visited = visit_type(t, ctx, elem.ty.clone());
                if visited.same(&elem.ty) {
                    elems.push(elem.clone());
                } else {
                    changed = true;
                    elems.push(TupleElem {
                        label: elem.label.clone(),
                        ty: visited,
                    });
                }
            }
            if changed {
                Type::Tuple(Arc::new(TupleType { elems }))
            } else {
                Type::Tuple(x)
            }
        }
        Type::Keyof(x) => {
            let of = visit_type(t, ctx, x.of.clone());
            if of.same(&x.of) {
                Type::Keyof(x)
            } else {
                Type::Keyof(Arc::new(KeyofType { of }))
            }
        }
        Type::Lookup(x) => {
            let from = visit_type(t, ctx, x.from.clone());
            let key = visit_type(t, ctx, x.key.clone());
            if from.same(&x.from) && key.same(&x.key) {
                Type::Lookup(x)
            } else {
                Type::Lookup(Arc::new(LookupType { from, key }))
            }
        }
        Type::Conditional(x) => {
            let pred = visit_type(t, ctx, x.pred.clone());
            let if_true = visit_type(t, ctx, x.if_true.clone());
            let if_false = visit_type(t, ctx, x.if_false.clone());
            if pred.same(&x.pred) && if_true.same(&x.if_true) && if_false.same(&x.if_false) {
                Type::Conditional(x)
            } else {
                Type::Conditional(Arc::new(ConditionalType {
                    pred,
                    if_true,
                    if_false,
                }))
            }
        }
        Type::Repeated(x) => {
            let underlying = visit_type(t, ctx, x.underlying.clone());
            if underlying.same(&x.underlying) {
                Type::Repeated(x)
            } else {
                Type::Repeated(Arc::new(RepeatedType { underlying }))
            }
        }
        Type::Predicate(x) => match visit_opt_type(t, ctx, &x.ty) {
            Some(pred_ty) => Type::Predicate(Arc::new(PredicateType {
                asserts: x.asserts,
                param: x.param.clone(),
                ty: pred_ty,
            })),
            None => Type::Predicate(x),
        },
        leaf @ (Type::Literal(_) | Type::Query(_) | Type::Infer(_) | Type::This) => leaf,
    }
}

pub fn visit_member<C, T>(t: &T, ctx: &C, member: Member) -> Member
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let ctx = t.with_tree(ctx, &Tree::Member(member.clone()));
    let entered = match member {
        Member::Call(x) => t.enter_call_member(&ctx, x),
        Member::Ctor(x) => t.enter_ctor_member(&ctx, x),
        Member::Function(x) => t.enter_fn_member(&ctx, x),
        Member::Property(x) => t.enter_property(&ctx, x),
        Member::Index(x) => t.enter_index_member(&ctx, x),
        Member::Mapped(x) => t.enter_mapped(&ctx, x),
    };
    let recursed = recurse_member(t, &ctx, entered);
    match recursed {
        Member::Call(x) => t.leave_call_member(&ctx, x),
        Member::Ctor(x) => t.leave_ctor_member(&ctx, x),
        Member::Function(x) => t.leave_fn_member(&ctx, x),
        Member::Property(x) => t.leave_property(&ctx, x),
        Member::Index(x) => t.leave_index_member(&ctx, x),
        Member::Mapped(x) => t.leave_mapped(&ctx, x),
    }
}

fn recurse_member<C, T>(t: &T, ctx: &C, member: Member) -> Member
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    match member {
        Member::Call(x) => match visit_sig(t, ctx, &x.sig) {
            Some(sig) => Member::Call(Arc::new(CallMember {
                comments: x.comments.clone(),
                sig,
            })),
            None => Member::Call(x),
        },
        Member::Ctor(x) => match visit_sig(t, ctx, &x.sig) {
            Some(sig) => Member::Ctor(Arc::new(CtorMember {
                comments: x.comments.clone(),
                sig,
            })),
            None => Member::Ctor(x),
        },
        Member::Function(x) => match visit_sig(t, ctx, &x.sig) {
            Some(sig) => Member::Function(Arc::new(FunctionMember {
                sig,
                ..(*x).clone()
            })),
            None => Member::Function(x),
        },
        Member::Property(x) => {
            let ty = visit_opt_type(t, ctx, &x.ty);
            let init = visit_opt_expr(t, ctx, &x.init);
            if ty.is_none() && init.is_none() {
                Member::Property(x)
            } else {
                Member::Property(Arc::new(x.with_type(
                    ty.unwrap_or_else(|| x.ty.clone()),
                    init.unwrap_or_else(|| x.init.clone()),
                )))
            }
        }
        Member::Index(x) => {
            let indexing = match &x.indexing {
                Indexing::Dict { name, ty } => {
                    let visited = visit_type(t, ctx, ty.clone());
                    if visited.same(ty) {
                        None
                    } else {
                        Some(Indexing::Dict {
                            name: name.clone(),
                            ty: visited,
                        })
                    }
                }
                Indexing::Single(_) => None,
            };
            let value_ty = visit_opt_type(t, ctx, &x.value_ty);
            if indexing.is_none() && value_ty.is_none() {
                Member::Index(x)
            } else {
                Member::Index(Arc::new(IndexMember {
                    comments: x.comments.clone(),
                    indexing: indexing.unwrap_or_else(|| x.indexing.clone()),
                    value_ty: value_ty.unwrap_or_else(|| x.value_ty.clone()),
                    is_read_only: x.is_read_only,
                }))
            }
        }
        Member::Mapped(x) => {
            let from = visit_type(t, ctx, x.from.clone());
            let as_remap = visit_opt_type(t, ctx, &x.as_remap);
            let to = visit_type(t, ctx, x.to.clone());
            if from.same(&x.from) && as_remap.is_none() && to.same(&x.to) {
                Member::Mapped(x)
            } else {
                Member::Mapped(Arc::new(MappedMember {
                    comments: x.comments.clone(),
                    key: x.key.clone(),
                    from,
                    as_remap: as_remap.unwrap_or_else(|| x.as_remap.clone()),
                    optionalize: x.optionalize,
                    readonly: x.readonly,
                    to,
                }))
            }
        }
    }
}

pub fn visit_expr<C, T>(t: &T, ctx: &C, expr: Expr) -> Expr
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let ctx = t.with_tree(ctx, &Tree::Expr(expr.clone()));
    let entered = t.enter_expr(&ctx, expr);
    let recursed = match entered {
        Expr::Call(x) => {
            let function = visit_expr(t, &ctx, x.function.clone());
            let args = visit_expr_list(t, &ctx, &x.args);
            if function.same(&x.function) && args.is_none() {
                Expr::Call(x)
            } else {
                Expr::Call(Arc::new(CallExpr {
                    function,
                    args: args.unwrap_or_else(|| x.args.clone()),
                }))
            }
        }
        Expr::Unary(x) => {
            let inner = visit_expr(t, &ctx, x.expr.clone());
            if inner.same(&x.expr) {
                Expr::Unary(x)
            } else {
                Expr::Unary(Arc::new(UnaryExpr {
                    op: x.op.clone(),
                    expr: inner,
                }))
            }
        }
        Expr::BinaryOp(x) => {
            let left = visit_expr(t, &ctx, x.left.clone());
            let right = visit_expr(t, &ctx, x.right.clone());
            if left.same(&x.left) && right.same(&x.right) {
                Expr::BinaryOp(x)
            } else {
                Expr::BinaryOp(Arc::new(BinaryExpr {
                    left,
                    op: x.op.clone(),
                    right,
                }))
            }
        }
        Expr::Cast(x) => {
            let inner = visit_expr(t, &ctx, x.expr.clone());
            let ty = visit_type(t, &ctx, x.ty.clone());
            if inner.same(&x.expr) && ty.same(&x.ty) {
                Expr::Cast(x)
            } else {
                Expr::Cast(Arc::new(CastExpr { expr: inner, ty }))
            }
        }
        Expr::ArrayOf(x) => {
            let inner = visit_expr(t, &ctx, (*x).clone());
            if inner.same(&x) {
                Expr::ArrayOf(x)
            } else {
                Expr::ArrayOf(Arc::new(inner))
            }
        }
        leaf @ (Expr::Ref(_) | Expr::Literal(_)) => leaf,
    };
    t.leave_expr(&ctx, recursed)
}

// ---- structural-sharing list and field helpers --------------------------

fn visit_item_list<C, T>(t: &T, ctx: &C, items: &[TreeItem]) -> Option<Vec<TreeItem>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let visited = visit_item(t, ctx, item.clone());
        changed |= !visited.same(item);
        out.push(visited);
    }
    changed.then_some(out)
}

fn visit_type_list<C, T>(t: &T, ctx: &C, types: &[Type]) -> Option<Vec<Type>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        let visited = visit_type(t, ctx, ty.clone());
        changed |= !visited.same(ty);
        out.push(visited);
    }
    changed.then_some(out)
}

fn visit_member_list<C, T>(t: &T, ctx: &C, members: &[Member]) -> Option<Vec<Member>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(members.len());
    for member in members {
        let visited = visit_member(t, ctx, member.clone());
        changed |= !visited.same(member);
        out.push(visited);
    }
    changed.then_some(out)
}

fn visit_expr_list<C, T>(t: &T, ctx: &C, exprs: &[Expr]) -> Option<Vec<Expr>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let visited = visit_expr(t, ctx, expr.clone());
        changed |= !visited.same(expr);
        out.push(visited);
    }
    changed.then_some(out)
}

fn visit_opt_type<C, T>(t: &T, ctx: &C, ty: &Option<Type>) -> Option<Option<Type>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    match ty {
        Some(inner) => {
            let visited = visit_type(t, ctx, inner.clone());
            if visited.same(inner) {
                None
            } else {
                Some(Some(visited))
            }
        }
        None => None,
    }
}

fn visit_opt_expr<C, T>(t: &T, ctx: &C, expr: &Option<Expr>) -> Option<Option<Expr>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    match expr {
        Some(inner) => {
            let visited = visit_expr(t, ctx, inner.clone());
            if visited.same(inner) {
                None
            } else {
                Some(Some(visited))
            }
        }
        None => None,
    }
}

fn visit_tparam_list<C, T>(t: &T, ctx: &C, tparams: &[TypeParam]) -> Option<Vec<TypeParam>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(tparams.len());
    for tparam in tparams {
        let bound = visit_opt_type(t, ctx, &tparam.bound);
        let default = visit_opt_type(t, ctx, &tparam.default);
        if bound.is_none() && default.is_none() {
            out.push(tparam.clone());
        } else {
            changed = true;
            out.push(TypeParam {
                name: tparam.name.clone(),
                bound: bound.unwrap_or_else(|| tparam.bound.clone()),
                default: default.unwrap_or_else(|| tparam.default.clone()),
            });
        }
    }
    changed.then_some(out)
}

fn visit_param_list<C, T>(t: &T, ctx: &C, params: &[Param]) -> Option<Vec<Param>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(params.len());
    for param in params {
        match visit_opt_type(t, ctx, &param.ty) {
            Some(ty) => {
                changed = true;
                out.push(Param {
                    name: param.name.clone(),
                    ty,
                    optional: param.optional,
                });
            }
            None => out.push(param.clone()),
        }
    }
    changed.then_some(out)
}

fn visit_sig<C, T>(t: &T, ctx: &C, sig: &Sig) -> Option<Sig>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let tparams = visit_tparam_list(t, ctx, &sig.tparams);
    let params = visit_param_list(t, ctx, &sig.params);
    let result = visit_opt_type(t, ctx, &sig.result);
    if tparams.is_none() && params.is_none() && result.is_none() {
        None
    } else {
        Some(Sig {
            comments: sig.comments.clone(),
            tparams: tparams.unwrap_or_else(|| sig.tparams.clone()),
            params: params.unwrap_or_else(|| sig.params.clone()),
            result: result.unwrap_or_else(|| sig.result.clone()),
        })
    }
}

// Extends/implements clauses only admit reference types; a hook that
// rewrites one into a different kind cannot be represented there, so the
// original reference shape is kept in that case.
fn visit_bounded_ref<C, T>(t: &T, ctx: &C, r: &Arc<RefType>) -> Option<Arc<RefType>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    match visit_type(t, ctx, Type::Ref(r.clone())) {
        Type::Ref(visited) if Arc::ptr_eq(&visited, r) => None,
        Type::Ref(visited) => Some(visited),
        _ => None,
    }
}

fn visit_ref_list<C, T>(t: &T, ctx: &C, refs: &[Arc<RefType>]) -> Option<Vec<Arc<RefType>>>
where
    C: Clone,
    T: TreeTransformation<C> + ?Sized,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(refs.len());
    for r in refs {
        match visit_bounded_ref(t, ctx, r) {
            Some(visited) => {
                changed = true;
                out.push(visited);
            }
            None => out.push(r.clone()),
        }
    }
    changed.then_some(out)
}

/// Two passes chained into one; built with [`Then::then`].
///
/// The second pass's context reflects the first's tree-location updates,
/// and both passes' hooks run at every hook point. When the first pass
/// rewrites a node to a different kind, the second sees it through its
/// category hook; the new kind's own hooks run when the engine re-enters
/// that node during recursion.
#[derive(Debug, Clone, Copy)]
pub struct Combined<A, B> {
    first: A,
    second: B,
}

macro_rules! chain_item_hook {
    ($($hook:ident => $variant:ident ($arg:ty), $cat:ident;)*) => {
        $(fn $hook(&self, ctx: &C, x: $arg) -> TreeItem {
            match self.first.$hook(ctx, x) {
                TreeItem::$variant(y) => self.second.$hook(ctx, y),
                other => self.second.$cat(ctx, other),
            }
        })*
    };
}

macro_rules! chain_type_hook {
    ($($hook:ident => $variant:ident ($arg:ty), $cat:ident;)*) => {
        $(fn $hook(&self, ctx: &C, x: $arg) -> Type {
            match self.first.$hook(ctx, x) {
                Type::$variant(y) => self.second.$hook(ctx, y),
                other => self.second.$cat(ctx, other),
            }
        })*
    };
}

macro_rules! chain_member_hook {
    ($($hook:ident => $variant:ident ($arg:ty), $cat:ident;)*) => {
        $(fn $hook(&self, ctx: &C, x: $arg) -> Member {
            match self.first.$hook(ctx, x) {
                Member::$variant(y) => self.second.$hook(ctx, y),
                other => self.second.$cat(ctx, other),
            }
        })*
    };
}

impl<C, A, B> TreeTransformation<C> for Combined<A, B>
where
    C: Clone,
    A: TreeTransformation<C>,
    B: TreeTransformation<C>,
{
    fn with_tree(&self, ctx: &C, tree: &Tree) -> C {
        let first = self.first.with_tree(ctx, tree);
        self.second.with_tree(&first, tree)
    }

    fn enter_file(&self, ctx: &C, file: Arc<SourceFile>) -> Arc<SourceFile> {
        self.second.enter_file(ctx, self.first.enter_file(ctx, file))
    }
    fn leave_file(&self, ctx: &C, file: Arc<SourceFile>) -> Arc<SourceFile> {
        self.second.leave_file(ctx, self.first.leave_file(ctx, file))
    }
    fn enter_item(&self, ctx: &C, item: TreeItem) -> TreeItem {
        self.second.enter_item(ctx, self.first.enter_item(ctx, item))
    }
    fn leave_item(&self, ctx: &C, item: TreeItem) -> TreeItem {
        self.second.leave_item(ctx, self.first.leave_item(ctx, item))
    }
    fn enter_type(&self, ctx: &C, ty: Type) -> Type {
        self.second.enter_type(ctx, self.first.enter_type(ctx, ty))
    }
    fn leave_type(&self, ctx: &C, ty: Type) -> Type {
        self.second.leave_type(ctx, self.first.leave_type(ctx, ty))
    }
    fn enter_member(&self, ctx: &C, member: Member) -> Member {
        self.second.enter_member(ctx, self.first.enter_member(ctx, member))
    }
    fn leave_member(&self, ctx: &C, member: Member) -> Member {
        self.second.leave_member(ctx, self.first.leave_member(ctx, member))
    }
    fn enter_expr(&self, ctx: &C, expr: Expr) -> Expr {
        self.second.enter_expr(ctx, self.first.enter_expr(ctx, expr))
    }
    fn leave_expr(&self, ctx: &C, expr: Expr) -> Expr {
        self.second.leave_expr(ctx, self.first.leave_expr(ctx, expr))
    }

    chain_item_hook! {
        enter_class => Class(Arc<ClassDecl>), enter_item;
        leave_class => Class(Arc<ClassDecl>), leave_item;
        enter_interface => Interface(Arc<InterfaceDecl>), enter_item;
        leave_interface => Interface(Arc<InterfaceDecl>), leave_item;
        enter_enum_decl => Enum(Arc<EnumDecl>), enter_item;
        leave_enum_decl => Enum(Arc<EnumDecl>), leave_item;
        enter_fn_decl => Function(Arc<FnDecl>), enter_item;
        leave_fn_decl => Function(Arc<FnDecl>), leave_item;
        enter_var => Var(Arc<VarDecl>), enter_item;
        leave_var => Var(Arc<VarDecl>), leave_item;
        enter_type_alias => TypeAlias(Arc<TypeAliasDecl>), enter_item;
        leave_type_alias => TypeAlias(Arc<TypeAliasDecl>), leave_item;
        enter_namespace => Namespace(Arc<NamespaceDecl>), enter_item;
        leave_namespace => Namespace(Arc<NamespaceDecl>), leave_item;
        enter_module => Module(Arc<ModuleDecl>), enter_item;
        leave_module => Module(Arc<ModuleDecl>), leave_item;
        enter_augmented => Augmented(Arc<AugmentedDecl>), enter_item;
        leave_augmented => Augmented(Arc<AugmentedDecl>), leave_item;
        enter_global => Global(Arc<GlobalDecl>), enter_item;
        leave_global => Global(Arc<GlobalDecl>), leave_item;
        enter_import => Import(Arc<Import>), enter_item;
        leave_import => Import(Arc<Import>), leave_item;
        enter_export => Export(Arc<Export>), enter_item;
        leave_export => Export(Arc<Export>), leave_item;
    }

    chain_type_hook! {
        enter_ref => Ref(Arc<RefType>), enter_type;
        leave_ref => Ref(Arc<RefType>), leave_type;
        enter_literal_type => Literal(Lit), enter_type;
        leave_literal_type => Literal(Lit), leave_type;
        enter_object => Object(Arc<ObjectType>), enter_type;
        leave_object => Object(Arc<ObjectType>), leave_type;
        enter_fn_type => Function(Arc<Sig>), enter_type;
        leave_fn_type => Function(Arc<Sig>), leave_type;
        enter_ctor_type => Constructor(Arc<CtorType>), enter_type;
        leave_ctor_type => Constructor(Arc<CtorType>), leave_type;
        enter_union => Union(Arc<crate::ty::UnionType>), enter_type;
        leave_union => Union(Arc<crate::ty::UnionType>), leave_type;
        enter_intersect => Intersect(Arc<crate::ty::IntersectType>), enter_type;
        leave_intersect => Intersect(Arc<crate::ty::IntersectType>), leave_type;
        enter_tuple => Tuple(Arc<TupleType>), enter_type;
        leave_tuple => Tuple(Arc<TupleType>), leave_type;
        enter_keyof => Keyof(Arc<KeyofType>), enter_type;
        leave_keyof => Keyof(Arc<KeyofType>), leave_type;
        enter_lookup => Lookup(Arc<LookupType>), enter_type;
        leave_lookup => Lookup(Arc<LookupType>), leave_type;
        enter_query => Query(QIdent), enter_type;
        leave_query => Query(QIdent), leave_type;
        enter_conditional => Conditional(Arc<ConditionalType>), enter_type;
        leave_conditional => Conditional(Arc<ConditionalType>), leave_type;
        enter_infer => Infer(Ident), enter_type;
        leave_infer => Infer(Ident), leave_type;
        enter_repeated => Repeated(Arc<RepeatedType>), enter_type;
        leave_repeated => Repeated(Arc<RepeatedType>), leave_type;
        enter_predicate => Predicate(Arc<PredicateType>), enter_type;
        leave_predicate => Predicate(Arc<PredicateType>), leave_type;
    }

    fn enter_this(&self, ctx: &C) -> Type {
        match self.first.enter_this(ctx) {
            Type::This => self.second.enter_this(ctx),
            other => self.second.enter_type(ctx, other),
        }
    }
    fn leave_this(&self, ctx: &C) -> Type {
        match self.first.leave_this(ctx) {
            Type::This => self.second.leave_this(ctx),
            other => self.second.leave_type(ctx, other),
        }
    }

    chain_member_hook! {
        enter_call_member => Call(Arc<CallMember>), enter_member;
        leave_call_member => Call(Arc<CallMember>), leave_member;
        enter_ctor_member => Ctor(Arc<CtorMember>), enter_member;
        leave_ctor_member => Ctor(Arc<CtorMember>), leave_member;
        enter_fn_member => Function(Arc<FunctionMember>), enter_member;
        leave_fn_member => Function(Arc<FunctionMember>), leave_member;
        enter_property => Property(Arc<PropertyMember>), enter_member;
        leave_property => Property(Arc<PropertyMember>), leave_member;
        enter_index_member => Index(Arc<IndexMember>), enter_member;
        leave_index_member => Index(Arc<IndexMember>), leave_member;
        enter_mapped => Mapped(Arc<MappedMember>), enter_member;
        leave_mapped => Mapped(Arc<MappedMember>), leave_member;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::Comments;

    #[test]
    fn test_identity_returns_original_reference() {
        let file = Arc::new(SourceFile::new(
            Comments::new(),
            vec![],
            vec![TreeItem::Var(Arc::new(VarDecl::plain(
                "x",
                Some(Type::named(QIdent::single("string"))),
                None,
            )))],
        ));
        let out = Identity.run(&(), file.clone());
        assert!(Arc::ptr_eq(&file, &out));
    }

    /// Uppercases every simple type-reference name.
    struct UppercaseRefs;

    impl<C: Clone> TreeTransformation<C> for UppercaseRefs {
        fn enter_ref(&self, _ctx: &C, x: Arc<RefType>) -> Type {
            match x.name.parts() {
                [only] => Type::named(QIdent::single(only.as_str().to_uppercase())),
                _ => Type::Ref(x),
            }
        }
    }

    #[test]
    fn test_per_kind_hook_rewrites() {
        let file = Arc::new(SourceFile::new(
            Comments::new(),
            vec![],
            vec![TreeItem::TypeAlias(Arc::new(TypeAliasDecl::plain(
                "A",
                Type::named(QIdent::single("string")),
            )))],
        ));
        let out = UppercaseRefs.run(&(), file);
        match &out.children()[0] {
            TreeItem::TypeAlias(alias) => assert_eq!(alias.alias.to_string(), "STRING"),
            other => panic!("unexpected item {}", other.label()),
        }
    }

    /// Counts visited nodes through the context hook.
    #[derive(Clone)]
    struct Depth(usize);

    struct DepthTracker;

    impl TreeTransformation<Depth> for DepthTracker {
        fn with_tree(&self, ctx: &Depth, _tree: &Tree) -> Depth {
            Depth(ctx.0 + 1)
        }
    }

    #[test]
    fn test_context_is_threaded() {
        // The context hook must run even when nothing changes.
        let file = Arc::new(SourceFile::new(
            Comments::new(),
            vec![],
            vec![TreeItem::Var(Arc::new(VarDecl::plain("x", None, None)))],
        ));
        let out = DepthTracker.run(&Depth(0), file.clone());
        assert!(Arc::ptr_eq(&file, &out));
    }

    /// Rewrites `string` to `number` at the category level.
    struct StringToNumber;

    impl<C: Clone> TreeTransformation<C> for StringToNumber {
        fn enter_type(&self, _ctx: &C, ty: Type) -> Type {
            if ty.to_string() == "string" {
                Type::named(QIdent::single("number"))
            } else {
                ty
            }
        }
    }

    #[test]
    fn test_category_hook_catches_all_kinds() {
        let file = Arc::new(SourceFile::new(
            Comments::new(),
            vec![],
            vec![TreeItem::TypeAlias(Arc::new(TypeAliasDecl::plain(
                "A",
                Type::union(vec![
                    Type::named(QIdent::single("string")),
                    Type::named(QIdent::single("boolean")),
                ]),
            )))],
        ));
        let out = StringToNumber.run(&(), file);
        match &out.children()[0] {
            TreeItem::TypeAlias(alias) => {
                assert_eq!(alias.alias.to_string(), "number | boolean")
            }
            other => panic!("unexpected item {}", other.label()),
        }
    }

    #[test]
    fn test_composition_runs_both_in_order() {
        let file = Arc::new(SourceFile::new(
            Comments::new(),
            vec![],
            vec![TreeItem::TypeAlias(Arc::new(TypeAliasDecl::plain(
                "A",
                Type::named(QIdent::single("string")),
            )))],
        ));
        // string -> number first, then uppercase the result.
        let combined = StringToNumber.then(UppercaseRefs);
        let out = combined.run(&(), file);
        match &out.children()[0] {
            TreeItem::TypeAlias(alias) => assert_eq!(alias.alias.to_string(), "NUMBER"),
            other => panic!("unexpected item {}", other.label()),
        }
    }

    #[test]
    fn test_composition_of_identities_shares_root() {
        let file = Arc::new(SourceFile::new(Comments::new(), vec![], vec![]));
        let combined = Identity.then(Identity).then(Identity);
        let out = combined.run(&(), file.clone());
        assert!(Arc::ptr_eq(&file, &out));
    }
}
