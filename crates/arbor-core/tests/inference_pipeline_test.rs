//! End-to-end runs of the bundled passes, alone and composed.

use std::sync::Arc;

use arbor_core::algebra::well_known;
use arbor_core::comments::Comments;
use arbor_core::expr::Expr;
use arbor_core::lit::Lit;
use arbor_core::passes::{InferTypes, SimplifyTypes};
use arbor_core::transform::{Then, TreeTransformation};
use arbor_core::tree::{HasChildren, SourceFile, TreeItem, TypeAliasDecl, VarDecl};
use arbor_core::ty::Type;

fn file_of(items: Vec<TreeItem>) -> Arc<SourceFile> {
    Arc::new(SourceFile::new(Comments::new(), vec![], items))
}

#[test]
fn test_initializer_becomes_declared_type_with_trace() {
    let file = file_of(vec![TreeItem::Var(Arc::new(VarDecl::plain(
        "greeting",
        None,
        Some(Expr::lit(Lit::str("hello"))),
    )))]);
    let out = InferTypes.run(&(), file);

    match &out.children()[0] {
        TreeItem::Var(var) => {
            assert_eq!(var.ty, Some(well_known::string()));
            assert_eq!(var.init, None);
            // The dropped initializer survives as an attached comment.
            assert!(var.comments.contains("\"hello\""));
        }
        other => panic!("unexpected item {}", other.label()),
    }
}

#[test]
fn test_passes_compose_in_declaration_order() {
    // The initializer infers to a literal type widened to string; the
    // surrounding union then simplifies away the duplicate.
    let alias = TreeItem::TypeAlias(Arc::new(TypeAliasDecl::plain(
        "Key",
        Type::union(vec![
            well_known::string(),
            Type::union(vec![well_known::string(), well_known::number()]),
        ]),
    )));
    let var = TreeItem::Var(Arc::new(VarDecl::plain(
        "port",
        None,
        Some(Expr::lit(Lit::num("8080"))),
    )));
    let file = file_of(vec![alias, var]);

    let pipeline = InferTypes.then(SimplifyTypes);
    let out = pipeline.run(&(), file);

    match &out.children()[0] {
        TreeItem::TypeAlias(alias) => {
            assert_eq!(alias.alias.to_string(), "string | number")
        }
        other => panic!("unexpected item {}", other.label()),
    }
    match &out.children()[1] {
        TreeItem::Var(var) => assert_eq!(var.ty, Some(well_known::number())),
        other => panic!("unexpected item {}", other.label()),
    }
}

#[test]
fn test_composed_pipeline_is_a_noop_on_normalized_input() {
    let file = file_of(vec![TreeItem::Var(Arc::new(VarDecl::plain(
        "ready",
        Some(well_known::boolean()),
        None,
    )))]);
    let pipeline = InferTypes.then(SimplifyTypes);
    let out = pipeline.run(&(), file.clone());
    assert!(Arc::ptr_eq(&file, &out));
}

/// Context that tracks the current nesting depth while visiting.
#[derive(Clone)]
struct Depth(usize);

/// Records the deepest level at which a union was simplified.
struct DepthAwareSimplify;

impl TreeTransformation<Depth> for DepthAwareSimplify {
    fn with_tree(&self, ctx: &Depth, _tree: &arbor_core::Tree) -> Depth {
        Depth(ctx.0 + 1)
    }

    fn leave_union(&self, ctx: &Depth, x: Arc<arbor_core::ty::UnionType>) -> Type {
        // The nested union sits strictly deeper than the file root.
        assert!(ctx.0 >= 3);
        arbor_core::algebra::simplify_union(x.types.clone())
    }
}

#[test]
fn test_context_reflects_position_in_the_tree() {
    let file = file_of(vec![TreeItem::TypeAlias(Arc::new(TypeAliasDecl::plain(
        "T",
        Type::union(vec![well_known::string(), well_known::string()]),
    )))]);
    let out = DepthAwareSimplify.run(&Depth(0), file);
    match &out.children()[0] {
        TreeItem::TypeAlias(alias) => assert_eq!(alias.alias, well_known::string()),
        other => panic!("unexpected item {}", other.label()),
    }
}
