//! Normalize union and intersection types bottom-up.
//!
//! Runs on `leave` so every member list is already simplified when its
//! parent is considered; one traversal therefore reaches a fixed point.

use std::sync::Arc;

use crate::algebra::{simplify_intersect, simplify_union};
use crate::transform::TreeTransformation;
use crate::ty::{IntersectType, Type, UnionType};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimplifyTypes;

impl<C: Clone> TreeTransformation<C> for SimplifyTypes {
    fn leave_union(&self, _ctx: &C, x: Arc<UnionType>) -> Type {
        simplify_union(x.types.clone())
    }

    fn leave_intersect(&self, _ctx: &C, x: Arc<IntersectType>) -> Type {
        simplify_intersect(x.types.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::well_known;
    use crate::comments::Comments;
    use crate::tree::{HasChildren, SourceFile, TreeItem, TypeAliasDecl};

    fn simplify(alias: Type) -> Type {
        let file = Arc::new(SourceFile::new(
            Comments::new(),
            vec![],
            vec![TreeItem::TypeAlias(Arc::new(TypeAliasDecl::plain(
                "T", alias,
            )))],
        ));
        let out = SimplifyTypes.run(&(), file);
        match &out.children()[0] {
            TreeItem::TypeAlias(alias) => alias.alias.clone(),
            other => panic!("unexpected item {}", other.label()),
        }
    }

    #[test]
    fn test_nested_unions_flatten_in_one_pass() {
        let nested = Type::union(vec![
            Type::union(vec![well_known::string(), well_known::number()]),
            Type::union(vec![well_known::number(), well_known::boolean()]),
        ]);
        assert_eq!(
            simplify(nested).to_string(),
            "string | number | boolean"
        );
    }

    #[test]
    fn test_singleton_union_unwraps() {
        let single = Type::union(vec![well_known::string(), well_known::string()]);
        assert_eq!(simplify(single), well_known::string());
    }

    #[test]
    fn test_union_inside_intersection() {
        // Bottom-up order: the inner union is simplified before the
        // intersection that contains it.
        let ty = Type::intersect(vec![
            Type::union(vec![well_known::string(), well_known::string()]),
            well_known::number(),
        ]);
        assert_eq!(simplify(ty).to_string(), "string & number");
    }
}
