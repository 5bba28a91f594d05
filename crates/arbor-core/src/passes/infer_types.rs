//! Replace initializers with inferred declared types.
//!
//! Declaration files cannot carry runtime initializers, so a variable or
//! property that has an initializer but no declared type gets the widened
//! inferred type of the initializer instead. The rendered initializer is
//! kept as an attached comment so nothing is silently lost.

use std::sync::Arc;

use crate::algebra::{infer, widen};
use crate::comments::Comment;
use crate::member::{Member, PropertyMember};
use crate::transform::TreeTransformation;
use crate::tree::{TreeItem, VarDecl};

#[derive(Debug, Clone, Copy, Default)]
pub struct InferTypes;

impl<C: Clone> TreeTransformation<C> for InferTypes {
    fn enter_var(&self, _ctx: &C, x: Arc<VarDecl>) -> TreeItem {
        match (&x.ty, &x.init) {
            (None, Some(init)) => {
                let inferred = widen(&infer(init));
                tracing::debug!(name = %x.name, ty = %inferred, "inferred variable type");
                let mut out = x.with_type(Some(inferred), None);
                out.comments = x.comments.plus(Comment::raw(format!("/* {} */", init)));
                TreeItem::Var(Arc::new(out))
            }
            _ => TreeItem::Var(x),
        }
    }

    fn enter_property(&self, _ctx: &C, x: Arc<PropertyMember>) -> Member {
        match (&x.ty, &x.init) {
            (None, Some(init)) => {
                let inferred = widen(&infer(init));
                tracing::debug!(name = %x.name, ty = %inferred, "inferred property type");
                let mut out = x.with_type(Some(inferred), None);
                out.comments = x.comments.plus(Comment::raw(format!("/* {} */", init)));
                Member::Property(Arc::new(out))
            }
            _ => Member::Property(x),
        }
    }
}
