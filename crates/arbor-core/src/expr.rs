//! Initializer expressions.
//!
//! Only the subset needed to infer a declared type from an initializer is
//! modeled; anything richer is the parser's concern. Every expression has a
//! deterministic rendered form used for traceability comments.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::ident::QIdent;
use crate::lit::Lit;
use crate::ty::Type;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Ref(QIdent),
    Literal(Lit),
    Call(Arc<CallExpr>),
    Unary(Arc<UnaryExpr>),
    BinaryOp(Arc<BinaryExpr>),
    Cast(Arc<CastExpr>),
    ArrayOf(Arc<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub function: Expr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub op: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Expr,
    pub op: String,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastExpr {
    pub expr: Expr,
    pub ty: Type,
}

impl Expr {
    pub fn lit(lit: Lit) -> Self {
        Expr::Literal(lit)
    }

    /// Pointer-level sameness, used by the rewriting engine to decide
    /// whether a parent must be reallocated. Leaf kinds compare by value.
    pub fn same(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Ref(a), Expr::Ref(b)) => a == b,
            (Expr::Literal(a), Expr::Literal(b)) => a == b,
            (Expr::Call(a), Expr::Call(b)) => Arc::ptr_eq(a, b),
            (Expr::Unary(a), Expr::Unary(b)) => Arc::ptr_eq(a, b),
            (Expr::BinaryOp(a), Expr::BinaryOp(b)) => Arc::ptr_eq(a, b),
            (Expr::Cast(a), Expr::Cast(b)) => Arc::ptr_eq(a, b),
            (Expr::ArrayOf(a), Expr::ArrayOf(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ref(name) => write!(f, "{}", name),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Call(call) => {
                write!(f, "{}(", call.function)?;
                let mut first = true;
                for arg in &call.args {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                    first = false;
                }
                write!(f, ")")
            }
            Expr::Unary(unary) => write!(f, "{}{}", unary.op, unary.expr),
            Expr::BinaryOp(binary) => {
                write!(f, "{} {} {}", binary.left, binary.op, binary.right)
            }
            Expr::Cast(cast) => write!(f, "{} as {}", cast.expr, cast.ty),
            Expr::ArrayOf(elem) => write!(f, "[{}]", elem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let call = Expr::Call(Arc::new(CallExpr {
            function: Expr::Ref(QIdent::of(&["Object", "freeze"])),
            args: vec![Expr::lit(Lit::num("1")), Expr::lit(Lit::str("x"))],
        }));
        assert_eq!(call.to_string(), "Object.freeze(1, \"x\")");

        let sum = Expr::BinaryOp(Arc::new(BinaryExpr {
            left: Expr::lit(Lit::num("1")),
            op: "+".to_string(),
            right: Expr::Unary(Arc::new(UnaryExpr {
                op: "-".to_string(),
                expr: Expr::lit(Lit::num("2")),
            })),
        }));
        assert_eq!(sum.to_string(), "1 + -2");
    }

    #[test]
    fn test_same_is_pointer_identity_for_composites() {
        let a = Expr::ArrayOf(Arc::new(Expr::lit(Lit::num("1"))));
        let b = a.clone();
        assert!(a.same(&b));

        let c = Expr::ArrayOf(Arc::new(Expr::lit(Lit::num("1"))));
        assert_eq!(a, c);
        assert!(!a.same(&c));
    }
}
