//! Algebraic simplification over union and intersection type lists,
//! literal widening, and expression → type inference.
//!
//! Simplification is where the flattening invariant lives: construction may
//! nest unions inside unions, but a simplified list never contains a
//! top-level element of its own kind. Deduplication is by rendered form,
//! keyed through an order-preserving map so first occurrences win.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::comments::Comments;
use crate::expr::Expr;
use crate::ident::QIdent;
use crate::lit::Lit;
use crate::ty::{ObjectType, RefType, Type};

/// Process-wide singletons for the well-known types. Cloning shares the
/// underlying allocation, so every `string()` result is pointer-identical.
pub mod well_known {
    use super::*;

    static STRING: Lazy<Type> = Lazy::new(|| Type::named(QIdent::single("string")));
    static NUMBER: Lazy<Type> = Lazy::new(|| Type::named(QIdent::single("number")));
    static BOOLEAN: Lazy<Type> = Lazy::new(|| Type::named(QIdent::single("boolean")));
    static NEVER: Lazy<Type> = Lazy::new(|| Type::named(QIdent::single("never")));
    static ANY: Lazy<Type> = Lazy::new(|| Type::named(QIdent::single("any")));
    static UNKNOWN: Lazy<Type> = Lazy::new(|| Type::named(QIdent::single("unknown")));

    pub fn string() -> Type {
        STRING.clone()
    }

    pub fn number() -> Type {
        NUMBER.clone()
    }

    pub fn boolean() -> Type {
        BOOLEAN.clone()
    }

    /// The bottom type, used for empty simplified lists.
    pub fn never() -> Type {
        NEVER.clone()
    }

    pub fn any() -> Type {
        ANY.clone()
    }

    /// The default type inferred when nothing better is known.
    pub fn unknown() -> Type {
        UNKNOWN.clone()
    }

    pub fn array(elem: Type) -> Type {
        Type::Ref(Arc::new(RefType {
            name: QIdent::single("Array"),
            targs: vec![elem],
        }))
    }
}

/// Recursively splice members of nested unions into one level, preserving
/// first-seen depth-first order.
pub fn flatten_unions(types: &[Type]) -> Vec<Type> {
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        match ty {
            Type::Union(u) => out.extend(flatten_unions(&u.types)),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Intersection counterpart of [`flatten_unions`].
pub fn flatten_intersects(types: &[Type]) -> Vec<Type> {
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        match ty {
            Type::Intersect(i) => out.extend(flatten_intersects(&i.types)),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Deduplicate by rendered form, keeping the first occurrence of each.
fn dedup_by_rendered(types: Vec<Type>) -> Vec<Type> {
    let mut seen: IndexMap<String, Type> = IndexMap::with_capacity(types.len());
    for ty in types {
        seen.entry(ty.to_string()).or_insert(ty);
    }
    seen.into_values().collect()
}

fn collapse(mut types: Vec<Type>, wrap: fn(Vec<Type>) -> Type) -> Type {
    match types.len() {
        0 => well_known::never(),
        1 => types.remove(0),
        _ => wrap(types),
    }
}

/// Flatten, deduplicate and collapse a union member list.
///
/// Zero members simplify to `never`; a single member is returned unwrapped.
pub fn simplify_union(types: Vec<Type>) -> Type {
    let flat = dedup_by_rendered(flatten_unions(&types));
    tracing::trace!(input = types.len(), distinct = flat.len(), "simplify union");
    collapse(flat, Type::union)
}

/// Simplify an intersection member list.
///
/// Structurally compatible object types in the input are first merged into
/// a single object type whose member list is the concatenation of all of
/// theirs (duplicates are preserved); then the list is flattened,
/// deduplicated and collapsed exactly as for unions.
pub fn simplify_intersect(types: Vec<Type>) -> Type {
    let object_count = types
        .iter()
        .filter(|ty| matches!(ty, Type::Object(_)))
        .count();

    let input = if object_count > 1 {
        let mut comments = Comments::new();
        let mut members = Vec::new();
        let mut rest = Vec::new();
        for ty in types {
            match ty {
                Type::Object(o) => {
                    comments = comments.concat(&o.comments);
                    members.extend(o.members().iter().cloned());
                }
                other => rest.push(other),
            }
        }
        let merged = Type::Object(Arc::new(ObjectType::new(comments, members)));
        let mut input = Vec::with_capacity(rest.len() + 1);
        input.push(merged);
        input.extend(rest);
        input
    } else {
        types
    };

    let flat = dedup_by_rendered(flatten_intersects(&input));
    tracing::trace!(distinct = flat.len(), "simplify intersection");
    collapse(flat, Type::intersect)
}

/// Widen a type to its base primitive: literal types widen to
/// string/number/boolean, references to a primitive base widen to
/// themselves, anything else widens to the default type.
pub fn widen(ty: &Type) -> Type {
    match ty {
        Type::Literal(Lit::Str(_)) => well_known::string(),
        Type::Literal(Lit::Num(_)) => well_known::number(),
        Type::Literal(Lit::Bool(_)) => well_known::boolean(),
        Type::Ref(r) if r.targs.is_empty() && is_primitive_name(&r.name) => ty.clone(),
        _ => well_known::unknown(),
    }
}

fn is_primitive_name(name: &QIdent) -> bool {
    match name.parts() {
        [only] => matches!(only.as_str(), "string" | "number" | "boolean"),
        _ => false,
    }
}

/// Infer a type from an initializer expression.
pub fn infer(expr: &Expr) -> Type {
    match expr {
        Expr::Ref(_) => well_known::unknown(),
        Expr::Literal(lit) => Type::Literal(lit.clone()),
        Expr::Call(_) => well_known::any(),
        Expr::Cast(cast) => cast.ty.clone(),
        Expr::ArrayOf(elem) => well_known::array(infer(elem)),
        Expr::Unary(unary) => widen(&infer(&unary.expr)),
        Expr::BinaryOp(binary) => {
            let both_numeric = matches!(&binary.left, Expr::Literal(l) if l.is_numeric())
                && matches!(&binary.right, Expr::Literal(l) if l.is_numeric());
            if both_numeric && matches!(binary.op.as_str(), "+" | "*") {
                well_known::number()
            } else {
                widen(&infer(&binary.left))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryExpr, CallExpr, CastExpr, UnaryExpr};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn string() -> Type {
        well_known::string()
    }

    fn number() -> Type {
        well_known::number()
    }

    #[test]
    fn test_flatten_is_order_preserving_and_exhaustive() {
        let nested = vec![
            Type::union(vec![string(), number()]),
            well_known::boolean(),
        ];
        let flat = flatten_unions(&nested);
        assert_eq!(flat, vec![string(), number(), well_known::boolean()]);
        assert!(flat.iter().all(|t| !matches!(t, Type::Union(_))));

        let deep = vec![Type::union(vec![
            Type::union(vec![string()]),
            Type::union(vec![number(), Type::union(vec![well_known::boolean()])]),
        ])];
        assert_eq!(
            flatten_unions(&deep),
            vec![string(), number(), well_known::boolean()]
        );
    }

    #[test]
    fn test_zero_one_many_collapsing() {
        assert_eq!(simplify_union(vec![]), well_known::never());
        assert_eq!(simplify_union(vec![string()]), string());
        assert_eq!(simplify_union(vec![string(), string()]), string());
        assert_eq!(
            simplify_union(vec![string(), number()]),
            Type::union(vec![string(), number()])
        );
    }

    #[test]
    fn test_union_dedup_keeps_first_occurrence_order() {
        let simplified = simplify_union(vec![number(), string(), number(), string()]);
        assert_eq!(simplified, Type::union(vec![number(), string()]));
    }

    #[test]
    fn test_intersection_merges_objects() {
        use crate::comments::Comments;
        use crate::ident::Ident;
        use crate::member::{Member, PropertyMember};

        let prop = |name: &str| {
            Member::Property(Arc::new(PropertyMember {
                comments: Comments::new(),
                name: Ident::new(name),
                ty: Some(string()),
                init: None,
                is_static: false,
                is_read_only: false,
                optional: false,
            }))
        };
        let a = Type::Object(Arc::new(ObjectType::new(Comments::new(), vec![prop("a")])));
        let b = Type::Object(Arc::new(ObjectType::new(
            Comments::new(),
            vec![prop("b"), prop("a")],
        )));

        let merged = simplify_intersect(vec![a, b, string()]);
        match merged {
            Type::Intersect(i) => {
                assert_eq!(i.types.len(), 2);
                match &i.types[0] {
                    Type::Object(o) => {
                        // Concatenated, duplicates preserved structurally.
                        assert_eq!(o.members().len(), 3);
                    }
                    other => panic!("expected merged object, got {}", other),
                }
                assert_eq!(i.types[1], string());
            }
            other => panic!("expected intersection, got {}", other),
        }
    }

    #[test]
    fn test_intersection_single_object_untouched() {
        let a = Type::Object(Arc::new(ObjectType::new(Comments::new(), vec![])));
        assert_eq!(simplify_intersect(vec![a.clone()]), a);
    }

    #[test]
    fn test_widen() {
        assert_eq!(widen(&Type::Literal(Lit::str("x"))), string());
        assert_eq!(widen(&Type::Literal(Lit::num("1"))), number());
        assert_eq!(widen(&Type::Literal(Lit::Bool(true))), well_known::boolean());
        assert_eq!(widen(&string()), string());
        assert_eq!(
            widen(&Type::named(QIdent::of(&["Foo"]))),
            well_known::unknown()
        );
        assert_eq!(
            widen(&well_known::array(string())),
            well_known::unknown()
        );
    }

    #[test]
    fn test_infer() {
        assert_eq!(infer(&Expr::Ref(QIdent::single("x"))), well_known::unknown());
        assert_eq!(
            infer(&Expr::Literal(Lit::str("hi"))),
            Type::Literal(Lit::str("hi"))
        );
        assert_eq!(
            infer(&Expr::Call(Arc::new(CallExpr {
                function: Expr::Ref(QIdent::single("f")),
                args: vec![],
            }))),
            well_known::any()
        );
        assert_eq!(
            infer(&Expr::Cast(Arc::new(CastExpr {
                expr: Expr::Literal(Lit::num("1")),
                ty: string(),
            }))),
            string()
        );
        assert_eq!(
            infer(&Expr::ArrayOf(Arc::new(Expr::Literal(Lit::num("1"))))),
            well_known::array(Type::Literal(Lit::num("1")))
        );
        assert_eq!(
            infer(&Expr::Unary(Arc::new(UnaryExpr {
                op: "-".to_string(),
                expr: Expr::Literal(Lit::num("1")),
            }))),
            number()
        );
    }

    #[test]
    fn test_infer_binary_ops() {
        let num_plus_num = Expr::BinaryOp(Arc::new(BinaryExpr {
            left: Expr::Literal(Lit::num("1")),
            op: "+".to_string(),
            right: Expr::Literal(Lit::num("2")),
        }));
        assert_eq!(infer(&num_plus_num), number());

        let str_plus_num = Expr::BinaryOp(Arc::new(BinaryExpr {
            left: Expr::Literal(Lit::str("a")),
            op: "+".to_string(),
            right: Expr::Literal(Lit::num("2")),
        }));
        assert_eq!(infer(&str_plus_num), string());

        let num_minus_num = Expr::BinaryOp(Arc::new(BinaryExpr {
            left: Expr::Literal(Lit::num("3")),
            op: "-".to_string(),
            right: Expr::Literal(Lit::num("2")),
        }));
        assert_eq!(infer(&num_minus_num), number());
    }

    fn arb_type() -> impl Strategy<Value = Type> {
        let leaf = prop_oneof![
            Just(well_known::string()),
            Just(well_known::number()),
            Just(well_known::boolean()),
            "[a-z]{1,4}".prop_map(|s| Type::Literal(Lit::str(s))),
            "[A-Z][a-z]{0,3}".prop_map(|s| Type::named(QIdent::single(s))),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Type::union),
                proptest::collection::vec(inner, 0..4).prop_map(Type::intersect),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_simplify_union_idempotent(types in proptest::collection::vec(arb_type(), 0..6)) {
            let once = simplify_union(types);
            let twice = simplify_union(vec![once.clone()]);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_simplify_intersect_idempotent(types in proptest::collection::vec(arb_type(), 0..6)) {
            let once = simplify_intersect(types);
            let twice = simplify_intersect(vec![once.clone()]);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_flatten_leaves_no_nested_unions(types in proptest::collection::vec(arb_type(), 0..6)) {
            let flat = flatten_unions(&types);
            prop_assert!(flat.iter().all(|t| !matches!(t, Type::Union(_))));
        }
    }
}
