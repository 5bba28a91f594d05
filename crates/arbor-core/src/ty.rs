//! The algebraic type grammar.
//!
//! [`Type`] is a closed sum; every composite kind lives behind an [`Arc`]
//! so that structural sharing is plain pointer sharing and the rewriting
//! engine can detect change with `Arc::ptr_eq`. The `Display` impl is the
//! deterministic rendered form used for deduplication and debugging, not a
//! full emitter.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::comments::Comments;
use crate::ident::{Ident, QIdent};
use crate::index::MemberIndex;
use crate::lit::Lit;
use crate::member::Member;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    /// Named reference with optional generic arguments: `A.B<T, U>`.
    Ref(Arc<RefType>),
    /// Literal type: `"a"`, `1`, `true`.
    Literal(Lit),
    /// Structural object type: `{ a: string, b(): void }`.
    Object(Arc<ObjectType>),
    /// Function type: `(a: T) => R`.
    Function(Arc<Sig>),
    /// Constructor type: `new (a: T) => R`.
    Constructor(Arc<CtorType>),
    Union(Arc<UnionType>),
    Intersect(Arc<IntersectType>),
    Tuple(Arc<TupleType>),
    Keyof(Arc<KeyofType>),
    /// Indexed lookup: `T[K]`.
    Lookup(Arc<LookupType>),
    /// Type query: `typeof a.b`.
    Query(QIdent),
    Conditional(Arc<ConditionalType>),
    /// Inference binder inside a conditional: `infer T`.
    Infer(Ident),
    This,
    /// Rest/repeated element: `...T`.
    Repeated(Arc<RepeatedType>),
    /// Type predicate: `x is T`, `asserts x is T`, `asserts x`.
    Predicate(Arc<PredicateType>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefType {
    pub name: QIdent,
    pub targs: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectType {
    pub comments: Comments,
    members: Vec<Member>,
    #[serde(skip)]
    index: MemberIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtorType {
    pub is_abstract: bool,
    pub sig: Sig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionType {
    pub types: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectType {
    pub types: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleType {
    pub elems: Vec<TupleElem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleElem {
    pub label: Option<Ident>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyofType {
    pub of: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupType {
    pub from: Type,
    pub key: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalType {
    pub pred: Type,
    pub if_true: Type,
    pub if_false: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatedType {
    pub underlying: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateType {
    pub asserts: bool,
    pub param: Ident,
    pub ty: Option<Type>,
}

/// A call/function signature shared by function types, constructor types,
/// function declarations and methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sig {
    pub comments: Comments,
    pub tparams: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub result: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<Type>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeParam {
    pub name: Ident,
    pub bound: Option<Type>,
    pub default: Option<Type>,
}

impl Type {
    /// Named reference without generic arguments.
    pub fn named(name: QIdent) -> Self {
        Type::Ref(Arc::new(RefType {
            name,
            targs: Vec::new(),
        }))
    }

    pub fn union(types: Vec<Type>) -> Self {
        Type::Union(Arc::new(UnionType { types }))
    }

    pub fn intersect(types: Vec<Type>) -> Self {
        Type::Intersect(Arc::new(IntersectType { types }))
    }

    /// Pointer-level sameness between two types of any kind. Composite
    /// kinds compare by `Arc` identity, leaf kinds by value; different
    /// kinds are never the same.
    pub fn same(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Ref(a), Type::Ref(b)) => Arc::ptr_eq(a, b),
            (Type::Literal(a), Type::Literal(b)) => a == b,
            (Type::Object(a), Type::Object(b)) => Arc::ptr_eq(a, b),
            (Type::Function(a), Type::Function(b)) => Arc::ptr_eq(a, b),
            (Type::Constructor(a), Type::Constructor(b)) => Arc::ptr_eq(a, b),
            (Type::Union(a), Type::Union(b)) => Arc::ptr_eq(a, b),
            (Type::Intersect(a), Type::Intersect(b)) => Arc::ptr_eq(a, b),
            (Type::Tuple(a), Type::Tuple(b)) => Arc::ptr_eq(a, b),
            (Type::Keyof(a), Type::Keyof(b)) => Arc::ptr_eq(a, b),
            (Type::Lookup(a), Type::Lookup(b)) => Arc::ptr_eq(a, b),
            (Type::Query(a), Type::Query(b)) => a == b,
            (Type::Conditional(a), Type::Conditional(b)) => Arc::ptr_eq(a, b),
            (Type::Infer(a), Type::Infer(b)) => a == b,
            (Type::This, Type::This) => true,
            (Type::Repeated(a), Type::Repeated(b)) => Arc::ptr_eq(a, b),
            (Type::Predicate(a), Type::Predicate(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Human-readable node label (kind plus name where one exists).
    pub fn label(&self) -> String {
        match self {
            Type::Ref(r) => format!("ref {}", r.name),
            Type::Literal(lit) => format!("literal {}", lit),
            Type::Object(_) => "object".to_string(),
            Type::Function(_) => "function".to_string(),
            Type::Constructor(_) => "constructor".to_string(),
            Type::Union(_) => "union".to_string(),
            Type::Intersect(_) => "intersection".to_string(),
            Type::Tuple(_) => "tuple".to_string(),
            Type::Keyof(_) => "keyof".to_string(),
            Type::Lookup(_) => "lookup".to_string(),
            Type::Query(name) => format!("typeof {}", name),
            Type::Conditional(_) => "conditional".to_string(),
            Type::Infer(name) => format!("infer {}", name),
            Type::This => "this".to_string(),
            Type::Repeated(_) => "repeated".to_string(),
            Type::Predicate(_) => "predicate".to_string(),
        }
    }
}

impl ObjectType {
    /// Factory: the member index is computed here and kept consistent by
    /// every later update.
    pub fn new(comments: Comments, members: Vec<Member>) -> Self {
        let index = MemberIndex::of(&members);
        ObjectType {
            comments,
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

    /// Pure update; recomputes the member index.
    pub fn with_members(&self, members: Vec<Member>) -> Self {
        ObjectType::new(self.comments.clone(), members)
    }
}

impl Sig {
    pub fn new(tparams: Vec<TypeParam>, params: Vec<Param>, result: Option<Type>) -> Self {
        Sig {
            comments: Comments::new(),
            tparams,
            params,
            result,
        }
    }

    pub fn simple(params: Vec<Param>, result: Option<Type>) -> Self {
        Sig::new(Vec::new(), params, result)
    }
}

impl Param {
    pub fn plain(name: impl Into<String>, ty: Option<Type>) -> Self {
        Param {
            name: Ident::new(name),
            ty,
            optional: false,
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    let mut first = true;
    for item in items {
        if !first {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Ref(r) => write!(f, "{}", r),
            Type::Literal(lit) => write!(f, "{}", lit),
            Type::Object(o) => {
                write!(f, "{{")?;
                let mut first = true;
                for member in o.members() {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", member)?;
                    first = false;
                }
                write!(f, "}}")
            }
            Type::Function(sig) => write!(f, "{}", sig),
            Type::Constructor(c) => {
                if c.is_abstract {
                    write!(f, "abstract ")?;
                }
                write!(f, "new {}", c.sig)
            }
            Type::Union(u) => write_joined(f, &u.types, " | "),
            Type::Intersect(i) => write_joined(f, &i.types, " & "),
            Type::Tuple(t) => {
                write!(f, "[")?;
                write_joined(f, &t.elems, ", ")?;
                write!(f, "]")
            }
            Type::Keyof(k) => write!(f, "keyof {}", k.of),
            Type::Lookup(l) => write!(f, "{}[{}]", l.from, l.key),
            Type::Query(name) => write!(f, "typeof {}", name),
            Type::Conditional(c) => {
                write!(f, "{} ? {} : {}", c.pred, c.if_true, c.if_false)
            }
            Type::Infer(name) => write!(f, "infer {}", name),
            Type::This => write!(f, "this"),
            Type::Repeated(r) => write!(f, "...{}", r.underlying),
            Type::Predicate(p) => {
                if p.asserts {
                    write!(f, "asserts ")?;
                }
                match &p.ty {
                    Some(ty) => write!(f, "{} is {}", p.param, ty),
                    None => write!(f, "{}", p.param),
                }
            }
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.targs.is_empty() {
            write!(f, "<")?;
            write_joined(f, &self.targs, ", ")?;
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TupleElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}: {}", label, self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

impl fmt::Display for Sig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tparams.is_empty() {
            write!(f, "<")?;
            write_joined(f, &self.tparams, ", ")?;
            write!(f, ">")?;
        }
        write!(f, "(")?;
        write_joined(f, &self.params, ", ")?;
        write!(f, ")")?;
        if let Some(result) = &self.result {
            write!(f, ": {}", result)?;
        }
        Ok(())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, "?")?;
        }
        if let Some(ty) = &self.ty {
            write!(f, ": {}", ty)?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(bound) = &self.bound {
            write!(f, " extends {}", bound)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_forms() {
        let string = Type::named(QIdent::single("string"));
        let number = Type::named(QIdent::single("number"));
        let union = Type::union(vec![string.clone(), number.clone()]);
        assert_eq!(union.to_string(), "string | number");

        let generic = Type::Ref(Arc::new(RefType {
            name: QIdent::of(&["Array"]),
            targs: vec![union],
        }));
        assert_eq!(generic.to_string(), "Array<string | number>");

        let sig = Sig::simple(
            vec![Param {
                name: Ident::new("x"),
                ty: Some(string.clone()),
                optional: true,
            }],
            Some(number.clone()),
        );
        assert_eq!(Type::Function(Arc::new(sig)).to_string(), "(x?: string): number");

        let lookup = Type::Lookup(Arc::new(LookupType {
            from: Type::named(QIdent::single("T")),
            key: Type::Keyof(Arc::new(KeyofType {
                of: Type::named(QIdent::single("T")),
            })),
        }));
        assert_eq!(lookup.to_string(), "T[keyof T]");
    }

    #[test]
    fn test_same_distinguishes_allocations() {
        let a = Type::union(vec![Type::named(QIdent::single("string"))]);
        let b = a.clone();
        let c = Type::union(vec![Type::named(QIdent::single("string"))]);
        assert!(a.same(&b));
        assert!(!a.same(&c));
        assert_eq!(a, c);
        assert!(Type::This.same(&Type::This));
    }

    #[test]
    fn test_predicate_forms() {
        let is = Type::Predicate(Arc::new(PredicateType {
            asserts: false,
            param: Ident::new("x"),
            ty: Some(Type::named(QIdent::single("string"))),
        }));
        assert_eq!(is.to_string(), "x is string");

        let asserts = Type::Predicate(Arc::new(PredicateType {
            asserts: true,
            param: Ident::new("x"),
            ty: None,
        }));
        assert_eq!(asserts.to_string(), "asserts x");
    }
}
