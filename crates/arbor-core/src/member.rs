//! Members of classes, interfaces and object types.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::comments::Comments;
use crate::expr::Expr;
use crate::ident::{Ident, QIdent};
use crate::ty::{Sig, Type};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Member {
    /// Call signature: `(x: T): R`. Grouped under the `<apply>` sentinel.
    Call(Arc<CallMember>),
    /// Construct signature: `new (x: T): R`. Grouped under `constructor`.
    Ctor(Arc<CtorMember>),
    /// Method, getter or setter.
    Function(Arc<FunctionMember>),
    Property(Arc<PropertyMember>),
    /// Index signature: `[key: string]: T` or `[Symbol.iterator]: T`.
    Index(Arc<IndexMember>),
    /// Mapped-type member: `[K in keyof T as R]?: U`.
    Mapped(Arc<MappedMember>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallMember {
    pub comments: Comments,
    pub sig: Sig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtorMember {
    pub comments: Comments,
    pub sig: Sig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodType {
    Normal,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionMember {
    pub comments: Comments,
    pub name: Ident,
    pub method_type: MethodType,
    pub sig: Sig,
    pub is_static: bool,
    pub is_read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyMember {
    pub comments: Comments,
    pub name: Ident,
    pub ty: Option<Type>,
    pub init: Option<Expr>,
    pub is_static: bool,
    pub is_read_only: bool,
    pub optional: bool,
}

/// How an index signature indexes: a dictionary key or a single qualified
/// name (well-known symbol).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Indexing {
    Dict { name: Ident, ty: Type },
    Single(QIdent),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMember {
    pub comments: Comments,
    pub indexing: Indexing,
    pub value_ty: Option<Type>,
    pub is_read_only: bool,
}

/// Modifier applied to optionality or readonly-ness in a mapped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Modifier {
    /// Leave as-is.
    Noop,
    /// Add the modifier (`?` / `readonly`).
    Add,
    /// Strip the modifier (`-?` / `-readonly`).
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedMember {
    pub comments: Comments,
    /// The key variable: `K` in `[K in keyof T]`.
    pub key: Ident,
    /// The source type iterated over.
    pub from: Type,
    /// Optional key remapping: the `as R` clause.
    pub as_remap: Option<Type>,
    pub optionalize: Modifier,
    pub readonly: Modifier,
    /// The target (value) type.
    pub to: Type,
}

impl Member {
    /// The name this member is grouped under, if any. Call and construct
    /// signatures unify with literal-named siblings via their sentinels;
    /// index and mapped members are unnamed.
    pub fn name(&self) -> Option<Ident> {
        match self {
            Member::Call(_) => Some(Ident::apply()),
            Member::Ctor(_) => Some(Ident::constructor()),
            Member::Function(m) => Some(m.name.clone()),
            Member::Property(m) => Some(m.name.clone()),
            Member::Index(_) | Member::Mapped(_) => None,
        }
    }

    /// Pointer-level sameness, used for structural-sharing checks.
    pub fn same(&self, other: &Member) -> bool {
        match (self, other) {
            (Member::Call(a), Member::Call(b)) => Arc::ptr_eq(a, b),
            (Member::Ctor(a), Member::Ctor(b)) => Arc::ptr_eq(a, b),
            (Member::Function(a), Member::Function(b)) => Arc::ptr_eq(a, b),
            (Member::Property(a), Member::Property(b)) => Arc::ptr_eq(a, b),
            (Member::Index(a), Member::Index(b)) => Arc::ptr_eq(a, b),
            (Member::Mapped(a), Member::Mapped(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Member::Call(_) => "call signature".to_string(),
            Member::Ctor(_) => "construct signature".to_string(),
            Member::Function(m) => format!("method {}", m.name),
            Member::Property(m) => format!("property {}", m.name),
            Member::Index(_) => "index signature".to_string(),
            Member::Mapped(m) => format!("mapped member {}", m.key),
        }
    }
}

impl PropertyMember {
    /// Pure copy-update of type and initializer.
    pub fn with_type(&self, ty: Option<Type>, init: Option<Expr>) -> Self {
        PropertyMember {
            ty,
            init,
            ..self.clone()
        }
    }
}

fn modifier_str(m: Modifier, token: &str) -> String {
    match m {
        Modifier::Noop => String::new(),
        Modifier::Add => token.to_string(),
        Modifier::Remove => format!("-{}", token),
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Call(m) => write!(f, "{}", m.sig),
            Member::Ctor(m) => write!(f, "new {}", m.sig),
            Member::Function(m) => {
                if m.is_static {
                    write!(f, "static ")?;
                }
                match m.method_type {
                    MethodType::Normal => {}
                    MethodType::Getter => write!(f, "get ")?,
                    MethodType::Setter => write!(f, "set ")?,
                }
                write!(f, "{}{}", m.name, m.sig)
            }
            Member::Property(m) => {
                if m.is_static {
                    write!(f, "static ")?;
                }
                if m.is_read_only {
                    write!(f, "readonly ")?;
                }
                write!(f, "{}", m.name)?;
                if m.optional {
                    write!(f, "?")?;
                }
                if let Some(ty) = &m.ty {
                    write!(f, ": {}", ty)?;
                }
                if let Some(init) = &m.init {
                    write!(f, " = {}", init)?;
                }
                Ok(())
            }
            Member::Index(m) => {
                if m.is_read_only {
                    write!(f, "readonly ")?;
                }
                match &m.indexing {
                    Indexing::Dict { name, ty } => write!(f, "[{}: {}]", name, ty)?,
                    Indexing::Single(name) => write!(f, "[{}]", name)?,
                }
                if let Some(value_ty) = &m.value_ty {
                    write!(f, ": {}", value_ty)?;
                }
                Ok(())
            }
            Member::Mapped(m) => {
                let readonly = modifier_str(m.readonly, "readonly ");
                write!(f, "{}[{} in {}", readonly, m.key, m.from)?;
                if let Some(as_remap) = &m.as_remap {
                    write!(f, " as {}", as_remap)?;
                }
                write!(f, "]{}", modifier_str(m.optionalize, "?"))?;
                write!(f, ": {}", m.to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::QIdent;

    fn string_ty() -> Type {
        Type::named(QIdent::single("string"))
    }

    #[test]
    fn test_sentinel_names() {
        let call = Member::Call(Arc::new(CallMember {
            comments: Comments::new(),
            sig: Sig::simple(vec![], None),
        }));
        assert_eq!(call.name(), Some(Ident::apply()));

        let ctor = Member::Ctor(Arc::new(CtorMember {
            comments: Comments::new(),
            sig: Sig::simple(vec![], None),
        }));
        assert_eq!(ctor.name(), Some(Ident::constructor()));

        let index = Member::Index(Arc::new(IndexMember {
            comments: Comments::new(),
            indexing: Indexing::Dict {
                name: Ident::new("key"),
                ty: string_ty(),
            },
            value_ty: Some(string_ty()),
            is_read_only: false,
        }));
        assert_eq!(index.name(), None);
    }

    #[test]
    fn test_render_mapped() {
        let mapped = Member::Mapped(Arc::new(MappedMember {
            comments: Comments::new(),
            key: Ident::new("K"),
            from: Type::Keyof(Arc::new(crate::ty::KeyofType { of: string_ty() })),
            as_remap: None,
            optionalize: Modifier::Add,
            readonly: Modifier::Noop,
            to: string_ty(),
        }));
        assert_eq!(mapped.to_string(), "[K in keyof string]?: string");
    }

    #[test]
    fn test_render_property() {
        let prop = Member::Property(Arc::new(PropertyMember {
            comments: Comments::new(),
            name: Ident::new("x"),
            ty: Some(string_ty()),
            init: None,
            is_static: true,
            is_read_only: true,
            optional: true,
        }));
        assert_eq!(prop.to_string(), "static readonly x?: string");
    }
}
