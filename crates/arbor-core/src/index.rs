//! Derived indices over container children and class/interface members.
//!
//! Indices are computed once, inside the owning node's factory, and are
//! recomputed by every child-list update, so a stale index is not a
//! representable state. The partition is a single linear pass keyed by the
//! node-kind discriminant; name grouping and module extraction each take
//! one more linear scan over the already-partitioned named subsequence.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ident::{Ident, ModuleName};
use crate::import::{Export, Import};
use crate::member::Member;
use crate::tree::{AugmentedDecl, ModuleDecl, TreeItem};

/// Precomputed partitions and lookup maps over a container's children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerIndex {
    named: Vec<TreeItem>,
    exports: Vec<Arc<Export>>,
    imports: Vec<Arc<Import>>,
    unnamed: Vec<TreeItem>,
    is_module: bool,
    by_name: IndexMap<Ident, Vec<TreeItem>>,
    modules: IndexMap<ModuleName, Arc<ModuleDecl>>,
    augmentations: IndexMap<ModuleName, Vec<Arc<AugmentedDecl>>>,
}

impl ContainerIndex {
    pub fn of(children: &[TreeItem]) -> Self {
        let mut named = Vec::new();
        let mut exports = Vec::new();
        let mut imports = Vec::new();
        let mut unnamed = Vec::new();

        // Single linear partition keyed by variant.
        for child in children {
            match child {
                TreeItem::Import(import) => imports.push(import.clone()),
                TreeItem::Export(export) => exports.push(export.clone()),
                other if other.name().is_some() => named.push(other.clone()),
                other => unnamed.push(other.clone()),
            }
        }

        let is_module =
            !exports.is_empty() || imports.iter().any(|import| !import.from.is_local());

        // Name grouping: first-seen key order, first-seen key identity.
        let mut by_name: IndexMap<Ident, Vec<TreeItem>> = IndexMap::new();
        for item in &named {
            if let Some(name) = item.name() {
                by_name.entry(name).or_default().push(item.clone());
            }
        }

        // Module and augmentation extraction. Augmentations come both from
        // siblings and from inside a matching module declaration.
        let mut modules: IndexMap<ModuleName, Arc<ModuleDecl>> = IndexMap::new();
        let mut augmentations: IndexMap<ModuleName, Vec<Arc<AugmentedDecl>>> = IndexMap::new();
        for item in &named {
            match item {
                TreeItem::Module(module) => {
                    modules.insert(module.name.clone(), module.clone());
                    for nested in crate::tree::HasChildren::children(module.as_ref()) {
                        if let TreeItem::Augmented(aug) = nested {
                            augmentations
                                .entry(aug.name.clone())
                                .or_default()
                                .push(aug.clone());
                        }
                    }
                }
                TreeItem::Augmented(aug) => {
                    augmentations
                        .entry(aug.name.clone())
                        .or_default()
                        .push(aug.clone());
                }
                _ => {}
            }
        }

        ContainerIndex {
            named,
            exports,
            imports,
            unnamed,
            is_module,
            by_name,
            modules,
            augmentations,
        }
    }

    /// Named declarations in original order.
    pub fn named(&self) -> &[TreeItem] {
        &self.named
    }

    pub fn exports(&self) -> &[Arc<Export>] {
        &self.exports
    }

    pub fn imports(&self) -> &[Arc<Import>] {
        &self.imports
    }

    pub fn unnamed(&self) -> &[TreeItem] {
        &self.unnamed
    }

    /// True iff the container has at least one export, or an import whose
    /// source is external rather than a local re-qualification.
    pub fn is_module(&self) -> bool {
        self.is_module
    }

    /// Name → declarations multimap, first-seen order.
    pub fn by_name(&self) -> &IndexMap<Ident, Vec<TreeItem>> {
        &self.by_name
    }

    pub fn lookup(&self, name: &Ident) -> &[TreeItem] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modules(&self) -> &IndexMap<ModuleName, Arc<ModuleDecl>> {
        &self.modules
    }

    pub fn augmentations(&self) -> &IndexMap<ModuleName, Vec<Arc<AugmentedDecl>>> {
        &self.augmentations
    }
}

/// Precomputed name grouping over class/interface/object-type members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberIndex {
    by_name: IndexMap<Ident, Vec<Member>>,
    unnamed: Vec<Member>,
}

impl MemberIndex {
    pub fn of(members: &[Member]) -> Self {
        let mut by_name: IndexMap<Ident, Vec<Member>> = IndexMap::new();
        let mut unnamed = Vec::new();
        for member in members {
            match member.name() {
                Some(name) => by_name.entry(name).or_default().push(member.clone()),
                None => unnamed.push(member.clone()),
            }
        }
        MemberIndex { by_name, unnamed }
    }

    pub fn by_name(&self) -> &IndexMap<Ident, Vec<Member>> {
        &self.by_name
    }

    pub fn lookup(&self, name: &Ident) -> &[Member] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unnamed(&self) -> &[Member] {
        &self.unnamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::Comments;
    use crate::ident::QIdent;
    use crate::import::{ExportKind, Exportee, ImportSource, Imported};
    use crate::member::{CallMember, CtorMember, FunctionMember, MethodType};
    use crate::tree::{GlobalDecl, VarDecl};
    use crate::ty::Sig;

    fn var(name: &str) -> TreeItem {
        TreeItem::Var(Arc::new(VarDecl::plain(name, None, None)))
    }

    fn import(from: ImportSource) -> TreeItem {
        TreeItem::Import(Arc::new(Import {
            type_only: false,
            imported: vec![Imported::Star(Some(Ident::new("ns")))],
            from,
        }))
    }

    fn export_names() -> TreeItem {
        TreeItem::Export(Arc::new(Export {
            comments: Comments::new(),
            type_only: false,
            kind: ExportKind::Named,
            exported: Exportee::Names {
                names: vec![(QIdent::single("x"), None)],
                from: None,
            },
        }))
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let children = vec![
            var("a"),
            import(ImportSource::Module(ModuleName::parse("react").unwrap())),
            export_names(),
            TreeItem::Global(Arc::new(GlobalDecl::new(Comments::new(), false, vec![]))),
            var("b"),
        ];
        let index = ContainerIndex::of(&children);

        assert_eq!(index.named().len(), 2);
        assert_eq!(index.imports().len(), 1);
        assert_eq!(index.exports().len(), 1);
        assert_eq!(index.unnamed().len(), 1);
        assert_eq!(
            index.named().len() + index.imports().len() + index.exports().len()
                + index.unnamed().len(),
            children.len()
        );
    }

    #[test]
    fn test_by_name_groups_preserving_order() {
        let children = vec![var("a"), var("b"), var("a")];
        let index = ContainerIndex::of(&children);

        let keys: Vec<_> = index.by_name().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(index.lookup(&Ident::new("a")).len(), 2);
        assert_eq!(index.lookup(&Ident::new("b")).len(), 1);

        // Every named declaration lands in exactly one group.
        let grouped: usize = index.by_name().values().map(Vec::len).sum();
        assert_eq!(grouped, index.named().len());
    }

    #[test]
    fn test_is_module_requires_external_source() {
        let local_only = ContainerIndex::of(&[import(ImportSource::Local(QIdent::of(&[
            "A", "B",
        ])))]);
        assert!(!local_only.is_module());

        let external = ContainerIndex::of(&[import(ImportSource::Required(
            ModuleName::parse("fs").unwrap(),
        ))]);
        assert!(external.is_module());

        let exporting = ContainerIndex::of(&[export_names()]);
        assert!(exporting.is_module());

        assert!(!ContainerIndex::of(&[var("a")]).is_module());
    }

    #[test]
    fn test_module_and_augmentation_extraction() {
        let target = ModuleName::parse("react").unwrap();
        let nested_aug = TreeItem::Augmented(Arc::new(AugmentedDecl::new(
            Comments::new(),
            target.clone(),
            vec![],
        )));
        let module = TreeItem::Module(Arc::new(ModuleDecl::new(
            Comments::new(),
            true,
            target.clone(),
            vec![var("inner"), nested_aug],
        )));
        let sibling_aug = TreeItem::Augmented(Arc::new(AugmentedDecl::new(
            Comments::new(),
            target.clone(),
            vec![],
        )));

        let index = ContainerIndex::of(&[module, sibling_aug]);
        assert_eq!(index.modules().len(), 1);
        assert!(index.modules().contains_key(&target));
        // Both the sibling and the nested augmentation target the module.
        assert_eq!(index.augmentations()[&target].len(), 2);
    }

    #[test]
    fn test_member_index_sentinels_unify() {
        let call = Member::Call(Arc::new(CallMember {
            comments: Comments::new(),
            sig: Sig::simple(vec![], None),
        }));
        let ctor = Member::Ctor(Arc::new(CtorMember {
            comments: Comments::new(),
            sig: Sig::simple(vec![], None),
        }));
        // A method literally named "constructor" unifies with the construct
        // signature's sentinel.
        let literal_ctor = Member::Function(Arc::new(FunctionMember {
            comments: Comments::new(),
            name: Ident::new("constructor"),
            method_type: MethodType::Normal,
            sig: Sig::simple(vec![], None),
            is_static: false,
            is_read_only: false,
        }));

        let index = MemberIndex::of(&[call.clone(), ctor, literal_ctor]);
        assert_eq!(index.lookup(&Ident::apply()).len(), 1);
        assert_eq!(index.lookup(&Ident::constructor()).len(), 2);
        assert!(index.unnamed().is_empty());
    }
}
