use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::t_union::TUnion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
}

/// Storage for one classlike, populated by the (external) scanner. Only the
/// pieces the type engine consults live here: ancestry, members, templates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassLikeInfo {
    pub name: String,
    pub kind: ClassLikeKind,
    pub is_final: bool,

    pub direct_parent_class: Option<String>,
    pub all_parent_classes: FxHashSet<String>,

    /// For interfaces, the interfaces this one extends.
    pub all_parent_interfaces: FxHashSet<String>,

    /// For classes, every interface implemented directly or via ancestors.
    pub all_class_interfaces: FxHashSet<String>,

    /// Known subclasses and implementors, when the host has a closed world.
    pub child_classlikes: Option<FxHashSet<String>>,

    pub methods: FxHashSet<String>,

    pub constant_types: FxHashMap<String, TUnion>,

    /// Template parameter definitions in declaration order:
    /// param name → upper bound.
    pub template_types: IndexMap<String, TUnion>,

    /// For each ancestor with templates, the concrete (or forwarded) types
    /// this classlike binds them to: ancestor name → param name → type.
    pub template_extended_params: FxHashMap<String, IndexMap<String, TUnion>>,
}

impl ClassLikeInfo {
    pub fn new(name: String, kind: ClassLikeKind) -> Self {
        Self {
            name,
            kind,
            is_final: false,
            direct_parent_class: None,
            all_parent_classes: FxHashSet::default(),
            all_parent_interfaces: FxHashSet::default(),
            all_class_interfaces: FxHashSet::default(),
            child_classlikes: None,
            methods: FxHashSet::default(),
            constant_types: FxHashMap::default(),
            template_types: IndexMap::new(),
            template_extended_params: FxHashMap::default(),
        }
    }
}
