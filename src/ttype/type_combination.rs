use std::collections::BTreeMap;
use std::sync::Arc;

use phlint_code_info::t_atomic::{ArrayKey, TAtomic};
use phlint_code_info::t_union::TUnion;
use rustc_hash::{FxHashMap, FxHashSet};

/// Scratch space for one `combine` call: every input atomic is scraped into
/// exactly one of these buckets before the result union is materialized.
#[derive(Debug)]
pub(crate) struct TypeCombination {
    pub value_types: FxHashMap<String, TAtomic>,

    pub has_object_top_type: bool,

    /// Generic objects, bucketed by class name.
    pub object_type_params: FxHashMap<String, Vec<TUnion>>,
    pub object_static: FxHashMap<String, bool>,

    pub array_type_params: Option<(TUnion, TUnion)>,
    pub array_sometimes_filled: bool,
    pub array_always_filled: bool,

    pub list_type_param: Option<TUnion>,
    pub list_counts: Option<FxHashSet<usize>>,
    pub list_sometimes_filled: bool,
    pub list_always_filled: bool,

    pub has_keyed_array: bool,
    pub keyed_array_entries: BTreeMap<ArrayKey, (bool, Arc<TUnion>)>,
    pub keyed_array_params: Option<(TUnion, TUnion)>,
    pub keyed_array_always_list: bool,
    pub keyed_array_sometimes_filled: bool,
    pub keyed_array_always_filled: bool,

    pub iterable_params: Option<(TUnion, TUnion)>,

    pub falsy_mixed: bool,
    pub truthy_mixed: bool,
    pub nonnull_mixed: bool,
    pub vanilla_mixed: bool,
    pub mixed_from_loop_isset: Option<bool>,

    pub literal_strings: FxHashMap<String, TAtomic>,
    pub literal_ints: FxHashMap<String, TAtomic>,
    pub literal_floats: FxHashMap<String, TAtomic>,

    /// `class-string` variants, bucketed by constraint class name.
    pub class_string_types: FxHashMap<String, TAtomic>,
}

impl TypeCombination {
    pub(crate) fn new() -> Self {
        Self {
            value_types: FxHashMap::default(),
            has_object_top_type: false,
            object_type_params: FxHashMap::default(),
            object_static: FxHashMap::default(),
            array_type_params: None,
            array_sometimes_filled: false,
            array_always_filled: true,
            list_type_param: None,
            list_counts: Some(FxHashSet::default()),
            list_sometimes_filled: false,
            list_always_filled: true,
            has_keyed_array: false,
            keyed_array_entries: BTreeMap::new(),
            keyed_array_params: None,
            keyed_array_always_list: true,
            keyed_array_sometimes_filled: false,
            keyed_array_always_filled: true,
            iterable_params: None,
            falsy_mixed: false,
            truthy_mixed: false,
            nonnull_mixed: false,
            vanilla_mixed: false,
            mixed_from_loop_isset: None,
            literal_strings: FxHashMap::default(),
            literal_ints: FxHashMap::default(),
            literal_floats: FxHashMap::default(),
            class_string_types: FxHashMap::default(),
        }
    }

    /// Whether any bucket holds a member beyond the mixed flags.
    pub(crate) fn has_concrete_members(&self) -> bool {
        !self.value_types.is_empty()
            || self.has_keyed_array
            || !self.keyed_array_entries.is_empty()
            || self.array_type_params.is_some()
            || self.list_type_param.is_some()
            || self.iterable_params.is_some()
            || !self.object_type_params.is_empty()
            || !self.literal_strings.is_empty()
            || !self.literal_ints.is_empty()
            || !self.literal_floats.is_empty()
            || !self.class_string_types.is_empty()
    }

    #[inline]
    pub(crate) fn is_simple(&self) -> bool {
        if self.value_types.len() == 1 && !self.has_keyed_array {
            if let (None, None, None) = (
                &self.array_type_params,
                &self.list_type_param,
                &self.iterable_params,
            ) {
                return self.keyed_array_entries.is_empty()
                    && self.object_type_params.is_empty()
                    && self.literal_strings.is_empty()
                    && self.literal_ints.is_empty()
                    && self.literal_floats.is_empty()
                    && self.class_string_types.is_empty();
            }
        }

        false
    }
}
