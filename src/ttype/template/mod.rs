pub mod inferred_type_replacer;
pub mod standin_type_replacer;

use indexmap::IndexMap;
use phlint_code_info::t_union::TUnion;
use rustc_hash::FxHashMap;

/// Template recursion beyond this depth returns the type untouched rather
/// than diverging on self-referential bounds.
pub const MAX_TEMPLATE_DEPTH: usize = 10;

/// A type inferred for a template param at one use site.
#[derive(Clone, Debug)]
pub struct TemplateBound {
    pub bound_type: TUnion,

    /// How deeply nested the appearance was; shallower bounds win when
    /// bounds conflict.
    pub appearance_depth: usize,

    pub arg_offset: Option<usize>,
}

impl TemplateBound {
    pub fn new(bound_type: TUnion, appearance_depth: usize, arg_offset: Option<usize>) -> Self {
        Self {
            bound_type,
            appearance_depth,
            arg_offset,
        }
    }
}

/// Accumulates what is known about template params across a reconciliation
/// or call-site inference pass, keyed by param name then defining entity.
#[derive(Clone, Debug, Default)]
pub struct TemplateResult {
    pub template_types: IndexMap<String, FxHashMap<String, TUnion>>,
    pub lower_bounds: IndexMap<String, FxHashMap<String, Vec<TemplateBound>>>,
}

impl TemplateResult {
    pub fn new(
        template_types: IndexMap<String, FxHashMap<String, TUnion>>,
        lower_bounds: IndexMap<String, FxHashMap<String, TUnion>>,
    ) -> Self {
        let mut new_lower_bounds = IndexMap::new();

        for (param_name, defining_map) in lower_bounds {
            let mut new_defining_map = FxHashMap::default();
            for (defining_entity, bound_type) in defining_map {
                new_defining_map.insert(defining_entity, vec![TemplateBound::new(bound_type, 0, None)]);
            }
            new_lower_bounds.insert(param_name, new_defining_map);
        }

        Self {
            template_types,
            lower_bounds: new_lower_bounds,
        }
    }

    pub fn add_lower_bound(
        &mut self,
        param_name: String,
        defining_entity: String,
        bound_type: TUnion,
    ) {
        self.lower_bounds
            .entry(param_name)
            .or_default()
            .entry(defining_entity)
            .or_default()
            .push(TemplateBound::new(bound_type, 0, None));
    }

    pub fn get_lower_bounds(
        &self,
        param_name: &str,
        defining_entity: &str,
    ) -> Option<&Vec<TemplateBound>> {
        self.lower_bounds
            .get(param_name)
            .and_then(|defining_map| defining_map.get(defining_entity))
    }
}
