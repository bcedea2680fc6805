use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;

use super::{TemplateBound, TemplateResult, MAX_TEMPLATE_DEPTH};
use crate::{add_union_type, get_mixed};

/// Walks a declared type, records a lower bound for every template param it
/// mentions (taken from the matching part of `input_type`), and returns the
/// declared type with those params replaced by what was inferred.
pub fn replace(
    union_type: &TUnion,
    template_result: &mut TemplateResult,
    codebase: Option<&CodebaseInfo>,
    input_type: &Option<&TUnion>,
    depth: usize,
) -> TUnion {
    if depth > MAX_TEMPLATE_DEPTH {
        return union_type.clone();
    }

    let mut atomic_types = Vec::new();

    for (_, atomic_type) in union_type.types.iter() {
        atomic_types.extend(replace_atomic(
            atomic_type,
            template_result,
            codebase,
            input_type,
            depth,
        ));
    }

    if atomic_types.is_empty() {
        return union_type.clone();
    }

    let mut new_union = TUnion::new(atomic_types);
    new_union.possibly_undefined = union_type.possibly_undefined;
    new_union.possibly_undefined_from_try = union_type.possibly_undefined_from_try;
    new_union.from_docblock = union_type.from_docblock;
    new_union.from_calculation = union_type.from_calculation;
    new_union.had_template = true;
    new_union
}

fn replace_atomic(
    atomic_type: &TAtomic,
    template_result: &mut TemplateResult,
    codebase: Option<&CodebaseInfo>,
    input_type: &Option<&TUnion>,
    depth: usize,
) -> Vec<TAtomic> {
    match atomic_type {
        TAtomic::TTemplateParam {
            param_name,
            defining_entity,
            as_type,
            ..
        } => {
            let is_tracked = template_result
                .template_types
                .get(param_name)
                .map(|defining_map| defining_map.contains_key(defining_entity))
                .unwrap_or(false);

            if !is_tracked {
                return vec![atomic_type.clone()];
            }

            let bound_type = if let Some(input_type) = input_type {
                (*input_type).clone()
            } else {
                (**as_type).clone()
            };

            template_result
                .lower_bounds
                .entry(param_name.clone())
                .or_default()
                .entry(defining_entity.clone())
                .or_default()
                .push(TemplateBound::new(bound_type.clone(), depth, None));

            bound_type.types.into_values().collect()
        }
        TAtomic::TArray {
            key_param,
            value_param,
            non_empty,
        } => {
            let input_params = input_type
                .and_then(|input| input.get_single_opt())
                .and_then(|input_atomic| crate::get_arrayish_params(input_atomic, codebase));

            vec![TAtomic::TArray {
                key_param: Box::new(replace(
                    key_param,
                    template_result,
                    codebase,
                    &input_params.as_ref().map(|(k, _)| k),
                    depth + 1,
                )),
                value_param: Box::new(replace(
                    value_param,
                    template_result,
                    codebase,
                    &input_params.as_ref().map(|(_, v)| v),
                    depth + 1,
                )),
                non_empty: *non_empty,
            }]
        }
        TAtomic::TList {
            type_param,
            known_count,
            non_empty,
        } => {
            let input_param = input_type
                .and_then(|input| input.get_single_opt())
                .and_then(|input_atomic| crate::get_arrayish_params(input_atomic, codebase))
                .map(|(_, v)| v);

            vec![TAtomic::TList {
                type_param: Box::new(replace(
                    type_param,
                    template_result,
                    codebase,
                    &input_param.as_ref(),
                    depth + 1,
                )),
                known_count: *known_count,
                non_empty: *non_empty,
            }]
        }
        TAtomic::TIterable {
            key_param,
            value_param,
        } => {
            let input_params = input_type
                .and_then(|input| input.get_single_opt())
                .and_then(|input_atomic| crate::get_arrayish_params(input_atomic, codebase));

            vec![TAtomic::TIterable {
                key_param: Box::new(replace(
                    key_param,
                    template_result,
                    codebase,
                    &input_params.as_ref().map(|(k, _)| k),
                    depth + 1,
                )),
                value_param: Box::new(replace(
                    value_param,
                    template_result,
                    codebase,
                    &input_params.as_ref().map(|(_, v)| v),
                    depth + 1,
                )),
            }]
        }
        TAtomic::TNamedObject {
            name,
            type_params: Some(type_params),
            is_this,
            extra_types,
        } => {
            let input_type_params = match input_type.and_then(|input| input.get_single_opt()) {
                Some(TAtomic::TNamedObject {
                    name: input_name,
                    type_params: Some(input_params),
                    ..
                }) if input_name == name => Some(input_params),
                _ => None,
            };

            let mut new_type_params = Vec::new();
            for (i, type_param) in type_params.iter().enumerate() {
                new_type_params.push(replace(
                    type_param,
                    template_result,
                    codebase,
                    &input_type_params.and_then(|params| params.get(i)),
                    depth + 1,
                ));
            }

            vec![TAtomic::TNamedObject {
                name: name.clone(),
                type_params: Some(new_type_params),
                is_this: *is_this,
                extra_types: extra_types.clone(),
            }]
        }
        TAtomic::TClosure {
            params,
            return_type,
            is_pure,
        } => {
            let new_return_type = return_type.as_ref().map(|return_type| {
                Box::new(replace(return_type, template_result, codebase, &None, depth + 1))
            });

            vec![TAtomic::TClosure {
                params: params.clone(),
                return_type: new_return_type,
                is_pure: *is_pure,
            }]
        }
        _ => vec![atomic_type.clone()],
    }
}

/// Collapses the bounds recorded for one param into the single type inference
/// settled on: bounds seen at the shallowest depth, widened together.
pub fn get_most_specific_type_from_bounds(
    lower_bounds: &[TemplateBound],
    codebase: Option<&CodebaseInfo>,
) -> TUnion {
    let relevant_bounds = get_relevant_bounds(lower_bounds);

    if relevant_bounds.is_empty() {
        return get_mixed();
    }

    let mut inferred_type = relevant_bounds[0].bound_type.clone();

    for bound in relevant_bounds.iter().skip(1) {
        inferred_type = add_union_type(inferred_type, &bound.bound_type, codebase, false);
    }

    inferred_type
}

pub fn get_relevant_bounds(lower_bounds: &[TemplateBound]) -> Vec<&TemplateBound> {
    if lower_bounds.len() == 1 {
        return vec![&lower_bounds[0]];
    }

    let mut min_depth = usize::MAX;
    for bound in lower_bounds {
        if bound.appearance_depth < min_depth {
            min_depth = bound.appearance_depth;
        }
    }

    lower_bounds
        .iter()
        .filter(|bound| bound.appearance_depth == min_depth)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_int, get_string, wrap_atomic};
    use indexmap::IndexMap;
    use rustc_hash::FxHashMap;

    fn template_t(as_type: TUnion) -> TAtomic {
        TAtomic::TTemplateParam {
            param_name: "T".to_string(),
            as_type: Box::new(as_type),
            defining_entity: "fn-map".to_string(),
            extra_types: None,
        }
    }

    fn tracked_t() -> TemplateResult {
        let mut defining_map = FxHashMap::default();
        defining_map.insert("fn-map".to_string(), crate::get_mixed());
        let mut template_types = IndexMap::new();
        template_types.insert("T".to_string(), defining_map);
        TemplateResult::new(template_types, IndexMap::new())
    }

    #[test]
    fn template_param_records_input_as_lower_bound() {
        let declared = wrap_atomic(template_t(crate::get_mixed()));
        let mut template_result = tracked_t();
        let input = get_int();

        let replaced = replace(&declared, &mut template_result, None, &Some(&input), 0);

        assert_eq!(replaced.get_id(), "int");
        let bounds = template_result.get_lower_bounds("T", "fn-map").unwrap();
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].bound_type.get_id(), "int");
    }

    #[test]
    fn untracked_params_pass_through() {
        let declared = wrap_atomic(template_t(crate::get_mixed()));
        let mut template_result = TemplateResult::default();

        let replaced = replace(&declared, &mut template_result, None, &Some(&get_int()), 0);

        assert!(replaced.has_template_types());
        assert!(template_result.lower_bounds.is_empty());
    }

    #[test]
    fn nested_array_params_are_inferred() {
        let declared = wrap_atomic(TAtomic::TArray {
            key_param: Box::new(get_int()),
            value_param: Box::new(wrap_atomic(template_t(crate::get_mixed()))),
            non_empty: false,
        });
        let input = wrap_atomic(TAtomic::TArray {
            key_param: Box::new(get_int()),
            value_param: Box::new(get_string()),
            non_empty: false,
        });

        let mut template_result = tracked_t();
        replace(&declared, &mut template_result, None, &Some(&input), 0);

        let bounds = template_result.get_lower_bounds("T", "fn-map").unwrap();
        assert_eq!(bounds[0].bound_type.get_id(), "string");
        assert_eq!(bounds[0].appearance_depth, 1);
    }

    #[test]
    fn shallow_bounds_beat_deep_bounds() {
        let bounds = vec![
            TemplateBound::new(get_string(), 2, None),
            TemplateBound::new(get_int(), 0, None),
        ];
        let inferred = get_most_specific_type_from_bounds(&bounds, None);
        assert_eq!(inferred.get_id(), "int");
    }

    #[test]
    fn no_bounds_mean_mixed() {
        let inferred = get_most_specific_type_from_bounds(&[], None);
        assert!(inferred.is_mixed());
    }

    #[test]
    fn replacement_stops_at_depth_limit() {
        let declared = wrap_atomic(template_t(crate::get_mixed()));
        let mut template_result = tracked_t();

        let replaced = replace(
            &declared,
            &mut template_result,
            None,
            &Some(&get_int()),
            MAX_TEMPLATE_DEPTH + 1,
        );

        assert!(replaced.has_template_types());
    }
}
