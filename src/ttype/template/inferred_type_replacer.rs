use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;

use super::{standin_type_replacer, TemplateResult};

/// Substitutes every template param that has inferred lower bounds with the
/// type those bounds settled on. Params with no bounds survive unchanged.
pub fn replace(
    union_type: &TUnion,
    template_result: &TemplateResult,
    codebase: Option<&CodebaseInfo>,
) -> TUnion {
    let mut new_atomics = Vec::new();

    for (_, atomic_type) in union_type.types.iter() {
        new_atomics.extend(replace_atomic(atomic_type, template_result, codebase));
    }

    let mut new_union = TUnion::new(new_atomics);
    new_union.possibly_undefined = union_type.possibly_undefined;
    new_union.possibly_undefined_from_try = union_type.possibly_undefined_from_try;
    new_union.from_docblock = union_type.from_docblock;
    new_union.from_calculation = union_type.from_calculation;
    new_union.had_template = union_type.had_template;
    new_union
}

fn replace_atomic(
    atomic_type: &TAtomic,
    template_result: &TemplateResult,
    codebase: Option<&CodebaseInfo>,
) -> Vec<TAtomic> {
    match atomic_type {
        TAtomic::TTemplateParam {
            param_name,
            defining_entity,
            as_type,
            extra_types,
        } => {
            if let Some(bounds) = template_result.get_lower_bounds(param_name, defining_entity) {
                let inferred =
                    standin_type_replacer::get_most_specific_type_from_bounds(bounds, codebase);
                return inferred.types.into_values().collect();
            }

            vec![TAtomic::TTemplateParam {
                param_name: param_name.clone(),
                as_type: Box::new(replace(as_type, template_result, codebase)),
                defining_entity: defining_entity.clone(),
                extra_types: extra_types.clone(),
            }]
        }
        TAtomic::TArray {
            key_param,
            value_param,
            non_empty,
        } => vec![TAtomic::TArray {
            key_param: Box::new(replace(key_param, template_result, codebase)),
            value_param: Box::new(replace(value_param, template_result, codebase)),
            non_empty: *non_empty,
        }],
        TAtomic::TList {
            type_param,
            known_count,
            non_empty,
        } => vec![TAtomic::TList {
            type_param: Box::new(replace(type_param, template_result, codebase)),
            known_count: *known_count,
            non_empty: *non_empty,
        }],
        TAtomic::TKeyedArray {
            known_items,
            params,
            is_list,
            non_empty,
        } => {
            let new_items = known_items
                .iter()
                .map(|(key, (possibly_undefined, item_type))| {
                    (
                        key.clone(),
                        (
                            *possibly_undefined,
                            std::sync::Arc::new(replace(
                                item_type.as_ref(),
                                template_result,
                                codebase,
                            )),
                        ),
                    )
                })
                .collect();

            vec![TAtomic::TKeyedArray {
                known_items: new_items,
                params: params.as_ref().map(|(key_param, value_param)| {
                    (
                        Box::new(replace(key_param, template_result, codebase)),
                        Box::new(replace(value_param, template_result, codebase)),
                    )
                }),
                is_list: *is_list,
                non_empty: *non_empty,
            }]
        }
        TAtomic::TIterable {
            key_param,
            value_param,
        } => vec![TAtomic::TIterable {
            key_param: Box::new(replace(key_param, template_result, codebase)),
            value_param: Box::new(replace(value_param, template_result, codebase)),
        }],
        TAtomic::TNamedObject {
            name,
            type_params: Some(type_params),
            is_this,
            extra_types,
        } => vec![TAtomic::TNamedObject {
            name: name.clone(),
            type_params: Some(
                type_params
                    .iter()
                    .map(|type_param| replace(type_param, template_result, codebase))
                    .collect(),
            ),
            is_this: *is_this,
            extra_types: extra_types.clone(),
        }],
        TAtomic::TClosure {
            params,
            return_type,
            is_pure,
        } => vec![TAtomic::TClosure {
            params: params.clone(),
            return_type: return_type
                .as_ref()
                .map(|return_type| Box::new(replace(return_type, template_result, codebase))),
            is_pure: *is_pure,
        }],
        _ => vec![atomic_type.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_int, wrap_atomic};

    #[test]
    fn bounded_param_is_substituted() {
        let mut template_result = TemplateResult::default();
        template_result.add_lower_bound("T".to_string(), "fn-map".to_string(), get_int());

        let declared = wrap_atomic(TAtomic::TTemplateParam {
            param_name: "T".to_string(),
            as_type: Box::new(crate::get_mixed()),
            defining_entity: "fn-map".to_string(),
            extra_types: None,
        });

        let replaced = replace(&declared, &template_result, None);
        assert_eq!(replaced.get_id(), "int");
    }

    #[test]
    fn unbounded_param_survives() {
        let declared = wrap_atomic(TAtomic::TTemplateParam {
            param_name: "T".to_string(),
            as_type: Box::new(crate::get_mixed()),
            defining_entity: "fn-map".to_string(),
            extra_types: None,
        });

        let replaced = replace(&declared, &TemplateResult::default(), None);
        assert!(replaced.has_template_types());
    }
}
