use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;

use super::{union_type_comparator, TypeComparisonResult};
use crate::get_arrayish_params;

pub fn is_contained_by(
    codebase: Option<&CodebaseInfo>,
    input_type_part: &TAtomic,
    container_type_part: &TAtomic,
    result: &mut TypeComparisonResult,
) -> bool {
    // shape-to-shape comparisons look at each known entry
    if let (
        TAtomic::TKeyedArray {
            known_items: input_items,
            params: input_params,
            ..
        },
        TAtomic::TKeyedArray {
            known_items: container_items,
            params: container_params,
            ..
        },
    ) = (input_type_part, container_type_part)
    {
        for (key, (container_undefined, container_item)) in container_items {
            if let Some((input_undefined, input_item)) = input_items.get(key) {
                if *input_undefined && !container_undefined {
                    result.type_coerced = Some(true);
                    return false;
                }

                if !union_type_comparator::is_contained_by(
                    codebase,
                    input_item.as_ref(),
                    container_item.as_ref(),
                    result,
                ) {
                    return false;
                }
            } else if input_params.is_none() {
                if !container_undefined {
                    result.type_coerced = Some(true);
                    return false;
                }
            } else if let Some((input_key_param, input_value_param)) = input_params {
                let key_union = crate::wrap_atomic(key.to_atomic());
                if !union_type_comparator::can_expression_types_be_identical(
                    codebase,
                    &key_union,
                    input_key_param.as_ref(),
                ) {
                    continue;
                }

                if !union_type_comparator::is_contained_by(
                    codebase,
                    input_value_param.as_ref(),
                    container_item.as_ref(),
                    result,
                ) {
                    return false;
                }
            }
        }

        for (key, (_, input_item)) in input_items {
            if container_items.contains_key(key) {
                continue;
            }

            match container_params {
                Some((container_key_param, container_value_param)) => {
                    let key_union = crate::wrap_atomic(key.to_atomic());
                    if !union_type_comparator::is_contained_by(
                        codebase,
                        &key_union,
                        container_key_param.as_ref(),
                        result,
                    ) || !union_type_comparator::is_contained_by(
                        codebase,
                        input_item.as_ref(),
                        container_value_param.as_ref(),
                        result,
                    ) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        return true;
    }

    let container_non_empty = match container_type_part {
        TAtomic::TArray { non_empty, .. } => *non_empty,
        TAtomic::TList { non_empty, .. } => *non_empty,
        TAtomic::TKeyedArray { non_empty, .. } => *non_empty,
        TAtomic::TIterable { .. } => false,
        _ => return false,
    };

    let input_non_empty = match input_type_part {
        TAtomic::TArray { non_empty, .. } => *non_empty,
        TAtomic::TList { non_empty, .. } => *non_empty,
        TAtomic::TKeyedArray {
            known_items,
            non_empty,
            ..
        } => {
            *non_empty
                || known_items
                    .iter()
                    .any(|(_, (possibly_undefined, _))| !possibly_undefined)
        }
        _ => return false,
    };

    if container_non_empty && !input_non_empty {
        result.type_coerced = Some(true);
        return false;
    }

    // a plain array can't promise the required entries of a shape
    if let TAtomic::TKeyedArray { known_items, .. } = container_type_part {
        if known_items
            .iter()
            .any(|(_, (possibly_undefined, _))| !possibly_undefined)
        {
            result.type_coerced = Some(true);
            return false;
        }
    }

    // a list can never hold string keys
    if matches!(container_type_part, TAtomic::TList { .. })
        && !matches!(
            input_type_part,
            TAtomic::TList { .. }
                | TAtomic::TKeyedArray { is_list: true, .. }
        )
    {
        if matches!(input_type_part, TAtomic::TArray { .. }) {
            result.type_coerced = Some(true);
        }
        return false;
    }

    let (input_key_param, input_value_param) =
        match get_arrayish_params(input_type_part, codebase) {
            Some(params) => params,
            None => return false,
        };

    let (container_key_param, container_value_param) =
        match get_arrayish_params(container_type_part, codebase) {
            Some(params) => params,
            None => return false,
        };

    if !input_key_param.is_nothing()
        && !union_type_comparator::is_contained_by(
            codebase,
            &input_key_param,
            &container_key_param,
            result,
        )
    {
        return false;
    }

    if !input_value_param.is_nothing()
        && !union_type_comparator::is_contained_by(
            codebase,
            &input_value_param,
            &container_value_param,
            result,
        )
    {
        return false;
    }

    true
}
