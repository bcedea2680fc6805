use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;

use super::{union_type_comparator, TypeComparisonResult};

pub fn is_contained_by(
    codebase: Option<&CodebaseInfo>,
    input_type_part: &TAtomic,
    container_type_part: &TAtomic,
    result: &mut TypeComparisonResult,
) -> bool {
    if let TAtomic::TObject = container_type_part {
        return input_type_part.is_object_type();
    }

    if let TAtomic::TObject = input_type_part {
        result.type_coerced = Some(true);
        return false;
    }

    let (input_name, input_type_params) = match input_type_part {
        TAtomic::TNamedObject {
            name, type_params, ..
        } => (name, type_params),
        _ => return false,
    };

    let (container_name, container_type_params) = match container_type_part {
        TAtomic::TNamedObject {
            name, type_params, ..
        } => (name, type_params),
        _ => return false,
    };

    if let Some(extra_types) = input_type_part.get_intersection_types() {
        for extra_type in extra_types {
            let mut intersection_result = TypeComparisonResult::new();
            if is_contained_by(
                codebase,
                &extra_type.clone_without_intersection_types(),
                container_type_part,
                &mut intersection_result,
            ) {
                return true;
            }
        }
    }

    if input_name != container_name {
        let codebase = match codebase {
            Some(codebase) => codebase,
            // without class info we assume compatibility
            None => return true,
        };

        if !codebase.class_or_interface_exists(input_name)
            || !codebase.class_or_interface_exists(container_name)
        {
            return true;
        }

        if codebase.class_extends_or_implements(input_name, container_name)
            || codebase.interface_extends(input_name, container_name)
        {
            return true;
        }

        if codebase.class_extends_or_implements(container_name, input_name)
            || codebase.interface_extends(container_name, input_name)
        {
            result.type_coerced = Some(true);
        }

        return false;
    }

    match (input_type_params, container_type_params) {
        (Some(input_type_params), Some(container_type_params)) => {
            for (i, container_param) in container_type_params.iter().enumerate() {
                let input_param = if let Some(input_param) = input_type_params.get(i) {
                    input_param
                } else {
                    break;
                };

                if input_param.is_nothing() {
                    continue;
                }

                if !union_type_comparator::is_contained_by(
                    codebase,
                    input_param,
                    container_param,
                    result,
                ) {
                    return false;
                }
            }

            true
        }
        (None, Some(_)) => {
            result.type_coerced = Some(true);
            false
        }
        _ => true,
    }
}
