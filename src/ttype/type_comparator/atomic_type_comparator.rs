use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;

use super::{
    array_type_comparator, object_type_comparator, scalar_type_comparator,
    union_type_comparator, TypeComparisonResult,
};

/// Whether every value of `input_type_part` is also a value of
/// `container_type_part`.
pub fn is_contained_by(
    codebase: Option<&CodebaseInfo>,
    input_type_part: &TAtomic,
    container_type_part: &TAtomic,
    result: &mut TypeComparisonResult,
) -> bool {
    if input_type_part.get_key() == container_type_part.get_key() {
        return true;
    }

    match container_type_part {
        TAtomic::TMixed | TAtomic::TMixedFromLoopIsset => return true,
        TAtomic::TNonNullMixed => {
            if !matches!(input_type_part, TAtomic::TNull) {
                return true;
            }
            return false;
        }
        TAtomic::TNonEmptyMixed => {
            if input_type_part.is_truthy() {
                return true;
            }
            if input_type_part.is_mixed() || !input_type_part.is_falsy() {
                result.type_coerced = Some(true);
            }
            return false;
        }
        TAtomic::TEmptyMixed => {
            if input_type_part.is_falsy() {
                return true;
            }
            if input_type_part.is_mixed() || !input_type_part.is_truthy() {
                result.type_coerced = Some(true);
            }
            return false;
        }
        _ => (),
    }

    if input_type_part.is_mixed() {
        result.type_coerced = Some(true);
        result.type_coerced_from_nested_mixed = Some(true);
        return false;
    }

    if let TAtomic::TNothing = input_type_part {
        return true;
    }

    if let TAtomic::TNull = input_type_part {
        return matches!(container_type_part, TAtomic::TNull);
    }

    if let TAtomic::TTemplateParam {
        param_name,
        defining_entity,
        as_type,
        ..
    } = input_type_part
    {
        if let TAtomic::TTemplateParam {
            param_name: container_param,
            defining_entity: container_entity,
            ..
        } = container_type_part
        {
            return param_name == container_param && defining_entity == container_entity;
        }

        for (_, as_atomic) in as_type.types.iter() {
            if !is_contained_by(codebase, as_atomic, container_type_part, result) {
                return false;
            }
        }

        return true;
    }

    if let TAtomic::TTemplateParam { as_type, .. } = container_type_part {
        let contained =
            union_type_comparator::is_contained_by_union(codebase, input_type_part, as_type, result);
        if !contained {
            result.type_coerced = Some(true);
        }
        return false;
    }

    if let TAtomic::TTypeAlias { .. } | TAtomic::TClassTypeConstant { .. } = container_type_part {
        // unresolved references are permissive until expansion resolves them
        return true;
    }

    if let TAtomic::TTypeAlias { .. } | TAtomic::TClassTypeConstant { .. } = input_type_part {
        return true;
    }

    if let TAtomic::TPlaceholder = container_type_part {
        return true;
    }

    if input_type_part.is_some_scalar() || matches!(input_type_part, TAtomic::TBool) {
        if matches!(container_type_part, TAtomic::TScalar) {
            return true;
        }

        if container_type_part.is_some_scalar() || matches!(container_type_part, TAtomic::TBool) {
            return scalar_type_comparator::is_contained_by(
                input_type_part,
                container_type_part,
                result,
            );
        }

        return false;
    }

    if input_type_part.is_array_type() || matches!(input_type_part, TAtomic::TIterable { .. }) {
        if container_type_part.is_array_type()
            || matches!(container_type_part, TAtomic::TIterable { .. })
        {
            return array_type_comparator::is_contained_by(
                codebase,
                input_type_part,
                container_type_part,
                result,
            );
        }

        return false;
    }

    if let TAtomic::TIterable { .. } = container_type_part {
        // a Traversable object fits iterable
        if let TAtomic::TNamedObject { name, .. } = input_type_part {
            if let Some(codebase) = codebase {
                if codebase.class_or_interface_exists(name) {
                    return name == "Traversable"
                        || codebase.class_extends_or_implements(name, "Traversable")
                        || codebase.interface_extends(name, "Traversable");
                }
            }
            return true;
        }

        if let TAtomic::TObject = input_type_part {
            result.type_coerced = Some(true);
            return false;
        }
    }

    if let TAtomic::TCallable = container_type_part {
        return matches!(
            input_type_part,
            TAtomic::TCallable
                | TAtomic::TClosure { .. }
                | TAtomic::TString
                | TAtomic::TNonEmptyString
                | TAtomic::TLiteralString { .. }
        );
    }

    if let (TAtomic::TClosure { .. }, TAtomic::TClosure { .. }) =
        (input_type_part, container_type_part)
    {
        // parameter-wise closure checks live with call analysis
        return true;
    }

    if input_type_part.is_object_type() && container_type_part.is_object_type() {
        return object_type_comparator::is_contained_by(
            codebase,
            input_type_part,
            container_type_part,
            result,
        );
    }

    false
}

/// Whether a value could satisfy both atomics at once. Used to decide if an
/// equality check between the two can ever be true.
pub fn can_be_identical(
    codebase: Option<&CodebaseInfo>,
    type1_part: &TAtomic,
    type2_part: &TAtomic,
) -> bool {
    if type1_part.is_mixed() || type2_part.is_mixed() {
        return true;
    }

    is_contained_by(
        codebase,
        type1_part,
        type2_part,
        &mut TypeComparisonResult::new(),
    ) || is_contained_by(
        codebase,
        type2_part,
        type1_part,
        &mut TypeComparisonResult::new(),
    )
}
