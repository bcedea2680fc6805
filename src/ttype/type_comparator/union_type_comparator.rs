use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;

use super::{atomic_type_comparator, TypeComparisonResult};

/// Whether every member of `input_type` fits somewhere in `container_type`.
pub fn is_contained_by(
    codebase: Option<&CodebaseInfo>,
    input_type: &TUnion,
    container_type: &TUnion,
    result: &mut TypeComparisonResult,
) -> bool {
    if container_type.is_mixed() {
        return true;
    }

    if input_type.possibly_undefined && !container_type.possibly_undefined {
        return false;
    }

    for (_, input_type_part) in input_type.types.iter() {
        if let TAtomic::TNull = input_type_part {
            if container_type.has_null() {
                continue;
            }

            return false;
        }

        let mut type_match_found = false;
        let mut all_type_coerced = None;
        let mut all_type_coerced_from_nested_mixed = None;

        for (_, container_type_part) in container_type.types.iter() {
            let mut atomic_comparison_result = TypeComparisonResult::new();

            let is_atomic_contained_by = atomic_type_comparator::is_contained_by(
                codebase,
                input_type_part,
                container_type_part,
                &mut atomic_comparison_result,
            );

            if is_atomic_contained_by {
                type_match_found = true;
                all_type_coerced = Some(false);
                all_type_coerced_from_nested_mixed = Some(false);

                if let Some(replacement) = atomic_comparison_result.replacement_atomic_type {
                    result.replacement_atomic_type = Some(replacement);
                }
            } else {
                if atomic_comparison_result.type_coerced.unwrap_or(false)
                    && all_type_coerced.unwrap_or(true)
                {
                    all_type_coerced = Some(true);
                } else {
                    all_type_coerced = Some(false);
                }

                if atomic_comparison_result
                    .type_coerced_from_nested_mixed
                    .unwrap_or(false)
                    && all_type_coerced_from_nested_mixed.unwrap_or(true)
                {
                    all_type_coerced_from_nested_mixed = Some(true);
                } else {
                    all_type_coerced_from_nested_mixed = Some(false);
                }
            }
        }

        if !type_match_found {
            if all_type_coerced.unwrap_or(false) {
                result.type_coerced = Some(true);
            }

            if all_type_coerced_from_nested_mixed.unwrap_or(false) {
                result.type_coerced_from_nested_mixed = Some(true);
            }

            return false;
        }
    }

    true
}

/// Containment of a lone atomic in a union.
pub fn is_contained_by_union(
    codebase: Option<&CodebaseInfo>,
    input_type_part: &TAtomic,
    container_type: &TUnion,
    result: &mut TypeComparisonResult,
) -> bool {
    for (_, container_type_part) in container_type.types.iter() {
        if atomic_type_comparator::is_contained_by(
            codebase,
            input_type_part,
            container_type_part,
            result,
        ) {
            return true;
        }
    }

    false
}

/// Whether some value could inhabit both unions, i.e. whether `==` between
/// expressions of these types can ever succeed.
pub fn can_expression_types_be_identical(
    codebase: Option<&CodebaseInfo>,
    type1: &TUnion,
    type2: &TUnion,
) -> bool {
    if type1.is_mixed() || type2.is_mixed() {
        return true;
    }

    if type1.is_nullable() && type2.is_nullable() {
        return true;
    }

    for (_, type1_part) in type1.types.iter() {
        for (_, type2_part) in type2.types.iter() {
            if atomic_type_comparator::can_be_identical(codebase, type1_part, type2_part) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_arraykey, get_int, get_literal_int, get_mixed, get_string, wrap_atomic};

    #[test]
    fn literal_int_is_contained_in_int() {
        let mut result = TypeComparisonResult::new();
        assert!(is_contained_by(
            None,
            &get_literal_int(5),
            &get_int(),
            &mut result
        ));
    }

    #[test]
    fn int_is_coerced_to_literal_not_contained() {
        let mut result = TypeComparisonResult::new();
        assert!(!is_contained_by(
            None,
            &get_int(),
            &get_literal_int(5),
            &mut result
        ));
        assert_eq!(result.type_coerced, Some(true));
    }

    #[test]
    fn string_and_int_both_fit_arraykey() {
        let mut result = TypeComparisonResult::new();
        let input = crate::combine_union_types(&get_string(), &get_int(), None, false);
        assert!(is_contained_by(None, &input, &get_arraykey(), &mut result));
    }

    #[test]
    fn mixed_container_accepts_everything() {
        let mut result = TypeComparisonResult::new();
        assert!(is_contained_by(None, &get_string(), &get_mixed(), &mut result));
    }

    #[test]
    fn mixed_input_is_nested_coercion() {
        let mut result = TypeComparisonResult::new();
        assert!(!is_contained_by(None, &get_mixed(), &get_string(), &mut result));
        assert_eq!(result.type_coerced_from_nested_mixed, Some(true));
    }

    #[test]
    fn unknown_classes_are_assumed_compatible() {
        let mut result = TypeComparisonResult::new();
        let input = crate::get_named_object("SomeUnknownClass".to_string());
        let container = crate::get_named_object("OtherUnknownClass".to_string());
        assert!(is_contained_by(None, &input, &container, &mut result));
    }

    #[test]
    fn disjoint_literals_can_never_be_identical() {
        assert!(!can_expression_types_be_identical(
            None,
            &get_literal_int(5),
            &crate::get_literal_string("a".to_string())
        ));
        assert!(can_expression_types_be_identical(
            None,
            &get_literal_int(5),
            &get_int()
        ));
    }

    #[test]
    fn int_literal_and_float_can_loosely_match_via_numeric() {
        assert!(can_expression_types_be_identical(
            None,
            &get_literal_int(5),
            &wrap_atomic(phlint_code_info::t_atomic::TAtomic::TNumeric)
        ));
    }
}
