use phlint_code_info::t_atomic::TAtomic;

use super::TypeComparisonResult;

/// Containment between two scalar atomics. Callers have already ruled out
/// array and object inputs.
pub fn is_contained_by(
    input_type_part: &TAtomic,
    container_type_part: &TAtomic,
    result: &mut TypeComparisonResult,
) -> bool {
    if let TAtomic::TScalar = container_type_part {
        return input_type_part.is_some_scalar();
    }

    if let TAtomic::TArraykey = container_type_part {
        return input_type_part.is_int()
            || input_type_part.is_string()
            || matches!(input_type_part, TAtomic::TArraykey);
    }

    if let TAtomic::TNumeric = container_type_part {
        return input_type_part.is_int()
            || input_type_part.is_float()
            || matches!(
                input_type_part,
                TAtomic::TNumeric | TAtomic::TNumericString
            );
    }

    match (input_type_part, container_type_part) {
        (TAtomic::TBool | TAtomic::TTrue | TAtomic::TFalse, TAtomic::TBool) => return true,
        (TAtomic::TTrue, TAtomic::TTrue) => return true,
        (TAtomic::TFalse, TAtomic::TFalse) => return true,
        (TAtomic::TBool, TAtomic::TTrue | TAtomic::TFalse) => {
            result.type_coerced = Some(true);
            return false;
        }
        _ => (),
    }

    if container_type_part.is_int() {
        return match (input_type_part, container_type_part) {
            (_, TAtomic::TInt) => input_type_part.is_int(),
            (TAtomic::TLiteralInt { value }, TAtomic::TPositiveInt) => *value > 0,
            (TAtomic::TPositiveInt, TAtomic::TPositiveInt) => true,
            (TAtomic::TInt, TAtomic::TPositiveInt) => {
                result.type_coerced = Some(true);
                false
            }
            (
                TAtomic::TLiteralInt { value: input_value },
                TAtomic::TLiteralInt {
                    value: container_value,
                },
            ) => input_value == container_value,
            (TAtomic::TInt | TAtomic::TPositiveInt, TAtomic::TLiteralInt { .. }) => {
                result.type_coerced = Some(true);
                false
            }
            _ => false,
        };
    }

    if container_type_part.is_float() {
        return match (input_type_part, container_type_part) {
            (_, TAtomic::TFloat) => input_type_part.is_float(),
            (
                TAtomic::TLiteralFloat { value: input_value },
                TAtomic::TLiteralFloat {
                    value: container_value,
                },
            ) => input_value == container_value,
            (TAtomic::TFloat, TAtomic::TLiteralFloat { .. }) => {
                result.type_coerced = Some(true);
                false
            }
            _ => false,
        };
    }

    if container_type_part.is_string() {
        return match (input_type_part, container_type_part) {
            (_, TAtomic::TString) => input_type_part.is_string(),
            (TAtomic::TLiteralString { value }, TAtomic::TNonEmptyString) => !value.is_empty(),
            (
                TAtomic::TNonEmptyString
                | TAtomic::TNumericString
                | TAtomic::TClassString { .. }
                | TAtomic::TLiteralClassString { .. },
                TAtomic::TNonEmptyString,
            ) => true,
            (TAtomic::TString, TAtomic::TNonEmptyString | TAtomic::TNumericString) => {
                result.type_coerced = Some(true);
                false
            }
            (TAtomic::TLiteralString { value }, TAtomic::TNumericString) => {
                value.parse::<f64>().is_ok()
            }
            (TAtomic::TNumericString, TAtomic::TNumericString) => true,
            (TAtomic::TNonEmptyString, TAtomic::TNumericString) => {
                result.type_coerced = Some(true);
                false
            }
            (
                TAtomic::TLiteralString { value: input_value },
                TAtomic::TLiteralString {
                    value: container_value,
                },
            ) => input_value == container_value,
            (
                TAtomic::TLiteralClassString { value: input_value },
                TAtomic::TLiteralString {
                    value: container_value,
                },
            ) => input_value == container_value,
            (
                TAtomic::TString | TAtomic::TNonEmptyString | TAtomic::TNumericString,
                TAtomic::TLiteralString { .. },
            ) => {
                result.type_coerced = Some(true);
                false
            }
            (
                TAtomic::TLiteralClassString { value: input_name },
                TAtomic::TClassString {
                    as_name: container_name,
                    ..
                },
            ) => input_name == container_name || container_name == "object",
            (
                TAtomic::TClassString {
                    as_name: input_name,
                    ..
                },
                TAtomic::TClassString {
                    as_name: container_name,
                    ..
                },
            ) => input_name == container_name || container_name == "object",
            (TAtomic::TString, TAtomic::TClassString { .. }) => {
                result.type_coerced = Some(true);
                false
            }
            _ => false,
        };
    }

    false
}
