use phlint_code_info::assertion::Assertion;
use phlint_code_info::code_location::HPos;
use phlint_code_info::t_atomic::{ArrayKey, TAtomic};
use phlint_code_info::t_union::TUnion;
use phlint_type::type_comparator::{atomic_type_comparator, TypeComparisonResult};
use phlint_type::{get_nothing, get_null};
use rustc_hash::FxHashMap;

use crate::{
    assertion_reconciler, get_acceptable_type, trigger_issue_for_impossible, ReconciliationContext,
};

/// Subtracts a simple asserted type from the existing one. Returns `None`
/// when the subtracted type needs class hierarchy reasoning.
#[allow(clippy::too_many_arguments)]
pub(crate) fn reconcile(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    possibly_undefined: bool,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> Option<TUnion> {
    let assertion_type = match assertion {
        Assertion::Falsy => {
            return Some(reconcile_falsy(
                assertion,
                existing_var_type,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::IsNotIsset => {
            return Some(reconcile_not_isset(
                assertion,
                existing_var_type,
                possibly_undefined,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::ArrayKeyDoesNotExist => {
            return Some(get_nothing());
        }
        Assertion::DoesNotHaveArrayKey(key_name) => {
            return Some(reconcile_no_array_key(
                assertion,
                existing_var_type,
                key_name,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::NotInArray(typed_value) => {
            return Some(reconcile_not_in_array(
                assertion,
                existing_var_type,
                typed_value,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::EmptyCountable => {
            return Some(reconcile_empty_countable(
                assertion,
                existing_var_type,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::DoesNotHaveAtLeastCount(count) => {
            if *count == 1 {
                return Some(reconcile_empty_countable(
                    assertion,
                    existing_var_type,
                    key,
                    ctx,
                    pos,
                    can_report_issues,
                    negated,
                    suppressed_issues,
                ));
            }

            return Some(existing_var_type.clone());
        }
        Assertion::DoesNotHaveExactCount(count) => {
            return Some(reconcile_not_exact_count(
                assertion,
                existing_var_type,
                *count,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::IsNotType(atomic) => atomic,
        // what a value doesn't equal rarely removes a whole type
        Assertion::IsNotEqual(_) | Assertion::IsNotLooselyEqual(_) => {
            return Some(existing_var_type.clone());
        }
        _ => return None,
    };

    let is_simple_target = match assertion_type {
        TAtomic::TNull
        | TAtomic::TBool
        | TAtomic::TFalse
        | TAtomic::TTrue
        | TAtomic::TString
        | TAtomic::TNonEmptyString
        | TAtomic::TNumericString
        | TAtomic::TInt
        | TAtomic::TPositiveInt
        | TAtomic::TFloat
        | TAtomic::TNumeric
        | TAtomic::TScalar
        | TAtomic::TArraykey
        | TAtomic::TObject
        | TAtomic::TResource
        | TAtomic::TCallable
        | TAtomic::TClassString { .. }
        | TAtomic::TArray { .. }
        | TAtomic::TList { .. }
        | TAtomic::TIterable { .. } => true,
        TAtomic::TKeyedArray { known_items, .. } => known_items.is_empty(),
        _ => false,
    };

    if !is_simple_target {
        return None;
    }

    Some(subtract_simple_type(
        assertion,
        existing_var_type,
        assertion_type,
        key,
        ctx,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
    ))
}

/// Members inside the subtracted type are dropped; members that merely
/// overlap are replaced by their remainder where one is expressible.
#[allow(clippy::too_many_arguments)]
fn subtract_simple_type(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    assertion_type: &TAtomic,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    let mut acceptable_types = Vec::new();
    let mut did_remove_type = false;

    let mut removed_ints = false;
    let mut removed_floats = false;

    for (_, atomic) in existing_var_type.types.iter() {
        if let TAtomic::TTemplateParam { as_type, .. } = atomic {
            did_remove_type = true;

            let narrowed = assertion_reconciler::reconcile(
                assertion,
                Some(as_type),
                false,
                None,
                ctx,
                None,
                false,
                false,
                suppressed_issues,
            )
            .value;

            if !narrowed.is_nothing() {
                acceptable_types.push(atomic.replace_template_extends(narrowed));
            }

            continue;
        }

        if atomic.is_mixed() {
            did_remove_type = true;

            if let TAtomic::TNull = assertion_type {
                if !matches!(atomic, TAtomic::TEmptyMixed) {
                    acceptable_types.push(TAtomic::TNonNullMixed);
                    continue;
                }
            }

            acceptable_types.push(atomic.clone());
            continue;
        }

        if atomic_type_comparator::is_contained_by(
            ctx.codebase,
            atomic,
            assertion_type,
            &mut TypeComparisonResult::new(),
        ) {
            did_remove_type = true;

            if atomic.is_int() {
                removed_ints = true;
            }

            if atomic.is_float() {
                removed_floats = true;
            }

            continue;
        }

        if atomic_type_comparator::is_contained_by(
            ctx.codebase,
            assertion_type,
            atomic,
            &mut TypeComparisonResult::new(),
        ) {
            did_remove_type = true;

            match (atomic, assertion_type) {
                (TAtomic::TBool, TAtomic::TFalse) => acceptable_types.push(TAtomic::TTrue),
                (TAtomic::TBool, TAtomic::TTrue) => acceptable_types.push(TAtomic::TFalse),
                (TAtomic::TScalar, TAtomic::TBool | TAtomic::TTrue | TAtomic::TFalse) => {
                    acceptable_types.push(TAtomic::TString);
                    acceptable_types.push(TAtomic::TInt);
                    acceptable_types.push(TAtomic::TFloat);
                }
                (TAtomic::TScalar, TAtomic::TString) => {
                    acceptable_types.push(TAtomic::TInt);
                    acceptable_types.push(TAtomic::TFloat);
                    acceptable_types.push(TAtomic::TBool);
                }
                (TAtomic::TScalar, TAtomic::TInt) => {
                    acceptable_types.push(TAtomic::TString);
                    acceptable_types.push(TAtomic::TFloat);
                    acceptable_types.push(TAtomic::TBool);
                }
                (TAtomic::TScalar, TAtomic::TFloat) => {
                    acceptable_types.push(TAtomic::TString);
                    acceptable_types.push(TAtomic::TInt);
                    acceptable_types.push(TAtomic::TBool);
                }
                (TAtomic::TArraykey, TAtomic::TString) => {
                    acceptable_types.push(TAtomic::TInt);
                }
                (TAtomic::TArraykey, TAtomic::TInt) => {
                    acceptable_types.push(TAtomic::TString);
                }
                (TAtomic::TNumeric, TAtomic::TInt) => {
                    acceptable_types.push(TAtomic::TFloat);
                }
                (TAtomic::TNumeric, TAtomic::TFloat) => {
                    acceptable_types.push(TAtomic::TInt);
                }
                (TAtomic::TString, TAtomic::TNonEmptyString) => {
                    acceptable_types.push(TAtomic::TLiteralString {
                        value: "".to_string(),
                    });
                }
                _ => {
                    // no expressible remainder
                    acceptable_types.push(atomic.clone());
                }
            }

            continue;
        }

        acceptable_types.push(atomic.clone());
    }

    // int arithmetic can overflow to float and float results can land on
    // whole numbers, so a calculated type survives removal as the other kind
    if existing_var_type.from_calculation {
        if removed_ints && matches!(assertion_type, TAtomic::TInt) {
            acceptable_types.push(TAtomic::TFloat);
        }

        if removed_floats && matches!(assertion_type, TAtomic::TFloat) {
            acceptable_types.push(TAtomic::TInt);
        }
    }

    get_acceptable_type(
        acceptable_types,
        did_remove_type,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
        ctx,
    )
}

/// Keeps only what a falsiness check lets through: `false`, zero and empty
/// literals, empty arrays, and the empty corner of mixed.
#[allow(clippy::too_many_arguments)]
pub(crate) fn reconcile_falsy(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    let mut did_remove_type =
        existing_var_type.possibly_undefined || existing_var_type.possibly_undefined_from_try;

    let mut acceptable_types = Vec::new();

    for (_, atomic) in existing_var_type.types.iter() {
        if atomic.is_truthy() {
            did_remove_type = true;
            continue;
        }

        if atomic.is_falsy() {
            acceptable_types.push(atomic.clone());
            continue;
        }

        did_remove_type = true;

        match atomic {
            TAtomic::TBool => {
                acceptable_types.push(TAtomic::TFalse);
            }
            TAtomic::TString | TAtomic::TNumericString => {
                acceptable_types.push(TAtomic::TLiteralString {
                    value: "".to_string(),
                });
                acceptable_types.push(TAtomic::TLiteralString {
                    value: "0".to_string(),
                });
            }
            TAtomic::TInt => {
                acceptable_types.push(TAtomic::TLiteralInt { value: 0 });
            }
            TAtomic::TFloat => {
                acceptable_types.push(TAtomic::TLiteralFloat { value: 0.0 });
            }
            TAtomic::TMixed
            | TAtomic::TMixedFromLoopIsset
            | TAtomic::TNonNullMixed => {
                acceptable_types.push(TAtomic::TEmptyMixed);
            }
            TAtomic::TArray { .. } => {
                acceptable_types.push(TAtomic::TArray {
                    key_param: Box::new(get_nothing()),
                    value_param: Box::new(get_nothing()),
                    non_empty: false,
                });
            }
            TAtomic::TList { .. } => {
                acceptable_types.push(TAtomic::TList {
                    type_param: Box::new(get_nothing()),
                    known_count: Some(0),
                    non_empty: false,
                });
            }
            TAtomic::TKeyedArray { is_list, .. } => {
                acceptable_types.push(TAtomic::TKeyedArray {
                    known_items: std::collections::BTreeMap::new(),
                    params: None,
                    is_list: *is_list,
                    non_empty: false,
                });
            }
            TAtomic::TTemplateParam { as_type, .. } => {
                let narrowed = assertion_reconciler::reconcile(
                    assertion,
                    Some(as_type),
                    false,
                    None,
                    ctx,
                    None,
                    false,
                    false,
                    suppressed_issues,
                )
                .value;

                if !narrowed.is_nothing() {
                    acceptable_types.push(atomic.replace_template_extends(narrowed));
                }
            }
            _ => {
                acceptable_types.push(atomic.clone());
            }
        }
    }

    get_acceptable_type(
        acceptable_types,
        did_remove_type,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
        ctx,
    )
}

#[allow(clippy::too_many_arguments)]
fn reconcile_not_isset(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    possibly_undefined: bool,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    if possibly_undefined || existing_var_type.possibly_undefined {
        return get_nothing();
    }

    if !existing_var_type.has_null() {
        if let (Some(key), Some(pos)) = (key, pos) {
            if can_report_issues {
                trigger_issue_for_impossible(
                    ctx,
                    existing_var_type,
                    &existing_var_type.get_id(),
                    key,
                    assertion,
                    false,
                    negated,
                    pos,
                    suppressed_issues,
                );
            }
        }

        return get_nothing();
    }

    get_null()
}

#[allow(clippy::too_many_arguments)]
fn reconcile_no_array_key(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    key_name: &ArrayKey,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    let mut acceptable_types = Vec::new();
    let mut did_remove_type = false;

    for (_, atomic) in existing_var_type.types.iter() {
        if let TAtomic::TKeyedArray {
            known_items,
            params,
            is_list,
            non_empty,
        } = atomic
        {
            if let Some((possibly_undefined, _)) = known_items.get(key_name) {
                did_remove_type = true;

                if !possibly_undefined && params.is_none() {
                    // the shape guarantees the key
                    continue;
                }

                let mut new_items = known_items.clone();
                new_items.remove(key_name);

                acceptable_types.push(TAtomic::TKeyedArray {
                    known_items: new_items,
                    params: params.clone(),
                    is_list: *is_list,
                    non_empty: *non_empty,
                });
                continue;
            }

            acceptable_types.push(atomic.clone());
            continue;
        }

        did_remove_type = true;
        acceptable_types.push(atomic.clone());
    }

    get_acceptable_type(
        acceptable_types,
        did_remove_type,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
        ctx,
    )
}

#[allow(clippy::too_many_arguments)]
fn reconcile_not_in_array(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    typed_value: &TUnion,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    let mut acceptable_types = Vec::new();

    for (member_key, atomic) in existing_var_type.types.iter() {
        if atomic.is_literal_value() && typed_value.types.contains_key(member_key) {
            continue;
        }

        acceptable_types.push(atomic.clone());
    }

    get_acceptable_type(
        acceptable_types,
        true,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
        ctx,
    )
}

#[allow(clippy::too_many_arguments)]
fn reconcile_empty_countable(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    let mut acceptable_types = Vec::new();
    let mut did_remove_type = false;

    for (_, atomic) in existing_var_type.types.iter() {
        match atomic {
            TAtomic::TArray { non_empty, .. } => {
                if *non_empty {
                    did_remove_type = true;
                    continue;
                }

                did_remove_type = true;
                acceptable_types.push(TAtomic::TArray {
                    key_param: Box::new(get_nothing()),
                    value_param: Box::new(get_nothing()),
                    non_empty: false,
                });
            }
            TAtomic::TList { non_empty, .. } => {
                if *non_empty {
                    did_remove_type = true;
                    continue;
                }

                did_remove_type = true;
                acceptable_types.push(TAtomic::TList {
                    type_param: Box::new(get_nothing()),
                    known_count: Some(0),
                    non_empty: false,
                });
            }
            TAtomic::TKeyedArray {
                known_items,
                is_list,
                non_empty,
                ..
            } => {
                let has_required_items = known_items
                    .iter()
                    .any(|(_, (possibly_undefined, _))| !possibly_undefined);

                if *non_empty || has_required_items {
                    did_remove_type = true;
                    continue;
                }

                did_remove_type = true;
                acceptable_types.push(TAtomic::TKeyedArray {
                    known_items: std::collections::BTreeMap::new(),
                    params: None,
                    is_list: *is_list,
                    non_empty: false,
                });
            }
            _ => {
                did_remove_type = true;
                acceptable_types.push(atomic.clone());
            }
        }
    }

    get_acceptable_type(
        acceptable_types,
        did_remove_type,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
        ctx,
    )
}

#[allow(clippy::too_many_arguments)]
fn reconcile_not_exact_count(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    count: usize,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> TUnion {
    let mut acceptable_types = Vec::new();
    let mut did_remove_type = false;

    for (_, atomic) in existing_var_type.types.iter() {
        match atomic {
            TAtomic::TList {
                known_count: Some(known_count),
                ..
            } => {
                if *known_count == count {
                    did_remove_type = true;
                    continue;
                }

                acceptable_types.push(atomic.clone());
            }
            TAtomic::TKeyedArray {
                known_items,
                params: None,
                ..
            } => {
                let required_count = known_items
                    .iter()
                    .filter(|(_, (possibly_undefined, _))| !possibly_undefined)
                    .count();

                if required_count == known_items.len() && required_count == count {
                    did_remove_type = true;
                    continue;
                }

                did_remove_type = true;
                acceptable_types.push(atomic.clone());
            }
            _ => {
                did_remove_type = true;
                acceptable_types.push(atomic.clone());
            }
        }
    }

    get_acceptable_type(
        acceptable_types,
        did_remove_type,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
        ctx,
    )
}
