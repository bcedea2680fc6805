use phlint_code_info::assertion::Assertion;
use phlint_code_info::code_location::HPos;
use phlint_code_info::t_atomic::{ArrayKey, TAtomic};
use phlint_code_info::t_union::TUnion;
use phlint_type::type_comparator::{atomic_type_comparator, union_type_comparator, TypeComparisonResult};
use phlint_type::wrap_atomic;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::{assertion_reconciler, get_acceptable_type, ReconciliationContext};

/// Narrows a type with assertions whose target is a simple type — scalars,
/// generic arrays, and structural facts like isset or countability. Returns
/// `None` when the assertion needs the richer intersection machinery.
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
        Assertion::IsIsset | Assertion::IsEqualIsset => {
            return Some(reconcile_isset(
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
        Assertion::ArrayKeyExists => {
            let mut new_var_type = existing_var_type.clone();
            new_var_type.possibly_undefined = false;
            return Some(new_var_type);
        }
        Assertion::HasArrayKey(key_name) => {
            return Some(reconcile_has_array_key(
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
        Assertion::InArray(typed_value) => {
            return Some(reconcile_in_array(
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
        Assertion::HasMethod(method_name) => {
            return Some(reconcile_has_method(
                assertion,
                existing_var_type,
                method_name,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::Truthy => {
            return Some(reconcile_truthy(
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
        Assertion::NonEmptyCountable(_) => {
            return Some(reconcile_array_min_count(
                assertion,
                existing_var_type,
                1,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            ));
        }
        Assertion::HasAtLeastCount(count) => {
            return Some(reconcile_array_min_count(
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
        Assertion::HasExactCount(count) => {
            return Some(reconcile_exactly_countable(
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
        Assertion::IsType(atomic) | Assertion::IsEqual(atomic) | Assertion::IsLooselyEqual(atomic) => {
            atomic
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
        | TAtomic::TMixed
        | TAtomic::TNonNullMixed
        | TAtomic::TArray { .. }
        | TAtomic::TList { .. }
        | TAtomic::TIterable { .. } => true,
        TAtomic::TKeyedArray { known_items, .. } => known_items.is_empty(),
        _ => false,
    };

    if !is_simple_target {
        return None;
    }

    Some(intersect_simple_type(
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

/// The shared narrowing loop: members fully inside the asserted type stay,
/// members the asserted type fits inside are replaced by it, and everything
/// disjoint is dropped.
#[allow(clippy::too_many_arguments)]
fn intersect_simple_type(
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

        if atomic_type_comparator::is_contained_by(
            ctx.codebase,
            atomic,
            assertion_type,
            &mut TypeComparisonResult::new(),
        ) {
            acceptable_types.push(atomic.clone());
            continue;
        }

        if atomic_type_comparator::is_contained_by(
            ctx.codebase,
            assertion_type,
            atomic,
            &mut TypeComparisonResult::new(),
        ) {
            let mut narrowed_atomic = assertion_type.clone();
            narrowed_atomic.remove_placeholders();
            acceptable_types.push(narrowed_atomic);
            did_remove_type = true;
            continue;
        }

        did_remove_type = true;
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
fn reconcile_isset(
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
    let mut did_remove_type = possibly_undefined
        || existing_var_type.possibly_undefined
        || existing_var_type.possibly_undefined_from_try;

    let mut acceptable_types = Vec::new();

    for (type_key, atomic) in existing_var_type.types.iter() {
        if type_key == "null" {
            did_remove_type = true;
            continue;
        }

        if let TAtomic::TMixedFromLoopIsset = atomic {
            // a loop-isset marker is only a guess; isset resolves it
            did_remove_type = true;
            acceptable_types.push(TAtomic::TMixed);
            continue;
        }

        acceptable_types.push(atomic.clone());
    }

    let mut new_var_type = get_acceptable_type(
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
    );

    new_var_type.possibly_undefined = false;
    new_var_type.possibly_undefined_from_try = false;
    new_var_type
}

#[allow(clippy::too_many_arguments)]
fn reconcile_truthy(
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
        if atomic.is_falsy() {
            did_remove_type = true;
            continue;
        }

        if atomic.is_truthy() {
            acceptable_types.push(atomic.clone());
            continue;
        }

        did_remove_type = true;

        match atomic {
            TAtomic::TBool => {
                acceptable_types.push(TAtomic::TTrue);
            }
            TAtomic::TString => {
                acceptable_types.push(TAtomic::TNonEmptyString);
            }
            TAtomic::TMixed | TAtomic::TMixedFromLoopIsset | TAtomic::TNonNullMixed => {
                acceptable_types.push(TAtomic::TNonEmptyMixed);
            }
            TAtomic::TArray {
                key_param,
                value_param,
                ..
            } => {
                acceptable_types.push(TAtomic::TArray {
                    key_param: key_param.clone(),
                    value_param: value_param.clone(),
                    non_empty: true,
                });
            }
            TAtomic::TList {
                type_param,
                known_count,
                ..
            } => {
                acceptable_types.push(TAtomic::TList {
                    type_param: type_param.clone(),
                    known_count: *known_count,
                    non_empty: true,
                });
            }
            TAtomic::TKeyedArray {
                known_items,
                params,
                is_list,
                ..
            } => {
                acceptable_types.push(TAtomic::TKeyedArray {
                    known_items: known_items.clone(),
                    params: params.clone(),
                    is_list: *is_list,
                    non_empty: true,
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

    let mut new_var_type = get_acceptable_type(
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
    );

    new_var_type.possibly_undefined = false;
    new_var_type.possibly_undefined_from_try = false;
    new_var_type
}

#[allow(clippy::too_many_arguments)]
fn reconcile_has_array_key(
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
        match atomic {
            TAtomic::TKeyedArray {
                known_items,
                params,
                is_list,
                ..
            } => {
                if let Some((possibly_undefined, item_type)) = known_items.get(key_name) {
                    did_remove_type = did_remove_type || *possibly_undefined;

                    let mut new_items = known_items.clone();
                    new_items.insert(key_name.clone(), (false, item_type.clone()));

                    acceptable_types.push(TAtomic::TKeyedArray {
                        known_items: new_items,
                        params: params.clone(),
                        is_list: *is_list,
                        non_empty: true,
                    });
                } else if let Some((key_param, value_param)) = params {
                    did_remove_type = true;

                    if union_type_comparator::can_expression_types_be_identical(
                        ctx.codebase,
                        &wrap_atomic(key_name.to_atomic()),
                        key_param.as_ref(),
                    ) {
                        let mut new_items = known_items.clone();
                        new_items
                            .insert(key_name.clone(), (false, Arc::new((**value_param).clone())));

                        acceptable_types.push(TAtomic::TKeyedArray {
                            known_items: new_items,
                            params: params.clone(),
                            is_list: *is_list,
                            non_empty: true,
                        });
                    }
                } else {
                    // sealed shape without the key
                    did_remove_type = true;
                }
            }
            TAtomic::TArray {
                key_param,
                value_param,
                ..
            } => {
                did_remove_type = true;

                if union_type_comparator::can_expression_types_be_identical(
                    ctx.codebase,
                    &wrap_atomic(key_name.to_atomic()),
                    key_param.as_ref(),
                ) {
                    acceptable_types.push(TAtomic::TArray {
                        key_param: key_param.clone(),
                        value_param: value_param.clone(),
                        non_empty: true,
                    });
                }
            }
            TAtomic::TList {
                type_param,
                known_count,
                ..
            } => {
                did_remove_type = true;

                if let ArrayKey::Int(index) = key_name {
                    let within_bounds = match known_count {
                        Some(known_count) => (*index as usize) < *known_count,
                        None => true,
                    };

                    if *index >= 0 && within_bounds {
                        acceptable_types.push(TAtomic::TList {
                            type_param: type_param.clone(),
                            known_count: *known_count,
                            non_empty: true,
                        });
                    }
                }
            }
            TAtomic::TMixed
            | TAtomic::TMixedFromLoopIsset
            | TAtomic::TNonEmptyMixed
            | TAtomic::TNonNullMixed
            | TAtomic::TTemplateParam { .. }
            | TAtomic::TObject
            | TAtomic::TNamedObject { .. } => {
                did_remove_type = true;
                acceptable_types.push(atomic.clone());
            }
            _ => {
                did_remove_type = true;
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
fn reconcile_in_array(
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

    for (_, asserted_atomic) in typed_value.types.iter() {
        for (_, existing_atomic) in existing_var_type.types.iter() {
            if atomic_type_comparator::is_contained_by(
                ctx.codebase,
                asserted_atomic,
                existing_atomic,
                &mut TypeComparisonResult::new(),
            ) {
                acceptable_types.push(asserted_atomic.clone());
            } else if atomic_type_comparator::is_contained_by(
                ctx.codebase,
                existing_atomic,
                asserted_atomic,
                &mut TypeComparisonResult::new(),
            ) {
                acceptable_types.push(existing_atomic.clone());
            }
        }
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
fn reconcile_has_method(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    method_name: &str,
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
            TAtomic::TNamedObject { name, .. } => {
                let codebase = match ctx.codebase {
                    Some(codebase) => codebase,
                    None => {
                        acceptable_types.push(atomic.clone());
                        continue;
                    }
                };

                if !codebase.class_or_interface_exists(name) {
                    acceptable_types.push(atomic.clone());
                    continue;
                }

                if codebase.method_exists(name, method_name) {
                    acceptable_types.push(atomic.clone());
                    continue;
                }

                did_remove_type = true;

                let is_final = codebase
                    .get_classlike_info(name)
                    .map(|info| info.is_final)
                    .unwrap_or(false);

                // a subclass may still add the method
                if !is_final {
                    acceptable_types.push(atomic.clone());
                }
            }
            TAtomic::TObject
            | TAtomic::TMixed
            | TAtomic::TMixedFromLoopIsset
            | TAtomic::TNonEmptyMixed
            | TAtomic::TNonNullMixed
            | TAtomic::TTemplateParam { .. } => {
                did_remove_type = true;
                acceptable_types.push(atomic.clone());
            }
            _ => {
                did_remove_type = true;
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
fn reconcile_array_min_count(
    assertion: &Assertion,
    existing_var_type: &TUnion,
    min_count: usize,
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
            TAtomic::TArray {
                key_param,
                value_param,
                non_empty,
            } => {
                if key_param.is_nothing() && value_param.is_nothing() {
                    did_remove_type = true;
                    continue;
                }

                did_remove_type = did_remove_type || !non_empty;
                acceptable_types.push(TAtomic::TArray {
                    key_param: key_param.clone(),
                    value_param: value_param.clone(),
                    non_empty: true,
                });
            }
            TAtomic::TList {
                type_param,
                known_count,
                non_empty,
            } => {
                if let Some(known_count) = known_count {
                    if *known_count < min_count {
                        did_remove_type = true;
                        continue;
                    }
                }

                did_remove_type = did_remove_type || !non_empty;
                acceptable_types.push(TAtomic::TList {
                    type_param: type_param.clone(),
                    known_count: *known_count,
                    non_empty: true,
                });
            }
            TAtomic::TKeyedArray {
                known_items,
                params,
                is_list,
                non_empty,
            } => {
                let defined_count = known_items
                    .iter()
                    .filter(|(_, (possibly_undefined, _))| !possibly_undefined)
                    .count();

                if params.is_none() && known_items.len() < min_count {
                    did_remove_type = true;
                    continue;
                }

                if defined_count >= min_count {
                    acceptable_types.push(atomic.clone());
                    continue;
                }

                did_remove_type = did_remove_type || !non_empty;
                acceptable_types.push(TAtomic::TKeyedArray {
                    known_items: known_items.clone(),
                    params: params.clone(),
                    is_list: *is_list,
                    non_empty: true,
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
fn reconcile_exactly_countable(
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
                type_param,
                known_count,
                ..
            } => match known_count {
                Some(known_count) => {
                    if *known_count == count {
                        acceptable_types.push(atomic.clone());
                    } else {
                        did_remove_type = true;
                    }
                }
                None => {
                    did_remove_type = true;
                    acceptable_types.push(TAtomic::TList {
                        type_param: type_param.clone(),
                        known_count: Some(count),
                        non_empty: count > 0,
                    });
                }
            },
            TAtomic::TArray {
                key_param,
                value_param,
                non_empty,
            } => {
                if key_param.is_nothing() && value_param.is_nothing() && count > 0 {
                    did_remove_type = true;
                    continue;
                }

                did_remove_type = true;
                acceptable_types.push(TAtomic::TArray {
                    key_param: key_param.clone(),
                    value_param: value_param.clone(),
                    non_empty: *non_empty || count > 0,
                });
            }
            TAtomic::TKeyedArray {
                known_items,
                params,
                ..
            } => {
                let required_count = known_items
                    .iter()
                    .filter(|(_, (possibly_undefined, _))| !possibly_undefined)
                    .count();

                if params.is_none() {
                    // a sealed shape has a knowable count range
                    if required_count <= count && count <= known_items.len() {
                        did_remove_type = did_remove_type || required_count != known_items.len();
                        acceptable_types.push(atomic.clone());
                    } else {
                        did_remove_type = true;
                    }
                } else {
                    did_remove_type = true;
                    acceptable_types.push(atomic.clone());
                }
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
