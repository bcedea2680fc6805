use phlint_code_info::assertion::Assertion;
use phlint_code_info::code_location::HPos;
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;
use phlint_type::type_combiner;
use phlint_type::type_comparator::{atomic_type_comparator, TypeComparisonResult};
use phlint_type::type_expander::{self, TypeExpansionOptions};
use phlint_type::{get_mixed, wrap_atomic, DEFAULT_LITERAL_LIMIT};
use rustc_hash::FxHashMap;

use crate::{
    get_acceptable_type, negated_assertion_reconciler, simple_assertion_reconciler,
    ReconciledType, ReconciliationContext, ReconciliationStatus,
};

/// Applies one assertion to a type and returns the narrowed type with its
/// outcome. A `None` existing type means the variable was unknown to the
/// scope; the assertion itself then seeds the type.
#[allow(clippy::too_many_arguments)]
pub fn reconcile(
    assertion: &Assertion,
    existing_var_type: Option<&TUnion>,
    possibly_undefined: bool,
    key: Option<&String>,
    ctx: &mut ReconciliationContext,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
) -> ReconciledType {
    let existing_var_type = match existing_var_type {
        Some(existing_var_type) => existing_var_type,
        None => {
            return ReconciledType {
                value: get_missing_type(assertion, possibly_undefined, key),
                status: ReconciliationStatus::Ok,
            };
        }
    };

    // an outer negation folds into the assertion itself; `negated` is kept
    // only so diagnostics describe the original condition
    let negated_assertion;
    let assertion = if negated {
        negated_assertion = assertion.get_negation();
        &negated_assertion
    } else {
        assertion
    };

    if let Some(key) = key {
        ctx.logger.log_debug(&format!(
            "narrowing {} from {} with {}",
            key,
            existing_var_type.get_id(),
            assertion.to_string()
        ));
    }

    let prior_status = ctx.status;
    ctx.status = ReconciliationStatus::Ok;

    let is_negation = assertion.has_negation();

    let mut new_var_type = if is_negation {
        negated_assertion_reconciler::reconcile(
            assertion,
            existing_var_type,
            possibly_undefined,
            key,
            ctx,
            pos,
            can_report_issues,
            negated,
            suppressed_issues,
        )
    } else if let Assertion::Any = assertion {
        existing_var_type.clone()
    } else if let Some(simple_type) = simple_assertion_reconciler::reconcile(
        assertion,
        existing_var_type,
        possibly_undefined,
        key,
        ctx,
        pos,
        can_report_issues,
        negated,
        suppressed_issues,
    ) {
        simple_type
    } else if assertion.has_literal_string_or_int() {
        let assertion_type = assertion.get_type().unwrap();
        handle_literal_equality(
            assertion,
            existing_var_type,
            assertion_type,
            key,
            ctx,
            pos,
            can_report_issues,
            negated,
            suppressed_issues,
        )
    } else if let Some(assertion_type) = assertion.get_type() {
        refine_with_atomic(
            assertion,
            existing_var_type,
            assertion_type,
            key,
            ctx,
            pos,
            can_report_issues,
            negated,
            suppressed_issues,
        )
    } else {
        existing_var_type.clone()
    };

    if let Some(codebase) = ctx.codebase {
        let mut expansion_issues = Vec::new();
        type_expander::expand_union(
            codebase,
            &mut new_var_type,
            &TypeExpansionOptions::default(),
            &mut expansion_issues,
        );

        for issue in expansion_issues {
            ctx.issues.maybe_add_issue(issue, suppressed_issues);
        }
    }

    let mut status = ctx.status;
    ctx.status = prior_status;

    // an emptied type always counts as a failure, whether or not a
    // contradiction was also reported; Contradiction is for narrowings
    // that keep the type
    if new_var_type.is_nothing() && !existing_var_type.is_nothing() {
        status = ReconciliationStatus::Failed;

        if existing_var_type.from_docblock {
            // a docblock lied; recover with mixed rather than poisoning
            // everything downstream
            new_var_type = get_mixed();
        }
    }

    ReconciledType {
        value: new_var_type,
        status,
    }
}

/// The type an assertion implies for a variable nothing was known about.
fn get_missing_type(assertion: &Assertion, possibly_undefined: bool, key: Option<&String>) -> TUnion {
    if let Some(key) = key {
        if matches!(
            key.as_str(),
            "$_GET"
                | "$_POST"
                | "$_REQUEST"
                | "$_COOKIE"
                | "$_FILES"
                | "$_SERVER"
                | "$_ENV"
                | "$_SESSION"
                | "$GLOBALS"
        ) {
            return wrap_atomic(TAtomic::TArray {
                key_param: Box::new(phlint_type::get_string()),
                value_param: Box::new(get_mixed()),
                non_empty: false,
            });
        }
    }

    match assertion {
        Assertion::IsIsset
        | Assertion::IsEqualIsset
        | Assertion::ArrayKeyExists
        | Assertion::HasArrayKey(_)
        | Assertion::InArray(_)
        | Assertion::HasMethod(_)
        | Assertion::NonEmptyCountable(_)
        | Assertion::HasAtLeastCount(_)
        | Assertion::HasExactCount(_) => {
            let mut new_var_type = get_mixed();
            new_var_type.possibly_undefined = possibly_undefined;
            new_var_type
        }
        Assertion::IsType(atomic) | Assertion::IsEqual(atomic) | Assertion::IsLooselyEqual(atomic) => {
            let mut atomic = atomic.clone();
            atomic.remove_placeholders();

            let mut new_var_type = wrap_atomic(atomic);
            new_var_type.possibly_undefined = possibly_undefined;
            new_var_type
        }
        _ => get_mixed(),
    }
}

/// Narrows with an equality against a literal: a matching literal member is
/// kept alone, a general member of that kind collapses to the literal, and
/// under loose rules a numeric literal reaches across the int/float divide.
#[allow(clippy::too_many_arguments)]
fn handle_literal_equality(
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
    let is_loose = matches!(assertion, Assertion::IsLooselyEqual(_));
    let assertion_key = assertion_type.get_key();

    let mut acceptable_types = Vec::new();
    let mut did_remove_type = false;

    for (member_key, atomic) in existing_var_type.types.iter() {
        if *member_key == assertion_key {
            acceptable_types.push(atomic.clone());
            continue;
        }

        if let TAtomic::TTemplateParam { as_type, .. } = atomic {
            did_remove_type = true;

            let narrowed = reconcile(
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
            assertion_type,
            atomic,
            &mut TypeComparisonResult::new(),
        ) {
            acceptable_types.push(assertion_type.clone());
            did_remove_type = true;
            continue;
        }

        if is_loose && negated_assertion_reconciler::loosely_matches(atomic, assertion_type) {
            did_remove_type = true;

            if atomic.is_literal_value() {
                acceptable_types.push(atomic.clone());
            } else if let Some(coerced) = cross_coerced_literal(atomic, assertion_type) {
                acceptable_types.push(coerced);
            } else {
                acceptable_types.push(atomic.clone());
            }

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
        can_report_issues && !is_loose,
        negated,
        suppressed_issues,
        ctx,
    )
}

/// The literal a general member collapses to when a loose equality crosses
/// numeric kinds, e.g. `== 5` turning a float member into `float(5)`.
fn cross_coerced_literal(member: &TAtomic, literal: &TAtomic) -> Option<TAtomic> {
    match (member, literal) {
        (TAtomic::TFloat | TAtomic::TNumeric, TAtomic::TLiteralInt { value }) => {
            Some(TAtomic::TLiteralFloat {
                value: *value as f64,
            })
        }
        (TAtomic::TInt | TAtomic::TPositiveInt, TAtomic::TLiteralFloat { value }) => {
            if value.fract() == 0.0 {
                Some(TAtomic::TLiteralInt {
                    value: *value as i64,
                })
            } else {
                None
            }
        }
        (TAtomic::TInt | TAtomic::TPositiveInt, TAtomic::TLiteralString { value }) => value
            .parse::<i64>()
            .ok()
            .map(|value| TAtomic::TLiteralInt { value }),
        (TAtomic::TFloat, TAtomic::TLiteralString { value }) => value
            .parse::<f64>()
            .ok()
            .map(|value| TAtomic::TLiteralFloat { value }),
        (
            TAtomic::TNumericString | TAtomic::TNonEmptyString | TAtomic::TString,
            TAtomic::TLiteralInt { value },
        ) => Some(TAtomic::TLiteralString {
            value: value.to_string(),
        }),
        _ => None,
    }
}

/// The fallback for assertion targets the simple reconciler refuses —
/// named objects, class strings, shapes with known entries, templates.
#[allow(clippy::too_many_arguments)]
fn refine_with_atomic(
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

    for (_, atomic) in existing_var_type.types.iter() {
        if let Some(intersected) = intersect_atomic_with_atomic(ctx, atomic, assertion_type) {
            acceptable_types.push(intersected);
        }
    }

    if acceptable_types.len() > 1 {
        acceptable_types = type_combiner::combine(
            acceptable_types,
            ctx.codebase,
            false,
            true,
            DEFAULT_LITERAL_LIMIT,
        );
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

/// The largest type inhabited by both atomics, or `None` when they are
/// provably disjoint.
pub(crate) fn intersect_atomic_with_atomic(
    ctx: &mut ReconciliationContext,
    type_1_atomic: &TAtomic,
    type_2_atomic: &TAtomic,
) -> Option<TAtomic> {
    if type_1_atomic.is_mixed() {
        let mut narrowed = type_2_atomic.clone();
        narrowed.remove_placeholders();
        return Some(narrowed);
    }

    if atomic_type_comparator::is_contained_by(
        ctx.codebase,
        type_2_atomic,
        type_1_atomic,
        &mut TypeComparisonResult::new(),
    ) {
        let mut narrowed = type_2_atomic.clone();
        narrowed.remove_placeholders();
        return Some(narrowed);
    }

    if atomic_type_comparator::is_contained_by(
        ctx.codebase,
        type_1_atomic,
        type_2_atomic,
        &mut TypeComparisonResult::new(),
    ) {
        return Some(type_1_atomic.clone());
    }

    if let (
        TAtomic::TKeyedArray {
            known_items: items_1,
            params: params_1,
            is_list: is_list_1,
            non_empty: non_empty_1,
        },
        TAtomic::TKeyedArray {
            known_items: items_2,
            params: params_2,
            ..
        },
    ) = (type_1_atomic, type_2_atomic)
    {
        let mut merged_items = items_1.clone();

        for (entry_key, (possibly_undefined_2, item_type_2)) in items_2 {
            match merged_items.get_mut(entry_key) {
                Some((possibly_undefined_1, item_type_1)) => {
                    *possibly_undefined_1 = *possibly_undefined_1 && *possibly_undefined_2;

                    // the narrower of the two entry types wins
                    if phlint_type::type_comparator::union_type_comparator::is_contained_by(
                        ctx.codebase,
                        item_type_2.as_ref(),
                        item_type_1.as_ref(),
                        &mut TypeComparisonResult::new(),
                    ) {
                        *item_type_1 = item_type_2.clone();
                    }
                }
                None => {
                    if params_1.is_none() && !possibly_undefined_2 {
                        // a sealed shape can't gain a required key
                        return None;
                    }

                    merged_items
                        .insert(entry_key.clone(), (*possibly_undefined_2, item_type_2.clone()));
                }
            }
        }

        for (entry_key, (possibly_undefined_1, _)) in items_1 {
            if !items_2.contains_key(entry_key) && params_2.is_none() && !possibly_undefined_1 {
                return None;
            }
        }

        return Some(TAtomic::TKeyedArray {
            known_items: merged_items,
            params: match (params_1, params_2) {
                (Some(params_1), Some(_)) => Some(params_1.clone()),
                _ => None,
            },
            is_list: *is_list_1,
            non_empty: *non_empty_1,
        });
    }

    if let TAtomic::TTemplateParam { as_type, .. } = type_1_atomic {
        let mut acceptable_types = Vec::new();
        for (_, as_atomic) in as_type.types.iter() {
            if let Some(intersected) = intersect_atomic_with_atomic(ctx, as_atomic, type_2_atomic) {
                acceptable_types.push(intersected);
            }
        }

        if acceptable_types.is_empty() {
            return None;
        }

        return Some(type_1_atomic.replace_template_extends(TUnion::new(acceptable_types)));
    }

    if let TAtomic::TTemplateParam { as_type, .. } = type_2_atomic {
        let mut acceptable_types = Vec::new();
        for (_, as_atomic) in as_type.types.iter() {
            if let Some(intersected) = intersect_atomic_with_atomic(ctx, type_1_atomic, as_atomic) {
                acceptable_types.push(intersected);
            }
        }

        if acceptable_types.is_empty() {
            return None;
        }

        return Some(type_2_atomic.replace_template_extends(TUnion::new(acceptable_types)));
    }

    if let (
        TAtomic::TNamedObject { name: name_1, .. },
        TAtomic::TNamedObject { name: name_2, .. },
    ) = (type_1_atomic, type_2_atomic)
    {
        if let Some(codebase) = ctx.codebase {
            // a class can meet an interface in a subclass even when neither
            // contains the other
            if codebase.interface_exists(name_1) || codebase.interface_exists(name_2) {
                let mut intersected = type_1_atomic.clone();
                intersected.add_intersection_type(type_2_atomic.clone_without_intersection_types());
                return Some(intersected);
            }
        }

        return None;
    }

    None
}
