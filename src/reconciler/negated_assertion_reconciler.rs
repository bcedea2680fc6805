use phlint_code_info::assertion::Assertion;
use phlint_code_info::code_location::HPos;
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;
use phlint_type::type_comparator::{atomic_type_comparator, TypeComparisonResult};
use rustc_hash::FxHashMap;

use crate::{
    assertion_reconciler, get_acceptable_type, simple_negated_assertion_reconciler,
    ReconciliationContext,
};

/// Entry point for assertions that remove possibilities: negated type
/// checks, falsiness, negated equalities, and their structural cousins.
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
) -> TUnion {
    if assertion.has_literal_string_or_int() {
        if let Some(assertion_type) = assertion.get_type() {
            return handle_literal_negated_equality(
                assertion,
                existing_var_type,
                assertion_type,
                key,
                ctx,
                pos,
                can_report_issues,
                negated,
                suppressed_issues,
            );
        }
    }

    if let Some(new_var_type) = simple_negated_assertion_reconciler::reconcile(
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
        return new_var_type;
    }

    let assertion_type = match assertion.get_type() {
        Some(assertion_type) => assertion_type,
        None => return existing_var_type.clone(),
    };

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

        if atomic.is_mixed() {
            did_remove_type = true;
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
            continue;
        }

        if atomic_type_comparator::is_contained_by(
            ctx.codebase,
            assertion_type,
            atomic,
            &mut TypeComparisonResult::new(),
        ) {
            // removing a subtype leaves the rest of the supertype
            did_remove_type = true;

            let expanded = expand_subtracted_parent(atomic, assertion_type, ctx);
            acceptable_types.extend(expanded);
            continue;
        }

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

/// Subtracting a subclass from a class whose descendants are all known can
/// be answered precisely by listing the surviving descendants.
fn expand_subtracted_parent(
    parent: &TAtomic,
    subtracted: &TAtomic,
    ctx: &mut ReconciliationContext,
) -> Vec<TAtomic> {
    let (parent_name, subtracted_name) = match (parent, subtracted) {
        (
            TAtomic::TNamedObject { name, .. },
            TAtomic::TNamedObject {
                name: subtracted_name,
                ..
            },
        ) => (name, subtracted_name),
        _ => return vec![parent.clone()],
    };

    let codebase = match ctx.codebase {
        Some(codebase) => codebase,
        None => return vec![parent.clone()],
    };

    let child_classlikes = match codebase
        .get_classlike_info(parent_name)
        .and_then(|info| info.child_classlikes.as_ref())
    {
        Some(child_classlikes) => child_classlikes,
        None => return vec![parent.clone()],
    };

    let mut surviving = Vec::new();

    for child in child_classlikes {
        if child == subtracted_name
            || codebase.class_extends_or_implements(child, subtracted_name)
        {
            continue;
        }

        surviving.push(TAtomic::TNamedObject {
            name: child.clone(),
            type_params: None,
            is_this: false,
            extra_types: None,
        });
    }

    surviving
}

/// Removes a literal from the type. A matching literal member disappears;
/// a general member of the literal's kind stays, since any other value of
/// that kind still satisfies the negation.
#[allow(clippy::too_many_arguments)]
fn handle_literal_negated_equality(
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
    let is_strict = matches!(assertion, Assertion::IsNotEqual(_));
    let assertion_key = assertion_type.get_key();

    let mut acceptable_types = Vec::new();
    let mut did_remove_type = false;

    for (member_key, atomic) in existing_var_type.types.iter() {
        if *member_key == assertion_key {
            did_remove_type = true;
            continue;
        }

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
            assertion_type,
            atomic,
            &mut TypeComparisonResult::new(),
        ) {
            // the member may hold the removed value, but other values of
            // the member's kind remain
            did_remove_type = true;
            acceptable_types.push(atomic.clone());
            continue;
        }

        if !is_strict && loosely_matches(atomic, assertion_type) {
            did_remove_type = true;

            if atomic.is_literal_value() {
                continue;
            }

            acceptable_types.push(atomic.clone());
            continue;
        }

        acceptable_types.push(atomic.clone());
    }

    get_acceptable_type(
        acceptable_types,
        did_remove_type,
        assertion,
        existing_var_type,
        key,
        pos,
        can_report_issues && is_strict,
        negated,
        suppressed_issues,
        ctx,
    )
}

/// Whether a loose (`==`) comparison between a member and a removed literal
/// could succeed across the int/float/numeric-string divide.
pub(crate) fn loosely_matches(member: &TAtomic, literal: &TAtomic) -> bool {
    match literal {
        TAtomic::TLiteralInt { value } => match member {
            TAtomic::TLiteralFloat { value: member_value } => *member_value == *value as f64,
            TAtomic::TLiteralString { value: member_value } => {
                member_value.parse::<i64>() == Ok(*value)
            }
            TAtomic::TFloat | TAtomic::TNumeric | TAtomic::TNumericString => true,
            _ => false,
        },
        TAtomic::TLiteralFloat { value } => match member {
            TAtomic::TLiteralInt { value: member_value } => *value == *member_value as f64,
            TAtomic::TLiteralString { value: member_value } => {
                member_value.parse::<f64>() == Ok(*value)
            }
            TAtomic::TInt | TAtomic::TNumeric | TAtomic::TNumericString => true,
            _ => false,
        },
        TAtomic::TLiteralString { value } => {
            let as_int = value.parse::<i64>();
            let as_float = value.parse::<f64>();

            match member {
                TAtomic::TLiteralInt { value: member_value } => as_int == Ok(*member_value),
                TAtomic::TLiteralFloat { value: member_value } => as_float == Ok(*member_value),
                TAtomic::TInt | TAtomic::TPositiveInt => as_int.is_ok(),
                TAtomic::TFloat | TAtomic::TNumeric => as_float.is_ok(),
                _ => false,
            }
        }
        _ => false,
    }
}
