use std::collections::BTreeMap;
use std::sync::Arc;

use phlint_code_info::assertion::Assertion;
use phlint_code_info::classlike_info::{ClassLikeInfo, ClassLikeKind};
use phlint_code_info::code_location::HPos;
use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::issue::IssueKind;
use phlint_code_info::t_atomic::{ArrayKey, TAtomic};
use phlint_code_info::t_union::TUnion;
use phlint_reconciler::{
    assertion_reconciler, ReconciledType, ReconciliationContext, ReconciliationStatus,
};
use phlint_type::{
    combine_union_types, get_bool, get_float, get_int, get_literal_int, get_mixed, get_mixed_list,
    get_named_object, get_string, wrap_atomic,
};
use rustc_hash::FxHashMap;

fn narrow(
    assertion: &Assertion,
    existing: &TUnion,
    ctx: &mut ReconciliationContext,
) -> ReconciledType {
    let key = "$a".to_string();
    let pos = HPos::new("a.php", 1, 1);

    assertion_reconciler::reconcile(
        assertion,
        Some(existing),
        false,
        Some(&key),
        ctx,
        Some(&pos),
        true,
        false,
        &FxHashMap::default(),
    )
}

fn shape(entries: Vec<(&str, bool, TUnion)>) -> TUnion {
    let mut known_items = BTreeMap::new();

    for (name, possibly_undefined, entry_type) in entries {
        known_items.insert(
            ArrayKey::String(name.to_string()),
            (possibly_undefined, Arc::new(entry_type)),
        );
    }

    wrap_atomic(TAtomic::TKeyedArray {
        known_items,
        params: None,
        is_list: false,
        non_empty: false,
    })
}

#[test]
fn truthy_narrows_bool_to_true() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::Truthy, &get_bool(), &mut ctx);

    assert_eq!(result.value.get_id(), "true");
    assert_eq!(result.status, ReconciliationStatus::Ok);
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn falsy_narrows_bool_to_false() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::Falsy, &get_bool(), &mut ctx);

    assert_eq!(result.value.get_id(), "false");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn truthy_narrows_string_to_non_empty_string() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::Truthy, &get_string(), &mut ctx);

    assert_eq!(result.value.get_id(), "non-empty-string");
}

#[test]
fn falsy_keeps_the_empty_and_zero_strings() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::Falsy, &get_string(), &mut ctx);

    assert_eq!(result.value.types.len(), 2);
    assert!(result.value.has_type("string()"));
    assert!(result.value.has_type("string(0)"));
}

#[test]
fn truthy_clears_possibly_undefined() {
    let mut ctx = ReconciliationContext::new(None);
    let mut existing = get_string();
    existing.possibly_undefined = true;

    let result = narrow(&Assertion::Truthy, &existing, &mut ctx);

    assert!(!result.value.possibly_undefined);
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn isset_removes_null() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![TAtomic::TNull, TAtomic::TString]);

    let result = narrow(&Assertion::IsIsset, &existing, &mut ctx);

    assert_eq!(result.value.get_id(), "string");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn isset_on_a_sure_type_is_redundant() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::IsIsset, &get_string(), &mut ctx);

    assert_eq!(result.value.get_id(), "string");
    assert_eq!(result.status, ReconciliationStatus::Ok);
    assert!(ctx.issues.has_issue_kind(&IssueKind::RedundantCondition));
}

#[test]
fn isset_after_loop_clears_flags_without_complaint() {
    let mut ctx = ReconciliationContext::new(None);
    let mut existing = wrap_atomic(TAtomic::TMixedFromLoopIsset);
    existing.possibly_undefined = true;

    let result = narrow(&Assertion::IsIsset, &existing, &mut ctx);

    assert_eq!(result.value.get_id(), "mixed");
    assert!(!result.value.possibly_undefined);
    assert_eq!(result.status, ReconciliationStatus::Ok);
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn not_isset_on_a_nullable_type_leaves_null() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![TAtomic::TNull, TAtomic::TString]);

    let result = narrow(&Assertion::IsNotIsset, &existing, &mut ctx);

    assert_eq!(result.value.get_id(), "null");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn not_isset_on_a_non_nullable_type_is_impossible() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::IsNotIsset, &get_string(), &mut ctx);

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
    assert!(ctx.issues.has_issue_kind(&IssueKind::TypeDoesNotContainType));
}

#[test]
fn not_null_on_mixed_gives_nonnull_mixed() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::IsNotType(TAtomic::TNull), &get_mixed(), &mut ctx);

    assert_eq!(result.value.get_id(), "nonnull-mixed");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn impossible_check_collapses_to_nothing() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::IsType(TAtomic::TString), &get_int(), &mut ctx);

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
    assert!(ctx.issues.has_issue_kind(&IssueKind::TypeDoesNotContainType));
}

#[test]
fn docblock_contradiction_recovers_to_mixed() {
    let mut ctx = ReconciliationContext::new(None);
    let mut existing = get_int();
    existing.from_docblock = true;

    let result = narrow(&Assertion::IsType(TAtomic::TString), &existing, &mut ctx);

    assert!(result.value.is_mixed());
    assert_eq!(result.status, ReconciliationStatus::Failed);
    assert!(ctx
        .issues
        .has_issue_kind(&IssueKind::DocblockTypeContradiction));
}

#[test]
fn null_check_on_a_non_nullable_type_reports_the_null_kind() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::IsType(TAtomic::TNull), &get_string(), &mut ctx);

    assert!(result.value.is_nothing());
    assert!(ctx.issues.has_issue_kind(&IssueKind::TypeDoesNotContainNull));
}

#[test]
fn outer_negation_flips_the_assertion() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![TAtomic::TNull, TAtomic::TString]);
    let key = "$a".to_string();
    let pos = HPos::new("a.php", 1, 1);

    let result = assertion_reconciler::reconcile(
        &Assertion::IsType(TAtomic::TNull),
        Some(&existing),
        false,
        Some(&key),
        &mut ctx,
        Some(&pos),
        true,
        true,
        &FxHashMap::default(),
    );

    assert_eq!(result.value.get_id(), "string");
    assert_eq!(result.status, ReconciliationStatus::Ok);
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn a_check_and_its_negation_partition_the_type() {
    let existing = TUnion::new(vec![TAtomic::TInt, TAtomic::TString]);

    let mut ctx = ReconciliationContext::new(None);
    let then_branch = narrow(&Assertion::IsType(TAtomic::TInt), &existing, &mut ctx);
    let else_branch = narrow(&Assertion::IsNotType(TAtomic::TInt), &existing, &mut ctx);

    assert_eq!(then_branch.value.get_id(), "int");
    assert_eq!(else_branch.value.get_id(), "string");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn literal_equality_selects_the_matching_literal() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![
        TAtomic::TLiteralInt { value: 5 },
        TAtomic::TLiteralInt { value: 7 },
    ]);

    let result = narrow(
        &Assertion::IsEqual(TAtomic::TLiteralInt { value: 5 }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "int(5)");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn literal_equality_narrows_a_general_int() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(
        &Assertion::IsEqual(TAtomic::TLiteralInt { value: 5 }),
        &get_int(),
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "int(5)");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn equality_with_the_sole_literal_is_redundant() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(
        &Assertion::IsEqual(TAtomic::TLiteralInt { value: 5 }),
        &get_literal_int(5),
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "int(5)");
    assert_eq!(result.status, ReconciliationStatus::Ok);
    assert!(ctx.issues.has_issue_kind(&IssueKind::RedundantCondition));
}

#[test]
fn loose_equality_coerces_across_numeric_kinds() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(
        &Assertion::IsLooselyEqual(TAtomic::TLiteralInt { value: 5 }),
        &get_float(),
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "float(5)");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn strict_equality_does_not_cross_numeric_kinds() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(
        &Assertion::IsEqual(TAtomic::TLiteralInt { value: 5 }),
        &get_float(),
        &mut ctx,
    );

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
}

#[test]
fn negated_literal_drops_only_that_member() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![
        TAtomic::TLiteralInt { value: 5 },
        TAtomic::TLiteralInt { value: 7 },
    ]);

    let result = narrow(
        &Assertion::IsNotEqual(TAtomic::TLiteralInt { value: 5 }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "int(7)");
}

#[test]
fn negated_literal_keeps_a_general_int() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(
        &Assertion::IsNotEqual(TAtomic::TLiteralInt { value: 5 }),
        &get_int(),
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "int");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn loose_negated_equality_drops_crossing_literals() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![
        TAtomic::TLiteralFloat { value: 5.0 },
        TAtomic::TLiteralString {
            value: "a".to_string(),
        },
    ]);

    let result = narrow(
        &Assertion::IsNotLooselyEqual(TAtomic::TLiteralInt { value: 5 }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "string(a)");
}

#[test]
fn calculated_int_survives_an_int_removal_as_float() {
    let mut ctx = ReconciliationContext::new(None);
    let mut existing = get_int();
    existing.from_calculation = true;

    let result = narrow(&Assertion::IsNotType(TAtomic::TInt), &existing, &mut ctx);

    assert_eq!(result.value.get_id(), "float");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn removing_the_only_member_empties_and_fails() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::IsNotType(TAtomic::TInt), &get_int(), &mut ctx);

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
}

#[test]
fn calculated_float_survives_a_float_removal_as_int() {
    let mut ctx = ReconciliationContext::new(None);
    let mut existing = get_float();
    existing.from_calculation = true;

    let result = narrow(&Assertion::IsNotType(TAtomic::TFloat), &existing, &mut ctx);

    assert_eq!(result.value.get_id(), "int");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn in_array_keeps_the_overlap() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![TAtomic::TNull, TAtomic::TString]);

    let result = narrow(&Assertion::InArray(get_string()), &existing, &mut ctx);

    assert_eq!(result.value.get_id(), "string");
}

#[test]
fn not_in_array_removes_literal_members() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![TAtomic::TLiteralInt { value: 5 }, TAtomic::TString]);

    let result = narrow(
        &Assertion::NotInArray(get_literal_int(5)),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "string");
}

#[test]
fn has_array_key_marks_the_entry_defined() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = shape(vec![("a", true, get_int())]);

    let result = narrow(
        &Assertion::HasArrayKey(ArrayKey::String("a".to_string())),
        &existing,
        &mut ctx,
    );

    let narrowed = result.value.get_single();
    match narrowed {
        TAtomic::TKeyedArray {
            known_items,
            non_empty,
            ..
        } => {
            let (possibly_undefined, _) = &known_items[&ArrayKey::String("a".to_string())];
            assert!(!possibly_undefined);
            assert!(non_empty);
        }
        _ => panic!("expected a shape, got {}", narrowed.get_id()),
    }
}

#[test]
fn has_array_key_on_a_sealed_shape_without_it_contradicts() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = shape(vec![("a", false, get_int())]);

    let result = narrow(
        &Assertion::HasArrayKey(ArrayKey::String("b".to_string())),
        &existing,
        &mut ctx,
    );

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
}

#[test]
fn no_array_key_removes_an_optional_entry() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = shape(vec![("a", true, get_int())]);

    let result = narrow(
        &Assertion::DoesNotHaveArrayKey(ArrayKey::String("a".to_string())),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "array{}");
}

#[test]
fn no_array_key_on_a_guaranteed_entry_contradicts() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = shape(vec![("a", false, get_int())]);

    let result = narrow(
        &Assertion::DoesNotHaveArrayKey(ArrayKey::String("a".to_string())),
        &existing,
        &mut ctx,
    );

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
}

#[test]
fn non_empty_countable_marks_a_list_non_empty() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(
        &Assertion::NonEmptyCountable(true),
        &get_mixed_list(),
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "non-empty-list<mixed>");
}

#[test]
fn empty_countable_empties_the_list() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::EmptyCountable, &get_mixed_list(), &mut ctx);

    assert_eq!(result.value.get_id(), "list<nothing>");
}

#[test]
fn exact_count_pins_the_list_count() {
    let mut ctx = ReconciliationContext::new(None);
    let result = narrow(&Assertion::HasExactCount(2), &get_mixed_list(), &mut ctx);

    match result.value.get_single() {
        TAtomic::TList {
            known_count,
            non_empty,
            ..
        } => {
            assert_eq!(*known_count, Some(2));
            assert!(non_empty);
        }
        other => panic!("expected a list, got {}", other.get_id()),
    }
}

#[test]
fn unknown_classes_narrow_optimistically() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = get_named_object("SomeService".to_string());

    let result = narrow(
        &Assertion::IsType(TAtomic::TNamedObject {
            name: "OtherService".to_string(),
            type_params: None,
            is_this: false,
            extra_types: None,
        }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "OtherService");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

fn hierarchy_codebase() -> CodebaseInfo {
    let mut codebase = CodebaseInfo::new();

    let mut runnable = ClassLikeInfo::new("Runnable".to_string(), ClassLikeKind::Interface);
    runnable.methods.insert("run".to_string());
    codebase.add_classlike(runnable);

    let mut animal = ClassLikeInfo::new("Animal".to_string(), ClassLikeKind::Class);
    let mut children = rustc_hash::FxHashSet::default();
    children.insert("Dog".to_string());
    children.insert("Cat".to_string());
    animal.child_classlikes = Some(children);
    codebase.add_classlike(animal);

    let mut dog = ClassLikeInfo::new("Dog".to_string(), ClassLikeKind::Class);
    dog.direct_parent_class = Some("Animal".to_string());
    dog.all_parent_classes.insert("Animal".to_string());
    codebase.add_classlike(dog);

    let mut cat = ClassLikeInfo::new("Cat".to_string(), ClassLikeKind::Class);
    cat.direct_parent_class = Some("Animal".to_string());
    cat.all_parent_classes.insert("Animal".to_string());
    codebase.add_classlike(cat);

    let mut counter = ClassLikeInfo::new("Counter".to_string(), ClassLikeKind::Class);
    counter.is_final = true;
    codebase.add_classlike(counter);

    codebase
}

#[test]
fn subclass_check_narrows_to_the_subclass() {
    let codebase = hierarchy_codebase();
    let mut ctx = ReconciliationContext::new(Some(&codebase));
    let existing = get_named_object("Animal".to_string());

    let result = narrow(
        &Assertion::IsType(TAtomic::TNamedObject {
            name: "Dog".to_string(),
            type_params: None,
            is_this: false,
            extra_types: None,
        }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "Dog");
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn subtracting_a_subclass_lists_the_known_survivors() {
    let codebase = hierarchy_codebase();
    let mut ctx = ReconciliationContext::new(Some(&codebase));
    let existing = get_named_object("Animal".to_string());

    let result = narrow(
        &Assertion::IsNotType(TAtomic::TNamedObject {
            name: "Dog".to_string(),
            type_params: None,
            is_this: false,
            extra_types: None,
        }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "Cat");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn class_and_interface_meet_in_an_intersection() {
    let codebase = hierarchy_codebase();
    let mut ctx = ReconciliationContext::new(Some(&codebase));
    let existing = get_named_object("Animal".to_string());

    let result = narrow(
        &Assertion::IsType(TAtomic::TNamedObject {
            name: "Runnable".to_string(),
            type_params: None,
            is_this: false,
            extra_types: None,
        }),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "Animal&Runnable");
}

#[test]
fn method_check_on_a_final_class_without_it_contradicts() {
    let codebase = hierarchy_codebase();
    let mut ctx = ReconciliationContext::new(Some(&codebase));
    let existing = get_named_object("Counter".to_string());

    let result = narrow(
        &Assertion::HasMethod("run".to_string()),
        &existing,
        &mut ctx,
    );

    assert!(result.value.is_nothing());
    assert_eq!(result.status, ReconciliationStatus::Failed);
}

#[test]
fn method_check_on_a_non_final_class_keeps_it() {
    let codebase = hierarchy_codebase();
    let mut ctx = ReconciliationContext::new(Some(&codebase));
    let existing = get_named_object("Animal".to_string());

    let result = narrow(
        &Assertion::HasMethod("run".to_string()),
        &existing,
        &mut ctx,
    );

    assert_eq!(result.value.get_id(), "Animal");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn template_narrowing_replaces_the_upper_bound() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = wrap_atomic(TAtomic::TTemplateParam {
        param_name: "T".to_string(),
        as_type: Box::new(get_mixed()),
        defining_entity: "fn-identity".to_string(),
        extra_types: None,
    });

    let result = narrow(&Assertion::IsType(TAtomic::TInt), &existing, &mut ctx);

    match result.value.get_single() {
        TAtomic::TTemplateParam { as_type, .. } => {
            assert_eq!(as_type.get_id(), "int");
        }
        other => panic!("expected a template param, got {}", other.get_id()),
    }
}

#[test]
fn assertion_on_an_unknown_variable_seeds_the_type() {
    let mut ctx = ReconciliationContext::new(None);

    let result = assertion_reconciler::reconcile(
        &Assertion::IsType(TAtomic::TString),
        None,
        false,
        None,
        &mut ctx,
        None,
        false,
        false,
        &FxHashMap::default(),
    );

    assert_eq!(result.value.get_id(), "string");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn isset_on_a_superglobal_seeds_an_array() {
    let mut ctx = ReconciliationContext::new(None);
    let key = "$_GET".to_string();

    let result = assertion_reconciler::reconcile(
        &Assertion::IsIsset,
        None,
        false,
        Some(&key),
        &mut ctx,
        None,
        false,
        false,
        &FxHashMap::default(),
    );

    assert_eq!(result.value.get_id(), "array<string, mixed>");
    assert_eq!(result.status, ReconciliationStatus::Ok);
}

#[test]
fn a_narrowing_and_its_negation_recombine_to_the_original() {
    let existing = TUnion::new(vec![TAtomic::TInt, TAtomic::TString, TAtomic::TFloat]);

    let mut ctx = ReconciliationContext::new(None);
    let then_branch = narrow(&Assertion::IsType(TAtomic::TString), &existing, &mut ctx);
    let else_branch = narrow(&Assertion::IsNotType(TAtomic::TString), &existing, &mut ctx);

    let recombined = combine_union_types(&then_branch.value, &else_branch.value, None, false);

    assert_eq!(recombined.get_id(), existing.get_id());
    assert!(ctx.issues.issues.is_empty());
}

#[test]
fn consecutive_narrowings_compound() {
    let mut ctx = ReconciliationContext::new(None);
    let existing = TUnion::new(vec![TAtomic::TNull, TAtomic::TBool, TAtomic::TString]);

    let non_null = narrow(&Assertion::IsNotType(TAtomic::TNull), &existing, &mut ctx);
    assert_eq!(non_null.value.get_id(), "bool|string");

    let truthy = narrow(&Assertion::Truthy, &non_null.value, &mut ctx);
    assert_eq!(truthy.value.get_id(), "non-empty-string|true");

    assert!(ctx.issues.issues.is_empty());
}
