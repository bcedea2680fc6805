use std::sync::Arc;

use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::{ArrayKey, TAtomic};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::type_combination::TypeCombination;
use crate::{combine_union_types, get_int, get_nothing, wrap_atomic};

/// Merges a list of atomic types into the members of a normalized union.
///
/// `overwrite_empty_array` lets an `array<nothing, nothing>` literal be
/// swallowed by a more specific shape instead of poisoning its entries;
/// `allow_mixed_union` controls whether a `mixed` input absorbs everything
/// else; literal scalars of one kind collapse to the general type once more
/// than `literal_limit` of them accumulate.
///
/// Panics if materialization produces zero atomics from well-formed input —
/// that means a scrape rule is missing, not that the input was bad.
pub fn combine(
    types: Vec<TAtomic>,
    codebase: Option<&CodebaseInfo>,
    overwrite_empty_array: bool,
    allow_mixed_union: bool,
    literal_limit: usize,
) -> Vec<TAtomic> {
    if types.len() == 1 {
        return types;
    }

    let mut combination = TypeCombination::new();

    for atomic in types {
        let result = scrape_type_properties(
            atomic,
            &mut combination,
            codebase,
            overwrite_empty_array,
            allow_mixed_union,
            literal_limit,
        );

        if let Some(result) = result {
            return result;
        }
    }

    if combination.nonnull_mixed && combination.value_types.contains_key("null") {
        return vec![TAtomic::TMixed];
    }

    if combination.falsy_mixed {
        if combination.has_concrete_members() {
            return vec![TAtomic::TMixed];
        }
        return vec![TAtomic::TEmptyMixed];
    } else if combination.truthy_mixed {
        if combination.has_concrete_members() {
            return vec![TAtomic::TMixed];
        }
        return vec![TAtomic::TNonEmptyMixed];
    } else if combination.nonnull_mixed {
        return vec![TAtomic::TNonNullMixed];
    } else if combination.vanilla_mixed {
        return vec![TAtomic::TMixed];
    }

    if combination.is_simple() {
        return combination
            .value_types
            .into_iter()
            .map(|(_, a)| a)
            .collect();
    }

    if combination.value_types.contains_key("false") && combination.value_types.contains_key("true")
    {
        combination.value_types.remove("false");
        combination.value_types.remove("true");
        combination
            .value_types
            .insert("bool".to_string(), TAtomic::TBool);
    }

    let mut new_types = Vec::new();

    // A Traversable generic alongside an array-ish bucket collapses to
    // iterable, the smallest type covering both.
    let traversable_params = combination.object_type_params.remove("Traversable");
    let has_arrayish = combination.has_keyed_array
        || combination.array_type_params.is_some()
        || combination.list_type_param.is_some();

    if combination.iterable_params.is_some() || (traversable_params.is_some() && has_arrayish) {
        let mut key_param = get_nothing();
        let mut value_param = get_nothing();

        if let Some((iterable_key, iterable_value)) = combination.iterable_params.take() {
            key_param = combine_union_types(&key_param, &iterable_key, codebase, false);
            value_param = combine_union_types(&value_param, &iterable_value, codebase, false);
        }

        if let Some(mut traversable_params) = traversable_params {
            if traversable_params.len() == 2 {
                let traversable_value = traversable_params.pop().unwrap();
                let traversable_key = traversable_params.pop().unwrap();
                key_param = combine_union_types(&key_param, &traversable_key, codebase, false);
                value_param = combine_union_types(&value_param, &traversable_value, codebase, false);
            }
        }

        for arrayish in [
            combination.array_type_params.take(),
            combination
                .list_type_param
                .take()
                .map(|list_param| (get_int(), list_param)),
        ]
        .into_iter()
        .flatten()
        {
            key_param = combine_union_types(&key_param, &arrayish.0, codebase, false);
            value_param = combine_union_types(&value_param, &arrayish.1, codebase, false);
        }

        if combination.has_keyed_array {
            combination.has_keyed_array = false;
            if let Some((keyed_key, keyed_value)) = combination.keyed_array_params.take() {
                key_param = combine_union_types(&key_param, &keyed_key, codebase, false);
                value_param = combine_union_types(&value_param, &keyed_value, codebase, false);
            }
            let entries = std::mem::take(&mut combination.keyed_array_entries);
            for (entry_key, (_, entry_type)) in entries {
                key_param =
                    combine_union_types(&key_param, &wrap_atomic(entry_key.to_atomic()), codebase, false);
                value_param = combine_union_types(&value_param, entry_type.as_ref(), codebase, false);
            }
        }

        new_types.push(TAtomic::TIterable {
            key_param: Box::new(key_param),
            value_param: Box::new(value_param),
        });
    } else if let Some(traversable_params) = traversable_params {
        combination
            .object_type_params
            .insert("Traversable".to_string(), traversable_params);
    }

    if combination.has_keyed_array {
        let mut keyed_array_params = combination.keyed_array_params.take();
        let mut entries = std::mem::take(&mut combination.keyed_array_entries);
        let mut non_empty = combination.keyed_array_always_filled;
        let mut is_list = combination.keyed_array_always_list;

        if let Some((array_key, array_value)) = combination.array_type_params.take() {
            if array_key.is_nothing() && array_value.is_nothing() {
                // an empty array literal joined the shape
                if !overwrite_empty_array {
                    for (_, (possibly_undefined, _)) in entries.iter_mut() {
                        *possibly_undefined = true;
                    }
                    non_empty = false;
                }
            } else {
                keyed_array_params = Some(match keyed_array_params {
                    Some((existing_key, existing_value)) => (
                        combine_union_types(&existing_key, &array_key, codebase, false),
                        combine_union_types(&existing_value, &array_value, codebase, false),
                    ),
                    None => (array_key, array_value),
                });
                non_empty = non_empty && combination.array_always_filled;
                is_list = false;
            }
        }

        if let Some(list_param) = combination.list_type_param.take() {
            let list_params = (get_int(), list_param);
            keyed_array_params = Some(match keyed_array_params {
                Some((existing_key, existing_value)) => (
                    combine_union_types(&existing_key, &list_params.0, codebase, false),
                    combine_union_types(&existing_value, &list_params.1, codebase, false),
                ),
                None => list_params,
            });
            non_empty = non_empty && combination.list_always_filled;
        }

        new_types.push(TAtomic::TKeyedArray {
            known_items: entries,
            params: keyed_array_params
                .map(|(key_param, value_param)| (Box::new(key_param), Box::new(value_param))),
            is_list,
            non_empty,
        });
    } else if let Some((key_param, value_param)) = combination.array_type_params.take() {
        if let Some(list_param) = combination.list_type_param.take() {
            new_types.push(TAtomic::TArray {
                key_param: Box::new(combine_union_types(&key_param, &get_int(), codebase, false)),
                value_param: Box::new(combine_union_types(
                    &value_param,
                    &list_param,
                    codebase,
                    false,
                )),
                non_empty: combination.array_always_filled && combination.list_always_filled,
            });
        } else {
            new_types.push(TAtomic::TArray {
                key_param: Box::new(key_param),
                value_param: Box::new(value_param),
                non_empty: combination.array_always_filled,
            });
        }
    } else if let Some(list_param) = combination.list_type_param.take() {
        let known_count = if let Some(counts) = &combination.list_counts {
            if counts.len() == 1 && combination.list_always_filled {
                counts.iter().next().copied()
            } else {
                None
            }
        } else {
            None
        };

        new_types.push(TAtomic::TList {
            type_param: Box::new(list_param),
            known_count,
            non_empty: combination.list_always_filled,
        });
    }

    for (generic_name, generic_type_params) in combination.object_type_params {
        let generic_object = TAtomic::TNamedObject {
            is_this: *combination.object_static.get(&generic_name).unwrap_or(&false),
            name: generic_name,
            type_params: Some(generic_type_params),
            extra_types: None,
        };

        new_types.push(generic_object);
    }

    new_types.extend(combination.class_string_types.into_values());
    new_types.extend(combination.literal_strings.into_values());
    new_types.extend(combination.literal_ints.into_values());
    new_types.extend(combination.literal_floats.into_values());

    if combination.value_types.contains_key("string")
        && combination.value_types.contains_key("float")
        && combination.value_types.contains_key("int")
        && combination.value_types.contains_key("bool")
    {
        combination.value_types.remove("string");
        combination.value_types.remove("float");
        combination.value_types.remove("int");
        combination.value_types.remove("bool");
        new_types.push(TAtomic::TScalar);
    }

    let mut has_nothing = combination.value_types.contains_key("nothing");

    let combination_value_type_count = combination.value_types.len();

    for (_, atomic) in combination.value_types {
        let tc = if has_nothing { 1 } else { 0 };
        if atomic.is_mixed()
            && combination.mixed_from_loop_isset.unwrap_or(false)
            && (combination_value_type_count > (tc + 1) || new_types.len() > tc)
        {
            continue;
        }

        if let TAtomic::TNothing = atomic {
            if combination_value_type_count > 1 || !new_types.is_empty() {
                has_nothing = true;
                continue;
            }
        }

        new_types.push(atomic);
    }

    if new_types.is_empty() {
        if !has_nothing {
            panic!("combination produced no types");
        }

        return vec![TAtomic::TNothing];
    }

    new_types
}

fn scrape_type_properties(
    atomic: TAtomic,
    combination: &mut TypeCombination,
    codebase: Option<&CodebaseInfo>,
    overwrite_empty_array: bool,
    allow_mixed_union: bool,
    literal_limit: usize,
) -> Option<Vec<TAtomic>> {
    match atomic {
        TAtomic::TMixed => {
            if !allow_mixed_union {
                combination.value_types.insert("mixed".to_string(), atomic);
                return None;
            }

            combination.falsy_mixed = false;
            combination.truthy_mixed = false;
            combination.mixed_from_loop_isset = Some(false);
            combination.vanilla_mixed = true;

            return None;
        }
        TAtomic::TMixedFromLoopIsset => {
            if combination.vanilla_mixed {
                return None;
            }

            if combination.mixed_from_loop_isset.is_none() {
                combination.mixed_from_loop_isset = Some(true);
            }

            combination.value_types.insert("mixed".to_string(), TAtomic::TMixed);
            return None;
        }
        TAtomic::TNonEmptyMixed | TAtomic::TEmptyMixed => {
            if combination.vanilla_mixed {
                return None;
            }

            if !allow_mixed_union {
                combination
                    .value_types
                    .insert(atomic.get_key(), atomic);
                return None;
            }

            combination.mixed_from_loop_isset = Some(false);

            if matches!(atomic, TAtomic::TNonEmptyMixed) {
                combination.truthy_mixed = true;

                if combination.falsy_mixed {
                    return Some(vec![TAtomic::TMixed]);
                }
            } else {
                combination.falsy_mixed = true;

                if combination.truthy_mixed {
                    return Some(vec![TAtomic::TMixed]);
                }
            }

            return None;
        }
        TAtomic::TNonNullMixed => {
            if combination.vanilla_mixed {
                return None;
            }

            if !allow_mixed_union {
                combination
                    .value_types
                    .insert(atomic.get_key(), atomic);
                return None;
            }

            if combination.falsy_mixed {
                return Some(vec![TAtomic::TMixed]);
            }

            combination.mixed_from_loop_isset = Some(false);
            combination.nonnull_mixed = true;

            return None;
        }
        _ => (),
    }

    // bool|false = bool
    if let TAtomic::TFalse | TAtomic::TTrue = atomic {
        if combination.value_types.contains_key("bool") {
            return None;
        }
    }

    // false|bool = bool
    if let TAtomic::TBool = atomic {
        combination.value_types.remove("false");
        combination.value_types.remove("true");
    }

    let type_key = atomic.get_key();

    if let TAtomic::TArray {
        ref key_param,
        ref value_param,
        non_empty,
    } = atomic
    {
        combination.array_type_params =
            if let Some((ref existing_key, ref existing_value)) = combination.array_type_params {
                Some((
                    combine_union_types(
                        existing_key,
                        key_param.as_ref(),
                        codebase,
                        overwrite_empty_array,
                    ),
                    combine_union_types(
                        existing_value,
                        value_param.as_ref(),
                        codebase,
                        overwrite_empty_array,
                    ),
                ))
            } else {
                Some(((**key_param).clone(), (**value_param).clone()))
            };

        if non_empty {
            combination.array_sometimes_filled = true;
        } else {
            combination.array_always_filled = false;
        }

        return None;
    }

    if let TAtomic::TList {
        ref type_param,
        known_count,
        non_empty,
    } = atomic
    {
        combination.list_type_param =
            if let Some(ref existing_type) = combination.list_type_param {
                Some(combine_union_types(
                    existing_type,
                    type_param.as_ref(),
                    codebase,
                    overwrite_empty_array,
                ))
            } else {
                Some((**type_param).clone())
            };

        if non_empty {
            if let Some(ref mut existing_counts) = combination.list_counts {
                if let Some(known_count) = known_count {
                    existing_counts.insert(known_count);
                } else {
                    combination.list_counts = None;
                }
            }

            combination.list_sometimes_filled = true;
        } else {
            combination.list_always_filled = false;
        }

        return None;
    }

    if let TAtomic::TKeyedArray {
        ref known_items,
        ref params,
        is_list,
        non_empty,
    } = atomic
    {
        let had_previous_keyed = combination.has_keyed_array;
        combination.has_keyed_array = true;

        if !is_list {
            combination.keyed_array_always_list = false;
        }

        combination.keyed_array_params = match (&combination.keyed_array_params, params) {
            (None, None) => None,
            (Some(existing_params), None) => Some(existing_params.clone()),
            (None, Some(params)) => Some(((*params.0).clone(), (*params.1).clone())),
            (Some(existing_params), Some(params)) => Some((
                combine_union_types(
                    &existing_params.0,
                    params.0.as_ref(),
                    codebase,
                    overwrite_empty_array,
                ),
                combine_union_types(
                    &existing_params.1,
                    params.1.as_ref(),
                    codebase,
                    overwrite_empty_array,
                ),
            )),
        };

        if non_empty
            || known_items
                .iter()
                .any(|(_, (possibly_undefined, _))| !possibly_undefined)
        {
            combination.keyed_array_sometimes_filled = true;
        } else {
            combination.keyed_array_always_filled = false;
        }

        if !known_items.is_empty() {
            let has_existing_entries = !combination.keyed_array_entries.is_empty()
                || had_previous_keyed;
            let mut possibly_undefined_entries: FxHashSet<ArrayKey> =
                combination.keyed_array_entries.keys().cloned().collect();

            let mut has_defined_keys = false;

            for (candidate_item_name, (cu, candidate_item_type)) in known_items {
                let existing_type = combination.keyed_array_entries.get(candidate_item_name);

                let new_type_possibly_undefined;
                let new_type = if let Some((eu, existing_type)) = existing_type {
                    new_type_possibly_undefined = *eu || *cu;
                    if candidate_item_type != existing_type {
                        Arc::new(combine_union_types(
                            existing_type.as_ref(),
                            candidate_item_type.as_ref(),
                            codebase,
                            overwrite_empty_array,
                        ))
                    } else {
                        existing_type.clone()
                    }
                } else {
                    new_type_possibly_undefined = has_existing_entries || *cu;
                    candidate_item_type.clone()
                };

                combination.keyed_array_entries.insert(
                    candidate_item_name.clone(),
                    (new_type_possibly_undefined, new_type),
                );

                possibly_undefined_entries.remove(candidate_item_name);

                if !cu {
                    has_defined_keys = true;
                }
            }

            if !has_defined_keys {
                combination.keyed_array_always_filled = false;
            }

            // keys absent from this (sealed or not) contributor may be missing
            for possibly_undefined_type_key in possibly_undefined_entries {
                let possibly_undefined_type = combination
                    .keyed_array_entries
                    .get_mut(&possibly_undefined_type_key);
                if let Some((pu, _)) = possibly_undefined_type {
                    *pu = true;
                }
            }
        } else if !overwrite_empty_array {
            for (_, (pu, _)) in combination.keyed_array_entries.iter_mut() {
                *pu = true;
            }
        }

        return None;
    }

    if let TAtomic::TIterable {
        ref key_param,
        ref value_param,
    } = atomic
    {
        combination.iterable_params =
            if let Some((ref existing_key, ref existing_value)) = combination.iterable_params {
                Some((
                    combine_union_types(
                        existing_key,
                        key_param.as_ref(),
                        codebase,
                        overwrite_empty_array,
                    ),
                    combine_union_types(
                        existing_value,
                        value_param.as_ref(),
                        codebase,
                        overwrite_empty_array,
                    ),
                ))
            } else {
                Some(((**key_param).clone(), (**value_param).clone()))
            };

        return None;
    }

    // the object top type eliminates named-object variants
    if let TAtomic::TObject = atomic {
        combination.has_object_top_type = true;
        combination
            .value_types
            .retain(|_, t| !matches!(t, TAtomic::TNamedObject { .. }));
        combination.object_type_params = FxHashMap::default();
        combination.value_types.insert(type_key, atomic);

        return None;
    }

    if let TAtomic::TNamedObject {
        ref name, is_this, ..
    } = atomic
    {
        if let Some(object_static) = combination.object_static.get(name) {
            if *object_static && !is_this {
                combination.object_static.insert(name.clone(), false);
            }
        } else {
            combination.object_static.insert(name.clone(), is_this);
        }
    }

    if let TAtomic::TNamedObject {
        name: ref fq_class_name,
        type_params: Some(ref type_params),
        ..
    } = atomic
    {
        if combination.has_object_top_type {
            return None;
        }

        if let Some(existing_type_params) = combination.object_type_params.get(fq_class_name) {
            let mut new_type_params = Vec::new();
            for (i, type_param) in type_params.iter().enumerate() {
                if let Some(existing_type_param) = existing_type_params.get(i) {
                    new_type_params.push(combine_union_types(
                        existing_type_param,
                        type_param,
                        codebase,
                        overwrite_empty_array,
                    ));
                }
            }

            combination
                .object_type_params
                .insert(fq_class_name.clone(), new_type_params);
        } else {
            combination
                .object_type_params
                .insert(fq_class_name.clone(), type_params.clone());
        }

        return None;
    }

    if let TAtomic::TNamedObject {
        name: ref fq_class_name,
        type_params: None,
        ..
    } = atomic
    {
        if combination.has_object_top_type {
            return None;
        }

        if combination.value_types.contains_key(&type_key) {
            return None;
        }

        let codebase = if let Some(codebase) = codebase {
            codebase
        } else {
            combination.value_types.insert(type_key, atomic);
            return None;
        };

        if !codebase.class_or_interface_exists(fq_class_name) {
            combination.value_types.insert(type_key, atomic);

            return None;
        }

        let is_class = codebase.class_exists(fq_class_name);

        let mut types_to_remove = Vec::new();
        for (key, named_object) in combination.value_types.iter() {
            if let TAtomic::TNamedObject {
                name: existing_name,
                ..
            } = &named_object
            {
                if codebase.class_exists(existing_name) {
                    // an existing subclass is covered by this type
                    if codebase.class_extends_or_implements(existing_name, fq_class_name) {
                        types_to_remove.push(key.clone());
                        continue;
                    }

                    if is_class && codebase.class_extends(fq_class_name, existing_name) {
                        return None;
                    }
                } else {
                    if codebase.interface_extends(existing_name, fq_class_name) {
                        types_to_remove.push(key.clone());
                        continue;
                    }

                    if is_class {
                        if codebase.class_implements(fq_class_name, existing_name) {
                            return None;
                        }
                    } else if codebase.interface_extends(fq_class_name, existing_name) {
                        return None;
                    }
                }
            }
        }

        combination.value_types.insert(type_key, atomic);

        for type_key in types_to_remove {
            combination.value_types.remove(&type_key);
        }

        return None;
    }

    if let TAtomic::TScalar = atomic {
        combination.literal_strings = FxHashMap::default();
        combination.literal_ints = FxHashMap::default();
        combination.literal_floats = FxHashMap::default();
        combination.class_string_types = FxHashMap::default();
        combination.value_types.retain(|k, _| {
            k != "string"
                && k != "non-empty-string"
                && k != "numeric-string"
                && k != "int"
                && k != "positive-int"
                && k != "bool"
                && k != "false"
                && k != "true"
                && k != "float"
                && k != "array-key"
                && k != "numeric"
        });

        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TArraykey = atomic {
        if combination.value_types.contains_key("scalar") {
            return None;
        }

        combination.literal_strings = FxHashMap::default();
        combination.literal_ints = FxHashMap::default();
        combination.value_types.retain(|k, _| {
            k != "string"
                && k != "non-empty-string"
                && k != "numeric-string"
                && k != "int"
                && k != "positive-int"
        });

        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TNumeric = atomic {
        if combination.value_types.contains_key("scalar") {
            return None;
        }

        combination.literal_ints = FxHashMap::default();
        combination.literal_floats = FxHashMap::default();
        combination
            .value_types
            .retain(|k, _| k != "float" && k != "int" && k != "positive-int");

        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if atomic.is_string() {
        if combination.value_types.contains_key("array-key")
            || combination.value_types.contains_key("scalar")
        {
            return None;
        }
    }

    if let TAtomic::TFloat
    | TAtomic::TLiteralFloat { .. }
    | TAtomic::TInt
    | TAtomic::TPositiveInt
    | TAtomic::TLiteralInt { .. } = atomic
    {
        if combination.value_types.contains_key("scalar")
            || combination.value_types.contains_key("numeric")
        {
            return None;
        }
    }

    if let TAtomic::TInt | TAtomic::TPositiveInt | TAtomic::TLiteralInt { .. } = atomic {
        if combination.value_types.contains_key("array-key") {
            return None;
        }
    }

    if let TAtomic::TString = atomic {
        combination.literal_strings = FxHashMap::default();
        combination.class_string_types = FxHashMap::default();
        combination.value_types.remove("non-empty-string");
        combination.value_types.remove("numeric-string");
        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TNonEmptyString = atomic {
        if combination.value_types.contains_key("string") {
            return None;
        }

        let has_empty_literal = combination
            .literal_strings
            .values()
            .any(|literal| matches!(literal.get_literal_string_value().as_deref(), Some("")));

        combination.literal_strings = FxHashMap::default();
        combination.value_types.remove("numeric-string");

        if has_empty_literal {
            combination
                .value_types
                .insert("string".to_string(), TAtomic::TString);
        } else {
            combination.value_types.insert(type_key, atomic);
        }

        return None;
    }

    if let TAtomic::TNumericString = atomic {
        if combination.value_types.contains_key("string")
            || combination.value_types.contains_key("non-empty-string")
        {
            return None;
        }

        combination
            .literal_strings
            .retain(|_, literal| match literal.get_literal_string_value() {
                Some(value) => value.parse::<f64>().is_err(),
                None => true,
            });

        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TLiteralString { ref value } = atomic {
        if combination.value_types.contains_key("string") {
            return None;
        }

        if combination.value_types.contains_key("non-empty-string") {
            if !value.is_empty() {
                return None;
            }

            // "" widens non-empty-string back to string
            combination.value_types.remove("non-empty-string");
            combination
                .value_types
                .insert("string".to_string(), TAtomic::TString);
            combination.literal_strings = FxHashMap::default();
            return None;
        }

        if combination.value_types.contains_key("numeric-string")
            && value.parse::<f64>().is_ok()
        {
            return None;
        }

        if combination.literal_strings.len() >= literal_limit {
            let all_non_empty = !value.is_empty()
                && combination.literal_strings.values().all(|literal| {
                    !matches!(literal.get_literal_string_value().as_deref(), Some(""))
                });

            combination.literal_strings = FxHashMap::default();

            if all_non_empty {
                combination
                    .value_types
                    .insert("non-empty-string".to_string(), TAtomic::TNonEmptyString);
            } else {
                combination
                    .value_types
                    .insert("string".to_string(), TAtomic::TString);
            }
        } else {
            combination.literal_strings.insert(type_key, atomic);
        }

        return None;
    }

    if let TAtomic::TInt = atomic {
        combination.literal_ints = FxHashMap::default();
        combination.value_types.remove("positive-int");
        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TPositiveInt = atomic {
        if combination.value_types.contains_key("int") {
            return None;
        }

        combination
            .literal_ints
            .retain(|_, literal| match literal.get_literal_int_value() {
                Some(value) => value <= 0,
                None => true,
            });

        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TLiteralInt { value } = atomic {
        if combination.value_types.contains_key("int") {
            return None;
        }

        if combination.value_types.contains_key("positive-int") && value > 0 {
            return None;
        }

        if combination.literal_ints.len() >= literal_limit {
            let all_positive = value > 0
                && combination
                    .literal_ints
                    .values()
                    .all(|literal| matches!(literal.get_literal_int_value(), Some(v) if v > 0));

            combination.literal_ints = FxHashMap::default();

            if all_positive {
                combination
                    .value_types
                    .insert("positive-int".to_string(), TAtomic::TPositiveInt);
            } else {
                combination
                    .value_types
                    .insert("int".to_string(), TAtomic::TInt);
            }
        } else {
            combination.literal_ints.insert(type_key, atomic);
        }

        return None;
    }

    if let TAtomic::TFloat = atomic {
        combination.literal_floats = FxHashMap::default();
        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TLiteralFloat { .. } = atomic {
        if combination.value_types.contains_key("float") {
            return None;
        }

        if combination.literal_floats.len() >= literal_limit {
            combination.literal_floats = FxHashMap::default();
            combination
                .value_types
                .insert("float".to_string(), TAtomic::TFloat);
        } else {
            combination.literal_floats.insert(type_key, atomic);
        }

        return None;
    }

    if let TAtomic::TClassString { ref as_name, .. } = atomic {
        if as_name == "object" {
            combination.class_string_types = FxHashMap::default();
            combination
                .class_string_types
                .insert("object".to_string(), atomic);
            return None;
        }

        if combination.class_string_types.contains_key("object") {
            return None;
        }

        if let Some(codebase) = codebase {
            // a class-string constraint already covered by a wider one
            for (existing_as, _) in combination.class_string_types.iter() {
                if existing_as == as_name
                    || codebase.class_extends_or_implements(as_name, existing_as)
                {
                    return None;
                }
            }

            let as_name = as_name.clone();
            combination
                .class_string_types
                .retain(|existing_as, _| {
                    !codebase.class_extends_or_implements(existing_as, &as_name)
                });
        }

        if let TAtomic::TClassString { ref as_name, .. } = atomic {
            combination
                .class_string_types
                .insert(as_name.clone(), atomic.clone());
        }

        return None;
    }

    if let TAtomic::TLiteralClassString { ref value } = atomic {
        if combination.class_string_types.contains_key("object") {
            return None;
        }

        if let Some(codebase) = codebase {
            for (existing_as, existing) in combination.class_string_types.iter() {
                if matches!(existing, TAtomic::TClassString { .. })
                    && (existing_as == value
                        || codebase.class_extends_or_implements(value, existing_as))
                {
                    return None;
                }
            }
        }

        combination.class_string_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TCallable = atomic {
        combination
            .value_types
            .retain(|k, _| !k.starts_with("Closure("));
        combination.value_types.insert(type_key, atomic);
        return None;
    }

    if let TAtomic::TClosure { .. } = atomic {
        if combination.value_types.contains_key("callable") {
            return None;
        }

        combination.value_types.insert(type_key, atomic);
        return None;
    }

    combination.value_types.insert(type_key, atomic);

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_mixed, get_string, DEFAULT_LITERAL_LIMIT};
    use phlint_code_info::classlike_info::{ClassLikeInfo, ClassLikeKind};
    use std::collections::BTreeMap;

    fn combine_simple(types: Vec<TAtomic>) -> Vec<TAtomic> {
        combine(types, None, false, true, DEFAULT_LITERAL_LIMIT)
    }

    fn keys(types: &[TAtomic]) -> Vec<String> {
        let mut keys = types.iter().map(|t| t.get_key()).collect::<Vec<_>>();
        keys.sort();
        keys
    }

    #[test]
    fn true_and_false_collapse_to_bool() {
        let combined = combine_simple(vec![TAtomic::TTrue, TAtomic::TFalse]);
        assert_eq!(keys(&combined), vec!["bool"]);
    }

    #[test]
    fn four_scalar_kinds_collapse_to_scalar() {
        let combined = combine_simple(vec![
            TAtomic::TString,
            TAtomic::TInt,
            TAtomic::TFloat,
            TAtomic::TBool,
        ]);
        assert_eq!(keys(&combined), vec!["scalar"]);
    }

    #[test]
    fn scalar_absorbs_literals() {
        let combined = combine_simple(vec![
            TAtomic::TLiteralInt { value: 3 },
            TAtomic::TScalar,
            TAtomic::TLiteralString {
                value: "a".to_string(),
            },
        ]);
        assert_eq!(keys(&combined), vec!["scalar"]);
    }

    #[test]
    fn mixed_absorbs_everything_when_allowed() {
        let combined = combine_simple(vec![TAtomic::TMixed, TAtomic::TInt, TAtomic::TNull]);
        assert_eq!(keys(&combined), vec!["mixed"]);
    }

    #[test]
    fn mixed_kept_alongside_when_union_disallowed() {
        let combined = combine(
            vec![TAtomic::TMixed, TAtomic::TInt],
            None,
            false,
            false,
            DEFAULT_LITERAL_LIMIT,
        );
        assert_eq!(keys(&combined), vec!["int", "mixed"]);
    }

    #[test]
    fn literal_int_threshold_collapses_to_int() {
        let mut types = vec![];
        for i in -1..(DEFAULT_LITERAL_LIMIT as i64) {
            types.push(TAtomic::TLiteralInt { value: i });
        }
        let combined = combine(types, None, false, true, DEFAULT_LITERAL_LIMIT);
        assert_eq!(keys(&combined), vec!["int"]);
    }

    // the collapse requires every literal to be strictly greater than zero;
    // a set containing int(0) widens to plain int, since zero is not a
    // member of positive-int anywhere else in the algebra
    #[test]
    fn literal_int_threshold_collapses_to_positive_int_when_all_positive() {
        let mut types = vec![];
        for i in 1..=(DEFAULT_LITERAL_LIMIT as i64 + 1) {
            types.push(TAtomic::TLiteralInt { value: i });
        }
        let combined = combine(types, None, false, true, DEFAULT_LITERAL_LIMIT);
        assert_eq!(keys(&combined), vec!["positive-int"]);
    }

    #[test]
    fn empty_mixed_alongside_an_array_widens_to_mixed() {
        let combined = combine_simple(vec![
            TAtomic::TEmptyMixed,
            TAtomic::TArray {
                key_param: Box::new(get_int()),
                value_param: Box::new(get_string()),
                non_empty: false,
            },
        ]);
        assert_eq!(keys(&combined), vec!["mixed"]);
    }

    #[test]
    fn combination_is_idempotent() {
        let combined = combine_simple(vec![
            TAtomic::TLiteralInt { value: 1 },
            TAtomic::TLiteralInt { value: 2 },
            TAtomic::TString,
            TAtomic::TNull,
        ]);
        let recombined = combine_simple(combined.clone());
        assert_eq!(keys(&combined), keys(&recombined));
    }

    #[test]
    fn arrays_merge_params() {
        let combined = combine_simple(vec![
            TAtomic::TArray {
                key_param: Box::new(get_int()),
                value_param: Box::new(get_string()),
                non_empty: false,
            },
            TAtomic::TArray {
                key_param: Box::new(get_string()),
                value_param: Box::new(get_int()),
                non_empty: true,
            },
        ]);
        assert_eq!(combined.len(), 1);
        if let TAtomic::TArray {
            key_param,
            value_param,
            non_empty,
        } = &combined[0]
        {
            assert_eq!(key_param.get_id(), "int|string");
            assert_eq!(value_param.get_id(), "int|string");
            assert!(!non_empty);
        } else {
            panic!("expected an array");
        }
    }

    #[test]
    fn keyed_arrays_mark_divergent_keys_possibly_undefined() {
        let mut items_a = BTreeMap::new();
        items_a.insert(
            ArrayKey::String("x".to_string()),
            (false, Arc::new(get_int())),
        );
        let mut items_b = BTreeMap::new();
        items_b.insert(
            ArrayKey::String("y".to_string()),
            (false, Arc::new(get_string())),
        );

        let combined = combine_simple(vec![
            TAtomic::TKeyedArray {
                known_items: items_a,
                params: None,
                is_list: false,
                non_empty: false,
            },
            TAtomic::TKeyedArray {
                known_items: items_b,
                params: None,
                is_list: false,
                non_empty: false,
            },
        ]);

        assert_eq!(combined.len(), 1);
        if let TAtomic::TKeyedArray { known_items, .. } = &combined[0] {
            assert!(known_items[&ArrayKey::String("x".to_string())].0);
            assert!(known_items[&ArrayKey::String("y".to_string())].0);
        } else {
            panic!("expected a keyed array");
        }
    }

    #[test]
    fn shared_keys_stay_defined_across_shapes() {
        let mut items_a = BTreeMap::new();
        items_a.insert(
            ArrayKey::String("x".to_string()),
            (false, Arc::new(get_int())),
        );
        let mut items_b = BTreeMap::new();
        items_b.insert(
            ArrayKey::String("x".to_string()),
            (false, Arc::new(get_string())),
        );

        let combined = combine_simple(vec![
            TAtomic::TKeyedArray {
                known_items: items_a,
                params: None,
                is_list: false,
                non_empty: false,
            },
            TAtomic::TKeyedArray {
                known_items: items_b,
                params: None,
                is_list: false,
                non_empty: false,
            },
        ]);

        if let TAtomic::TKeyedArray { known_items, .. } = &combined[0] {
            let (possibly_undefined, entry_type) =
                &known_items[&ArrayKey::String("x".to_string())];
            assert!(!possibly_undefined);
            assert_eq!(entry_type.get_id(), "int|string");
        } else {
            panic!("expected a keyed array");
        }
    }

    #[test]
    fn named_object_hierarchy_dedupes() {
        let mut codebase = CodebaseInfo::new();
        let animal = ClassLikeInfo::new("Animal".to_string(), ClassLikeKind::Class);
        codebase.add_classlike(animal);
        let mut dog = ClassLikeInfo::new("Dog".to_string(), ClassLikeKind::Class);
        dog.all_parent_classes.insert("Animal".to_string());
        codebase.add_classlike(dog);

        let make = |name: &str| TAtomic::TNamedObject {
            name: name.to_string(),
            type_params: None,
            is_this: false,
            extra_types: None,
        };

        let combined = combine(
            vec![make("Dog"), make("Animal")],
            Some(&codebase),
            false,
            true,
            DEFAULT_LITERAL_LIMIT,
        );
        assert_eq!(keys(&combined), vec!["Animal"]);

        let combined = combine(
            vec![make("Animal"), make("Dog")],
            Some(&codebase),
            false,
            true,
            DEFAULT_LITERAL_LIMIT,
        );
        assert_eq!(keys(&combined), vec!["Animal"]);
    }

    #[test]
    fn array_and_traversable_collapse_to_iterable() {
        let combined = combine_simple(vec![
            TAtomic::TArray {
                key_param: Box::new(get_int()),
                value_param: Box::new(get_string()),
                non_empty: false,
            },
            TAtomic::TNamedObject {
                name: "Traversable".to_string(),
                type_params: Some(vec![get_int(), get_mixed()]),
                is_this: false,
                extra_types: None,
            },
        ]);

        assert_eq!(combined.len(), 1);
        assert!(matches!(combined[0], TAtomic::TIterable { .. }));
    }

    #[test]
    fn empty_string_widens_non_empty_string() {
        let combined = combine_simple(vec![
            TAtomic::TNonEmptyString,
            TAtomic::TLiteralString {
                value: "".to_string(),
            },
        ]);
        assert_eq!(keys(&combined), vec!["string"]);
    }

    #[test]
    fn nothing_is_dropped_in_favor_of_real_types() {
        let combined = combine_simple(vec![TAtomic::TNothing, TAtomic::TInt]);
        assert_eq!(keys(&combined), vec!["int"]);

        let combined = combine_simple(vec![TAtomic::TNothing, TAtomic::TNothing]);
        assert_eq!(keys(&combined), vec!["nothing"]);
    }
}
