use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;

pub mod template;
mod type_combination;
pub mod type_combiner;
pub mod type_comparator;
pub mod type_expander;

/// Literal members of one scalar kind kept in a union before the combiner
/// collapses them to the general type.
pub const DEFAULT_LITERAL_LIMIT: usize = 500;

pub fn wrap_atomic(tinner: TAtomic) -> TUnion {
    TUnion::new(vec![tinner])
}

pub fn get_int() -> TUnion {
    wrap_atomic(TAtomic::TInt)
}

pub fn get_literal_int(value: i64) -> TUnion {
    wrap_atomic(TAtomic::TLiteralInt { value })
}

pub fn get_string() -> TUnion {
    wrap_atomic(TAtomic::TString)
}

pub fn get_literal_string(value: String) -> TUnion {
    wrap_atomic(TAtomic::TLiteralString { value })
}

pub fn get_float() -> TUnion {
    wrap_atomic(TAtomic::TFloat)
}

pub fn get_bool() -> TUnion {
    wrap_atomic(TAtomic::TBool)
}

pub fn get_true() -> TUnion {
    wrap_atomic(TAtomic::TTrue)
}

pub fn get_false() -> TUnion {
    wrap_atomic(TAtomic::TFalse)
}

pub fn get_null() -> TUnion {
    wrap_atomic(TAtomic::TNull)
}

pub fn get_nothing() -> TUnion {
    wrap_atomic(TAtomic::TNothing)
}

pub fn get_mixed() -> TUnion {
    wrap_atomic(TAtomic::TMixed)
}

pub fn get_mixed_maybe_from_loop(from_loop_isset: bool) -> TUnion {
    wrap_atomic(if from_loop_isset {
        TAtomic::TMixedFromLoopIsset
    } else {
        TAtomic::TMixed
    })
}

pub fn get_scalar() -> TUnion {
    wrap_atomic(TAtomic::TScalar)
}

pub fn get_arraykey() -> TUnion {
    wrap_atomic(TAtomic::TArraykey)
}

pub fn get_numeric() -> TUnion {
    wrap_atomic(TAtomic::TNumeric)
}

pub fn get_object() -> TUnion {
    wrap_atomic(TAtomic::TObject)
}

pub fn get_named_object(name: String) -> TUnion {
    wrap_atomic(TAtomic::TNamedObject {
        name,
        type_params: None,
        is_this: false,
        extra_types: None,
    })
}

pub fn get_mixed_array() -> TUnion {
    wrap_atomic(TAtomic::TArray {
        key_param: Box::new(get_arraykey()),
        value_param: Box::new(get_mixed()),
        non_empty: false,
    })
}

pub fn get_empty_array() -> TUnion {
    wrap_atomic(TAtomic::TArray {
        key_param: Box::new(get_nothing()),
        value_param: Box::new(get_nothing()),
        non_empty: false,
    })
}

pub fn get_mixed_list() -> TUnion {
    wrap_atomic(TAtomic::TList {
        type_param: Box::new(get_mixed()),
        known_count: None,
        non_empty: false,
    })
}

pub fn get_mixed_iterable() -> TUnion {
    wrap_atomic(TAtomic::TIterable {
        key_param: Box::new(get_mixed()),
        value_param: Box::new(get_mixed()),
    })
}

/// Merges two unions into their smallest common supertype, preserving union
/// flags: a flag set on either side survives on the result.
pub fn combine_union_types(
    one: &TUnion,
    two: &TUnion,
    codebase: Option<&CodebaseInfo>,
    overwrite_empty_array: bool,
) -> TUnion {
    let mut combined_type = if one == two {
        one.clone()
    } else {
        let mut atomic_types = one.types.values().cloned().collect::<Vec<_>>();
        atomic_types.extend(two.types.values().cloned());

        TUnion::new(type_combiner::combine(
            atomic_types,
            codebase,
            overwrite_empty_array,
            true,
            DEFAULT_LITERAL_LIMIT,
        ))
    };

    combined_type.possibly_undefined = one.possibly_undefined || two.possibly_undefined;
    combined_type.possibly_undefined_from_try =
        one.possibly_undefined_from_try || two.possibly_undefined_from_try;
    combined_type.from_docblock = one.from_docblock || two.from_docblock;
    combined_type.from_calculation = one.from_calculation || two.from_calculation;
    combined_type.had_template = one.had_template || two.had_template;

    combined_type
}

/// Folds `other` into `base`, widening in place where keys collide.
pub fn add_union_type(
    mut base_type: TUnion,
    other_type: &TUnion,
    codebase: Option<&CodebaseInfo>,
    overwrite_empty_array: bool,
) -> TUnion {
    let base_types = std::mem::take(&mut base_type.types);

    base_type.types = if base_types.keys().eq(other_type.types.keys()) {
        base_types
    } else {
        let mut atomic_types = base_types.into_values().collect::<Vec<_>>();
        atomic_types.extend(other_type.types.values().cloned());

        let mut keyed = std::collections::BTreeMap::new();
        for atomic in type_combiner::combine(
            atomic_types,
            codebase,
            overwrite_empty_array,
            true,
            DEFAULT_LITERAL_LIMIT,
        ) {
            keyed.insert(atomic.get_key(), atomic);
        }
        keyed
    };

    base_type.possibly_undefined = base_type.possibly_undefined || other_type.possibly_undefined;
    base_type.possibly_undefined_from_try =
        base_type.possibly_undefined_from_try || other_type.possibly_undefined_from_try;
    base_type.from_docblock = base_type.from_docblock || other_type.from_docblock;
    base_type.from_calculation = base_type.from_calculation || other_type.from_calculation;
    base_type.had_template = base_type.had_template || other_type.had_template;

    base_type
}

pub fn add_optional_union_type(
    base_type: TUnion,
    maybe_type: Option<&TUnion>,
    codebase: Option<&CodebaseInfo>,
) -> TUnion {
    if let Some(type_2) = maybe_type {
        add_union_type(base_type, type_2, codebase, false)
    } else {
        base_type
    }
}

/// The key and value params an arrayish type would expose to iteration.
pub fn get_arrayish_params(
    atomic: &TAtomic,
    _codebase: Option<&CodebaseInfo>,
) -> Option<(TUnion, TUnion)> {
    match atomic {
        TAtomic::TArray {
            key_param,
            value_param,
            ..
        } => Some(((**key_param).clone(), (**value_param).clone())),
        TAtomic::TList { type_param, .. } => Some((get_int(), (**type_param).clone())),
        TAtomic::TKeyedArray {
            known_items,
            params,
            ..
        } => {
            let mut key_param = params
                .as_ref()
                .map(|(k, _)| (**k).clone())
                .unwrap_or(get_nothing());
            let mut value_param = params
                .as_ref()
                .map(|(_, v)| (**v).clone())
                .unwrap_or(get_nothing());

            for (key, (_, item_type)) in known_items {
                key_param = add_union_type(key_param, &wrap_atomic(key.to_atomic()), None, false);
                value_param = add_union_type(value_param, item_type.as_ref(), None, false);
            }

            Some((key_param, value_param))
        }
        TAtomic::TIterable {
            key_param,
            value_param,
        } => Some(((**key_param).clone(), (**value_param).clone())),
        _ => None,
    }
}
