use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::functionlike_parameter::FnParameter;
use crate::t_union::TUnion;

/// A key in a keyed-array shape. PHP array keys are either ints or strings,
/// and the two never collide (`"5"` is coerced to `5` upstream).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArrayKey {
    Int(i64),
    String(String),
}

impl ArrayKey {
    pub fn to_string(&self) -> String {
        match self {
            ArrayKey::Int(i) => i.to_string(),
            ArrayKey::String(k) => format!("'{}'", k),
        }
    }

    pub fn to_atomic(&self) -> TAtomic {
        match self {
            ArrayKey::Int(i) => TAtomic::TLiteralInt { value: *i },
            ArrayKey::String(k) => TAtomic::TLiteralString { value: k.clone() },
        }
    }
}

/// One indivisible member of a union type.
///
/// Identity inside a union is the string returned by `get_key` — literal
/// variants embed their value (`int(5)`, `string(foo)`) so distinct literals
/// occupy distinct union slots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TAtomic {
    TArraykey,
    TBool,
    TTrue,
    TFalse,
    TInt,
    TPositiveInt,
    TLiteralInt {
        value: i64,
    },
    TFloat,
    TLiteralFloat {
        value: f64,
    },
    TString,
    TNonEmptyString,
    TNumericString,
    TLiteralString {
        value: String,
    },
    TNumeric,
    TScalar,
    TNull,
    TResource,
    TArray {
        key_param: Box<TUnion>,
        value_param: Box<TUnion>,
        non_empty: bool,
    },
    TList {
        type_param: Box<TUnion>,
        known_count: Option<usize>,
        non_empty: bool,
    },
    TKeyedArray {
        known_items: BTreeMap<ArrayKey, (bool, Arc<TUnion>)>,
        params: Option<(Box<TUnion>, Box<TUnion>)>,
        is_list: bool,
        non_empty: bool,
    },
    TIterable {
        key_param: Box<TUnion>,
        value_param: Box<TUnion>,
    },
    TCallable,
    TClosure {
        params: Vec<FnParameter>,
        return_type: Option<Box<TUnion>>,
        is_pure: bool,
    },
    TObject,
    TNamedObject {
        name: String,
        type_params: Option<Vec<TUnion>>,
        is_this: bool,
        extra_types: Option<Vec<TAtomic>>,
    },
    TClassString {
        as_name: String,
        as_type: Option<Box<TAtomic>>,
    },
    TLiteralClassString {
        value: String,
    },
    TTemplateParam {
        param_name: String,
        as_type: Box<TUnion>,
        defining_entity: String,
        extra_types: Option<Vec<TAtomic>>,
    },
    TMixed,
    TMixedFromLoopIsset,
    TEmptyMixed,
    TNonEmptyMixed,
    TNonNullMixed,
    TNothing,
    TPlaceholder,
    TClassTypeConstant {
        class_type: Box<TAtomic>,
        member_name: String,
    },
    TTypeAlias {
        name: String,
        type_params: Option<Vec<TUnion>>,
    },
}

impl TAtomic {
    pub fn get_id(&self) -> String {
        match self {
            TAtomic::TArraykey => "array-key".to_string(),
            TAtomic::TBool => "bool".to_string(),
            TAtomic::TTrue => "true".to_string(),
            TAtomic::TFalse => "false".to_string(),
            TAtomic::TInt => "int".to_string(),
            TAtomic::TPositiveInt => "positive-int".to_string(),
            TAtomic::TLiteralInt { value } => format!("int({})", value),
            TAtomic::TFloat => "float".to_string(),
            TAtomic::TLiteralFloat { value } => format!("float({})", value),
            TAtomic::TString => "string".to_string(),
            TAtomic::TNonEmptyString => "non-empty-string".to_string(),
            TAtomic::TNumericString => "numeric-string".to_string(),
            TAtomic::TLiteralString { value } => format!("string({})", value),
            TAtomic::TNumeric => "numeric".to_string(),
            TAtomic::TScalar => "scalar".to_string(),
            TAtomic::TNull => "null".to_string(),
            TAtomic::TResource => "resource".to_string(),
            TAtomic::TArray {
                key_param,
                value_param,
                non_empty,
            } => format!(
                "{}array<{}, {}>",
                if *non_empty { "non-empty-" } else { "" },
                key_param.get_id(),
                value_param.get_id()
            ),
            TAtomic::TList {
                type_param,
                non_empty,
                ..
            } => format!(
                "{}list<{}>",
                if *non_empty { "non-empty-" } else { "" },
                type_param.get_id()
            ),
            TAtomic::TKeyedArray {
                known_items,
                params,
                is_list,
                ..
            } => {
                let mut str = String::new();
                str += if *is_list { "list{" } else { "array{" };
                str += known_items
                    .iter()
                    .map(|(key, (possibly_undefined, item_type))| {
                        format!(
                            "{}{}: {}",
                            key.to_string(),
                            if *possibly_undefined { "?" } else { "" },
                            item_type.get_id()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
                    .as_str();
                if let Some((key_param, value_param)) = params {
                    str += &format!(", ...<{}, {}>", key_param.get_id(), value_param.get_id());
                }
                str += "}";
                str
            }
            TAtomic::TIterable {
                key_param,
                value_param,
            } => format!("iterable<{}, {}>", key_param.get_id(), value_param.get_id()),
            TAtomic::TCallable => "callable".to_string(),
            TAtomic::TClosure {
                params,
                return_type,
                ..
            } => {
                let mut str = String::new();
                str += "Closure(";
                str += params
                    .iter()
                    .map(|param| {
                        if let Some(param_type) = &param.signature_type {
                            param_type.get_id()
                        } else {
                            "mixed".to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
                    .as_str();
                str += "): ";
                if let Some(return_type) = return_type {
                    str += return_type.get_id().as_str();
                } else {
                    str += "mixed";
                }
                str
            }
            TAtomic::TObject => "object".to_string(),
            TAtomic::TNamedObject {
                name,
                type_params,
                extra_types,
                ..
            } => {
                let mut str = name.clone();

                if let Some(type_params) = type_params {
                    str += "<";
                    str += type_params
                        .iter()
                        .map(|tunion| tunion.get_id())
                        .collect::<Vec<_>>()
                        .join(", ")
                        .as_str();
                    str += ">";
                }

                if let Some(extra_types) = extra_types {
                    str += "&";
                    str += extra_types
                        .iter()
                        .map(|atomic| atomic.get_id())
                        .collect::<Vec<_>>()
                        .join("&")
                        .as_str();
                }

                str
            }
            TAtomic::TClassString { as_name, .. } => {
                if as_name == "object" {
                    "class-string".to_string()
                } else {
                    format!("class-string<{}>", as_name)
                }
            }
            TAtomic::TLiteralClassString { value } => format!("class-string({})", value),
            TAtomic::TTemplateParam {
                param_name,
                defining_entity,
                ..
            } => format!("{}:{}", param_name, defining_entity),
            TAtomic::TMixed => "mixed".to_string(),
            TAtomic::TMixedFromLoopIsset => "mixed-from-loop-isset".to_string(),
            TAtomic::TEmptyMixed => "empty-mixed".to_string(),
            TAtomic::TNonEmptyMixed => "non-empty-mixed".to_string(),
            TAtomic::TNonNullMixed => "nonnull-mixed".to_string(),
            TAtomic::TNothing => "nothing".to_string(),
            TAtomic::TPlaceholder => "_".to_string(),
            TAtomic::TClassTypeConstant {
                class_type,
                member_name,
            } => format!("{}::{}", class_type.get_id(), member_name),
            TAtomic::TTypeAlias { name, type_params } => {
                if let Some(type_params) = type_params {
                    format!(
                        "{}<{}>",
                        name,
                        type_params
                            .iter()
                            .map(|tunion| tunion.get_id())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                } else {
                    name.clone()
                }
            }
        }
    }

    /// The stable string used for set membership inside a `TUnion`.
    pub fn get_key(&self) -> String {
        self.get_id()
    }

    pub fn is_mixed(&self) -> bool {
        matches!(
            self,
            TAtomic::TMixed
                | TAtomic::TMixedFromLoopIsset
                | TAtomic::TEmptyMixed
                | TAtomic::TNonEmptyMixed
                | TAtomic::TNonNullMixed
        )
    }

    pub fn is_vanilla_mixed(&self) -> bool {
        matches!(self, TAtomic::TMixed)
    }

    pub fn is_templated_as_mixed(&self) -> bool {
        match self {
            TAtomic::TTemplateParam { as_type, .. } => as_type.is_mixed(),
            _ => false,
        }
    }

    pub fn is_object_type(&self) -> bool {
        matches!(
            self,
            TAtomic::TObject | TAtomic::TNamedObject { .. } | TAtomic::TClosure { .. }
        )
    }

    pub fn is_array_type(&self) -> bool {
        matches!(
            self,
            TAtomic::TArray { .. } | TAtomic::TList { .. } | TAtomic::TKeyedArray { .. }
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            TAtomic::TString
                | TAtomic::TNonEmptyString
                | TAtomic::TNumericString
                | TAtomic::TLiteralString { .. }
                | TAtomic::TClassString { .. }
                | TAtomic::TLiteralClassString { .. }
        )
    }

    pub fn is_int(&self) -> bool {
        matches!(
            self,
            TAtomic::TInt | TAtomic::TPositiveInt | TAtomic::TLiteralInt { .. }
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, TAtomic::TFloat | TAtomic::TLiteralFloat { .. })
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TAtomic::TBool | TAtomic::TTrue | TAtomic::TFalse)
    }

    pub fn is_literal_value(&self) -> bool {
        matches!(
            self,
            TAtomic::TLiteralInt { .. }
                | TAtomic::TLiteralFloat { .. }
                | TAtomic::TLiteralString { .. }
                | TAtomic::TLiteralClassString { .. }
                | TAtomic::TTrue
                | TAtomic::TFalse
        )
    }

    pub fn is_some_scalar(&self) -> bool {
        matches!(
            self,
            TAtomic::TArraykey
                | TAtomic::TBool
                | TAtomic::TTrue
                | TAtomic::TFalse
                | TAtomic::TInt
                | TAtomic::TPositiveInt
                | TAtomic::TLiteralInt { .. }
                | TAtomic::TFloat
                | TAtomic::TLiteralFloat { .. }
                | TAtomic::TString
                | TAtomic::TNonEmptyString
                | TAtomic::TNumericString
                | TAtomic::TLiteralString { .. }
                | TAtomic::TNumeric
                | TAtomic::TScalar
                | TAtomic::TClassString { .. }
                | TAtomic::TLiteralClassString { .. }
        )
    }

    /// Whether a runtime value of this type is always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            TAtomic::TTrue
            | TAtomic::TPositiveInt
            | TAtomic::TObject
            | TAtomic::TNamedObject { .. }
            | TAtomic::TClosure { .. }
            | TAtomic::TResource
            | TAtomic::TLiteralClassString { .. }
            | TAtomic::TClassString { .. }
            | TAtomic::TNonEmptyMixed => true,
            TAtomic::TLiteralInt { value } => *value != 0,
            TAtomic::TLiteralFloat { value } => *value != 0.0,
            TAtomic::TLiteralString { value } => !value.is_empty() && value != "0",
            TAtomic::TArray { non_empty, .. } | TAtomic::TList { non_empty, .. } => *non_empty,
            TAtomic::TKeyedArray {
                known_items,
                non_empty,
                ..
            } => {
                *non_empty
                    || known_items
                        .iter()
                        .any(|(_, (possibly_undefined, _))| !possibly_undefined)
            }
            TAtomic::TTemplateParam { as_type, .. } => as_type.is_always_truthy(),
            _ => false,
        }
    }

    /// Whether a runtime value of this type is always falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            TAtomic::TFalse | TAtomic::TNull | TAtomic::TEmptyMixed => true,
            TAtomic::TLiteralInt { value } => *value == 0,
            TAtomic::TLiteralFloat { value } => *value == 0.0,
            TAtomic::TLiteralString { value } => value.is_empty() || value == "0",
            TAtomic::TArray {
                key_param,
                value_param,
                non_empty,
            } => !non_empty && key_param.is_nothing() && value_param.is_nothing(),
            TAtomic::TList {
                type_param,
                non_empty,
                ..
            } => !non_empty && type_param.is_nothing(),
            TAtomic::TKeyedArray {
                known_items,
                params,
                non_empty,
                ..
            } => !non_empty && known_items.is_empty() && params.is_none(),
            TAtomic::TTemplateParam { as_type, .. } => as_type.is_always_falsy(),
            _ => false,
        }
    }

    pub fn get_literal_int_value(&self) -> Option<i64> {
        match self {
            TAtomic::TLiteralInt { value } => Some(*value),
            _ => None,
        }
    }

    pub fn get_literal_string_value(&self) -> Option<String> {
        match self {
            TAtomic::TLiteralString { value } => Some(value.clone()),
            _ => None,
        }
    }

    /// Rebuilds a template param with a new upper bound. Panics on any other
    /// variant — callers match first.
    pub fn replace_template_extends(&self, new_as_type: TUnion) -> TAtomic {
        match self {
            TAtomic::TTemplateParam {
                param_name,
                defining_entity,
                extra_types,
                ..
            } => TAtomic::TTemplateParam {
                param_name: param_name.clone(),
                as_type: Box::new(new_as_type),
                defining_entity: defining_entity.clone(),
                extra_types: extra_types.clone(),
            },
            _ => panic!("not a template param: {}", self.get_id()),
        }
    }

    pub fn get_intersection_types(&self) -> Option<&Vec<TAtomic>> {
        match self {
            TAtomic::TNamedObject {
                extra_types: Some(extra_types),
                ..
            }
            | TAtomic::TTemplateParam {
                extra_types: Some(extra_types),
                ..
            } => Some(extra_types),
            _ => None,
        }
    }

    pub fn add_intersection_type(&mut self, extra_type: TAtomic) {
        if let TAtomic::TNamedObject {
            ref mut extra_types,
            ..
        }
        | TAtomic::TTemplateParam {
            ref mut extra_types,
            ..
        } = self
        {
            if let Some(extra_types) = extra_types {
                extra_types.push(extra_type);
            } else {
                *extra_types = Some(vec![extra_type]);
            }
        }
    }

    pub fn clone_without_intersection_types(&self) -> TAtomic {
        let mut clone = self.clone();

        if let TAtomic::TNamedObject {
            ref mut extra_types,
            ..
        }
        | TAtomic::TTemplateParam {
            ref mut extra_types,
            ..
        } = clone
        {
            *extra_types = None;
        }

        clone
    }

    /// Replaces assertion wildcards with their widest counterpart so a
    /// narrowed type never leaks a placeholder to callers.
    pub fn remove_placeholders(&mut self) {
        match self {
            TAtomic::TArray {
                ref mut key_param,
                ref mut value_param,
                ..
            } => {
                if let Some(TAtomic::TPlaceholder) = key_param.get_single_opt() {
                    **key_param = TUnion::new(vec![TAtomic::TArraykey]);
                }
                if let Some(TAtomic::TPlaceholder) = value_param.get_single_opt() {
                    **value_param = TUnion::new(vec![TAtomic::TMixed]);
                }
            }
            TAtomic::TList {
                ref mut type_param, ..
            } => {
                if let Some(TAtomic::TPlaceholder) = type_param.get_single_opt() {
                    **type_param = TUnion::new(vec![TAtomic::TMixed]);
                }
            }
            TAtomic::TIterable {
                ref mut key_param,
                ref mut value_param,
            } => {
                if let Some(TAtomic::TPlaceholder) = key_param.get_single_opt() {
                    **key_param = TUnion::new(vec![TAtomic::TArraykey]);
                }
                if let Some(TAtomic::TPlaceholder) = value_param.get_single_opt() {
                    **value_param = TUnion::new(vec![TAtomic::TMixed]);
                }
            }
            TAtomic::TNamedObject {
                type_params: Some(ref mut type_params),
                ..
            } => {
                for type_param in type_params {
                    if let Some(TAtomic::TPlaceholder) = type_param.get_single_opt() {
                        *type_param = TUnion::new(vec![TAtomic::TMixed]);
                    }
                }
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_keys_embed_values() {
        assert_eq!(TAtomic::TLiteralInt { value: 5 }.get_key(), "int(5)");
        assert_eq!(
            TAtomic::TLiteralString {
                value: "foo".to_string()
            }
            .get_key(),
            "string(foo)"
        );
        assert_ne!(
            TAtomic::TLiteralInt { value: 5 }.get_key(),
            TAtomic::TLiteralInt { value: 6 }.get_key()
        );
    }

    #[test]
    fn truthiness_of_literals() {
        assert!(TAtomic::TLiteralInt { value: 1 }.is_truthy());
        assert!(TAtomic::TLiteralInt { value: 0 }.is_falsy());
        assert!(TAtomic::TLiteralString {
            value: "0".to_string()
        }
        .is_falsy());
        assert!(TAtomic::TLiteralString {
            value: "a".to_string()
        }
        .is_truthy());
        assert!(!TAtomic::TString.is_truthy());
        assert!(!TAtomic::TString.is_falsy());
    }

    #[test]
    fn keyed_array_id_marks_optional_entries() {
        let mut known_items = BTreeMap::new();
        known_items.insert(
            ArrayKey::String("a".to_string()),
            (false, Arc::new(TUnion::new(vec![TAtomic::TInt]))),
        );
        known_items.insert(
            ArrayKey::String("b".to_string()),
            (true, Arc::new(TUnion::new(vec![TAtomic::TString]))),
        );
        let shape = TAtomic::TKeyedArray {
            known_items,
            params: None,
            is_list: false,
            non_empty: false,
        };
        assert_eq!(shape.get_id(), "array{'a': int, 'b'?: string}");
    }
}
