use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::t_atomic::TAtomic;

/// A union of atomic types, keyed by each member's identity string.
///
/// Reconciliation and combination functions borrow a union, build a fresh
/// replacement, and return it — callers must store the returned value and
/// not assume the input survives unaliased.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TUnion {
    pub types: BTreeMap<String, TAtomic>,
    pub possibly_undefined: bool,
    pub possibly_undefined_from_try: bool,
    pub from_docblock: bool,
    pub from_calculation: bool,
    pub had_template: bool,
}

impl TUnion {
    pub fn new(types: Vec<TAtomic>) -> TUnion {
        let mut keyed_types = BTreeMap::new();

        for ttype in types {
            keyed_types.insert(ttype.get_key(), ttype);
        }

        TUnion {
            types: keyed_types,
            possibly_undefined: false,
            possibly_undefined_from_try: false,
            from_docblock: false,
            from_calculation: false,
            had_template: false,
        }
    }

    pub fn add_type(&mut self, new_type: TAtomic) {
        self.types.insert(new_type.get_key(), new_type);
    }

    pub fn remove_type(&mut self, key: &str) -> Option<TAtomic> {
        self.types.remove(key)
    }

    pub fn has_type(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn is_single(&self) -> bool {
        self.types.len() == 1
    }

    pub fn get_single(&self) -> &TAtomic {
        for (_, atomic) in self.types.iter() {
            return atomic;
        }

        panic!("expected a single type")
    }

    pub fn get_single_owned(self) -> TAtomic {
        for (_, atomic) in self.types.into_iter() {
            return atomic;
        }

        panic!("expected a single type")
    }

    pub fn get_single_opt(&self) -> Option<&TAtomic> {
        if self.types.len() == 1 {
            self.types.values().next()
        } else {
            None
        }
    }

    pub fn is_nothing(&self) -> bool {
        self.types.len() == 1 && self.types.contains_key("nothing")
    }

    pub fn is_mixed(&self) -> bool {
        self.types.values().all(|atomic| atomic.is_mixed())
    }

    pub fn has_mixed(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_mixed())
    }

    pub fn is_vanilla_mixed(&self) -> bool {
        self.types.len() == 1 && self.types.contains_key("mixed")
    }

    pub fn is_nullable(&self) -> bool {
        self.types.contains_key("null") && self.types.len() > 1
    }

    pub fn is_null(&self) -> bool {
        self.types.len() == 1 && self.types.contains_key("null")
    }

    pub fn has_null(&self) -> bool {
        self.types.contains_key("null")
    }

    pub fn has_bool(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_bool())
    }

    pub fn has_int(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_int())
    }

    pub fn has_float(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_float())
    }

    pub fn has_string(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_string())
    }

    pub fn has_template_types(&self) -> bool {
        self.types
            .values()
            .any(|atomic| matches!(atomic, TAtomic::TTemplateParam { .. }))
    }

    pub fn has_object_type(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_object_type())
    }

    pub fn is_always_truthy(&self) -> bool {
        !self.possibly_undefined
            && !self.possibly_undefined_from_try
            && self.types.values().all(|atomic| atomic.is_truthy())
    }

    pub fn is_always_falsy(&self) -> bool {
        self.types.values().all(|atomic| atomic.is_falsy())
    }

    pub fn get_literal_ints(&self) -> Vec<&TAtomic> {
        self.types
            .values()
            .filter(|atomic| matches!(atomic, TAtomic::TLiteralInt { .. }))
            .collect()
    }

    pub fn get_literal_floats(&self) -> Vec<&TAtomic> {
        self.types
            .values()
            .filter(|atomic| matches!(atomic, TAtomic::TLiteralFloat { .. }))
            .collect()
    }

    pub fn get_literal_strings(&self) -> Vec<&TAtomic> {
        self.types
            .values()
            .filter(|atomic| matches!(atomic, TAtomic::TLiteralString { .. }))
            .collect()
    }

    pub fn has_literal_value(&self) -> bool {
        self.types.values().any(|atomic| atomic.is_literal_value())
    }

    pub fn get_id(&self) -> String {
        self.types
            .values()
            .map(|atomic| atomic.get_id())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl PartialEq for TUnion {
    fn eq(&self, other: &Self) -> bool {
        if self.types.len() != other.types.len() {
            return false;
        }

        for key in self.types.keys() {
            if !other.types.contains_key(key) {
                return false;
            }
        }

        self.possibly_undefined == other.possibly_undefined
            && self.possibly_undefined_from_try == other.possibly_undefined_from_try
            && self.from_docblock == other.from_docblock
            && self.from_calculation == other.from_calculation
            && self.had_template == other.had_template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_members_occupy_one_slot() {
        let union = TUnion::new(vec![
            TAtomic::TInt,
            TAtomic::TInt,
            TAtomic::TLiteralInt { value: 5 },
        ]);
        assert_eq!(union.types.len(), 2);
        assert!(union.has_type("int"));
        assert!(union.has_type("int(5)"));
    }

    #[test]
    fn nullability() {
        let union = TUnion::new(vec![TAtomic::TNull, TAtomic::TString]);
        assert!(union.is_nullable());
        assert!(!union.is_null());

        let null_only = TUnion::new(vec![TAtomic::TNull]);
        assert!(null_only.is_null());
        assert!(!null_only.is_nullable());
    }

    #[test]
    fn serde_round_trip() {
        let union = TUnion::new(vec![TAtomic::TLiteralInt { value: 5 }, TAtomic::TNull]);
        let json = serde_json::to_string(&union).unwrap();
        let restored: TUnion = serde_json::from_str(&json).unwrap();
        assert_eq!(union, restored);
        assert_eq!(union.get_id(), restored.get_id());
    }

    #[test]
    fn serde_round_trip_keeps_shape_entries() {
        use crate::t_atomic::ArrayKey;
        use std::sync::Arc;

        let mut known_items = BTreeMap::new();
        known_items.insert(
            ArrayKey::String("id".to_string()),
            (false, Arc::new(TUnion::new(vec![TAtomic::TInt]))),
        );
        let union = TUnion::new(vec![TAtomic::TKeyedArray {
            known_items,
            params: None,
            is_list: false,
            non_empty: true,
        }]);

        let json = serde_json::to_string(&union).unwrap();
        let restored: TUnion = serde_json::from_str(&json).unwrap();
        assert_eq!(union.get_id(), restored.get_id());
    }

    #[test]
    fn union_equality_ignores_member_order() {
        let a = TUnion::new(vec![TAtomic::TInt, TAtomic::TString]);
        let b = TUnion::new(vec![TAtomic::TString, TAtomic::TInt]);
        assert_eq!(a, b);
    }
}
