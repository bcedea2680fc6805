use serde::{Deserialize, Serialize};

use crate::t_atomic::{ArrayKey, TAtomic};
use crate::t_union::TUnion;

/// A fact learned about a variable on one control-flow branch, already
/// parsed into structure by the upstream assertion collector.
///
/// `IsEqual`/`IsNotEqual` are strict (`===`) comparisons;
/// `IsLooselyEqual`/`IsNotLooselyEqual` are loose (`==`) ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Assertion {
    Any,
    IsType(TAtomic),
    IsNotType(TAtomic),
    Falsy,
    Truthy,
    IsEqual(TAtomic),
    IsNotEqual(TAtomic),
    IsLooselyEqual(TAtomic),
    IsNotLooselyEqual(TAtomic),
    IsEqualIsset,
    IsIsset,
    IsNotIsset,
    ArrayKeyExists,
    ArrayKeyDoesNotExist,
    HasArrayKey(ArrayKey),
    DoesNotHaveArrayKey(ArrayKey),
    InArray(TUnion),
    NotInArray(TUnion),
    HasMethod(String),
    DoesNotHaveMethod(String),
    NonEmptyCountable(bool),
    EmptyCountable,
    HasAtLeastCount(usize),
    DoesNotHaveAtLeastCount(usize),
    HasExactCount(usize),
    DoesNotHaveExactCount(usize),
}

impl Assertion {
    pub fn to_string(&self) -> String {
        match self {
            Assertion::Any => "any".to_string(),
            Assertion::IsType(atomic) => atomic.get_id(),
            Assertion::IsNotType(atomic) => "!".to_string() + &atomic.get_id(),
            Assertion::Falsy => "falsy".to_string(),
            Assertion::Truthy => "truthy".to_string(),
            Assertion::IsEqual(atomic) => "=".to_string() + &atomic.get_id(),
            Assertion::IsNotEqual(atomic) => "!=".to_string() + &atomic.get_id(),
            Assertion::IsLooselyEqual(atomic) => "~".to_string() + &atomic.get_id(),
            Assertion::IsNotLooselyEqual(atomic) => "!~".to_string() + &atomic.get_id(),
            Assertion::IsEqualIsset => "=isset".to_string(),
            Assertion::IsIsset => "isset".to_string(),
            Assertion::IsNotIsset => "!isset".to_string(),
            Assertion::ArrayKeyExists => "array-key-exists".to_string(),
            Assertion::ArrayKeyDoesNotExist => "!array-key-exists".to_string(),
            Assertion::HasArrayKey(key) => format!("has-array-key-{}", key.to_string()),
            Assertion::DoesNotHaveArrayKey(key) => {
                format!("!has-array-key-{}", key.to_string())
            }
            Assertion::InArray(union) => format!("in-array-{}", union.get_id()),
            Assertion::NotInArray(union) => format!("!in-array-{}", union.get_id()),
            Assertion::HasMethod(name) => format!("hasmethod-{}", name),
            Assertion::DoesNotHaveMethod(name) => format!("!hasmethod-{}", name),
            Assertion::NonEmptyCountable(_) => "non-empty-countable".to_string(),
            Assertion::EmptyCountable => "!non-empty-countable".to_string(),
            Assertion::HasAtLeastCount(count) => format!("has-at-least-{}", count),
            Assertion::DoesNotHaveAtLeastCount(count) => format!("!has-at-least-{}", count),
            Assertion::HasExactCount(count) => format!("has-exactly-{}", count),
            Assertion::DoesNotHaveExactCount(count) => format!("!has-exactly-{}", count),
        }
    }

    pub fn has_negation(&self) -> bool {
        matches!(
            self,
            Assertion::Falsy
                | Assertion::IsNotType(_)
                | Assertion::IsNotEqual(_)
                | Assertion::IsNotLooselyEqual(_)
                | Assertion::IsNotIsset
                | Assertion::ArrayKeyDoesNotExist
                | Assertion::DoesNotHaveArrayKey(_)
                | Assertion::NotInArray(_)
                | Assertion::DoesNotHaveMethod(_)
                | Assertion::EmptyCountable
                | Assertion::DoesNotHaveAtLeastCount(_)
                | Assertion::DoesNotHaveExactCount(_)
        )
    }

    pub fn has_isset(&self) -> bool {
        matches!(
            self,
            Assertion::IsIsset
                | Assertion::IsEqualIsset
                | Assertion::ArrayKeyExists
                | Assertion::HasArrayKey(_)
        )
    }

    pub fn has_equality(&self) -> bool {
        matches!(
            self,
            Assertion::IsEqual(_)
                | Assertion::IsNotEqual(_)
                | Assertion::IsLooselyEqual(_)
                | Assertion::IsNotLooselyEqual(_)
                | Assertion::IsEqualIsset
        )
    }

    pub fn has_literal_string_or_int(&self) -> bool {
        match self {
            Assertion::IsEqual(atomic)
            | Assertion::IsNotEqual(atomic)
            | Assertion::IsLooselyEqual(atomic)
            | Assertion::IsNotLooselyEqual(atomic) => matches!(
                atomic,
                TAtomic::TLiteralInt { .. }
                    | TAtomic::TLiteralString { .. }
                    | TAtomic::TLiteralFloat { .. }
                    | TAtomic::TLiteralClassString { .. }
            ),
            _ => false,
        }
    }

    pub fn get_type(&self) -> Option<&TAtomic> {
        match self {
            Assertion::IsType(atomic)
            | Assertion::IsNotType(atomic)
            | Assertion::IsEqual(atomic)
            | Assertion::IsNotEqual(atomic)
            | Assertion::IsLooselyEqual(atomic)
            | Assertion::IsNotLooselyEqual(atomic) => Some(atomic),
            _ => None,
        }
    }

    pub fn get_negation(&self) -> Assertion {
        match self {
            Assertion::Any => Assertion::Any,
            Assertion::Falsy => Assertion::Truthy,
            Assertion::Truthy => Assertion::Falsy,
            Assertion::IsType(atomic) => Assertion::IsNotType(atomic.clone()),
            Assertion::IsNotType(atomic) => Assertion::IsType(atomic.clone()),
            Assertion::IsEqual(atomic) => Assertion::IsNotEqual(atomic.clone()),
            Assertion::IsNotEqual(atomic) => Assertion::IsEqual(atomic.clone()),
            Assertion::IsLooselyEqual(atomic) => Assertion::IsNotLooselyEqual(atomic.clone()),
            Assertion::IsNotLooselyEqual(atomic) => Assertion::IsLooselyEqual(atomic.clone()),
            Assertion::IsEqualIsset => Assertion::Any,
            Assertion::IsIsset => Assertion::IsNotIsset,
            Assertion::IsNotIsset => Assertion::IsIsset,
            Assertion::ArrayKeyExists => Assertion::ArrayKeyDoesNotExist,
            Assertion::ArrayKeyDoesNotExist => Assertion::ArrayKeyExists,
            Assertion::HasArrayKey(key) => Assertion::DoesNotHaveArrayKey(key.clone()),
            Assertion::DoesNotHaveArrayKey(key) => Assertion::HasArrayKey(key.clone()),
            Assertion::InArray(union) => Assertion::NotInArray(union.clone()),
            Assertion::NotInArray(union) => Assertion::InArray(union.clone()),
            Assertion::HasMethod(name) => Assertion::DoesNotHaveMethod(name.clone()),
            Assertion::DoesNotHaveMethod(name) => Assertion::HasMethod(name.clone()),
            Assertion::NonEmptyCountable(negatable) => {
                if *negatable {
                    Assertion::EmptyCountable
                } else {
                    Assertion::Any
                }
            }
            Assertion::EmptyCountable => Assertion::NonEmptyCountable(true),
            Assertion::HasAtLeastCount(count) => Assertion::DoesNotHaveAtLeastCount(*count),
            Assertion::DoesNotHaveAtLeastCount(count) => Assertion::HasAtLeastCount(*count),
            Assertion::HasExactCount(count) => Assertion::DoesNotHaveExactCount(*count),
            Assertion::DoesNotHaveExactCount(count) => Assertion::HasExactCount(*count),
        }
    }

    pub fn is_negation_of(&self, other: &Assertion) -> bool {
        self.get_negation().to_string() == other.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_round_trips() {
        let assertions = vec![
            Assertion::Truthy,
            Assertion::IsType(TAtomic::TInt),
            Assertion::IsEqual(TAtomic::TLiteralInt { value: 5 }),
            Assertion::IsIsset,
            Assertion::HasArrayKey(ArrayKey::String("a".to_string())),
            Assertion::HasExactCount(3),
        ];

        for assertion in assertions {
            assert!(assertion.is_negation_of(&assertion.get_negation()));
            assert_eq!(
                assertion.get_negation().get_negation().to_string(),
                assertion.to_string()
            );
        }
    }

    #[test]
    fn equality_classification() {
        assert!(Assertion::IsEqual(TAtomic::TLiteralInt { value: 5 }).has_equality());
        assert!(Assertion::IsNotLooselyEqual(TAtomic::TLiteralInt { value: 5 }).has_equality());
        assert!(!Assertion::IsType(TAtomic::TInt).has_equality());
        assert!(
            Assertion::IsEqual(TAtomic::TLiteralString {
                value: "foo".to_string()
            })
            .has_literal_string_or_int()
        );
    }

    #[test]
    fn negated_assertions_report_negation() {
        assert!(Assertion::Falsy.has_negation());
        assert!(Assertion::IsNotType(TAtomic::TInt).has_negation());
        assert!(!Assertion::Truthy.has_negation());
        assert!(!Assertion::IsType(TAtomic::TInt).has_negation());
    }
}
