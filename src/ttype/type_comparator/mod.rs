pub mod array_type_comparator;
pub mod atomic_type_comparator;
pub mod object_type_comparator;
pub mod scalar_type_comparator;
pub mod union_type_comparator;

use phlint_code_info::t_atomic::TAtomic;

/// Carries side-channel facts discovered while checking containment, most
/// importantly whether the input only fits the container after coercion.
#[derive(Debug, Default)]
pub struct TypeComparisonResult {
    pub type_coerced: Option<bool>,
    pub type_coerced_from_nested_mixed: Option<bool>,

    /// A narrower atomic the caller should use in place of the container,
    /// e.g. a template param whose bound was refined.
    pub replacement_atomic_type: Option<TAtomic>,
}

impl TypeComparisonResult {
    pub fn new() -> Self {
        Self::default()
    }
}
