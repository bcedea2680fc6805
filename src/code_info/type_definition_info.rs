use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::t_union::TUnion;

/// A named type alias (`@psalm-type Foo = array{...}`), expanded on demand.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDefinitionInfo {
    pub actual_type: TUnion,

    /// Template parameter definitions in declaration order:
    /// param name → (defining entity, upper bound).
    pub template_types: IndexMap<String, (String, TUnion)>,
}
