use serde::{Deserialize, Serialize};

use crate::t_union::TUnion;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FnParameter {
    pub signature_type: Option<Box<TUnion>>,
    pub is_optional: bool,
    pub is_variadic: bool,
}
