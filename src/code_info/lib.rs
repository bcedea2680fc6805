pub mod assertion;
pub mod classlike_info;
pub mod code_location;
pub mod codebase_info;
pub mod functionlike_parameter;
pub mod issue;
pub mod t_atomic;
pub mod t_union;
pub mod type_definition_info;
