use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilePath(pub String);

/// A half-open source span, used to attribute diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HPos {
    pub file_path: FilePath,
    pub start_offset: u32,
    pub end_offset: u32,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u16,
    pub end_column: u16,
}

impl HPos {
    pub fn new(file_path: &str, start_line: u32, start_column: u16) -> HPos {
        HPos {
            file_path: FilePath(file_path.to_string()),
            start_offset: 0,
            end_offset: 0,
            start_line,
            end_line: start_line,
            start_column,
            end_column: start_column,
        }
    }
}
