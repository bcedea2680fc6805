use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::code_location::HPos;

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum IssueKind {
    DocblockTypeContradiction,
    InvalidDocblock,
    ParadoxicalCondition,
    RedundantCondition,
    TypeDoesNotContainNull,
    TypeDoesNotContainType,
}

/// A user-facing diagnostic. `old_type`/`new_type` carry the machine-readable
/// before/after pair for tooling; `description` is the human-readable line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub description: String,
    pub pos: HPos,
    pub old_type: Option<String>,
    pub new_type: Option<String>,
}

impl Issue {
    pub fn new(kind: IssueKind, description: String, pos: HPos) -> Self {
        Self {
            kind,
            description,
            pos,
            old_type: None,
            new_type: None,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "ERROR: {} - {}:{}:{} - {}",
            self.kind, self.pos.file_path.0, self.pos.start_line, self.pos.start_column,
            self.description
        )
    }
}

/// Collects issues for one analysis scope. Suppression lists map issue names
/// to the count of times they were suppressed, so hosts can flag unused
/// suppressions.
#[derive(Debug, Default)]
pub struct IssueBuffer {
    pub issues: Vec<Issue>,
}

impl IssueBuffer {
    pub fn new() -> Self {
        Self { issues: vec![] }
    }

    pub fn maybe_add_issue(&mut self, issue: Issue, suppressed_issues: &FxHashMap<String, usize>) {
        if suppressed_issues.contains_key(&issue.kind.to_string()) {
            return;
        }

        self.issues.push(issue);
    }

    pub fn has_issue_kind(&self, kind: &IssueKind) -> bool {
        self.issues.iter().any(|issue| &issue.kind == kind)
    }

    pub fn take_issues(&mut self) -> Vec<Issue> {
        std::mem::take(&mut self.issues)
    }
}
