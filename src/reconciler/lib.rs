pub mod assertion_reconciler;
pub mod negated_assertion_reconciler;
pub mod simple_assertion_reconciler;
pub mod simple_negated_assertion_reconciler;

use phlint_code_info::assertion::Assertion;
use phlint_code_info::code_location::HPos;
use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::issue::{Issue, IssueBuffer, IssueKind};
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;
use phlint_logger::Logger;
use rustc_hash::FxHashMap;

/// How applying an assertion to a type worked out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconciliationStatus {
    Ok,

    /// The assertion can never hold for the existing type, but narrowing
    /// still kept members. Diagnostics have been buffered where a position
    /// was available.
    Contradiction,

    /// Narrowing emptied the type. The returned value is `nothing`, or
    /// `mixed` when the emptied type came from a docblock.
    Failed,
}

/// The narrowed type together with its reconciliation outcome.
#[derive(Debug)]
pub struct ReconciledType {
    pub value: TUnion,
    pub status: ReconciliationStatus,
}

/// State shared across one reconciliation pass: class hierarchy answers,
/// buffered diagnostics, and debug logging.
pub struct ReconciliationContext<'a> {
    pub codebase: Option<&'a CodebaseInfo>,
    pub logger: Logger,
    pub issues: IssueBuffer,

    pub(crate) status: ReconciliationStatus,
}

impl<'a> ReconciliationContext<'a> {
    pub fn new(codebase: Option<&'a CodebaseInfo>) -> Self {
        Self {
            codebase,
            logger: Logger::DevNull,
            issues: IssueBuffer::new(),
            status: ReconciliationStatus::Ok,
        }
    }

    pub fn with_logger(codebase: Option<&'a CodebaseInfo>, logger: Logger) -> Self {
        Self {
            codebase,
            logger,
            issues: IssueBuffer::new(),
            status: ReconciliationStatus::Ok,
        }
    }
}

/// Reports that an assertion is either impossible for the existing type or
/// always true of it, and marks the pass contradictory in the former case.
pub(crate) fn trigger_issue_for_impossible(
    ctx: &mut ReconciliationContext,
    existing_var_type: &TUnion,
    old_var_type_string: &str,
    key: &str,
    assertion: &Assertion,
    redundant: bool,
    negated: bool,
    pos: &HPos,
    suppressed_issues: &FxHashMap<String, usize>,
) {
    let mut assertion_string = assertion.to_string();
    let mut not = assertion_string.starts_with('!');

    if not {
        assertion_string = assertion_string[1..].to_string();
    }

    if negated {
        not = !not;
    }

    let (kind, description) = if redundant {
        (
            if existing_var_type.from_docblock {
                IssueKind::DocblockTypeContradiction
            } else {
                IssueKind::RedundantCondition
            },
            format!(
                "Type {} for {} is {} {}",
                old_var_type_string,
                key,
                if not { "never" } else { "always" },
                assertion_string
            ),
        )
    } else {
        ctx.status = ReconciliationStatus::Contradiction;

        (
            if matches!(assertion.get_type(), Some(TAtomic::TNull)) && !not {
                IssueKind::TypeDoesNotContainNull
            } else if existing_var_type.from_docblock {
                IssueKind::DocblockTypeContradiction
            } else if negated {
                IssueKind::ParadoxicalCondition
            } else {
                IssueKind::TypeDoesNotContainType
            },
            format!(
                "Type {} for {} is {} {}",
                old_var_type_string,
                key,
                if not { "always" } else { "never" },
                assertion_string
            ),
        )
    };

    ctx.logger.log_debug(&description);

    let mut issue = Issue::new(kind, description, pos.clone());
    issue.old_type = Some(old_var_type_string.to_string());
    issue.new_type = Some(assertion_string);

    ctx.issues.maybe_add_issue(issue, suppressed_issues);
}

/// Finishes a narrowing pass: either the kept members become the new type, or
/// nothing was kept and the narrowed type collapses, with diagnostics when
/// the pass also proved the assertion impossible or redundant.
#[allow(clippy::too_many_arguments)]
pub(crate) fn get_acceptable_type(
    acceptable_types: Vec<TAtomic>,
    did_remove_type: bool,
    assertion: &Assertion,
    existing_var_type: &TUnion,
    key: Option<&String>,
    pos: Option<&HPos>,
    can_report_issues: bool,
    negated: bool,
    suppressed_issues: &FxHashMap<String, usize>,
    ctx: &mut ReconciliationContext,
) -> TUnion {
    if acceptable_types.is_empty() || !did_remove_type {
        if let (Some(key), Some(pos)) = (key, pos) {
            if can_report_issues {
                trigger_issue_for_impossible(
                    ctx,
                    existing_var_type,
                    &existing_var_type.get_id(),
                    key,
                    assertion,
                    !did_remove_type,
                    negated,
                    pos,
                    suppressed_issues,
                );
            }
        }

        if acceptable_types.is_empty() {
            return phlint_type::get_nothing();
        }
    }

    let mut new_var_type = existing_var_type.clone();
    new_var_type.types = TUnion::new(acceptable_types).types;
    new_var_type
}
