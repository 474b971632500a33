use crate::filter::KindFilter;
use crate::{Check, CheckStatus, StatusKindCounts};
use std::collections::BTreeMap;

/// Fully loaded report for one source file.
///
/// Checks are kept in rendering order (by line, and within a line by status
/// descending, so errors come first); `line_checks` is the index from a line
/// number to the positions of its checks.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_id: i64,
    pub path: String,
    pub source: Vec<String>,
    pub checks: Vec<Check>,
    pub functions: BTreeMap<i64, String>,
    pub call_contexts: BTreeMap<i64, String>,
    line_checks: BTreeMap<u32, Vec<usize>>,
}

impl FileReport {
    pub fn new(
        file_id: i64,
        path: String,
        source: &str,
        checks: Vec<Check>,
        functions: BTreeMap<i64, String>,
        call_contexts: BTreeMap<i64, String>,
    ) -> Self {
        let mut line_checks: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, check) in checks.iter().enumerate() {
            line_checks.entry(check.line).or_default().push(i);
        }
        Self {
            file_id,
            path,
            source: source.lines().map(str::to_owned).collect(),
            checks,
            functions,
            call_contexts,
            line_checks,
        }
    }

    /// Indices into `checks` for one source line.
    pub fn checks_on_line(&self, line: u32) -> &[usize] {
        self.line_checks
            .get(&line)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Overall status of a source line: the worst status of its checks, with
    /// errors outranking warnings outranking dead code outranking ok.
    /// Lines without checks have no status.
    pub fn line_status(&self, line: u32) -> Option<CheckStatus> {
        let indices = self.line_checks.get(&line)?;
        let mut counts = [0usize; 4];
        for &i in indices {
            counts[self.checks[i].status.code() as usize] += 1;
        }
        if counts[CheckStatus::Error.code() as usize] > 0 {
            Some(CheckStatus::Error)
        } else if counts[CheckStatus::Warning.code() as usize] > 0 {
            Some(CheckStatus::Warning)
        } else if counts[CheckStatus::Unreachable.code() as usize] > 0 {
            Some(CheckStatus::Unreachable)
        } else {
            Some(CheckStatus::Ok)
        }
    }

    /// `(line, status)` for every line that has checks, in document order.
    pub fn line_statuses(&self) -> Vec<(u32, CheckStatus)> {
        self.line_checks
            .keys()
            .filter_map(|&line| self.line_status(line).map(|status| (line, status)))
            .collect()
    }

    /// Modal text listing every call context of a check, order preserved.
    ///
    /// The empty context is the program entry point and is rendered with the
    /// function's name instead.
    pub fn call_context_text(&self, check: &Check) -> String {
        let function_name = self
            .functions
            .get(&check.function_id)
            .map(String::as_str)
            .unwrap_or("?");

        let mut message = String::new();
        for (i, id) in check.call_context_ids.iter().enumerate() {
            let context = self
                .call_contexts
                .get(id)
                .map(String::as_str)
                .unwrap_or("");
            if i > 0 {
                message.push('\n');
            }
            if context.is_empty() {
                message.push_str(&format!("Called from entry point '{}'\n", function_name));
            } else {
                message.push_str(&format!("Called from:\n{}\n", context));
            }
        }
        message
    }
}

/// Display header of a check: `<line>:<column>: ` with `?` for an unknown
/// column.
pub fn check_header(check: &Check) -> String {
    match check.column {
        Some(column) => format!("{}:{}: ", check.line, column),
        None => format!("{}:?: ", check.line),
    }
}

/// Message body of a check, laid out to sit after its header: embedded
/// newlines are re-indented to align under the header, then tabs are expanded
/// to four spaces.
pub fn check_message(check: &Check) -> String {
    let header = check_header(check);
    let continuation = format!("\n{}\t", " ".repeat(header.len()));
    check.message.replace('\n', &continuation).replace('\t', "    ")
}

/// Counts for one file after applying the kind filter (overview rows).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilteredCounts {
    pub ok: u64,
    pub warning: u64,
    pub error: u64,
    pub unreachable: u64,
}

impl FilteredCounts {
    /// Sum the per-kind counts of every status, keeping only enabled kinds.
    pub fn compute(counts: &StatusKindCounts, filter: &KindFilter) -> Self {
        let sum = |status: CheckStatus| {
            counts
                .for_status(status)
                .iter()
                .filter(|&(&kind, _)| filter.enabled(kind))
                .map(|(_, &count)| count)
                .sum()
        };
        Self {
            ok: sum(CheckStatus::Ok),
            warning: sum(CheckStatus::Warning),
            error: sum(CheckStatus::Error),
            unreachable: sum(CheckStatus::Unreachable),
        }
    }

    /// A file is safe when nothing but ok findings remain after filtering.
    /// A nonzero ok count is still safe: findings with no issues are fine.
    pub fn is_safe(&self) -> bool {
        self.warning == 0 && self.error == 0 && self.unreachable == 0
    }
}
