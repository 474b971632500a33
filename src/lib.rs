pub mod cli;
pub mod db;
pub mod filter;
pub mod highlight;
pub mod navigator;
pub mod report;
pub mod tui;

use std::collections::BTreeMap;

/// Severity of a single analyzer finding.
///
/// The numeric codes match the analyzer's output database (0..3);
/// `Unreachable` marks dead code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
    Unreachable,
}

impl CheckStatus {
    pub const ALL: [CheckStatus; 4] = [
        CheckStatus::Ok,
        CheckStatus::Warning,
        CheckStatus::Error,
        CheckStatus::Unreachable,
    ];

    /// Numeric code used in the results database.
    pub fn code(self) -> u8 {
        match self {
            CheckStatus::Ok => 0,
            CheckStatus::Warning => 1,
            CheckStatus::Error => 2,
            CheckStatus::Unreachable => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<CheckStatus> {
        match code {
            0 => Some(CheckStatus::Ok),
            1 => Some(CheckStatus::Warning),
            2 => Some(CheckStatus::Error),
            3 => Some(CheckStatus::Unreachable),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
            CheckStatus::Unreachable => "dead code",
        }
    }
}

/// A named category of analysis rule (e.g. null-dereference, buffer-overflow).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckKind {
    pub id: u32,
    pub name: String,
}

/// A single finding emitted by the analyzer at a source location.
#[derive(Debug, Clone)]
pub struct Check {
    pub kind: u32,
    pub status: CheckStatus,
    pub line: u32,
    /// Column within the line; the analyzer does not always know it.
    pub column: Option<u32>,
    pub message: String,
    pub function_id: i64,
    /// Call paths by which the checked code was reached, order preserved.
    pub call_context_ids: Vec<i64>,
}

/// Per-status maps from check kind id to finding count for one file.
#[derive(Debug, Clone, Default)]
pub struct StatusKindCounts {
    pub ok: BTreeMap<u32, u64>,
    pub warning: BTreeMap<u32, u64>,
    pub error: BTreeMap<u32, u64>,
    pub unreachable: BTreeMap<u32, u64>,
}

impl StatusKindCounts {
    pub fn for_status(&self, status: CheckStatus) -> &BTreeMap<u32, u64> {
        match status {
            CheckStatus::Ok => &self.ok,
            CheckStatus::Warning => &self.warning,
            CheckStatus::Error => &self.error,
            CheckStatus::Unreachable => &self.unreachable,
        }
    }

    pub fn record(&mut self, status: CheckStatus, kind: u32, count: u64) {
        let map = match status {
            CheckStatus::Ok => &mut self.ok,
            CheckStatus::Warning => &mut self.warning,
            CheckStatus::Error => &mut self.error,
            CheckStatus::Unreachable => &mut self.unreachable,
        };
        *map.entry(kind).or_insert(0) += count;
    }
}

/// One analyzed file on the overview screen.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: i64,
    pub path: String,
    pub status_kinds: StatusKindCounts,
}
