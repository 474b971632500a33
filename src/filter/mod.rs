use crate::{Check, CheckKind, CheckStatus};
use std::collections::{BTreeMap, BTreeSet};

/// Per-kind inclusion filter, shared by the overview and the report view.
///
/// The enabled set round-trips through a compact hex mask (the `--kinds` flag,
/// originally a URL query parameter) so a filter choice can be restored on the
/// next invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFilter {
    entries: BTreeMap<u32, bool>,
}

impl KindFilter {
    /// Build a filter over the given catalog with every kind enabled.
    pub fn all_enabled(kinds: &[CheckKind]) -> Self {
        Self {
            entries: kinds.iter().map(|kind| (kind.id, true)).collect(),
        }
    }

    /// Build a filter over the catalog, optionally restoring state from a mask.
    pub fn from_mask(kinds: &[CheckKind], mask: Option<&str>) -> Self {
        let mut filter = Self::all_enabled(kinds);
        if let Some(mask) = mask {
            filter.apply_mask(mask);
        }
        filter
    }

    pub fn enabled(&self, id: u32) -> bool {
        self.entries.get(&id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: u32, enabled: bool) {
        self.entries.insert(id, enabled);
    }

    pub fn toggle(&mut self, id: u32) -> bool {
        let enabled = !self.enabled(id);
        self.set(id, enabled);
        enabled
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        self.entries.iter().map(|(&id, &enabled)| (id, enabled))
    }

    /// Encode the enabled set as an uppercase hex mask.
    ///
    /// Bit `id % 8` of byte `id / 8` is set for every enabled kind; bytes are
    /// rendered as two hex digits each, byte 0 first. The result depends only
    /// on the filter content, never on iteration order. An empty catalog
    /// encodes to the empty string.
    pub fn encode(&self) -> String {
        let Some(&max_kind) = self.entries.keys().next_back() else {
            return String::new();
        };

        let mut bytes = vec![0u8; max_kind as usize / 8 + 1];
        for (&id, &enabled) in &self.entries {
            if enabled {
                bytes[id as usize / 8] |= 1 << (id % 8);
            }
        }

        let mut mask = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            mask.push_str(&format!("{:02X}", byte));
        }
        mask
    }

    /// Restore filter state from a hex mask.
    ///
    /// Kinds whose byte lies beyond the end of the mask keep their current
    /// value. A malformed mask is ignored entirely; restoring state from a
    /// user-supplied string must never fail.
    pub fn apply_mask(&mut self, mask: &str) {
        let Some(bytes) = parse_mask(mask) else {
            return;
        };
        for (&id, enabled) in self.entries.iter_mut() {
            if let Some(&byte) = bytes.get(id as usize / 8) {
                *enabled = byte & (1 << (id % 8)) != 0;
            }
        }
    }
}

/// Parse a hex mask into bytes. Returns None if empty or malformed.
fn parse_mask(mask: &str) -> Option<Vec<u8>> {
    if mask.is_empty() {
        return None;
    }
    mask.as_bytes()
        .chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(digits, 16).ok()
        })
        .collect()
}

/// Per-status inclusion filter, local to one report view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFilter {
    enabled: [bool; 4],
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self { enabled: [true; 4] }
    }
}

impl StatusFilter {
    pub fn enabled(&self, status: CheckStatus) -> bool {
        self.enabled[status.code() as usize]
    }

    pub fn set(&mut self, status: CheckStatus, enabled: bool) {
        self.enabled[status.code() as usize] = enabled;
    }

    pub fn toggle(&mut self, status: CheckStatus) -> bool {
        let enabled = !self.enabled(status);
        self.set(status, enabled);
        enabled
    }
}

/// Hide flags for one rendered check.
///
/// The kind filter and the status filter each own one flag; the check is
/// visible iff neither is set. Toggling one filter never touches the other
/// filter's flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HideFlags {
    pub kind_hidden: bool,
    pub status_hidden: bool,
}

impl HideFlags {
    pub fn visible(self) -> bool {
        !(self.kind_hidden || self.status_hidden)
    }
}

/// Visibility side table for a report's checks.
///
/// Holds one `HideFlags` entry per check (parallel to the report's check list)
/// and a derived hidden flag per checks box (one box per source line that has
/// checks). Domain records stay in the report model; this table carries only
/// presentation state.
#[derive(Debug, Clone)]
pub struct Visibility {
    flags: Vec<HideFlags>,
    box_hidden: BTreeMap<u32, bool>,
}

impl Visibility {
    /// Everything visible; one box per line that has checks.
    pub fn new(checks: &[Check]) -> Self {
        let box_hidden = checks.iter().map(|check| (check.line, false)).collect();
        Self {
            flags: vec![HideFlags::default(); checks.len()],
            box_hidden,
        }
    }

    /// Apply a synthetic toggle for every filter entry that starts disabled,
    /// so the initial rendering matches stored preferences without waiting
    /// for user interaction.
    pub fn apply_initial(
        &mut self,
        checks: &[Check],
        kinds: &KindFilter,
        statuses: &StatusFilter,
    ) {
        for (kind, enabled) in kinds.iter() {
            if !enabled {
                self.set_kind(checks, kind, false);
            }
        }
        for status in CheckStatus::ALL {
            if !statuses.enabled(status) {
                self.set_status(checks, status, false);
            }
        }
    }

    /// Show or hide every check of the given kind, then refresh the boxes of
    /// the affected lines.
    pub fn set_kind(&mut self, checks: &[Check], kind: u32, enabled: bool) {
        let mut touched = BTreeSet::new();
        for (i, check) in checks.iter().enumerate() {
            if check.kind == kind {
                self.flags[i].kind_hidden = !enabled;
                touched.insert(check.line);
            }
        }
        self.update_boxes(checks, &touched);
    }

    /// Show or hide every check of the given status, then refresh the boxes
    /// of the affected lines.
    pub fn set_status(&mut self, checks: &[Check], status: CheckStatus, enabled: bool) {
        let mut touched = BTreeSet::new();
        for (i, check) in checks.iter().enumerate() {
            if check.status == status {
                self.flags[i].status_hidden = !enabled;
                touched.insert(check.line);
            }
        }
        self.update_boxes(checks, &touched);
    }

    /// Manual expand/collapse of one line's checks box.
    ///
    /// Expanding also clears both hide flags on every check of that line: the
    /// user asked to see this line's checks, overriding the filters for that
    /// line only.
    pub fn toggle_line(&mut self, checks: &[Check], line: u32) {
        let hidden = self.box_hidden.get(&line).copied().unwrap_or(false);
        if hidden {
            self.box_hidden.insert(line, false);
            for (i, check) in checks.iter().enumerate() {
                if check.line == line {
                    self.flags[i] = HideFlags::default();
                }
            }
        } else {
            self.box_hidden.insert(line, true);
        }
    }

    pub fn check_visible(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or_default().visible()
    }

    pub fn flags(&self, index: usize) -> HideFlags {
        self.flags.get(index).copied().unwrap_or_default()
    }

    pub fn box_visible(&self, line: u32) -> bool {
        !self.box_hidden.get(&line).copied().unwrap_or(false)
    }

    /// Refresh the boxes of the given (already deduplicated) lines: a box is
    /// hidden iff every check it contains is hidden.
    fn update_boxes(&mut self, checks: &[Check], lines: &BTreeSet<u32>) {
        for &line in lines {
            let mut total = 0usize;
            let mut hidden = 0usize;
            for (i, check) in checks.iter().enumerate() {
                if check.line == line {
                    total += 1;
                    if !self.flags[i].visible() {
                        hidden += 1;
                    }
                }
            }
            self.box_hidden.insert(line, total > 0 && hidden == total);
        }
    }
}
