use crate::CheckStatus;

/// Status categories the navigator can step through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCategory {
    Error,
    Warning,
    Deadcode,
}

impl NavCategory {
    pub const ALL: [NavCategory; 3] = [
        NavCategory::Error,
        NavCategory::Warning,
        NavCategory::Deadcode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NavCategory::Error => "error",
            NavCategory::Warning => "warning",
            NavCategory::Deadcode => "dead code",
        }
    }

    fn matches(self, status: CheckStatus) -> bool {
        match self {
            NavCategory::Error => status == CheckStatus::Error,
            NavCategory::Warning => status == CheckStatus::Warning,
            NavCategory::Deadcode => status == CheckStatus::Unreachable,
        }
    }
}

/// One cursor over the fixed, document-ordered list of lines matching a
/// status category.
///
/// `current` starts at -1 ("before first"). The line list is computed once at
/// initialization and never re-sorted on filter changes.
#[derive(Debug, Clone)]
pub struct Navigator {
    lines: Vec<u32>,
    current: i32,
}

impl Navigator {
    pub fn new(lines: Vec<u32>) -> Self {
        Self { lines, current: -1 }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn next_enabled(&self) -> bool {
        self.current < self.lines.len() as i32 - 1
    }

    pub fn prev_enabled(&self) -> bool {
        self.current > 0
    }

    /// Line number the next press would jump to, if enabled.
    pub fn next_target(&self) -> Option<u32> {
        self.next_enabled()
            .then(|| self.lines[(self.current + 1) as usize])
    }

    /// Line number the previous press would jump to, if enabled.
    pub fn prev_target(&self) -> Option<u32> {
        self.prev_enabled()
            .then(|| self.lines[(self.current - 1) as usize])
    }

    /// Move the cursor by +1 or -1 and return the target line.
    ///
    /// Returns None (without moving) when the move is disabled.
    pub fn step(&mut self, direction: i32) -> Option<u32> {
        if direction > 0 && !self.next_enabled() {
            return None;
        }
        if direction < 0 && !self.prev_enabled() {
            return None;
        }
        self.current += direction;
        Some(self.lines[self.current as usize])
    }

    /// Back to the unset position. Does not touch scroll state.
    pub fn reset(&mut self) {
        self.current = -1;
    }
}

/// The three independent navigators of a report view.
#[derive(Debug, Clone)]
pub struct NavigatorSet {
    pub error: Navigator,
    pub warning: Navigator,
    pub deadcode: Navigator,
}

impl NavigatorSet {
    /// Build from `(line, status)` pairs in document order.
    pub fn new(line_statuses: &[(u32, CheckStatus)]) -> Self {
        let collect = |category: NavCategory| {
            Navigator::new(
                line_statuses
                    .iter()
                    .filter(|&&(_, status)| category.matches(status))
                    .map(|&(line, _)| line)
                    .collect(),
            )
        };
        Self {
            error: collect(NavCategory::Error),
            warning: collect(NavCategory::Warning),
            deadcode: collect(NavCategory::Deadcode),
        }
    }

    pub fn get(&self, category: NavCategory) -> &Navigator {
        match category {
            NavCategory::Error => &self.error,
            NavCategory::Warning => &self.warning,
            NavCategory::Deadcode => &self.deadcode,
        }
    }

    pub fn get_mut(&mut self, category: NavCategory) -> &mut Navigator {
        match category {
            NavCategory::Error => &mut self.error,
            NavCategory::Warning => &mut self.warning,
            NavCategory::Deadcode => &mut self.deadcode,
        }
    }

    /// Reset all three cursors to the unset position.
    pub fn reset_all(&mut self) {
        self.error.reset();
        self.warning.reset();
        self.deadcode.reset();
    }
}
