use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::db::ResultsDb;
use crate::filter::{KindFilter, StatusFilter, Visibility};
use crate::navigator::{NavCategory, NavigatorSet};
use crate::report::{self, FileReport, FilteredCounts};
use crate::{CheckKind, CheckStatus, FileEntry};

/// How long a jumped-to line keeps its highlight. The timestamp is scoped to
/// the line it was set for; a newer jump simply replaces it (last one wins).
const HIGHLIGHT_DURATION: Duration = Duration::from_millis(100);

/// View mode for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    FileList,
    Report,
}

/// Which panel owns key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Main,
    Kinds,
}

/// The shared call-contexts modal.
struct Modal {
    content: String,
}

/// Screen geometry of the rendered modal, for mouse hit testing.
#[derive(Debug, Clone, Copy)]
struct ModalLayout {
    window: Rect,
    close: Rect,
}

/// Per-report state: the loaded report plus all derived view state.
struct ReportPage {
    report: FileReport,
    visibility: Visibility,
    navigators: NavigatorSet,
    status_filter: StatusFilter,
    /// Cursor over source lines (0-based).
    cursor: usize,
    /// Selected check within the cursor line.
    selected_check: usize,
    /// Row offset into the rendered report body.
    scroll: u16,
    /// Navigator jump target; resolved to a row offset at render time.
    pending_top_line: Option<u32>,
    highlight: Option<(u32, Instant)>,
    /// Row index of each source line in the last rendered body.
    line_rows: Vec<u16>,
}

/// Application state for the TUI.
pub struct App {
    db: ResultsDb,
    kinds: Vec<CheckKind>,
    kind_filter: KindFilter,
    files: Vec<FileEntry>,
    selected_file: usize,
    selected_kind: usize,
    view_mode: ViewMode,
    page: Option<ReportPage>,
    focus: Focus,
    highlighter: crate::highlight::Highlighter,
    modal: Option<Modal>,
    modal_layout: Option<ModalLayout>,
    should_quit: bool,
    show_help: bool,
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Load the catalog and file list and start on the file list view.
    ///
    /// `kinds_mask` restores a previously encoded kind filter.
    pub fn new(db: ResultsDb, kinds_mask: Option<&str>) -> Result<Self> {
        let kinds = db.check_kinds().context("Failed to load check kinds")?;
        let kind_filter = KindFilter::from_mask(&kinds, kinds_mask);
        let files = db.files().context("Failed to load file list")?;

        Ok(Self {
            db,
            kinds,
            kind_filter,
            files,
            selected_file: 0,
            selected_kind: 0,
            view_mode: ViewMode::FileList,
            page: None,
            focus: Focus::Main,
            highlighter: crate::highlight::Highlighter::new(),
            modal: None,
            modal_layout: None,
            should_quit: false,
            show_help: false,
            status_message: None,
        })
    }

    /// Open the report view for one file.
    ///
    /// Loads the checks from the database and the source text from disk, then
    /// applies the stored filters as initial synthetic toggles so the first
    /// rendering already matches them.
    pub fn open_report(&mut self, file_id: i64) -> Result<()> {
        let path = self
            .db
            .file_path(file_id)?
            .with_context(|| format!("no such file id: {}", file_id))?;
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("No such file: {}", path))?;
        let checks = self.db.checks(file_id)?;
        let functions = self.db.functions()?;
        let call_contexts = self.db.call_contexts()?;
        let report = FileReport::new(file_id, path, &source, checks, functions, call_contexts);

        let status_filter = StatusFilter::default();
        let mut visibility = Visibility::new(&report.checks);
        visibility.apply_initial(&report.checks, &self.kind_filter, &status_filter);
        let navigators = NavigatorSet::new(&report.line_statuses());

        self.page = Some(ReportPage {
            report,
            visibility,
            navigators,
            status_filter,
            cursor: 0,
            selected_check: 0,
            scroll: 0,
            pending_top_line: None,
            highlight: None,
            line_rows: Vec::new(),
        });
        self.view_mode = ViewMode::Report;
        self.focus = Focus::Main;
        Ok(())
    }

    /// Handle keyboard input, dispatching to the appropriate mode handler.
    fn handle_input(&mut self, key: event::KeyEvent) {
        // The modal swallows keys; Esc closes it (mouse close rules are
        // handled in handle_mouse).
        if self.modal.is_some() {
            if key.code == KeyCode::Esc {
                self.close_modal();
            }
            return;
        }

        if self.show_help {
            // Any key closes help
            self.show_help = false;
            return;
        }

        match self.view_mode {
            ViewMode::FileList => self.handle_file_list_input(key),
            ViewMode::Report => self.handle_report_input(key),
        }
    }

    /// Handle mouse input. Only the modal cares about the mouse: it closes on
    /// a backdrop click or on its close control, never on a click inside the
    /// content.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return;
        }
        if self.modal.is_some()
            && let Some(layout) = self.modal_layout
            && modal_click_closes(layout, Position::new(mouse.column, mouse.row))
        {
            self.close_modal();
        }
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.modal_layout = None;
    }

    /// Handle keyboard input on the file list.
    fn handle_file_list_input(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Tab => {
                self.toggle_focus();
            }
            KeyCode::Char('j') | KeyCode::Down => match self.focus {
                Focus::Main => {
                    if !self.files.is_empty() && self.selected_file < self.files.len() - 1 {
                        self.selected_file += 1;
                    }
                }
                Focus::Kinds => self.kind_cursor_down(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.focus {
                Focus::Main => {
                    self.selected_file = self.selected_file.saturating_sub(1);
                }
                Focus::Kinds => self.kind_cursor_up(),
            },
            KeyCode::Char(' ') => {
                if self.focus == Focus::Kinds {
                    self.toggle_selected_kind();
                }
            }
            KeyCode::Enter => {
                if self.focus == Focus::Main
                    && let Some(file) = self.files.get(self.selected_file)
                {
                    let id = file.id;
                    if let Err(e) = self.open_report(id) {
                        self.status_message = Some((format!("{:#}", e), Instant::now()));
                    }
                }
            }
            _ => {}
        }
    }

    /// Handle keyboard input on the report view.
    fn handle_report_input(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                // Back to the file list.
                self.page = None;
                self.view_mode = ViewMode::FileList;
                self.focus = Focus::Main;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Tab => {
                self.toggle_focus();
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_report(10);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_report(-10);
            }
            KeyCode::PageDown => {
                self.scroll_report(20);
            }
            KeyCode::PageUp => {
                self.scroll_report(-20);
            }
            KeyCode::Char('j') | KeyCode::Down => match self.focus {
                Focus::Main => self.cursor_down(),
                Focus::Kinds => self.kind_cursor_down(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.focus {
                Focus::Main => self.cursor_up(),
                Focus::Kinds => self.kind_cursor_up(),
            },
            KeyCode::Char(' ') => {
                if self.focus == Focus::Kinds {
                    self.toggle_selected_kind();
                }
            }
            KeyCode::Enter => {
                if self.focus == Focus::Main {
                    self.toggle_cursor_line_checks();
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.select_check(-1),
            KeyCode::Char('l') | KeyCode::Right => self.select_check(1),
            KeyCode::Char('c') => self.open_call_contexts(),
            KeyCode::Char('1') => self.toggle_status_filter(CheckStatus::Ok),
            KeyCode::Char('2') => self.toggle_status_filter(CheckStatus::Warning),
            KeyCode::Char('3') => self.toggle_status_filter(CheckStatus::Error),
            KeyCode::Char('4') => self.toggle_status_filter(CheckStatus::Unreachable),
            KeyCode::Char('n') => self.move_navigator(NavCategory::Error, 1),
            KeyCode::Char('N') => self.move_navigator(NavCategory::Error, -1),
            KeyCode::Char('m') => self.move_navigator(NavCategory::Warning, 1),
            KeyCode::Char('M') => self.move_navigator(NavCategory::Warning, -1),
            KeyCode::Char('b') => self.move_navigator(NavCategory::Deadcode, 1),
            KeyCode::Char('B') => self.move_navigator(NavCategory::Deadcode, -1),
            KeyCode::Char('R') => {
                if let Some(page) = &mut self.page {
                    // Buttons reflect the unset state on the next render;
                    // scroll position is left alone.
                    page.navigators.reset_all();
                }
            }
            _ => {}
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Main => Focus::Kinds,
            Focus::Kinds => Focus::Main,
        };
    }

    fn kind_cursor_down(&mut self) {
        if !self.kinds.is_empty() && self.selected_kind < self.kinds.len() - 1 {
            self.selected_kind += 1;
        }
    }

    fn kind_cursor_up(&mut self) {
        self.selected_kind = self.selected_kind.saturating_sub(1);
    }

    /// Flip the kind under the cursor in the stored filter and propagate the
    /// change to every check of that kind in the open report, if any. The
    /// file list recomputes its counts from the filter on every render.
    fn toggle_selected_kind(&mut self) {
        let Some(kind) = self.kinds.get(self.selected_kind) else {
            return;
        };
        let id = kind.id;
        let enabled = self.kind_filter.toggle(id);
        if let Some(page) = &mut self.page {
            page.visibility.set_kind(&page.report.checks, id, enabled);
        }
    }

    /// Flip a status filter; scoped to the open report.
    fn toggle_status_filter(&mut self, status: CheckStatus) {
        if let Some(page) = &mut self.page {
            let enabled = page.status_filter.toggle(status);
            page.visibility.set_status(&page.report.checks, status, enabled);
        }
    }

    fn cursor_down(&mut self) {
        if let Some(page) = &mut self.page
            && !page.report.source.is_empty()
            && page.cursor < page.report.source.len() - 1
        {
            page.cursor += 1;
            page.selected_check = 0;
        }
    }

    fn cursor_up(&mut self) {
        if let Some(page) = &mut self.page {
            page.cursor = page.cursor.saturating_sub(1);
            page.selected_check = 0;
        }
    }

    fn scroll_report(&mut self, delta: i32) {
        if let Some(page) = &mut self.page {
            page.scroll = if delta >= 0 {
                page.scroll.saturating_add(delta as u16)
            } else {
                page.scroll.saturating_sub((-delta) as u16)
            };
        }
    }

    /// Cycle the check selection within the cursor line.
    fn select_check(&mut self, delta: i32) {
        if let Some(page) = &mut self.page {
            let line = page.cursor as u32 + 1;
            let count = page.report.checks_on_line(line).len();
            if count == 0 {
                return;
            }
            let current = page.selected_check as i32;
            page.selected_check = (current + delta).rem_euclid(count as i32) as usize;
        }
    }

    /// Expand or collapse the checks box of the cursor line.
    fn toggle_cursor_line_checks(&mut self) {
        if let Some(page) = &mut self.page {
            let line = page.cursor as u32 + 1;
            if !page.report.checks_on_line(line).is_empty() {
                page.visibility.toggle_line(&page.report.checks, line);
            }
        }
    }

    /// Open the call-contexts modal for the selected check of the cursor line.
    fn open_call_contexts(&mut self) {
        let Some(page) = &self.page else {
            return;
        };
        let line = page.cursor as u32 + 1;
        let indices = page.report.checks_on_line(line);
        let Some(&check_idx) = indices.get(page.selected_check) else {
            return;
        };
        let check = &page.report.checks[check_idx];
        self.modal = Some(Modal {
            content: page.report.call_context_text(check),
        });
    }

    /// Step one navigator and jump to the target line: scroll it to the top
    /// edge, move the cursor there, and flash a transient highlight.
    fn move_navigator(&mut self, category: NavCategory, direction: i32) {
        let Some(page) = &mut self.page else {
            return;
        };
        if let Some(line) = page.navigators.get_mut(category).step(direction) {
            page.pending_top_line = Some(line);
            page.highlight = Some((line, Instant::now()));
            page.cursor = (line as usize).saturating_sub(1);
            page.selected_check = 0;
        }
    }

    /// Render the UI, dispatching to the appropriate mode renderer.
    fn render(&mut self, frame: &mut Frame) {
        // Expire old status messages
        let expired = self
            .status_message
            .as_ref()
            .map(|(_, time)| time.elapsed() >= Duration::from_secs(3))
            .unwrap_or(false);
        if expired {
            self.status_message = None;
        }

        // Expire the transient navigator highlight
        if let Some(page) = &mut self.page
            && let Some((_, since)) = page.highlight
            && since.elapsed() >= HIGHLIGHT_DURATION
        {
            page.highlight = None;
        }

        if self.show_help {
            self.render_help(frame);
            return;
        }

        match self.view_mode {
            ViewMode::FileList => self.render_file_list(frame),
            ViewMode::Report => self.render_report(frame),
        }

        // Draw the modal on top if open
        if self.modal.is_some() {
            self.render_modal(frame);
        } else {
            self.modal_layout = None;
        }
    }

    /// Render the file list view with the kinds panel.
    fn render_file_list(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(frame.area());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[0]);

        let items: Vec<ListItem> = self
            .files
            .iter()
            .enumerate()
            .map(|(idx, file)| {
                let filtered = FilteredCounts::compute(&file.status_kinds, &self.kind_filter);
                let (label, color) = if filtered.is_safe() {
                    (format!("{}  Safe", file.path), Color::Green)
                } else {
                    let color = if filtered.error > 0 {
                        Color::Red
                    } else if filtered.warning > 0 {
                        Color::Yellow
                    } else {
                        Color::Magenta
                    };
                    (
                        format!(
                            "{}  ok:{} warning:{} error:{} dead:{}",
                            file.path,
                            filtered.ok,
                            filtered.warning,
                            filtered.error,
                            filtered.unreachable
                        ),
                        color,
                    )
                };

                let style = if idx == self.selected_file && self.focus == Focus::Main {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(color)
                };
                ListItem::new(label).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Files (Enter to open)"),
        );
        frame.render_widget(list, main_chunks[0]);

        self.render_kinds_panel(frame, main_chunks[1]);

        let status_text = match &self.status_message {
            Some((msg, _)) => msg.clone(),
            None => format!(
                "{} files | k={} | j/k: navigate  Enter: open  Tab: kinds  Space: toggle  ?: help  q: quit",
                self.files.len(),
                self.kind_filter.encode()
            ),
        };
        let status_bar = Paragraph::new(status_text)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(status_bar, chunks[1]);
    }

    /// Render the check kinds panel with checkbox-style rows.
    fn render_kinds_panel(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .kinds
            .iter()
            .enumerate()
            .map(|(idx, kind)| {
                let mark = if self.kind_filter.enabled(kind.id) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if idx == self.selected_kind && self.focus == Focus::Kinds {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{} {}", mark, kind.name)).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Check kinds (Space)"),
        );
        frame.render_widget(list, area);
    }

    /// Render the report view: annotated source, side panels, navigator bar
    /// and status bar.
    fn render_report(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
            .split(chunks[0]);

        let side_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(6)])
            .split(main_chunks[1]);

        self.render_report_body(frame, main_chunks[0]);
        self.render_kinds_panel(frame, side_chunks[0]);
        self.render_status_panel(frame, side_chunks[1]);
        self.render_navigator_bar(frame, chunks[1]);
        self.render_report_status_bar(frame, chunks[2]);
    }

    /// Render the annotated source body.
    ///
    /// Builds one row per source line plus one row per visible check message
    /// line, remembering each source line's row index so navigator jumps can
    /// align their target with the top edge.
    fn render_report_body(&mut self, frame: &mut Frame, area: Rect) {
        let Some(page) = self.page.as_mut() else {
            return;
        };
        let focus_main = self.focus == Focus::Main;

        let ext = Path::new(&page.report.path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        let mut fh = self.highlighter.for_file(&ext);

        let highlight_line = page
            .highlight
            .as_ref()
            .map(|&(line, _)| line);

        let mut rows: Vec<Line> = Vec::new();
        page.line_rows.clear();

        for (idx, text) in page.report.source.iter().enumerate() {
            let line_num = idx as u32 + 1;
            page.line_rows.push(rows.len().min(u16::MAX as usize) as u16);

            let check_indices = page.report.checks_on_line(line_num);
            let line_status = page.report.line_status(line_num);

            let mut number_style = match line_status {
                Some(status) => Style::default().fg(status_color(status)),
                None => Style::default().fg(Color::DarkGray),
            };
            if idx == page.cursor && focus_main {
                number_style = number_style.add_modifier(Modifier::BOLD);
            }
            let mut spans = vec![Span::styled(format!("{:>5} ", line_num), number_style)];

            let code_spans = fh.highlight_line(text);
            if highlight_line == Some(line_num) {
                // Transient flash after a navigator jump.
                for span in code_spans {
                    spans.push(Span::styled(
                        span.content,
                        span.style.add_modifier(Modifier::REVERSED),
                    ));
                }
            } else {
                spans.extend(code_spans);
            }

            if !check_indices.is_empty() {
                let marker = if page.visibility.box_visible(line_num) {
                    format!("  [-{} checks]", check_indices.len())
                } else {
                    format!("  [+{} checks]", check_indices.len())
                };
                spans.push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            rows.push(Line::from(spans));

            // Checks box: one block of rows per visible check.
            if !check_indices.is_empty() && page.visibility.box_visible(line_num) {
                for (pos, &check_idx) in check_indices.iter().enumerate() {
                    if !page.visibility.check_visible(check_idx) {
                        continue;
                    }
                    let check = &page.report.checks[check_idx];
                    let selected =
                        focus_main && idx == page.cursor && pos == page.selected_check;

                    let mut header_style = Style::default()
                        .fg(status_color(check.status))
                        .add_modifier(Modifier::BOLD);
                    if selected {
                        header_style = header_style.add_modifier(Modifier::REVERSED);
                    }

                    let message = report::check_message(check);
                    let mut message_lines = message.split('\n');
                    let first = message_lines.next().unwrap_or("");

                    let mut check_spans = vec![
                        Span::raw("      "),
                        Span::styled(report::check_header(check), header_style),
                        Span::styled(
                            first.to_string(),
                            Style::default().fg(status_color(check.status)),
                        ),
                    ];
                    if !check.call_context_ids.is_empty() {
                        check_spans.push(Span::styled(
                            format!("  [{} contexts: c]", check.call_context_ids.len()),
                            Style::default().fg(Color::Cyan),
                        ));
                    }
                    rows.push(Line::from(check_spans));

                    for rest in message_lines {
                        rows.push(Line::from(vec![
                            Span::raw("      "),
                            Span::styled(
                                rest.to_string(),
                                Style::default().fg(status_color(check.status)),
                            ),
                        ]));
                    }
                }
            }
        }

        // A navigator jump aligns its target line with the top edge.
        if let Some(line) = page.pending_top_line.take()
            && let Some(&row) = page.line_rows.get(line as usize - 1)
        {
            page.scroll = row;
        }

        // Keep the cursor visible.
        let height = area.height.saturating_sub(2);
        if height > 0
            && let Some(&cursor_row) = page.line_rows.get(page.cursor)
        {
            if cursor_row < page.scroll {
                page.scroll = cursor_row;
            } else if cursor_row >= page.scroll + height {
                page.scroll = cursor_row - height + 1;
            }
        }
        let max_scroll = (rows.len().min(u16::MAX as usize) as u16).saturating_sub(1);
        page.scroll = page.scroll.min(max_scroll);

        let title = format!("{} | k={}", page.report.path, self.kind_filter.encode());
        let paragraph = Paragraph::new(Text::from(rows))
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((page.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    /// Render the status filter panel.
    fn render_status_panel(&self, frame: &mut Frame, area: Rect) {
        let Some(page) = &self.page else {
            return;
        };
        let items: Vec<ListItem> = CheckStatus::ALL
            .iter()
            .map(|&status| {
                let mark = if page.status_filter.enabled(status) {
                    "[x]"
                } else {
                    "[ ]"
                };
                ListItem::new(format!(
                    "{} {} ({})",
                    mark,
                    status.label(),
                    status.code() + 1
                ))
                .style(Style::default().fg(status_color(status)))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Statuses (1-4)"),
        );
        frame.render_widget(list, area);
    }

    /// Render the navigator bar. Empty categories are not shown.
    fn render_navigator_bar(&self, frame: &mut Frame, area: Rect) {
        let Some(page) = &self.page else {
            return;
        };

        let keys = [
            (NavCategory::Error, "n/N"),
            (NavCategory::Warning, "m/M"),
            (NavCategory::Deadcode, "b/B"),
        ];

        let mut spans: Vec<Span> = Vec::new();
        for (category, key) in keys {
            let nav = page.navigators.get(category);
            if nav.is_empty() {
                continue;
            }
            if !spans.is_empty() {
                spans.push(Span::raw("  |  "));
            }
            spans.push(Span::styled(
                format!("{} ({}) ", category.label(), key),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            spans.push(nav_button("<-", nav.prev_target(), nav.prev_enabled()));
            spans.push(Span::raw(" "));
            spans.push(nav_button("->", nav.next_target(), nav.next_enabled()));
        }
        if spans.is_empty() {
            spans.push(Span::styled(
                "no findings to navigate",
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::raw("  |  R: reset"));
        }

        let bar = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Navigator"));
        frame.render_widget(bar, area);
    }

    /// Render the report status bar.
    fn render_report_status_bar(&self, frame: &mut Frame, area: Rect) {
        let Some(page) = &self.page else {
            return;
        };
        let status_text = match &self.status_message {
            Some((msg, _)) => msg.clone(),
            None => format!(
                "{} checks | k={} | Tab: panel  Space: kind  1-4: status  Enter: expand  h/l: pick  c: contexts  ?: help  q: back",
                page.report.checks.len(),
                self.kind_filter.encode()
            ),
        };
        let status_bar = Paragraph::new(status_text)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(status_bar, area);
    }

    /// Render the call-contexts modal and remember its geometry for mouse
    /// hit testing.
    fn render_modal(&mut self, frame: &mut Frame) {
        let Some(modal) = &self.modal else {
            return;
        };

        let window = centered_rect(60, 60, frame.area());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(window);

        frame.render_widget(Clear, window);

        let content = Paragraph::new(modal.content.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Call contexts"),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(content, chunks[0]);

        let close = Paragraph::new("[ close ]")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(close, chunks[1]);

        self.modal_layout = Some(ModalLayout {
            window,
            close: chunks[1],
        });
    }

    /// Render the help overlay.
    fn render_help(&self, frame: &mut Frame) {
        let help_text: Vec<&str> = match self.view_mode {
            ViewMode::FileList => vec![
                "check-view - File List Shortcuts",
                "",
                "Navigation:",
                "  j / Down      - Next file",
                "  k / Up        - Previous file",
                "  Tab           - Switch to/from kinds panel",
                "",
                "Actions:",
                "  Enter         - Open report for selected file",
                "  Space         - Toggle selected check kind",
                "",
                "Other:",
                "  ?             - Show this help",
                "  q / Esc       - Quit",
                "",
                "Press any key to close this help",
            ],
            ViewMode::Report => vec![
                "check-view - Report Shortcuts",
                "",
                "Navigation:",
                "  j / Down      - Next line",
                "  k / Up        - Previous line",
                "  Ctrl+d/PgDn   - Scroll down",
                "  Ctrl+u/PgUp   - Scroll up",
                "  n / N         - Next/previous error line",
                "  m / M         - Next/previous warning line",
                "  b / B         - Next/previous dead code line",
                "  R             - Reset navigators",
                "",
                "Checks:",
                "  Enter         - Expand/collapse checks on the line",
                "  h / l         - Select check on the line",
                "  c             - Show call contexts for selected check",
                "",
                "Filters:",
                "  Tab           - Switch to/from kinds panel",
                "  Space         - Toggle selected check kind",
                "  1 / 2 / 3 / 4 - Toggle ok / warning / error / dead code",
                "",
                "Other:",
                "  ?             - Show this help",
                "  q / Esc       - Back to file list",
                "",
                "Press any key to close this help",
            ],
        };

        let text = Text::from(help_text.iter().map(|&s| Line::from(s)).collect::<Vec<_>>());
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });

        let area = centered_rect(60, 80, frame.area());
        frame.render_widget(paragraph, area);
    }
}

/// One navigator button: arrow plus target line when enabled, dimmed when
/// disabled.
fn nav_button(arrow: &str, target: Option<u32>, enabled: bool) -> Span<'static> {
    if enabled {
        let label = match target {
            Some(line) => format!("{} (L{})", arrow, line),
            None => arrow.to_string(),
        };
        Span::styled(label, Style::default().fg(Color::Cyan))
    } else {
        Span::styled(arrow.to_string(), Style::default().fg(Color::DarkGray))
    }
}

fn status_color(status: CheckStatus) -> Color {
    match status {
        CheckStatus::Ok => Color::Green,
        CheckStatus::Warning => Color::Yellow,
        CheckStatus::Error => Color::Red,
        CheckStatus::Unreachable => Color::Magenta,
    }
}

/// Whether a click at `pos` closes the modal: only the close control and the
/// backdrop (anywhere outside the modal window) do.
fn modal_click_closes(layout: ModalLayout, pos: Position) -> bool {
    layout.close.contains(pos) || !layout.window.contains(pos)
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Setup the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Launch the interactive browser.
///
/// Accepts a pre-configured App (created via `App::new`, optionally with a
/// report already opened via `App::open_report`).
pub fn run_tui(mut app: App) -> Result<()> {
    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    // Main event loop
    let result = (|| -> Result<()> {
        loop {
            terminal
                .draw(|f| app.render(f))
                .context("Failed to draw frame")?;

            if app.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(200)).context("Failed to poll events")? {
                match event::read().context("Failed to read event")? {
                    Event::Key(key) => {
                        // Ignore key release events
                        if key.kind == event::KeyEventKind::Press {
                            app.handle_input(key);
                        }
                    }
                    Event::Mouse(mouse) => app.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    })();

    // Restore terminal in all cases
    restore_terminal(&mut terminal)?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ModalLayout {
        ModalLayout {
            window: Rect::new(20, 5, 40, 12),
            close: Rect::new(20, 16, 40, 1),
        }
    }

    #[test]
    fn backdrop_click_closes() {
        assert!(modal_click_closes(layout(), Position::new(0, 0)));
        assert!(modal_click_closes(layout(), Position::new(70, 20)));
    }

    #[test]
    fn content_click_does_not_close() {
        // Inside the window but not on the close control - like a click on
        // any other element of the content.
        assert!(!modal_click_closes(layout(), Position::new(25, 8)));
        assert!(!modal_click_closes(layout(), Position::new(20, 5)));
    }

    #[test]
    fn close_control_click_closes() {
        assert!(modal_click_closes(layout(), Position::new(40, 16)));
    }

    #[test]
    fn centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 60, parent);
        assert!(inner.x >= parent.x && inner.y >= parent.y);
        assert!(inner.right() <= parent.right() && inner.bottom() <= parent.bottom());
    }
}
