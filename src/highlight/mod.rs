use ratatui::{
    style::{Color, Style},
    text::Span,
};
use syntect::{
    easy::HighlightLines,
    highlighting::{Color as SyntectColor, Theme, ThemeSet},
    parsing::SyntaxSet,
};

/// Maximum line length for syntax highlighting (skip longer lines for performance).
const MAX_LINE_LENGTH: usize = 10_000;

/// Syntax highlighter for report source code.
///
/// Immutable and shareable; use `for_file()` to create a stateful session for
/// one file.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a new Highlighter with default syntax and theme sets.
    ///
    /// Loading the bundled syntaxes and themes takes ~250ms, paid once at
    /// startup.
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get("base16-ocean.dark")
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self { syntax_set, theme }
    }

    /// Create a file-scoped session that maintains state across lines, so
    /// multi-line constructs (strings, block comments) highlight correctly.
    /// Lines must be fed in order.
    pub fn for_file(&self, file_ext: &str) -> FileHighlighter<'_> {
        FileHighlighter::new(&self.syntax_set, &self.theme, file_ext)
    }

    fn syntect_to_ratatui(color: SyntectColor) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintains HighlightLines state across the lines of a single file.
pub struct FileHighlighter<'a> {
    highlighter: Option<HighlightLines<'a>>,
    syntax_set: &'a SyntaxSet,
}

impl<'a> FileHighlighter<'a> {
    fn new(syntax_set: &'a SyntaxSet, theme: &'a Theme, file_ext: &str) -> Self {
        let syntax = syntax_set
            .find_syntax_by_extension(file_ext)
            .or_else(|| syntax_set.find_syntax_by_name(file_ext));

        let highlighter = syntax.map(|s| HighlightLines::new(s, theme));

        Self {
            highlighter,
            syntax_set,
        }
    }

    /// Highlight one source line.
    ///
    /// Returns owned spans; falls back to an unstyled span when the file type
    /// is unknown, the line is very long, or highlighting fails.
    pub fn highlight_line(&mut self, line: &str) -> Vec<Span<'static>> {
        if line.is_empty() {
            return vec![Span::raw(String::new())];
        }

        if line.len() > MAX_LINE_LENGTH {
            return vec![Span::raw(line.to_string())];
        }

        let Some(ref mut highlighter) = self.highlighter else {
            return vec![Span::raw(line.to_string())];
        };

        match highlighter.highlight_line(line, self.syntax_set) {
            Ok(regions) => regions
                .into_iter()
                .map(|(style, text)| {
                    Span::styled(
                        text.to_string(),
                        Style::default().fg(Highlighter::syntect_to_ratatui(style.foreground)),
                    )
                })
                .collect(),
            Err(_) => vec![Span::raw(line.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_extensions() {
        let highlighter = Highlighter::new();

        let fh = highlighter.for_file("c");
        assert!(fh.highlighter.is_some(), "C syntax should be found");

        let fh = highlighter.for_file("rs");
        assert!(fh.highlighter.is_some(), "Rust syntax should be found");

        let fh = highlighter.for_file("unknown_ext_xyz");
        assert!(
            fh.highlighter.is_none(),
            "Unknown extension should have no highlighter"
        );
    }

    #[test]
    fn highlights_a_c_line() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("c");
        let spans = fh.highlight_line("int main(void) { return 0; }");
        assert!(spans.len() > 1, "Should split into styled regions");
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "int main(void) { return 0; }");
    }

    #[test]
    fn unknown_extension_falls_back_to_plain() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("unknown_xyz");
        let spans = fh.highlight_line("some text");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content.as_ref(), "some text");
    }

    #[test]
    fn empty_line_yields_single_empty_span() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("c");
        let spans = fh.highlight_line("");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content.as_ref(), "");
    }

    #[test]
    fn very_long_line_skips_highlighting() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("c");
        let long_line = "x".repeat(15_000);

        let start = std::time::Instant::now();
        let spans = fh.highlight_line(&long_line);
        assert!(start.elapsed() < std::time::Duration::from_millis(100));
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn multiline_comment_state_is_kept() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("c");

        let spans1 = fh.highlight_line("/* begin");
        let spans2 = fh.highlight_line("   still a comment */");
        assert!(!spans1.is_empty());
        assert!(!spans2.is_empty());
    }
}
