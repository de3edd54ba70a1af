//! # Page formatting
//!
//! Turns raw tldr markdown into indented, styled terminal lines. Every line
//! is handled on its own: placeholder braces and backticks are stripped, the
//! leading marker picks a [`LineStyle`], and `colored` paints it.

use colored::Colorize;

/// Semantic role of a page line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// `# name`
    Title,
    /// `> description`
    Description,
    /// `- example description`
    Example,
    /// Example command line.
    Body,
    /// Blank line or non-page text.
    Plain,
}

impl LineStyle {
    pub fn paint(self, text: &str) -> String {
        match self {
            LineStyle::Title => text.bold().red().to_string(),
            LineStyle::Description => text.yellow().underline().to_string(),
            LineStyle::Example => text.green().to_string(),
            LineStyle::Body => text.magenta().to_string(),
            LineStyle::Plain => text.to_string(),
        }
    }
}

/// Remove `{{ }}` placeholder delimiters and inline-code backticks.
pub fn strip_tokens(line: &str) -> String {
    line.replace("{{", "").replace("}}", "").replace('`', "")
}

/// Decide the style of a stripped, trimmed page line and its display text.
pub fn classify(line: &str) -> (LineStyle, String) {
    if line.is_empty() {
        return (LineStyle::Plain, String::new());
    }

    if let Some(rest) = line.strip_prefix('#') {
        (LineStyle::Title, rest.trim_start().to_string())
    } else if let Some(rest) = line.strip_prefix('>') {
        let text: String = rest.trim_start().chars().filter(|c| !matches!(c, '<' | '>')).collect();
        (LineStyle::Description, text)
    } else if let Some(rest) = line.strip_prefix('-') {
        (LineStyle::Example, format!("\u{2022}{rest}"))
    } else {
        (LineStyle::Body, format!("  {line}"))
    }
}

/// Arranges text line by line with optional indentation and a leading newline.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    indent_spaces: usize,
    start_with_new_line: bool,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent every non-blank line by `spaces`.
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent_spaces = spaces;
        self
    }

    /// Prefix the output with one blank line.
    pub fn start_with_new_line(mut self, enabled: bool) -> Self {
        self.start_with_new_line = enabled;
        self
    }

    /// Format plain text: trimmed lines, each terminated by a newline.
    pub fn format(&self, content: &str) -> String {
        self.format_with(content, str::to_string)
    }

    fn format_with(&self, content: &str, render: impl Fn(&str) -> String) -> String {
        let mut formatted = String::new();
        if self.start_with_new_line {
            formatted.push('\n');
        }

        // Blank lines inside the content are kept
        for line in content.trim().split('\n') {
            let rendered = render(line.trim());
            if !rendered.trim().is_empty() {
                formatted.push_str(&" ".repeat(self.indent_spaces));
            }
            formatted.push_str(&rendered);
            formatted.push('\n');
        }

        formatted
    }
}

/// [`Formatter`] that renders tldr page markup.
#[derive(Debug, Clone, Default)]
pub struct PageFormatter {
    formatter: Formatter,
}

impl PageFormatter {
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }

    pub fn format(&self, content: &str) -> String {
        self.formatter.format_with(content, |line| {
            let (style, text) = classify(&strip_tokens(line));
            style.paint(&text)
        })
    }
}
