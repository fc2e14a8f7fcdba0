//! Styled terminal output utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use stepwise_migrate::Status;

static COLOR: AtomicBool = AtomicBool::new(true);

/// Enable or disable colored output
pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

/// Whether colored output is enabled
pub fn color_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

fn paint(text: &str, styled: impl FnOnce(&str) -> String) -> String {
    if color_enabled() {
        styled(text)
    } else {
        text.to_string()
    }
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", paint(key, |k| k.dimmed().to_string()), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!(
        "{} {}",
        paint("✔", |s| s.green().bold().to_string()),
        paint(text, |s| s.green().to_string())
    );
}

/// Print an info message
pub fn info(text: &str) {
    println!("{} {}", paint("ℹ", |s| s.blue().bold().to_string()), text);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!(
        "{} {}",
        paint("✖", |s| s.red().bold().to_string()),
        paint(text, |s| s.red().to_string())
    );
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Status badge: colored background when colors are on, plain name otherwise
pub fn status_badge(status: Status) -> Cell {
    let plain = status.as_str().to_string();
    if !color_enabled() {
        return Cell::plain(plain);
    }

    let padded = format!(" {} ", plain);
    let styled = match status {
        Status::Pending => padded.white().on_blue().to_string(),
        Status::Failed => padded.white().on_red().to_string(),
        Status::Passed => padded.black().on_green().to_string(),
    };
    Cell::styled(padded, styled)
}

/// A table cell whose width is measured on its unstyled text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    text: String,
    styled: Option<String>,
}

impl Cell {
    /// Unstyled cell. Line breaks are folded into spaces.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: single_line(&text.into()),
            styled: None,
        }
    }

    /// Cell rendered as `styled` but measured as `text`
    pub fn styled(text: impl Into<String>, styled: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            styled: Some(styled.into()),
        }
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }

    fn render(&self, width: usize) -> String {
        let pad = " ".repeat(width.saturating_sub(self.width()));
        format!("{}{}", self.styled.as_deref().unwrap_or(&self.text), pad)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::plain(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::plain(text)
    }
}

fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Box-drawn table with a bold header row
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table with the given column names
    pub fn new(columns: &[&str]) -> Self {
        let headers = columns
            .iter()
            .map(|c| Cell::styled(*c, paint(c, |s| s.bold().to_string())))
            .collect();
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty, extra cells are dropped
    pub fn add_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render to a string, one line per row plus borders
    pub fn render(&self) -> String {
        let columns = self.headers.len();
        let empty = Cell::plain("");

        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                std::iter::once(&self.headers[i])
                    .chain(self.rows.iter().filter_map(|r| r.get(i)))
                    .map(Cell::width)
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(border(&widths, "┌", "┬", "┐"));
        out.push(line(&self.headers.iter().collect::<Vec<_>>(), &widths));
        out.push(border(&widths, "├", "┼", "┤"));
        for row in &self.rows {
            let cells: Vec<&Cell> = (0..columns)
                .map(|i| row.get(i).unwrap_or(&empty))
                .collect();
            out.push(line(&cells, &widths));
        }
        out.push(border(&widths, "└", "┴", "┘"));
        out.join("\n")
    }

    /// Print the rendered table
    pub fn print(&self) {
        println!("{}", self.render());
    }
}

fn border(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}", left, segments.join(mid), right)
}

fn line(cells: &[&Cell], widths: &[usize]) -> String {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {} ", cell.render(*width)))
        .collect();
    format!("│{}│", rendered.join("│"))
}
