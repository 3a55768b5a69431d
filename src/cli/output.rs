//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use serde::Serialize;

use crate::cli::{CliError, CliResult};
use crate::infrastructure::InfraError;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print a value as pretty JSON
pub fn json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| {
        CliError::Infra(InfraError::io(
            "render json",
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        ))
    })?;
    println!("{}", rendered);
    Ok(())
}

/// Print rows as left-aligned columns with a bold header line
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        detail(&"(none)".dimmed());
        return;
    }
    let rendered = render_table(headers, rows);
    let mut lines = rendered.lines();
    if let Some(first) = lines.next() {
        println!("{}", first.bold());
    }
    for line in lines {
        println!("{}", line);
    }
}

/// Column-align `headers` and `rows` into plain text.
///
/// Short rows are padded with empty cells; trailing spaces are trimmed.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        let line = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).copied().unwrap_or("");
                format!("{:<width$}", cell, width = *width)
            })
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(format_line(headers.to_vec()));
    for row in rows {
        out.push(format_line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_rows_when_rendering_table_then_columns_align() {
        let rows = vec![
            vec!["web-1".to_string(), "running".to_string()],
            vec!["db".to_string(), "stopped".to_string()],
        ];

        let rendered = render_table(&["NAME", "STATUS"], &rows);

        assert_eq!(
            rendered,
            "NAME   STATUS\nweb-1  running\ndb     stopped"
        );
    }

    #[test]
    fn given_short_row_when_rendering_table_then_missing_cells_are_blank() {
        let rows = vec![vec!["only".to_string()]];

        let rendered = render_table(&["A", "B"], &rows);

        assert_eq!(rendered, "A     B\nonly");
    }
}
