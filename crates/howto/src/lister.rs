//! Tabulated guide listings for `list` output and disambiguation errors.

use std::path::Path;

use crossterm::style::Stylize;

use crate::error::Result;
use crate::guide::Guide;

/// Render guides as an index/name table. `verbose` swaps the humanized
/// name for the raw normalized one and adds the file column (relative to
/// `base_dir`). Colors are applied only when `color` is set; callers gate
/// it on the output being a capable terminal.
///
/// # Errors
///
/// [`crate::HowtoError::Internal`] if any guide has no display index yet.
pub fn table(guides: &[&Guide], verbose: bool, color: bool, base_dir: &Path) -> Result<String> {
    let mut header = vec!["Index".to_owned(), "Name".to_owned()];
    if verbose {
        header.push(format!("File (Dir: {})", base_dir.display()));
    }

    let mut rows = Vec::with_capacity(guides.len());
    for guide in guides {
        let mut row = vec![guide.display_index()?.to_string()];
        row.push(if verbose {
            guide.identity().joined()
        } else {
            guide.humanized_title()
        });
        if verbose {
            let rel = guide.path().strip_prefix(base_dir).unwrap_or(guide.path());
            row.push(rel.display().to_string());
        }
        rows.push(row);
    }

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    // The header row stays uncolored; only data cells are styled.
    let mut lines = vec![format_row(&header, &widths, false)];
    for row in &rows {
        lines.push(format_row(row, &widths, color));
    }
    Ok(lines.join("\n"))
}

fn format_row(cells: &[String], widths: &[usize], colorize_cells: bool) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        let padded = pad(cell, widths[i]);
        let styled = if colorize_cells {
            match i {
                0 => padded.yellow().to_string(),
                1 => padded.cyan().to_string(),
                _ => padded,
            }
        } else {
            padded
        };
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(&styled);
    }
    line.trim_end().to_owned()
}

fn pad(cell: &str, width: usize) -> String {
    let mut padded = cell.to_owned();
    for _ in cell.chars().count()..width {
        padded.push(' ');
    }
    padded
}
