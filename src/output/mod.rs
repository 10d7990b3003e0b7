//! Output renderers: console table, CSV file, HTML file.
//!
//! File outputs land under a per-property subdirectory of the output dir,
//! named by the sanitized property display name. Renderers are pure
//! formatting over a [`TabularResult`]; nothing here touches the network
//! or the cache.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::report::TabularResult;

/// Where a finished report goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Console,
    Csv,
    Html,
    /// Both CSV and HTML.
    Files,
}

impl OutputMode {
    pub const ALL: [OutputMode; 4] = [
        OutputMode::Console,
        OutputMode::Csv,
        OutputMode::Html,
        OutputMode::Files,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OutputMode::Console => "Console",
            OutputMode::Csv => "CSV file",
            OutputMode::Html => "HTML file",
            OutputMode::Files => "CSV + HTML files",
        }
    }

    /// CLI flag value.
    pub fn flag(self) -> &'static str {
        match self {
            OutputMode::Console => "console",
            OutputMode::Csv => "csv",
            OutputMode::Html => "html",
            OutputMode::Files => "files",
        }
    }

    pub fn from_flag(value: &str) -> Option<Self> {
        OutputMode::ALL
            .into_iter()
            .find(|m| m.flag() == value.trim().to_ascii_lowercase())
    }
}

/// Render `result` in `mode`. `property_name` picks the per-property
/// subdirectory for file modes.
pub fn render(
    mode: OutputMode,
    result: &TabularResult,
    property_name: &str,
    output_dir: &Path,
) -> Result<()> {
    let dir = output_dir.join(sanitize_name(property_name));
    match mode {
        OutputMode::Console => print_console(result),
        OutputMode::Csv => announce(write_csv(result, &dir)?),
        OutputMode::Html => announce(write_html(result, &dir)?),
        OutputMode::Files => {
            announce(write_csv(result, &dir)?);
            announce(write_html(result, &dir)?);
        }
    }
    Ok(())
}

fn announce(path: PathBuf) {
    println!("Saved report to {}", path.display());
}

/// Print a width-aligned table to stdout.
pub fn print_console(result: &TabularResult) {
    if result.rows.is_empty() {
        println!("No data to display.");
        return;
    }

    println!("\n--- {} ---", result.title);
    if let Some(range) = &result.date_range {
        println!("({range})");
    }

    let mut widths: Vec<usize> = result.headers.iter().map(|h| h.len()).collect();
    for row in &result.rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header_line = result
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{h:<width$}", width = widths[i]))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{header_line}");
    println!("{}", "-".repeat(header_line.len()));

    for row in &result.rows {
        let line = row
            .iter()
            .enumerate()
            .take(widths.len())
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{line}");
    }
    println!("{}", "-".repeat(header_line.len()));
}

/// Write `result` as a CSV file; returns the path written.
pub fn write_csv(result: &TabularResult, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir {}", dir.display()))?;
    let path = dir.join(format!("{}_{}.csv", title_slug(&result.title), timestamp()));

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&result.headers)?;
    for row in &result.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(path)
}

/// Write `result` as a standalone styled HTML document; returns the path
/// written.
pub fn write_html(result: &TabularResult, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir {}", dir.display()))?;
    let path = dir.join(format!("{}_{}.html", title_slug(&result.title), timestamp()));

    fs::write(&path, html_document(result))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn html_document(result: &TabularResult) -> String {
    let title = escape_html(&result.title);
    let subtitle = result
        .date_range
        .as_deref()
        .map(|range| format!("    <p class=\"range\">{}</p>\n", escape_html(range)))
        .unwrap_or_default();

    let header_cells: String = result
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h)))
        .collect();

    let body_rows: String = result
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<td>{}</td>", escape_html(cell)))
                .collect();
            format!("                <tr>{cells}</tr>\n")
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; }}
        table {{ border-collapse: collapse; width: 80%; margin: 20px auto; }}
        th, td {{ border: 1px solid #dddddd; text-align: left; padding: 8px; }}
        th {{ background-color: #f2f2f2; }}
        tr:nth-child(even) {{ background-color: #f9f9f9; }}
        h1, .range {{ text-align: center; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
{subtitle}    <table>
        <thead>
            <tr>{header_cells}</tr>
        </thead>
        <tbody>
{body_rows}        </tbody>
    </table>
</body>
</html>
"#
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

fn title_slug(title: &str) -> String {
    title.to_ascii_lowercase().replace(' ', "_")
}

/// Make a property display name safe as a directory name.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "property".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> TabularResult {
        let mut result = TabularResult::new("Top 5 Cities by Active Users", &["City", "Active Users"]);
        result.date_range = Some("2024-01-01 to 2024-01-07".to_string());
        result.rows.push(vec!["London".into(), "100".into()]);
        result.rows.push(vec!["<script>".into(), "5 & 6".into()]);
        result
    }

    #[test]
    fn sanitize_keeps_hostnames_readable() {
        assert_eq!(sanitize_name("www.example.com"), "www.example.com");
        assert_eq!(sanitize_name("My Site (staging)"), "My_Site__staging");
        assert_eq!(sanitize_name("///"), "property");
    }

    #[test]
    fn csv_contains_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&sample_result(), dir.path()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("City,Active Users"));
        assert_eq!(lines.next(), Some("London,100"));
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("top_5_cities_by_active_users_"));
    }

    #[test]
    fn html_escapes_cells() {
        let html = html_document(&sample_result());
        assert!(html.contains("<h1>Top 5 Cities by Active Users</h1>"));
        assert!(html.contains("2024-01-01 to 2024-01-07"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("5 &amp; 6"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn output_flags_round_trip() {
        for mode in OutputMode::ALL {
            assert_eq!(OutputMode::from_flag(mode.flag()), Some(mode));
        }
        assert_eq!(OutputMode::from_flag("pdf"), None);
    }
}
