//! Table export of a result list as a downloadable CSV document.

use chrono::NaiveDate;

use crate::models::internship::MatchResult;

pub const EXPORT_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const HEADER: [&str; 7] = [
    "Company",
    "Role",
    "Location",
    "Match Score",
    "Duration",
    "Salary Range",
    "Key Skills",
];

const NOT_AVAILABLE: &str = "N/A";

pub fn export_file_name(date: NaiveDate) -> String {
    format!("internship-matches-{}.csv", date.format("%Y-%m-%d"))
}

pub fn render_csv(results: &[MatchResult]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|h| h.to_string()));
    for result in results {
        let record = &result.record;
        push_row(
            &mut out,
            [
                record.company.clone(),
                record.role.clone(),
                record.location.clone(),
                result
                    .match_score
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s}%")),
                or_na(&result.duration),
                or_na(&result.salary_range),
                record.skills_required.clone(),
            ],
        );
    }
    out
}

fn or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let row = cells
        .into_iter()
        .map(|cell| escape_cell(&cell))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}

/// Leading characters a spreadsheet reads as the start of a formula.
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

fn escape_cell(cell: &str) -> String {
    let cell = if cell.starts_with(FORMULA_PREFIXES) {
        format!("'{cell}")
    } else {
        cell.to_string()
    };
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell
    }
}
