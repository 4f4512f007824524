use crossterm::style::Stylize;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::layout::{compute_widths, render_header, render_row, render_rule, Align, ColumnSpec};
use crate::store::ResidentPage;
use crate::types::Resident;
use crate::util::{age_in_years, format_int};
use chrono::NaiveDate;

pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Current terminal width, or `fallback` when stdout is not a terminal.
pub fn terminal_width(fallback: usize) -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| cols as usize)
        .unwrap_or(fallback)
}

/// Columns of the resident listing. The name column absorbs spare width;
/// household and sex go first when the terminal is narrow.
pub fn resident_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::fixed("Registry", 9, 9),
        ColumnSpec::flex("Name", 12, 2.0, 8),
        ColumnSpec::fixed("Age", 3, 6).align(Align::Right),
        ColumnSpec::fixed("Sex", 3, 2).align(Align::Center),
        ColumnSpec::fixed("Status", 11, 5),
        ColumnSpec::fixed("Born", 10, 3),
        ColumnSpec::fixed("Household", 9, 1).align(Align::Right),
    ]
}

fn resident_cells(r: &Resident, as_of: NaiveDate) -> Vec<String> {
    vec![
        r.registry_number.clone(),
        r.full_name(),
        age_in_years(r.date_of_birth, as_of).to_string(),
        r.sex.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        r.status.to_string(),
        r.date_of_birth.format("%Y-%m-%d").to_string(),
        r.household_id.map(|h| h.to_string()).unwrap_or_default(),
    ]
}

/// Lines of one listing screen, laid out for `width` columns.
pub fn format_resident_page(page: &ResidentPage, as_of: NaiveDate, width: usize) -> Vec<String> {
    let columns = resident_columns();
    let widths = compute_widths(&columns, width);
    let mut lines = Vec::with_capacity(page.records.len() + 3);
    lines.push(render_header(&columns, &widths));
    lines.push(render_rule(&widths));
    for r in &page.records {
        lines.push(render_row(&columns, &widths, &resident_cells(r, as_of)));
    }
    if page.records.is_empty() {
        lines.push(" (no residents match)".to_string());
    }
    lines.push(format!(
        " Page {} of {} ({} residents)",
        page.page + 1,
        page.total_pages.max(1),
        format_int(page.total_records)
    ));
    lines
}

pub fn print_resident_page(page: &ResidentPage, as_of: NaiveDate, width: usize) {
    let lines = format_resident_page(page, as_of, width);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("{}", line.as_str().bold());
        } else {
            println!("{}", line);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::resident;
    use crate::types::{ResidentStatus, Sex};

    fn page(records: Vec<Resident>) -> ResidentPage {
        let total = records.len();
        ResidentPage {
            records,
            page: 0,
            total_pages: if total == 0 { 0 } else { 1 },
            total_records: total,
        }
    }

    #[test]
    fn test_wide_listing_shows_every_column() {
        let as_of = NaiveDate::from_ymd_opt(2080, 6, 1).unwrap();
        let p = page(vec![resident(3, "2050-02-01", Some(Sex::Male), ResidentStatus::OnMission)]);
        let lines = format_resident_page(&p, as_of, 120);
        assert!(lines[0].contains("Household"));
        assert!(lines[2].contains("V-00003"));
        assert!(lines[2].contains("On Mission"));
        assert_eq!(lines[0].chars().count(), 120);
        assert_eq!(lines[2].chars().count(), 120);
        assert_eq!(lines.last().unwrap(), " Page 1 of 1 (1 residents)");
    }

    #[test]
    fn test_narrow_listing_drops_low_priority_columns() {
        let as_of = NaiveDate::from_ymd_opt(2080, 6, 1).unwrap();
        let p = page(vec![resident(3, "2050-02-01", Some(Sex::Male), ResidentStatus::Active)]);
        let lines = format_resident_page(&p, as_of, 40);
        assert!(!lines[0].contains("Household"));
        assert!(!lines[0].contains("Sex"));
        assert!(!lines[0].contains("Born"));
        assert!(lines[0].contains("Registry"));
        assert!(lines[0].contains("Status"));
    }

    #[test]
    fn test_empty_listing() {
        let as_of = NaiveDate::from_ymd_opt(2080, 6, 1).unwrap();
        let lines = format_resident_page(&page(Vec::new()), as_of, 80);
        assert!(lines.iter().any(|l| l.contains("no residents match")));
        assert_eq!(lines.last().unwrap(), " Page 1 of 1 (0 residents)");
    }
}
