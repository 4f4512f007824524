//! Responsive column layout for text tables.
//!
//! [`compute_widths`] decides how wide each column is for a given terminal
//! width, hiding low-priority columns when the fixed columns do not fit.
//! The row helpers then fit each cell to its width.

use tracing::debug;

/// Joins adjacent visible cells.
pub const SEPARATOR: &str = " │ ";
/// One space before the first cell and one after the last.
pub const ROW_PADDING: usize = 2;
pub const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub title: String,
    pub min_width: usize,
    pub align: Align,
    /// Share of the leftover width; 0 (or less) makes the column fixed.
    pub weight: f64,
    /// Lower values are hidden first. 0 is simply the lowest priority.
    pub priority: u8,
}

impl ColumnSpec {
    pub fn fixed(title: impl Into<String>, width: usize, priority: u8) -> Self {
        Self {
            title: title.into(),
            min_width: width,
            align: Align::Left,
            weight: 0.0,
            priority,
        }
    }

    pub fn flex(title: impl Into<String>, min_width: usize, weight: f64, priority: u8) -> Self {
        Self {
            title: title.into(),
            min_width,
            align: Align::Left,
            weight,
            priority,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    fn is_fixed(&self) -> bool {
        self.weight <= 0.0
    }
}

/// Width for every column, 1:1 with `columns`; 0 means the column is hidden.
///
/// While the fixed columns, separators and row padding overflow
/// `available_width`, the visible column with the lowest priority is hidden
/// (the first one in input order on ties). Once they fit, or a single
/// column is left, the leftover width is split between weighted columns in
/// proportion to their weights, never below their minimum.
pub fn compute_widths(columns: &[ColumnSpec], available_width: usize) -> Vec<usize> {
    let mut visible = vec![true; columns.len()];

    loop {
        let mut count = 0usize;
        let mut fixed_sum = 0i64;
        let mut total_weight = 0.0f64;
        for (col, _) in columns.iter().zip(&visible).filter(|(_, v)| **v) {
            count += 1;
            if col.is_fixed() {
                fixed_sum += col.min_width as i64;
            } else {
                total_weight += col.weight;
            }
        }

        let separators = if count > 1 { SEPARATOR.chars().count() * (count - 1) } else { 0 };
        let remaining =
            available_width as i64 - fixed_sum - separators as i64 - ROW_PADDING as i64;

        if remaining >= 0 || count <= 1 {
            return columns
                .iter()
                .zip(&visible)
                .map(|(col, &shown)| {
                    if !shown {
                        0
                    } else if col.is_fixed() {
                        col.min_width
                    } else {
                        let share = (remaining as f64 * col.weight / total_weight).floor();
                        if share < col.min_width as f64 {
                            col.min_width
                        } else {
                            share as usize
                        }
                    }
                })
                .collect();
        }

        let dropped = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| visible[*i])
            .min_by_key(|(_, col)| col.priority)
            .map(|(i, _)| i);
        match dropped {
            Some(i) => {
                debug!(column = %columns[i].title, remaining, "Hiding column");
                visible[i] = false;
            }
            None => return vec![0; columns.len()],
        }
    }
}

/// Fit `text` into exactly `width` characters.
///
/// Longer text keeps its first `width - 1` characters followed by an
/// ellipsis; shorter text is padded according to `align`.
pub fn fit_cell(text: &str, width: usize, align: Align) -> String {
    if width == 0 {
        return String::new();
    }
    let len = text.chars().count();
    if len > width {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push(ELLIPSIS);
        return out;
    }
    let gap = width - len;
    match align {
        Align::Left => format!("{}{}", text, " ".repeat(gap)),
        Align::Right => format!("{}{}", " ".repeat(gap), text),
        Align::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(gap - left))
        }
    }
}

/// Render one row; hidden columns and their cells are skipped.
pub fn render_row<S: AsRef<str>>(columns: &[ColumnSpec], widths: &[usize], cells: &[S]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .zip(widths)
        .enumerate()
        .filter(|(_, (_, w))| **w > 0)
        .map(|(i, (col, &w))| {
            let text = cells.get(i).map(|c| c.as_ref()).unwrap_or("");
            fit_cell(text, w, col.align)
        })
        .collect();
    format!(" {} ", parts.join(SEPARATOR))
}

pub fn render_header(columns: &[ColumnSpec], widths: &[usize]) -> String {
    let titles: Vec<&str> = columns.iter().map(|c| c.title.as_str()).collect();
    render_row(columns, widths, &titles)
}

/// Horizontal rule matching the header's width and separator positions.
pub fn render_rule(widths: &[usize]) -> String {
    let parts: Vec<String> = widths
        .iter()
        .filter(|w| **w > 0)
        .map(|w| "─".repeat(*w))
        .collect();
    format!("─{}─", parts.join("─┼─"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_priority_dropped_first() {
        let columns = vec![
            ColumnSpec::fixed("A", 20, 3),
            ColumnSpec::fixed("B", 20, 2),
            ColumnSpec::fixed("C", 20, 1),
        ];
        let widths = compute_widths(&columns, 50);
        assert_eq!(widths, vec![20, 20, 0]);
    }

    #[test]
    fn test_weighted_columns_share_leftover() {
        let columns = vec![
            ColumnSpec::fixed("Id", 10, 5),
            ColumnSpec::flex("Name", 5, 1.0, 4),
            ColumnSpec::flex("Notes", 5, 2.0, 3),
        ];
        let widths = compute_widths(&columns, 100);
        assert_eq!(widths[0], 10);
        // 100 - 10 - 6 - 2 = 82 left over.
        assert_eq!(widths[1], 27);
        assert_eq!(widths[2], 54);
        let ratio = widths[2] as f64 / widths[1] as f64;
        assert!((ratio - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_weighted_column_never_below_minimum() {
        let columns = vec![
            ColumnSpec::fixed("Id", 10, 5),
            ColumnSpec::flex("Name", 12, 1.0, 4),
        ];
        let widths = compute_widths(&columns, 20);
        assert_eq!(widths, vec![10, 12]);
    }

    #[test]
    fn test_single_column_kept_even_if_too_wide() {
        let columns = vec![ColumnSpec::fixed("A", 40, 1), ColumnSpec::fixed("B", 40, 2)];
        let widths = compute_widths(&columns, 10);
        assert_eq!(widths, vec![0, 40]);
    }

    #[test]
    fn test_ties_drop_first_in_order() {
        let columns = vec![
            ColumnSpec::fixed("A", 10, 0),
            ColumnSpec::fixed("B", 10, 0),
            ColumnSpec::fixed("C", 10, 9),
        ];
        // 30 + 6 + 2 = 38 does not fit in 30; 20 + 3 + 2 = 25 does.
        let widths = compute_widths(&columns, 30);
        assert_eq!(widths, vec![0, 10, 10]);
    }

    #[test]
    fn test_length_matches_input() {
        assert!(compute_widths(&[], 80).is_empty());
        let columns: Vec<ColumnSpec> = (0..7)
            .map(|i| ColumnSpec::fixed(format!("C{}", i), 15, i as u8))
            .collect();
        for width in [0, 5, 30, 80, 200] {
            assert_eq!(compute_widths(&columns, width).len(), columns.len());
        }
    }

    #[test]
    fn test_fit_cell_truncates_with_ellipsis() {
        assert_eq!(fit_cell("Overseer", 5, Align::Left), "Over…");
        assert_eq!(fit_cell("Overseer", 8, Align::Left), "Overseer");
        assert_eq!(fit_cell("abc", 0, Align::Left), "");
        assert_eq!(fit_cell("abc", 1, Align::Left), "…");
    }

    #[test]
    fn test_fit_cell_alignment() {
        assert_eq!(fit_cell("42", 5, Align::Right), "   42");
        assert_eq!(fit_cell("42", 5, Align::Left), "42   ");
        assert_eq!(fit_cell("42", 5, Align::Center), " 42  ");
    }

    #[test]
    fn test_render_row_skips_hidden_and_fills_width() {
        let columns = vec![
            ColumnSpec::fixed("No", 4, 9).align(Align::Right),
            ColumnSpec::flex("Name", 6, 1.0, 5),
            ColumnSpec::fixed("Status", 10, 1),
        ];
        let widths = compute_widths(&columns, 20);
        assert_eq!(widths, vec![4, 11, 0]);
        let row = render_row(&columns, &widths, &["7", "Ada Reyes", "Active"]);
        assert_eq!(row, "    7 │ Ada Reyes   ");
        assert_eq!(row.chars().count(), 20);
        assert_eq!(render_rule(&widths).chars().count(), 20);
        assert_eq!(render_header(&columns, &widths), "   No │ Name        ");
    }
}
