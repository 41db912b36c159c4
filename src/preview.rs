//! Plain-text table rendering of the first cleaned rows.

use std::fmt::Write as _;

use crate::data::Dataset;

const COLUMN_GAP: &str = "  ";

pub fn render_preview(dataset: &Dataset, limit: usize) -> String {
    let headers = dataset.headers();
    let rows = dataset
        .records
        .iter()
        .take(limit)
        .map(|record| {
            record
                .values
                .iter()
                .map(|cell| cell.as_ref().map(|v| sanitize(&v.as_display())).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, headers.iter().map(String::as_str), &widths);
    let rules = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    push_line(&mut output, rules.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut output, row.iter().map(String::as_str), &widths);
    }
    output
}

fn push_line<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.zip(widths).enumerate() {
        if idx > 0 {
            line.push_str(COLUMN_GAP);
        }
        let _ = write!(line, "{cell:<width$}");
    }
    let _ = writeln!(output, "{}", line.trim_end());
}

fn sanitize(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let headers = vec!["id".to_string(), "customer_name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Alice".to_string()],
            vec!["1000".to_string(), "Bob".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "id    customer_name");
        assert_eq!(lines[1], "----  -------------");
        assert_eq!(lines[2], "1     Alice");
        assert_eq!(lines[3], "1000  Bob");
    }

    #[test]
    fn sanitize_flattens_control_whitespace() {
        assert_eq!(sanitize("a\nb\tc"), "a b c");
    }
}
