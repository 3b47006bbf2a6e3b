/*
    Plain text tables for transition tables, parsing tables and traces
*/

use itertools::Itertools;

// Lays out rows under a header with every column padded to its widest
// cell. Rows shorter than the header are padded with empty cells.
pub fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = header.len().max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let widths = (0..columns)
        .map(|column| {
            std::iter::once(header)
                .chain(rows.iter().map(Vec::as_slice))
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect_vec();

    let format_row = |row: &[String]| {
        (0..columns)
            .map(|column| {
                let cell = row.get(column).map(String::as_str).unwrap_or("");
                format!("{}{}", cell, " ".repeat(widths[column] - cell.chars().count()))
            })
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let rule = widths.iter().map(|width| "-".repeat(*width)).join("-+-");

    std::iter::once(format_row(header))
        .chain(std::iter::once(rule))
        .chain(rows.iter().map(|row| format_row(row)))
        .map(|line| line + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn pads_columns() {
        let rendered = table(
            &strings(&["State", "a", "b"]),
            &[strings(&["{1}", "{2, 3}", "∅"]), strings(&["∅", "∅", "∅"])]
        );

        assert_eq!(
            rendered,
            "State | a      | b\n\
             ------+--------+--\n\
             {1}   | {2, 3} | ∅\n\
             ∅     | ∅      | ∅\n"
        );
    }
}
