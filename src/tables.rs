//! Pipe-table recovery from OCR markdown.
//!
//! This is a line heuristic: cells that contain `|` themselves, or tables
//! that continue across a page break, come out split.

use crate::engine::Table;

const DELIMITER: char = '|';

pub fn tables_from_markdown(markdown: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();
    let mut in_table = false;

    for raw in markdown.lines() {
        let line = raw.trim();
        if !is_candidate_row(line) {
            if in_table && !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
            in_table = false;
            continue;
        }

        in_table = true;
        let cells = split_row(line);
        if is_separator(&cells) {
            continue;
        }
        current.push(cells.into_iter().map(|c| Some(c.to_string())).collect());
    }

    if in_table && !current.is_empty() {
        tables.push(current);
    }
    tables
}

fn is_candidate_row(line: &str) -> bool {
    line.contains(DELIMITER) && !line.starts_with('#')
}

/// Cells of one row, trimmed, without the empty edge cells produced by a
/// leading or trailing delimiter.
fn split_row(line: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn is_separator(cells: &[&str]) -> bool {
    cells
        .iter()
        .all(|c| c.chars().all(|ch| matches!(ch, '-' | ':' | ' ')))
}
