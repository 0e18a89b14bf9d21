//! Tabular-structure detection over extracted page text.
//!
//! Without glyph coordinates the only reliable signal left after text
//! extraction is whitespace-column alignment: runs of consecutive lines
//! that split into the same number of cells on wide gaps. That is what
//! resume skill matrices and certification tables collapse to.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::document::PageTable;

/// Minimum consecutive aligned lines to call something a table.
const MIN_TABLE_ROWS: usize = 2;
/// Minimum cells per row; single gaps occur in ordinary prose.
const MIN_TABLE_COLS: usize = 2;

fn gap_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s{2,}|\t+").expect("gap pattern must compile"))
}

/// Splits a line into candidate cells on 2+ space runs or tabs.
fn split_cells(line: &str) -> Vec<String> {
    gap_pattern()
        .split(line.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

/// Detects whitespace-aligned tables in a page's text lines. Returned
/// tables carry the line span they cover so the normalizer can render
/// them in place of the raw lines.
pub fn detect_tables(lines: &[&str]) -> Vec<PageTable> {
    let mut tables = Vec::new();
    let mut run: Vec<(usize, Vec<String>)> = Vec::new();

    let mut flush = |run: &mut Vec<(usize, Vec<String>)>, tables: &mut Vec<PageTable>| {
        if run.len() >= MIN_TABLE_ROWS {
            tables.push(PageTable {
                start_line: run[0].0,
                end_line: run[run.len() - 1].0,
                rows: run.drain(..).map(|(_, cells)| cells).collect(),
            });
        } else {
            run.clear();
        }
    };

    for (idx, line) in lines.iter().enumerate() {
        let cells = split_cells(line);
        let aligned = cells.len() >= MIN_TABLE_COLS
            && run
                .last()
                .map(|(_, prev)| prev.len() == cells.len())
                .unwrap_or(true);

        if cells.len() >= MIN_TABLE_COLS && aligned {
            run.push((idx, cells));
        } else {
            flush(&mut run, &mut tables);
            // A misaligned multi-cell line can still start a new run.
            if cells.len() >= MIN_TABLE_COLS {
                run.push((idx, cells));
            }
        }
    }
    flush(&mut run, &mut tables);

    tables
}
