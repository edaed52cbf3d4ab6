//! Plain-text table widget used by the command line

use std::fmt;

use crate::table::{Cell, ColumnSpec, TableWidget};

/// Keeps the materialized table in memory and renders it as aligned text
#[derive(Debug, Default)]
pub struct TextTable {
    columns: Option<Vec<ColumnSpec>>,
    rows: Vec<Vec<Cell>>,
    rebuilds: usize,
}

impl TextTable {
    pub fn columns(&self) -> &[ColumnSpec] {
        self.columns.as_deref().unwrap_or_default()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// How many times a table was initialized on this widget
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}

impl TableWidget for TextTable {
    fn is_initialized(&self) -> bool {
        self.columns.is_some()
    }

    fn destroy(&mut self) {
        self.columns = None;
        self.rows.clear();
    }

    fn initialize(&mut self, columns: &[ColumnSpec], rows: Vec<Vec<Cell>>) {
        self.columns = Some(columns.to_vec());
        self.rows = rows;
        self.rebuilds += 1;
    }
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Links(links) => links
            .iter()
            .map(|link| link.action.label())
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(columns) = &self.columns else {
            return writeln!(f, "(no table)");
        };

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .filter_map(|row| row.get(i))
                    .map(String::len)
                    .chain(std::iter::once(column.title.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |f: &mut fmt::Formatter<'_>, cells: Vec<&str>| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect();
            writeln!(f, "{}", padded.join("  ").trim_end())
        };

        line(f, columns.iter().map(|c| c.title.as_str()).collect())?;
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        line(f, rule.iter().map(String::as_str).collect())?;
        for row in &rows {
            line(f, row.iter().map(String::as_str).collect())?;
        }
        Ok(())
    }
}
