//! # Table Printer
//!
//! Lays out a column set as an aligned table:
//!
//! ```text
//! CONTAINER ID   NAMES   STATE
//! ------------   -----   -------
//! 4c01db0b339c   web     running
//! ```
//!
//! Column widths are the widest header or cell in each column, measured with
//! [`printable_width`], so colored cells line up with plain ones. The last
//! column is never padded.

use crate::fields::{FieldRegistry, RenderOptions};
use crate::format::ColumnSpec;
use crate::model::ContainerRecord;
use crate::width::{pad_right, printable_width, table_width, RenderedLine, COLUMN_SPACING};

/// Which decorations go above the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyle {
    pub header: bool,
    /// Dashed line under the header; ignored without a header.
    pub separator: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header: true,
            separator: true,
        }
    }
}

/// A fully laid out table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub column_widths: Vec<usize>,
    pub lines: Vec<RenderedLine>,
}

impl TableLayout {
    /// Total printable width, spacing included.
    pub fn width(&self) -> usize {
        table_width(&self.column_widths)
    }
}

pub fn layout_table(
    columns: &[ColumnSpec],
    records: &[ContainerRecord],
    registry: &FieldRegistry,
    options: &RenderOptions,
    style: TableStyle,
) -> TableLayout {
    let headers: Vec<String> = columns.iter().map(|c| c.header(registry)).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| c.render(record, registry, options))
                .collect()
        })
        .collect();

    let column_widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            let header_width = if style.header {
                printable_width(&headers[i])
            } else {
                0
            };
            rows.iter()
                .map(|row| printable_width(&row[i]))
                .fold(header_width, usize::max)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if style.header {
        lines.push(join_row(&headers, &column_widths));
        if style.separator {
            let dashes: Vec<String> = column_widths.iter().map(|w| "-".repeat(*w)).collect();
            lines.push(join_row(&dashes, &column_widths));
        }
    }
    lines.extend(rows.iter().map(|row| join_row(row, &column_widths)));

    TableLayout {
        column_widths,
        lines,
    }
}

fn join_row(cells: &[String], widths: &[usize]) -> RenderedLine {
    let gap = " ".repeat(COLUMN_SPACING);
    let last = cells.len().saturating_sub(1);
    let text = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == last {
                cell.clone()
            } else {
                pad_right(cell, *width)
            }
        })
        .collect::<Vec<_>>()
        .join(&gap);
    RenderedLine::new(text)
}
