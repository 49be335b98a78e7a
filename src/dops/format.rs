//! # Format Selector
//!
//! A view is described by an ordered list of format strings, widest first:
//!
//! - `idlist`: one container id per line
//! - `table <cells>`: a table whose cells are separated by tabs (or a literal `\t`)
//! - anything else: a single-line template printed once per record
//!
//! [`select`] renders each candidate in turn and keeps the first one that fits
//! the terminal. When the terminal width is unknown every candidate fits, so
//! the first one wins.

use crate::error::{DopsError, Result};
use crate::fields::{FieldRegistry, RenderOptions};
use crate::model::ContainerRecord;
use crate::table::{layout_table, TableStyle};
use crate::template::Template;
use crate::width::{block_width, truncate_to_width, RenderedLine};
use std::collections::BTreeMap;

const ID_LIST: &str = "idlist";
const TABLE_PREFIX: &str = "table";
const SHORT_ID_LEN: usize = 12;

/// Columns of a bare `table` format, as printed by `docker ps`.
const DOCKER_COLUMNS: &[&str] = &[
    "ID",
    "Image",
    "Command",
    "RunningFor",
    "Status",
    "Ports",
    "Names",
];

/// One table column: the cell template plus an optional maximum width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub cell: Template,
    pub width_hint: Option<usize>,
}

impl ColumnSpec {
    pub fn new(cell: &str, width_hint: Option<usize>) -> Self {
        Self {
            cell: Template::parse(cell),
            width_hint,
        }
    }

    pub fn header(&self, registry: &FieldRegistry) -> String {
        match self.cell.single_key() {
            Some(key) => registry.header(key),
            None => self.cell.render_header(registry),
        }
    }

    /// Cell value; a lone unknown placeholder gives an empty cell.
    pub fn render(
        &self,
        record: &ContainerRecord,
        registry: &FieldRegistry,
        options: &RenderOptions,
    ) -> String {
        let value = match self.cell.single_key() {
            Some(key) => registry.resolve(record, key, options),
            None => self.cell.render(record, registry, options),
        };
        match self.width_hint {
            Some(max) => truncate_to_width(&value, max),
            None => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCandidate {
    IdList,
    Table(Vec<ColumnSpec>),
    Template(Template),
}

impl FormatCandidate {
    /// Parses one format string. `column_widths` maps field keys to the
    /// maximum width of columns showing that field.
    pub fn parse(format: &str, column_widths: &BTreeMap<String, usize>) -> Self {
        if format == ID_LIST {
            return FormatCandidate::IdList;
        }

        let table_body = if format == TABLE_PREFIX {
            Some(None)
        } else {
            format
                .strip_prefix(TABLE_PREFIX)
                .filter(|rest| rest.starts_with(' '))
                .map(Some)
        };

        match table_body {
            Some(None) => FormatCandidate::Table(
                DOCKER_COLUMNS
                    .iter()
                    .map(|key| {
                        ColumnSpec::new(&format!("{{{{.{}}}}}", key), column_widths.get(*key).copied())
                    })
                    .collect(),
            ),
            Some(Some(body)) => FormatCandidate::Table(parse_columns(body, column_widths)),
            None => FormatCandidate::Template(Template::parse(format)),
        }
    }

    /// True if any cell or the template mentions `{{.key}}`.
    pub fn references(&self, key: &str) -> bool {
        match self {
            FormatCandidate::IdList => false,
            FormatCandidate::Table(columns) => columns.iter().any(|c| c.cell.references(key)),
            FormatCandidate::Template(template) => template.references(key),
        }
    }

    /// Renders every record and measures the result.
    pub fn render(
        &self,
        records: &[ContainerRecord],
        registry: &FieldRegistry,
        options: &RenderOptions,
        style: TableStyle,
    ) -> RenderedBlock {
        match self {
            FormatCandidate::IdList => RenderedBlock {
                lines: records
                    .iter()
                    .map(|r| {
                        let id = if options.truncate {
                            r.id.chars().take(SHORT_ID_LEN).collect()
                        } else {
                            r.id.clone()
                        };
                        RenderedLine::new(id)
                    })
                    .collect(),
                width: None,
            },
            FormatCandidate::Table(columns) => {
                let layout = layout_table(columns, records, registry, options, style);
                RenderedBlock {
                    width: Some(layout.width()),
                    lines: layout.lines,
                }
            }
            FormatCandidate::Template(template) => {
                let lines: Vec<RenderedLine> = records
                    .iter()
                    .map(|r| RenderedLine::new(template.render(r, registry, options)))
                    .collect();
                RenderedBlock {
                    width: Some(block_width(&lines)),
                    lines,
                }
            }
        }
    }
}

fn parse_columns(body: &str, column_widths: &BTreeMap<String, usize>) -> Vec<ColumnSpec> {
    body.replace("\\t", "\t")
        .split('\t')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            let template = Template::parse(cell);
            let hint = template
                .single_key()
                .and_then(|key| column_widths.get(key).copied());
            ColumnSpec {
                cell: template,
                width_hint: hint,
            }
        })
        .collect()
}

pub fn parse_formats(formats: &[String], column_widths: &BTreeMap<String, usize>) -> Vec<FormatCandidate> {
    formats
        .iter()
        .map(|f| FormatCandidate::parse(f, column_widths))
        .collect()
}

/// Adds a `{{.Size}}` column to a table format that lacks one, as `-s` does.
/// Other formats come back unchanged.
pub fn with_size_column(format: &str) -> String {
    let body = if format == TABLE_PREFIX {
        DOCKER_COLUMNS
            .iter()
            .map(|key| format!("{{{{.{}}}}}", key))
            .collect::<Vec<_>>()
            .join("\t")
    } else {
        match format.strip_prefix(TABLE_PREFIX).and_then(|rest| rest.strip_prefix(' ')) {
            Some(body) => body.to_string(),
            None => return format.to_string(),
        }
    };
    if Template::parse(&body).references("Size") {
        return format.to_string();
    }
    format!("{} {}\t{{{{.Size}}}}", TABLE_PREFIX, body)
}

/// Output of one candidate. `width` is `None` for candidates that always fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub lines: Vec<RenderedLine>,
    pub width: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen {
        index: usize,
        lines: Vec<RenderedLine>,
    },
    NoFit,
}

/// Picks the first candidate that fits `terminal_width`.
///
/// `None` or `0` means the width is unknown, and every candidate fits. With
/// `force_last` the final candidate is used even when it is too wide.
pub fn select(
    candidates: &[FormatCandidate],
    records: &[ContainerRecord],
    registry: &FieldRegistry,
    options: &RenderOptions,
    style: TableStyle,
    terminal_width: Option<usize>,
    force_last: bool,
) -> Result<Selection> {
    if candidates.is_empty() {
        return Err(DopsError::MissingFormat);
    }

    let limit = terminal_width.filter(|w| *w > 0);
    let last = candidates.len() - 1;

    for (index, candidate) in candidates.iter().enumerate() {
        let block = candidate.render(records, registry, options, style);
        let fits = match (block.width, limit) {
            (Some(width), Some(limit)) => width <= limit,
            _ => true,
        };

        if fits || (force_last && index == last) {
            tracing::debug!(index, width = ?block.width, terminal = ?limit, "selected format");
            return Ok(Selection::Chosen {
                index,
                lines: block.lines,
            });
        }
        tracing::trace!(index, width = ?block.width, "format too wide");
    }

    Ok(Selection::NoFit)
}
