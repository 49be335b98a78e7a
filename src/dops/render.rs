//! One pass of the pipeline over an already fetched batch of records:
//! sort, then pick and render a format.

use crate::error::{DopsError, Result};
use crate::fields::{FieldRegistry, RenderOptions};
use crate::format::{select, FormatCandidate, Selection};
use crate::model::ContainerRecord;
use crate::sort::{sort_records, SortKey};
use crate::table::TableStyle;
use crate::width::RenderedLine;

/// Everything about a view that stays fixed for a whole session.
#[derive(Debug, Clone)]
pub struct ViewSpec {
    pub candidates: Vec<FormatCandidate>,
    pub sort_keys: Vec<SortKey>,
    pub table: TableStyle,
}

impl ViewSpec {
    pub fn new(candidates: Vec<FormatCandidate>) -> Self {
        Self {
            candidates,
            sort_keys: Vec::new(),
            table: TableStyle::default(),
        }
    }

    pub fn with_sort_keys(mut self, keys: Vec<SortKey>) -> Self {
        self.sort_keys = keys;
        self
    }

    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table = style;
        self
    }

    /// True if any candidate shows `{{.key}}`.
    pub fn references(&self, key: &str) -> bool {
        self.candidates.iter().any(|c| c.references(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// Position of the chosen candidate in [`ViewSpec::candidates`]
    pub format_index: usize,
    pub lines: Vec<RenderedLine>,
}

impl RenderOutput {
    /// The lines joined with newlines, each one terminated.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}\n", l.text))
            .collect()
    }
}

/// Sorts `records` and renders them with the first candidate that fits,
/// falling back to the last one.
pub fn render_records(
    records: Vec<ContainerRecord>,
    view: &ViewSpec,
    registry: &FieldRegistry,
    options: &RenderOptions,
    terminal_width: Option<usize>,
) -> Result<RenderOutput> {
    if view.candidates.is_empty() {
        return Err(DopsError::MissingFormat);
    }

    let records = if view.sort_keys.is_empty() {
        records
    } else {
        sort_records(records, &view.sort_keys, registry, options)
    };

    match select(
        &view.candidates,
        &records,
        registry,
        options,
        view.table,
        terminal_width,
        true,
    )? {
        Selection::Chosen { index, lines } => Ok(RenderOutput {
            format_index: index,
            lines,
        }),
        Selection::NoFit => Err(DopsError::MissingFormat),
    }
}
