use super::{ListOptions, RecordSource};
use async_trait::async_trait;
use crate::error::{DopsError, Result};
use crate::model::ContainerRecord;
use std::cell::Cell;

/// Records held in memory. Applies `all` and `limit` the way the daemon does;
/// filters are ignored.
#[derive(Default)]
pub struct InMemorySource {
    records: Vec<ContainerRecord>,
    fetches: Cell<usize>,
}

impl InMemorySource {
    pub fn new(records: Vec<ContainerRecord>) -> Self {
        Self {
            records,
            fetches: Cell::new(0),
        }
    }

    /// How many times the records were fetched.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

#[async_trait(?Send)]
impl RecordSource for InMemorySource {
    async fn fetch_raw(&self, options: &ListOptions) -> Result<String> {
        self.fetches.set(self.fetches.get() + 1);

        let mut selected: Vec<&ContainerRecord> = if options.all || options.limit.is_some() {
            self.records.iter().collect()
        } else {
            self.records.iter().filter(|r| r.state == "running").collect()
        };

        if let Some(limit) = options.limit {
            selected.sort_by(|a, b| b.created.cmp(&a.created));
            selected.truncate(limit);
        }

        serde_json::to_string(&selected).map_err(|e| DopsError::Source(e.to_string()))
    }
}
