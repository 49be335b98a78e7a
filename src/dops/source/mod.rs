//! # Record Sources
//!
//! Where container records come from. The [`RecordSource`] trait lets the
//! pipeline run against different backends:
//!
//! - [`socket::DockerSocketSource`]: the Docker Engine API over its unix socket
//! - [`file::JsonFileSource`]: a saved `/containers/json` response, or stdin
//! - [`memory::InMemorySource`]: records held in memory, for tests
//!
//! Sources hand back the raw JSON payload. Decoding happens in one place,
//! [`RecordSource::list`], so every backend reports malformed data the same way.
//!
//! Fetches are async and run on the CLI's current-thread runtime, so sources
//! need not be `Send`.

use crate::error::{DopsError, Result};
use async_trait::async_trait;
use crate::model::ContainerRecord;
use std::collections::BTreeMap;

pub mod file;
pub mod memory;
pub mod socket;

/// Query parameters of a container listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include stopped containers
    pub all: bool,
    /// Ask the daemon to compute `SizeRw` / `SizeRootFs`
    pub size: bool,
    /// Only the `n` most recently created containers
    pub limit: Option<usize>,
    /// `-f key=value` filters, grouped by key
    pub filters: BTreeMap<String, Vec<String>>,
}

impl ListOptions {
    /// Adds a `key=value` filter expression.
    pub fn add_filter(&mut self, expr: &str) -> Result<()> {
        let (key, value) = expr
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| {
                DopsError::Config(format!("Bad format of filter (expected name=value): {}", expr))
            })?;
        self.filters
            .entry(key.trim().to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    /// Query string for `/containers/json`.
    pub fn to_query(&self) -> String {
        let mut params = Vec::new();
        if self.all {
            params.push("all=1".to_string());
        }
        if self.size {
            params.push("size=1".to_string());
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        if !self.filters.is_empty() {
            // a BTreeMap of string vectors always serializes
            let json = serde_json::to_string(&self.filters).unwrap_or_default();
            params.push(format!("filters={}", urlencoding::encode(&json)));
        }
        params.join("&")
    }
}

/// A backend that can list containers.
#[async_trait(?Send)]
pub trait RecordSource {
    /// Fetches the raw JSON array of containers.
    async fn fetch_raw(&self, options: &ListOptions) -> Result<String>;

    /// Fetches and decodes the containers.
    async fn list(&self, options: &ListOptions) -> Result<Vec<ContainerRecord>> {
        let raw = self.fetch_raw(options).await?;
        tracing::trace!(payload = %raw, "container listing");
        let records: Vec<ContainerRecord> =
            serde_json::from_str(&raw).map_err(|e| DopsError::decode(e, &raw))?;
        tracing::debug!(count = records.len(), bytes = raw.len(), "fetched containers");
        Ok(records)
    }
}

#[async_trait(?Send)]
impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    async fn fetch_raw(&self, options: &ListOptions) -> Result<String> {
        (**self).fetch_raw(options).await
    }
}
