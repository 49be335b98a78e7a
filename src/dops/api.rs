//! # API Facade
//!
//! [`DopsApi`] is the single entry point a UI uses to produce a container
//! listing. It owns everything that is fixed for a session (the record source,
//! the field registry, the view, the listing options) and runs one full
//! fetch → sort → select → render pass per [`DopsApi::render`] call.
//!
//! ## What the API Does NOT Do
//!
//! - Print anything: it returns [`RenderOutput`] lines
//! - Clear the screen or loop: that is the caller's job (see [`crate::watch`])
//! - Query the terminal: widths come from a [`WidthProvider`]
//!
//! ## Generic Over RecordSource
//!
//! `DopsApi<S: RecordSource>` works with any backend:
//! - Production: `DopsApi<DockerSocketSource>`
//! - Offline: `DopsApi<JsonFileSource>`
//! - Testing: `DopsApi<InMemorySource>`

use crate::error::Result;
use crate::fields::{FieldRegistry, RenderOptions};
use crate::render::{render_records, ViewSpec};
use crate::source::{ListOptions, RecordSource};
use console::Term;

pub use crate::render::RenderOutput;

/// Supplies the terminal width, if there is one.
pub trait WidthProvider {
    /// Columns available, `None` when unknown.
    fn width(&self) -> Option<usize>;
}

/// Width of the terminal attached to stdout, read on every call so resizes
/// during `--watch` are honored.
pub struct TerminalWidth;

impl WidthProvider for TerminalWidth {
    fn width(&self) -> Option<usize> {
        Term::stdout()
            .size_checked()
            .map(|(_rows, cols)| cols as usize)
    }
}

/// A fixed width, or a permanently unknown one.
pub struct FixedWidth(pub Option<usize>);

impl WidthProvider for FixedWidth {
    fn width(&self) -> Option<usize> {
        self.0
    }
}

pub struct DopsApi<S: RecordSource> {
    source: S,
    registry: FieldRegistry,
    view: ViewSpec,
    list: ListOptions,
    options: RenderOptions,
}

impl<S: RecordSource> DopsApi<S> {
    /// Sizes are requested from the source whenever the view shows `{{.Size}}`.
    pub fn new(source: S, view: ViewSpec, mut list: ListOptions, options: RenderOptions) -> Self {
        if !list.size && view.references("Size") {
            tracing::debug!("format shows Size, requesting sizes");
            list.size = true;
        }
        Self {
            source,
            registry: FieldRegistry::new(),
            view,
            list,
            options,
        }
    }

    /// One full pass: fetch, sort, pick the first fitting format, render.
    pub async fn render(&self, width: &dyn WidthProvider) -> Result<RenderOutput> {
        let records = self.source.list(&self.list).await?;
        render_records(
            records,
            &self.view,
            &self.registry,
            &self.options,
            width.width(),
        )
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn list_options(&self) -> &ListOptions {
        &self.list
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DopsError;
    use crate::format::parse_formats;
    use crate::model::ContainerRecord;
    use crate::source::memory::InMemorySource;
    use crate::sort::SortKey;
    use std::collections::BTreeMap;

    fn records() -> Vec<ContainerRecord> {
        serde_json::from_value(serde_json::json!([
            {"Id": "aaaaaaaaaaaaaaaa", "Names": ["/web"], "State": "running", "Created": 10, "SizeRw": 2000},
            {"Id": "bbbbbbbbbbbbbbbb", "Names": ["/db"], "State": "exited", "Created": 20, "SizeRw": 1000},
            {"Id": "cccccccccccccccc", "Names": ["/cache"], "State": "running", "Created": 30, "SizeRw": 3000},
        ]))
        .unwrap()
    }

    fn view(formats: &[&str]) -> ViewSpec {
        let formats: Vec<String> = formats.iter().map(|f| f.to_string()).collect();
        ViewSpec::new(parse_formats(&formats, &BTreeMap::new()))
    }

    fn api(formats: &[&str], list: ListOptions) -> DopsApi<InMemorySource> {
        DopsApi::new(
            InMemorySource::new(records()),
            view(formats),
            list,
            RenderOptions::default(),
        )
    }

    #[tokio::test]
    async fn renders_running_containers_by_default() {
        let out = api(&["{{.Names}}"], ListOptions::default())
            .render(&FixedWidth(None))
            .await
            .unwrap();
        assert_eq!(out.to_text(), "web\ncache\n");
    }

    #[tokio::test]
    async fn passes_list_options_to_the_source() {
        let list = ListOptions {
            all: true,
            ..ListOptions::default()
        };
        let out = api(&["{{.Names}}"], list).render(&FixedWidth(None)).await.unwrap();
        assert_eq!(out.lines.len(), 3);
    }

    #[test]
    fn size_in_format_requests_sizes() {
        assert!(api(&["table {{.Names}}\t{{.Size}}"], ListOptions::default()).list_options().size);
        assert!(!api(&["{{.Names}}"], ListOptions::default()).list_options().size);
    }

    #[tokio::test]
    async fn sorted_and_narrowed_to_terminal() {
        let mut v = view(&["table {{.ID}}\t{{.Names}}\t{{.State}}", "{{.Names}}"]);
        v = v.with_sort_keys(vec![SortKey::desc("Size")]);
        let api = DopsApi::new(
            InMemorySource::new(records()),
            v,
            ListOptions {
                all: true,
                ..ListOptions::default()
            },
            RenderOptions::default(),
        );

        let wide = api.render(&FixedWidth(Some(200))).await.unwrap();
        assert_eq!(wide.format_index, 0);
        assert!(wide.lines[2].text.starts_with("cccccccccccc"));

        let narrow = api.render(&FixedWidth(Some(10))).await.unwrap();
        assert_eq!(narrow.format_index, 1);
        assert_eq!(narrow.to_text(), "cache\nweb\ndb\n");
    }

    #[tokio::test]
    async fn fetches_once_per_render() {
        let api = api(&["{{.ID}}"], ListOptions::default());
        api.render(&FixedWidth(None)).await.unwrap();
        api.render(&FixedWidth(None)).await.unwrap();
        assert_eq!(api.source().fetch_count(), 2);
    }

    #[tokio::test]
    async fn repeated_renders_are_identical() {
        let api = DopsApi::new(
            InMemorySource::new(records()),
            view(&["table {{.ID}}\t{{.Names}}\t{{.RunningFor}}"]),
            ListOptions::default(),
            RenderOptions {
                now: chrono::DateTime::from_timestamp(100_000, 0),
                ..RenderOptions::default()
            },
        );
        let first = api.render(&FixedWidth(Some(80))).await.unwrap();
        let second = api.render(&FixedWidth(Some(80))).await.unwrap();
        assert_eq!(first.to_text(), second.to_text());
    }

    #[tokio::test]
    async fn empty_view_is_missing_format() {
        let result = api(&[], ListOptions::default()).render(&FixedWidth(None)).await;
        assert!(matches!(result, Err(DopsError::MissingFormat)));
    }

    #[test]
    fn lists_fields() {
        let api = api(&["idlist"], ListOptions::default());
        assert!(api.registry().fields().any(|f| f.key == "ShortPublishedPorts"));
    }
}
