//! # Dops Architecture
//!
//! Dops is an adaptive `docker ps`. It lists containers the way `docker ps`
//! does, but takes a whole list of formats and prints the first one that fits
//! the terminal, so one invocation gives a rich table on a wide screen and a
//! compact one on a narrow split.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints output, handles Ctrl+C          │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - One render pass: fetch → sort → select → render          │
//! │  - Returns lines, never prints                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Pipeline (sort.rs, format.rs, table.rs, template.rs, ...)  │
//! │  - Pure functions over records                              │
//! │  - Widths measured without color escapes (width.rs)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Record Sources (source/)                                   │
//! │  - Abstract RecordSource trait                              │
//! │  - Docker socket (production), JSON file, in-memory (tests) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The refresh loop (`watch.rs`) sits beside the API: it calls a render
//! function, waits for the interval or a cancel, and repeats.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust values, returns
//! [`error::Result`], never writes to stdout/stderr and never exits the
//! process. The terminal width comes in through [`api::WidthProvider`] so tests
//! can pin it.
//!
//! ## Module Overview
//!
//! - [`fields`]: format keys (`{{.ID}}`, `{{.ShortPublishedPorts}}`, ...) and their values
//! - [`sort`]: stable multi-key sort
//! - [`width`]: printable width, padding, truncation
//! - [`template`]: `{{.Key}}` tokenizer
//! - [`format`]: format candidates and width-driven selection
//! - [`table`]: aligned table layout
//! - [`render`]: one pass over a batch of records
//! - [`watch`]: refresh loop and interrupt handling
//! - [`source`]: where records come from
//! - [`config`]: `config.json` defaults

pub mod api;
pub mod config;
pub mod error;
pub mod fields;
pub mod format;
pub mod model;
pub mod render;
pub mod sort;
pub mod source;
pub mod styles;
pub mod table;
pub mod template;
pub mod watch;
pub mod width;
