//! # CLI Templates
//!
//! Help, the key listing and status messages are rendered through
//! minijinja templates kept as stand-alone files next to this module and
//! embedded at compile time. Layout math (column padding) is done in Rust and
//! passed in as plain strings; templates only pick styles.
//!
//! Line breaks are explicit: every loop body ends in its own newline, so the
//! blank lines in the output are the ones visible in the template.

pub const HELP_TEMPLATE: &str = include_str!("templates/help.tmp");
pub const KEYS_TEMPLATE: &str = include_str!("templates/keys.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
