//! # CLI Behavior
//!
//! This is **one possible UI client** for dops, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and signals.
//!
//! For the overall architecture, see the crate-level documentation of `dops`.
//!
//! ## Picking a Format
//!
//! `dops` takes the same `--format` flag as `docker ps`, but repeatable.
//! Each render pass tries the formats in order and prints the first one that
//! is no wider than the terminal. The last one is printed even if it is too wide.
//!
//! Priority order for the format list:
//!
//! 1. `-q`: a plain id list
//! 2. `--format` flags, in the order given
//! 3. `formats` in `config.json`, or the built-in list (widest first)
//!
//! When stdout is not a terminal its width is unknown and the first format wins.
//!
//! ## Watch Mode
//!
//! `--watch [INTERVAL]` re-renders until Ctrl+C. Every refresh fetches the
//! containers again, re-reads the terminal width and redraws the screen.

mod commands;
mod print;
mod render;
pub mod setup;
mod templates;

pub use commands::run;
pub use print::print_fatal_error;
