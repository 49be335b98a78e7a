//! # dops
//!
//! Thin binary wrapper. All behavior lives in the `cli` module, which drives
//! the `dops` library.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        cli::print_fatal_error(&e);
        std::process::exit(1);
    }
}
