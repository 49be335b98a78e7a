use super::render::{render_messages, Message};
use colored::Colorize;
use dops::api::RenderOutput;
use dops::error::DopsError;
use std::io::Write;

/// Writes a rendered listing to stdout in one go, so a refresh never shows
/// half a table.
pub(super) fn print_output(output: &RenderOutput, silent: bool) -> std::io::Result<()> {
    if silent {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.to_text().as_bytes())?;
    stdout.flush()
}

fn messages_text(messages: &[Message], use_color: bool) -> String {
    render_messages(messages, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub(super) fn print_messages(messages: &[Message], use_color: bool) {
    let output = messages_text(messages, use_color);
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// Like [`print_messages`], but on stderr so listings stay pipeable.
pub(super) fn print_warnings(messages: &[Message], use_color: bool) {
    let output = messages_text(messages, use_color);
    if !output.is_empty() {
        eprint!("{}", output);
    }
}

pub fn print_fatal_error(e: &DopsError) {
    eprintln!("{}", format!("Error: {}", e).red());
}
