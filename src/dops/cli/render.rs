//! # Rendering Module
//!
//! Help text, the `--keys` listing and status messages go through the
//! `dops-style` renderer with the templates in `templates.rs`. Container
//! listings do not: they are laid out by the library and printed as is.

use super::setup::{get_version, option_lines, DOCKER_HEADING, EXTRA_HEADING};
use super::templates::{HELP_TEMPLATE, KEYS_TEMPLATE, MESSAGES_TEMPLATE};
use dops::error::{DopsError, Result};
use dops::fields::FieldRegistry;
use dops::styles::{names, DOPS_THEME};
use dops_style::Renderer;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: usize = 3;
const KEYS_HEADING: &str = "Format keys:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub level: MessageLevel,
    pub content: String,
}

impl Message {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct Entry {
    label: String,
    padding: String,
    help: String,
}

#[derive(Serialize)]
struct Section {
    title: String,
    entries: Vec<Entry>,
}

#[derive(Serialize)]
struct HelpData {
    title: String,
    about: String,
    sections: Vec<Section>,
}

#[derive(Serialize)]
struct KeyLine {
    key: String,
    padding: String,
    description: String,
}

#[derive(Serialize)]
struct KeysData {
    fields: Vec<KeyLine>,
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: String,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

fn renderer(use_color: bool) -> Result<Renderer> {
    let mut renderer = Renderer::with_color(DOPS_THEME.clone(), use_color);
    for (name, source) in [
        ("help", HELP_TEMPLATE),
        ("keys", KEYS_TEMPLATE),
        ("messages", MESSAGES_TEMPLATE),
    ] {
        renderer
            .add_template(name, source)
            .map_err(|e| DopsError::Render(e.to_string()))?;
    }
    Ok(renderer)
}

fn render<T: Serialize>(name: &str, data: &T, use_color: bool) -> Result<String> {
    renderer(use_color)?
        .render(name, data)
        .map_err(|e| DopsError::Render(e.to_string()))
}

/// Pads labels so the texts after them start in the same column.
fn aligned(pairs: Vec<(String, String)>) -> Vec<(String, String, String)> {
    let column = pairs.iter().map(|(l, _)| l.width()).max().unwrap_or(0) + COLUMN_GAP;
    pairs
        .into_iter()
        .map(|(label, text)| {
            let padding = " ".repeat(column - label.width());
            (label, padding, text)
        })
        .collect()
}

fn key_pairs(registry: &FieldRegistry) -> Vec<(String, String)> {
    registry
        .fields()
        .map(|f| (format!("{{{{.{}}}}}", f.key), f.description.to_string()))
        .collect()
}

pub fn render_help(registry: &FieldRegistry, use_color: bool) -> Result<String> {
    let options = option_lines();
    let mut pairs: Vec<(String, String)> = options
        .iter()
        .map(|o| (o.label.clone(), o.help.clone()))
        .collect();
    let option_count = pairs.len();
    pairs.extend(key_pairs(registry));

    let mut rows = aligned(pairs).into_iter();
    let option_rows: Vec<_> = rows.by_ref().take(option_count).collect();
    let key_rows: Vec<_> = rows.collect();

    let mut sections = Vec::new();
    for heading in [DOCKER_HEADING, EXTRA_HEADING] {
        let entries = options
            .iter()
            .zip(&option_rows)
            .filter(|(o, _)| o.heading == heading)
            .map(|(_, (label, padding, help))| Entry {
                label: label.clone(),
                padding: padding.clone(),
                help: help.clone(),
            })
            .collect();
        sections.push(Section {
            title: heading.to_string(),
            entries,
        });
    }
    sections.push(Section {
        title: KEYS_HEADING.to_string(),
        entries: key_rows
            .into_iter()
            .map(|(label, padding, help)| Entry {
                label,
                padding,
                help,
            })
            .collect(),
    });

    let data = HelpData {
        title: format!("dops {}", get_version()),
        about: "List docker containers, in the widest format your terminal fits".to_string(),
        sections,
    };
    render("help", &data, use_color)
}

pub fn render_keys(registry: &FieldRegistry, use_color: bool) -> Result<String> {
    let fields = aligned(key_pairs(registry))
        .into_iter()
        .map(|(key, padding, description)| KeyLine {
            key,
            padding,
            description,
        })
        .collect();
    render("keys", &KeysData { fields }, use_color)
}

pub fn render_messages(messages: &[Message], use_color: bool) -> Result<String> {
    let messages = messages
        .iter()
        .map(|m| MessageData {
            content: m.content.clone(),
            style: match m.level {
                MessageLevel::Info => names::INFO,
                MessageLevel::Warning => names::WARNING,
            }
            .to_string(),
        })
        .collect();
    render("messages", &MessagesData { messages }, use_color)
}
