//! # dops-style - Named Styles for Terminal Output
//!
//! The small styling layer under `dops`. It keeps every color decision in one
//! place so the table and template printers only ever ask for a style by
//! *name* ("state_running", "header", ...), never for a raw ANSI code.
//!
//! Two ways to use it:
//!
//! - [`Theme::paint`] styles a single value. The container state column goes
//!   through here, which is why the width measurement in `dops` must ignore
//!   escape sequences.
//! - [`Renderer`] renders minijinja templates with a `style` filter. The CLI
//!   renders its help screens and status messages this way.
//!
//! ## Quick Example
//!
//! ```rust
//! use dops_style::{Renderer, Theme};
//! use console::Style;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data {
//!     name: String,
//!     count: usize,
//! }
//!
//! let theme = Theme::new()
//!     .add("header", Style::new().bold().cyan())
//!     .add("count", Style::new().green());
//!
//! let mut renderer = Renderer::with_color(theme, false);
//! renderer
//!     .add_template(
//!         "summary",
//!         r#"{{ "Containers on" | style("header") }} {{ name }}: {{ count | style("count") }}"#,
//!     )
//!     .unwrap();
//!
//! let data = Data { name: "local".into(), count: 3 };
//! assert_eq!(renderer.render("summary", &data).unwrap(), "Containers on local: 3");
//! ```
//!
//! ## Color Control
//!
//! Nothing here looks at the terminal. Callers pass `use_color`, having
//! already weighed `--color`/`--no-color` against what stdout supports.

use console::Style;
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use std::collections::HashMap;

/// Default prefix shown when a style name is not found.
pub const DEFAULT_MISSING_STYLE_INDICATOR: &str = "(!?)";

/// A collection of named styles.
///
/// When a style name is not found, a configurable indicator is prepended to the
/// text so typos in templates show up in the output (defaults to `(!?)`).
///
/// ```rust
/// use dops_style::Styles;
/// use console::Style;
///
/// let styles = Styles::new()
///     .add("state_exited", Style::new().red())
///     .add("dim", Style::new().dim());
///
/// let unknown = styles.apply("typo", "running");
/// assert!(unknown.starts_with("(!?)"));
/// ```
#[derive(Clone)]
pub struct Styles {
    styles: HashMap<String, Style>,
    missing_indicator: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            missing_indicator: DEFAULT_MISSING_STYLE_INDICATOR.to_string(),
        }
    }
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indicator prepended when a style name is not found.
    /// An empty indicator disables it.
    pub fn missing_indicator(mut self, indicator: &str) -> Self {
        self.missing_indicator = indicator.to_string();
        self
    }

    /// Adds a named style, replacing any previous style with that name.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    /// Applies a named style to text, emitting ANSI codes.
    pub fn apply(&self, name: &str, text: &str) -> String {
        match self.styles.get(name) {
            Some(style) => style.apply_to(text).to_string(),
            None if self.missing_indicator.is_empty() => text.to_string(),
            None => format!("{} {}", self.missing_indicator, text),
        }
    }

    /// Same lookup as [`Styles::apply`] but never emits ANSI codes.
    pub fn apply_plain(&self, name: &str, text: &str) -> String {
        if self.styles.contains_key(name) || self.missing_indicator.is_empty() {
            text.to_string()
        } else {
            format!("{} {}", self.missing_indicator, text)
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// A named collection of styles used when rendering.
#[derive(Clone, Default)]
pub struct Theme {
    styles: Styles,
}

impl Theme {
    pub fn new() -> Self {
        Self {
            styles: Styles::new(),
        }
    }

    /// Adds a named style, returning the updated theme for chaining.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles = self.styles.add(name, style);
        self
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Styles a single value, or returns it untouched when color is off.
    ///
    /// Unlike the template filter, an unknown style name leaves the text alone:
    /// cell values feed width calculations and must not grow an indicator.
    ///
    /// ```rust
    /// use dops_style::Theme;
    /// use console::Style;
    ///
    /// let theme = Theme::new().add("ok", Style::new().green().force_styling(true));
    /// assert_eq!(theme.paint("ok", "up", false), "up");
    /// assert!(theme.paint("ok", "up", true).contains("\x1b["));
    /// assert_eq!(theme.paint("missing", "up", true), "up");
    /// ```
    pub fn paint(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.styles.get(name) {
            Some(style) if use_color => style.apply_to(text).to_string(),
            _ => text.to_string(),
        }
    }
}

/// A renderer with pre-registered templates, compiled once and reused.
///
/// ```rust
/// use dops_style::{Renderer, Theme};
/// use console::Style;
/// use serde::Serialize;
///
/// let theme = Theme::new().add("key", Style::new().cyan());
/// let mut renderer = Renderer::with_color(theme, false);
/// renderer.add_template("key", r#"{{ name | style("key") }}"#).unwrap();
///
/// #[derive(Serialize)]
/// struct Key { name: String }
///
/// let out = renderer.render("key", &Key { name: "ID".into() }).unwrap();
/// assert_eq!(out, "ID");
/// ```
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn with_color(theme: Theme, use_color: bool) -> Self {
        let mut env = Environment::new();
        register_style_filter(&mut env, theme, use_color);
        Self { env }
    }

    /// Registers a named template. Syntax errors are reported here.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render(data)
    }
}

fn register_style_filter(env: &mut Environment<'static>, theme: Theme, use_color: bool) {
    let styles = theme.styles;
    env.add_filter("style", move |value: Value, name: String| -> String {
        let text = value.to_string();
        if use_color {
            styles.apply(&name, &text)
        } else {
            // missing styles are still flagged without color
            styles.apply_plain(&name, &text)
        }
    });
}
