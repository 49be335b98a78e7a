use console::Style;
use dops_style::Theme;
use once_cell::sync::Lazy;

/// Style names shared by the library and the CLI templates.
pub mod names {
    pub const HEADER: &str = "header";
    pub const KEY: &str = "key";
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
}

pub static DOPS_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        .add("state_running", Style::new().green())
        .add("state_exited", Style::new().red())
        .add("state_created", Style::new().yellow())
        .add("state_paused", Style::new().yellow())
        .add("state_restarting", Style::new().yellow())
        .add("state_dead", Style::new().red().bold())
        .add("state_removing", Style::new().dim())
        .add(names::HEADER, Style::new().bold())
        .add(names::KEY, Style::new().cyan())
        .add(names::INFO, Style::new().dim())
        .add(names::WARNING, Style::new().yellow())
});
