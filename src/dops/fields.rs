//! # Field Resolver
//!
//! Every format key (`{{.ID}}`, `{{.ShortPublishedPorts}}`, ...) maps to a
//! [`FieldDef`] in the [`FieldRegistry`]. The registry is built once at startup
//! and passed by reference into everything that needs to turn a record into
//! display strings: the sort engine, the table printer and the template printer.
//!
//! Unknown keys resolve to an empty string. A format written for a newer
//! version, or with a typo, degrades to blank cells instead of aborting the
//! whole view.

use crate::error::{DopsError, Result};
use crate::model::{ContainerRecord, PortBinding};
use crate::styles::DOPS_THEME;
use crate::width::truncate_to_width;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Utc};
use dops_style::Theme;
use humansize::{format_size, DECIMAL};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

const SHORT_ID_LEN: usize = 12;
const COMMAND_WIDTH: usize = 20;

/// How two records compare on a field when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    /// Lexicographic on the resolved (uncolored) display value
    Text,
    /// Chronological on the creation timestamp
    Created,
    /// Numeric on the writable layer size
    Size,
}

type ResolveFn = fn(&ContainerRecord, &ResolveContext<'_>) -> String;

/// One resolvable format key.
#[derive(Clone, Copy)]
pub struct FieldDef {
    pub key: &'static str,
    pub header: &'static str,
    pub description: &'static str,
    pub sort: SortKind,
    resolve: ResolveFn,
}

/// Timezone used when printing timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneSpec {
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl TimeZoneSpec {
    pub fn format(&self, time: DateTime<Utc>, fmt: &str) -> String {
        match self {
            TimeZoneSpec::Local => time.with_timezone(&Local).format(fmt).to_string(),
            TimeZoneSpec::Utc => time.format(fmt).to_string(),
            TimeZoneSpec::Fixed(offset) => time.with_timezone(offset).format(fmt).to_string(),
        }
    }
}

impl FromStr for TimeZoneSpec {
    type Err = DopsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DopsError::Config(format!("Invalid timezone: '{}'", s));
        match s.trim() {
            t if t.eq_ignore_ascii_case("local") => Ok(TimeZoneSpec::Local),
            t if t.eq_ignore_ascii_case("utc") || t == "Z" => Ok(TimeZoneSpec::Utc),
            t => {
                let (sign, rest) = match t.as_bytes().first() {
                    Some(b'+') => (1, &t[1..]),
                    Some(b'-') => (-1, &t[1..]),
                    _ => return Err(invalid()),
                };
                if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
                    return Err(invalid());
                }
                let (hours, minutes) = match rest.split_once(':') {
                    Some((h, m)) => (h, m),
                    None if rest.len() == 4 => rest.split_at(2),
                    None => (rest, "0"),
                };
                let hours: i32 = hours.parse().map_err(|_| invalid())?;
                let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
                if hours > 23 || minutes > 59 {
                    return Err(invalid());
                }
                FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
                    .map(TimeZoneSpec::Fixed)
                    .ok_or_else(invalid)
            }
        }
    }
}

impl fmt::Display for TimeZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSpec::Local => write!(f, "local"),
            TimeZoneSpec::Utc => write!(f, "UTC"),
            TimeZoneSpec::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Knobs that change how values are rendered, fixed for a whole session.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Shorten ids, image digests and commands
    pub truncate: bool,
    /// Emit ANSI colors in cells
    pub use_color: bool,
    pub time_format: String,
    pub timezone: TimeZoneSpec,
    /// Clock used for relative times; `None` reads the system clock.
    pub now: Option<DateTime<Utc>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            truncate: true,
            use_color: false,
            time_format: "%Y-%m-%d %H:%M:%S".to_string(),
            timezone: TimeZoneSpec::Local,
            now: None,
        }
    }
}

impl RenderOptions {
    /// Rejects strftime strings chrono cannot format (they would panic on display).
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(DopsError::Config(format!(
                "Invalid time format: '{}'",
                self.time_format
            )));
        }
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// What a resolver gets besides the record.
pub struct ResolveContext<'a> {
    pub options: &'a RenderOptions,
    pub theme: &'a Theme,
}

/// Lookup table from format key to [`FieldDef`].
pub struct FieldRegistry {
    fields: HashMap<&'static str, FieldDef>,
    theme: Theme,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    /// Registry with every built-in field and the default theme.
    pub fn new() -> Self {
        Self::with_theme(DOPS_THEME.clone())
    }

    pub fn with_theme(theme: Theme) -> Self {
        let fields = FIELDS.iter().map(|f| (f.key, *f)).collect();
        Self { fields, theme }
    }

    pub fn get(&self, key: &str) -> Option<&FieldDef> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// All fields in documentation order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        FIELDS.iter()
    }

    /// Display value of `key` for `record`; empty for unknown keys.
    pub fn resolve(&self, record: &ContainerRecord, key: &str, options: &RenderOptions) -> String {
        match self.fields.get(key) {
            Some(def) => {
                let ctx = ResolveContext {
                    options,
                    theme: &self.theme,
                };
                (def.resolve)(record, &ctx)
            }
            None => String::new(),
        }
    }

    /// Column header for `key`; unknown keys are shown upper-cased.
    pub fn header(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(def) => def.header.to_string(),
            None => key.to_uppercase(),
        }
    }
}

static FIELDS: &[FieldDef] = &[
    FieldDef {
        key: "ID",
        header: "CONTAINER ID",
        description: "Container ID",
        sort: SortKind::Text,
        resolve: resolve_id,
    },
    FieldDef {
        key: "Image",
        header: "IMAGE",
        description: "Image reference",
        sort: SortKind::Text,
        resolve: resolve_image,
    },
    FieldDef {
        key: "ImageName",
        header: "IMAGE",
        description: "Image name (without tag and registry)",
        sort: SortKind::Text,
        resolve: |r, _| ImageRef::parse(&r.image).name.to_string(),
    },
    FieldDef {
        key: "ImageTag",
        header: "TAG",
        description: "Image tag",
        sort: SortKind::Text,
        resolve: |r, _| ImageRef::parse(&r.image).tag(),
    },
    FieldDef {
        key: "Tag",
        header: "TAG",
        description: "Image tag",
        sort: SortKind::Text,
        resolve: |r, _| ImageRef::parse(&r.image).tag(),
    },
    FieldDef {
        key: "ImageRegistry",
        header: "REGISTRY",
        description: "Image registry",
        sort: SortKind::Text,
        resolve: |r, _| ImageRef::parse(&r.image).registry.to_string(),
    },
    FieldDef {
        key: "Registry",
        header: "REGISTRY",
        description: "Image registry",
        sort: SortKind::Text,
        resolve: |r, _| ImageRef::parse(&r.image).registry.to_string(),
    },
    FieldDef {
        key: "Command",
        header: "COMMAND",
        description: "Quoted command",
        sort: SortKind::Text,
        resolve: resolve_command,
    },
    FieldDef {
        key: "ShortCommand",
        header: "COMMAND",
        description: "Command without arguments",
        sort: SortKind::Text,
        resolve: |r, _| r.command.split_whitespace().next().unwrap_or("").to_string(),
    },
    FieldDef {
        key: "CreatedAt",
        header: "CREATED AT",
        description: "Time when the container was created",
        sort: SortKind::Created,
        resolve: |r, ctx| {
            ctx.options
                .timezone
                .format(r.created_at(), &ctx.options.time_format)
        },
    },
    FieldDef {
        key: "RunningFor",
        header: "CREATED",
        description: "Elapsed time since the container was created",
        sort: SortKind::Created,
        resolve: resolve_running_for,
    },
    FieldDef {
        key: "Ports",
        header: "PORTS",
        description: "Published ports (only the published ones, unlike docker)",
        sort: SortKind::Text,
        resolve: |r, _| published_ports(&r.ports),
    },
    FieldDef {
        key: "PublishedPorts",
        header: "PORTS",
        description: "Published ports",
        sort: SortKind::Text,
        resolve: |r, _| published_ports(&r.ports),
    },
    FieldDef {
        key: "LongPublishedPorts",
        header: "PORTS",
        description: "Published ports, full output with IP",
        sort: SortKind::Text,
        resolve: |r, _| long_published_ports(&r.ports),
    },
    FieldDef {
        key: "ShortPublishedPorts",
        header: "PORTS",
        description: "Published ports, shorter output than {{.Ports}}",
        sort: SortKind::Text,
        resolve: |r, _| short_published_ports(&r.ports),
    },
    FieldDef {
        key: "PublicPorts",
        header: "PUBLIC PORTS",
        description: "Only the public part of published ports",
        sort: SortKind::Text,
        resolve: |r, _| public_ports(&r.ports),
    },
    FieldDef {
        key: "ExposedPorts",
        header: "EXPOSED PORTS",
        description: "Exposed ports",
        sort: SortKind::Text,
        resolve: |r, _| exposed_ports(&r.ports, false),
    },
    FieldDef {
        key: "NotPublishedPorts",
        header: "NOT PUBLISHED",
        description: "Exposed but not published ports",
        sort: SortKind::Text,
        resolve: |r, _| exposed_ports(&r.ports, true),
    },
    FieldDef {
        key: "State",
        header: "STATE",
        description: "Container state",
        sort: SortKind::Text,
        resolve: |r, ctx| {
            let style = format!("state_{}", r.state.to_lowercase());
            ctx.theme.paint(&style, &r.state, ctx.options.use_color)
        },
    },
    FieldDef {
        key: "Status",
        header: "STATUS",
        description: "Container status with details",
        sort: SortKind::Text,
        resolve: |r, _| r.status.clone(),
    },
    FieldDef {
        key: "Size",
        header: "SIZE",
        description: "Container disk size",
        sort: SortKind::Size,
        resolve: resolve_size,
    },
    FieldDef {
        key: "Names",
        header: "NAMES",
        description: "Container names",
        sort: SortKind::Text,
        resolve: |r, _| {
            r.names
                .iter()
                .map(|n| n.trim_start_matches('/'))
                .collect::<Vec<_>>()
                .join(",")
        },
    },
    FieldDef {
        key: "Labels",
        header: "LABELS",
        description: "All labels assigned to the container",
        sort: SortKind::Text,
        resolve: |r, _| {
            r.labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",")
        },
    },
    FieldDef {
        key: "LabelKeys",
        header: "LABELS",
        description: "Label keys only",
        sort: SortKind::Text,
        resolve: |r, _| r.labels.keys().cloned().collect::<Vec<_>>().join(","),
    },
    FieldDef {
        key: "Mounts",
        header: "MOUNTS",
        description: "Names of the volumes mounted in this container",
        sort: SortKind::Text,
        resolve: |r, _| {
            r.mounts
                .iter()
                .map(|m| m.name.clone().unwrap_or_else(|| m.source.clone()))
                .collect::<Vec<_>>()
                .join(",")
        },
    },
    FieldDef {
        key: "Networks",
        header: "NETWORKS",
        description: "Names of the networks attached to this container",
        sort: SortKind::Text,
        resolve: |r, _| {
            r.network_settings
                .networks
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(",")
        },
    },
    FieldDef {
        key: "IP",
        header: "IP",
        description: "Internal IP address",
        sort: SortKind::Text,
        resolve: |r, _| {
            r.network_settings
                .networks
                .values()
                .filter(|n| !n.ip_address.is_empty())
                .map(|n| n.ip_address.clone())
                .collect::<Vec<_>>()
                .join(",")
        },
    },
];

fn resolve_id(r: &ContainerRecord, ctx: &ResolveContext<'_>) -> String {
    if ctx.options.truncate {
        r.id.chars().take(SHORT_ID_LEN).collect()
    } else {
        r.id.clone()
    }
}

fn resolve_image(r: &ContainerRecord, ctx: &ResolveContext<'_>) -> String {
    match r.image.strip_prefix("sha256:") {
        Some(hash) if ctx.options.truncate => hash.chars().take(SHORT_ID_LEN).collect(),
        _ => r.image.clone(),
    }
}

fn resolve_command(r: &ContainerRecord, ctx: &ResolveContext<'_>) -> String {
    let command = if ctx.options.truncate {
        truncate_to_width(&r.command, COMMAND_WIDTH)
    } else {
        r.command.clone()
    };
    format!("\"{}\"", command)
}

fn resolve_running_for(r: &ContainerRecord, ctx: &ResolveContext<'_>) -> String {
    let elapsed = ctx
        .options
        .now()
        .signed_duration_since(r.created_at())
        .to_std()
        .unwrap_or_default();
    timeago::Formatter::new().convert(elapsed)
}

fn resolve_size(r: &ContainerRecord, _ctx: &ResolveContext<'_>) -> String {
    let human = |bytes: i64| format_size(bytes.max(0) as u64, DECIMAL);
    match (r.size_rw, r.size_root_fs) {
        (Some(rw), Some(root)) => format!("{} (virtual {})", human(rw), human(root)),
        (Some(rw), None) => human(rw),
        (None, Some(root)) => format!("(virtual {})", human(root)),
        (None, None) => String::new(),
    }
}

/// An image reference split into `registry/name:tag@digest`.
#[derive(Debug, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub registry: &'a str,
    pub name: &'a str,
    pub tag: &'a str,
    pub digest: &'a str,
}

impl<'a> ImageRef<'a> {
    pub fn parse(reference: &'a str) -> Self {
        if reference.starts_with("sha256:") {
            return ImageRef {
                registry: "",
                name: reference,
                tag: "",
                digest: "",
            };
        }

        let (rest, digest) = reference.split_once('@').unwrap_or((reference, ""));

        let (registry, remainder) = match rest.split_once('/') {
            Some((first, tail))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (first, tail)
            }
            _ => ("", rest),
        };

        let last_slash = remainder.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (name, tag) = match remainder[last_slash..].rfind(':') {
            Some(i) => (
                &remainder[..last_slash + i],
                &remainder[last_slash + i + 1..],
            ),
            None => (remainder, ""),
        };

        ImageRef {
            registry,
            name,
            tag,
            digest,
        }
    }

    /// The tag, with docker's implicit `latest` for named references.
    pub fn tag(&self) -> String {
        if !self.tag.is_empty() {
            self.tag.to_string()
        } else if self.digest.is_empty() && !self.name.starts_with("sha256:") {
            "latest".to_string()
        } else {
            String::new()
        }
    }
}

fn sorted_ports(ports: &[PortBinding]) -> Vec<&PortBinding> {
    let mut sorted: Vec<&PortBinding> = ports.iter().collect();
    sorted.sort_by(|a, b| {
        (a.public_port, a.private_port, &a.protocol, &a.ip).cmp(&(
            b.public_port,
            b.private_port,
            &b.protocol,
            &b.ip,
        ))
    });
    sorted
}

/// Joins values in first-seen order, dropping duplicates (IPv4 and IPv6
/// bindings of the same port would otherwise show twice).
fn join_unique(values: impl Iterator<Item = String>) -> String {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| seen.insert(v.clone()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn published_ports(ports: &[PortBinding]) -> String {
    join_unique(sorted_ports(ports).into_iter().filter_map(|p| {
        p.public_port
            .map(|public| format!("{}->{}/{}", public, p.private_port, p.protocol))
    }))
}

fn long_published_ports(ports: &[PortBinding]) -> String {
    join_unique(sorted_ports(ports).into_iter().filter_map(|p| {
        let public = p.public_port?;
        let ip = match p.ip.as_deref() {
            Some(ip) if ip.contains(':') => format!("[{}]", ip),
            Some(ip) => ip.to_string(),
            None => String::new(),
        };
        Some(format!(
            "{}:{}->{}/{}",
            ip, public, p.private_port, p.protocol
        ))
    }))
}

fn short_published_ports(ports: &[PortBinding]) -> String {
    join_unique(sorted_ports(ports).into_iter().filter_map(|p| {
        let public = p.public_port?;
        Some(if p.protocol == "tcp" || p.protocol.is_empty() {
            format!("{}->{}", public, p.private_port)
        } else {
            format!("{}->{}/{}", public, p.private_port, p.protocol)
        })
    }))
}

fn public_ports(ports: &[PortBinding]) -> String {
    join_unique(
        sorted_ports(ports)
            .into_iter()
            .filter_map(|p| p.public_port.map(|public| public.to_string())),
    )
}

fn exposed_ports(ports: &[PortBinding], only_unpublished: bool) -> String {
    let published: BTreeSet<(u16, &str)> = ports
        .iter()
        .filter(|p| p.public_port.is_some())
        .map(|p| (p.private_port, p.protocol.as_str()))
        .collect();

    let mut private: Vec<(u16, &str)> = ports
        .iter()
        .map(|p| (p.private_port, p.protocol.as_str()))
        .filter(|key| !only_unpublished || !published.contains(key))
        .collect();
    private.sort();
    private.dedup();

    private
        .into_iter()
        .map(|(port, proto)| format!("{}/{}", port, proto))
        .collect::<Vec<_>>()
        .join(", ")
}
