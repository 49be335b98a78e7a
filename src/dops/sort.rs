//! # Sort Engine
//!
//! Multi-key stable sort over container records. Keys are evaluated in order
//! and the first one that tells two records apart decides. Records that tie on
//! every key keep their input order, which matters because ties are the norm
//! (a dozen containers all `running`).

use crate::error::{DopsError, Result};
use crate::fields::{FieldRegistry, RenderOptions, SortKind};
use crate::model::ContainerRecord;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DopsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(DopsError::Config(format!(
                "Invalid sort direction: '{}' (expected ASC or DESC)",
                s
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Pairs `--sort` fields with `--sort-direction` values by position.
/// Fields without a matching direction sort ascending.
pub fn build_sort_keys(fields: &[String], directions: &[SortDirection]) -> Vec<SortKey> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let direction = directions.get(i).copied().unwrap_or_default();
            SortKey::new(field.clone(), direction)
        })
        .collect()
}

/// Stably sorts `records` by `keys`. Keys naming unknown fields are skipped.
pub fn sort_records(
    mut records: Vec<ContainerRecord>,
    keys: &[SortKey],
    registry: &FieldRegistry,
    options: &RenderOptions,
) -> Vec<ContainerRecord> {
    let active: Vec<(&SortKey, SortKind)> = keys
        .iter()
        .filter_map(|key| match registry.get(&key.field) {
            Some(def) => Some((key, def.sort)),
            None => {
                tracing::debug!(field = %key.field, "skipping unknown sort field");
                None
            }
        })
        .collect();

    if active.is_empty() {
        return records;
    }

    // compare on plain text; color codes would reorder values
    let plain = RenderOptions {
        use_color: false,
        ..options.clone()
    };

    records.sort_by(|a, b| {
        for (key, kind) in &active {
            let ord = compare(a, b, &key.field, *kind, registry, &plain);
            let ord = match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    records
}

fn compare(
    a: &ContainerRecord,
    b: &ContainerRecord,
    field: &str,
    kind: SortKind,
    registry: &FieldRegistry,
    options: &RenderOptions,
) -> Ordering {
    match kind {
        SortKind::Created => a.created.cmp(&b.created),
        SortKind::Size => a.size_rw.unwrap_or(0).cmp(&b.size_rw.unwrap_or(0)),
        SortKind::Text => registry
            .resolve(a, field, options)
            .cmp(&registry.resolve(b, field, options)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rec(id: &str, name: &str, state: &str, created: i64, size: Option<i64>) -> ContainerRecord {
        serde_json::from_value(serde_json::json!({
            "Id": id,
            "Names": [format!("/{}", name)],
            "State": state,
            "Created": created,
            "SizeRw": size,
        }))
        .unwrap()
    }

    fn ids(records: &[ContainerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn sample() -> Vec<ContainerRecord> {
        vec![
            rec("a", "web", "running", 30, Some(500)),
            rec("b", "db", "exited", 10, Some(20)),
            rec("c", "cache", "running", 20, None),
            rec("d", "api", "exited", 40, Some(1000)),
        ]
    }

    fn sorted(keys: &[SortKey]) -> Vec<ContainerRecord> {
        sort_records(sample(), keys, &FieldRegistry::new(), &RenderOptions::default())
    }

    #[test]
    fn empty_keys_keep_input_order() {
        assert_eq!(ids(&sorted(&[])), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn text_sort_ascending_and_descending() {
        assert_eq!(ids(&sorted(&[SortKey::asc("Names")])), vec!["d", "c", "b", "a"]);
        assert_eq!(ids(&sorted(&[SortKey::desc("Names")])), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn ties_keep_input_order() {
        // a,c running; b,d exited
        assert_eq!(ids(&sorted(&[SortKey::asc("State")])), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn second_key_breaks_ties_only() {
        let keys = [SortKey::asc("State"), SortKey::desc("CreatedAt")];
        assert_eq!(ids(&sorted(&keys)), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn chronological_and_numeric_kinds() {
        assert_eq!(ids(&sorted(&[SortKey::asc("RunningFor")])), vec!["b", "c", "a", "d"]);
        assert_eq!(ids(&sorted(&[SortKey::desc("Size")])), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn unknown_sort_field_is_skipped() {
        let keys = [SortKey::asc("Bogus"), SortKey::asc("Names")];
        assert_eq!(ids(&sorted(&keys)), vec!["d", "c", "b", "a"]);
        assert_eq!(ids(&sorted(&[SortKey::desc("Bogus")])), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn directions_pair_by_position() {
        let keys = build_sort_keys(
            &["State".to_string(), "Names".to_string()],
            &[SortDirection::Desc],
        );
        assert_eq!(keys, vec![SortKey::desc("State"), SortKey::asc("Names")]);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("up".parse::<SortDirection>().is_err());
    }

    proptest! {
        #[test]
        fn all_equal_keys_preserve_order(states in proptest::collection::vec("running|exited", 0..20)) {
            // only the sort key is shared; states and creation times differ
            let records: Vec<ContainerRecord> = states
                .iter()
                .enumerate()
                .map(|(i, s)| rec(&i.to_string(), "same", s, (20 - i) as i64, None))
                .collect();
            let expected: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            let out = sort_records(
                records,
                &[SortKey::asc("Names"), SortKey::desc("Names")],
                &FieldRegistry::new(),
                &RenderOptions::default(),
            );
            let got: Vec<String> = out.iter().map(|r| r.id.clone()).collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn no_keys_keep_any_input_order(
            rows in proptest::collection::vec(
                ("[a-z]{1,8}", "running|exited|paused", 0i64..1_000, proptest::option::of(0i64..1_000_000)),
                0..20,
            )
        ) {
            let records: Vec<ContainerRecord> = rows
                .iter()
                .enumerate()
                .map(|(i, (name, state, created, size))| rec(&i.to_string(), name, state, *created, *size))
                .collect();
            let expected: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            let out = sort_records(records, &[], &FieldRegistry::new(), &RenderOptions::default());
            let got: Vec<String> = out.iter().map(|r| r.id.clone()).collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn sorted_by_state_is_grouped(states in proptest::collection::vec("running|exited|paused", 0..20)) {
            let records: Vec<ContainerRecord> = states
                .iter()
                .enumerate()
                .map(|(i, s)| rec(&i.to_string(), "n", s, i as i64, None))
                .collect();
            let out = sort_records(records, &[SortKey::asc("State")], &FieldRegistry::new(), &RenderOptions::default());
            for pair in out.windows(2) {
                prop_assert!(pair[0].state <= pair[1].state);
                if pair[0].state == pair[1].state {
                    prop_assert!(pair[0].created < pair[1].created);
                }
            }
        }
    }
}
