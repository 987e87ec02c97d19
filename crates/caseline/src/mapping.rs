// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key classification: flat record keys to Line Protocol tags and fields.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::influx;

/// Ordered tag and field pairs mapped from one record.
pub type TagsAndFields = (Vec<(String, String)>, Vec<(String, String)>);

/// Immutable key-classification tables applied to every record of a batch.
///
/// - `key_map` renames raw keys to canonical output keys; unmapped keys pass
///   through under their raw name.
/// - `tag_keys` selects which raw keys become tags instead of fields.
/// - `ignored_keys` drops raw keys entirely.
#[derive(Debug, Clone)]
pub struct FieldPolicy {
    key_map: HashMap<String, String>,
    tag_keys: HashSet<String>,
    ignored_keys: HashSet<String>,
}

impl FieldPolicy {
    /// Builds a policy, rejecting tables that classify a key as both tag
    /// and ignored.
    pub fn new(
        key_map: &[(&str, &str)],
        tag_keys: &[&str],
        ignored_keys: &[&str],
    ) -> Result<Self> {
        let tag_keys: HashSet<String> = tag_keys.iter().map(|k| k.to_string()).collect();
        let ignored_keys: HashSet<String> = ignored_keys.iter().map(|k| k.to_string()).collect();

        let mut overlap: Vec<&str> = tag_keys
            .intersection(&ignored_keys)
            .map(|k| k.as_str())
            .collect();
        if !overlap.is_empty() {
            overlap.sort_unstable();
            return Err(Error::PolicyOverlap(overlap.join(", ")));
        }

        Ok(FieldPolicy {
            key_map: key_map
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
            tag_keys,
            ignored_keys,
        })
    }

    /// Canonical output key for a raw key (identity when unmapped).
    pub fn canonical_key<'a>(&'a self, raw: &'a str) -> &'a str {
        self.key_map.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// True when the raw key is classified as a tag.
    pub fn is_tag(&self, raw: &str) -> bool {
        self.tag_keys.contains(raw)
    }

    /// True when the raw key is dropped from output.
    pub fn is_ignored(&self, raw: &str) -> bool {
        self.ignored_keys.contains(raw)
    }

    /// Classifies one record into ordered (tags, fields) pairs.
    ///
    /// Iteration follows the record's own key order. Keys that are ignored,
    /// or whose values fail [`influx::is_emittable`], produce nothing.
    pub fn map_record(&self, record: &Map<String, Value>) -> TagsAndFields {
        let mut tags = Vec::new();
        let mut fields = Vec::new();
        for (key, value) in record {
            if !influx::is_emittable(value) || self.is_ignored(key) {
                continue;
            }
            let pair = (
                self.canonical_key(key).to_string(),
                influx::render_scalar(value),
            );
            if self.is_tag(key) {
                tags.push(pair);
            } else {
                fields.push(pair);
            }
        }
        (tags, fields)
    }
}

/// Renders a batch of records into Line Protocol lines.
///
/// Pure function: one line per record, in batch order, all sharing the same
/// measurement and timestamp.
pub fn render_lines(
    policy: &FieldPolicy,
    records: &[Map<String, Value>],
    measurement: &str,
    timestamp: i64,
) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let (tags, fields) = policy.map_record(record);
            influx::build_line(measurement, &tags, &fields, timestamp)
        })
        .collect()
}
