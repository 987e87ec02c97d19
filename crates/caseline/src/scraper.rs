// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDC COVID case tracker scraper.
//!
//! Fetches the `US_MAP_DATA` snapshot from the public case tracker endpoint
//! and renders one Line Protocol line per region record. Rendering is
//! memoized per snapshot: lines are produced once after a fetch, and
//! [`CdcCasesScraper::reset`] discards everything so the next update pulls
//! and renders fresh data.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::header::{HeaderValue, ACCEPT};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::http::RestClient;
use crate::mapping::{render_lines, FieldPolicy};

/// Base URL of the public case tracker.
pub const CDC_BASE_URL: &str = "https://covid.cdc.gov/covid-data-tracker";

/// Snapshot endpoint path on the tracker.
const AJAX_ENDPOINT: &str = "/COVIDData/getAjaxData";

/// Dataset selector for the national map snapshot.
const MAP_DATA_ID: &str = "US_MAP_DATA";

/// Snapshot update-time format, e.g. `"Mar  7 2023  3:08PM"`.
const UPDATE_TIME_FORMAT: &str = "%b %d %Y %I:%M%p";

/// Raw snapshot key to canonical output key.
const KEY_MAP: [(&str, &str); 16] = [
    ("abbr", "abbr"),
    ("fips", "fips"),
    ("name", "jurisdiction"),
    ("tot_cases", "total_cases"),
    ("tot_death", "total_deaths"),
    ("death_100k", "death_per_100k"),
    ("new_cases07", "cases_7_days"),
    ("new_deaths07", "deaths_7_days"),
    ("incidence", "rate_per_100k"),
    ("prob_death", "probable_deaths"),
    ("conf_death", "confirmed_deaths"),
    ("prob_cases", "probable_cases"),
    ("conf_cases", "confirmed_cases"),
    ("id", "id"),
    ("tot_cases_last_24_hours", "total_cases_last_24h"),
    ("tot_death_last_24_hours", "total_death_last_24h"),
];

/// Keys emitted as tags.
const TAG_KEYS: [&str; 3] = ["abbr", "fips", "name"];

/// Keys dropped from output.
const IGNORED_KEYS: [&str; 11] = [
    "state_level_community_transmission",
    "us_trend_new_case",
    "us_trend_new_death",
    "us_trend_maxdate",
    "mmwrweek_end",
    "change",
    "change_text",
    "burden",
    "burden_text",
    "data_as_of",
    "data_period_end",
];

/// Snapshot payload shape served by the tracker endpoint.
#[derive(Debug, Clone, Deserialize)]
struct Snapshot {
    #[serde(rename = "CSVInfo")]
    info: CsvInfo,
    #[serde(rename = "US_MAP_DATA")]
    regions: Vec<Map<String, Value>>,
}

/// Snapshot metadata block (`CSVInfo`).
#[derive(Debug, Clone, Deserialize)]
pub struct CsvInfo {
    /// Update time in the tracker's own format, e.g. `"Mar  7 2023  3:08PM"`.
    pub update: String,
}

/// Scraper for the CDC COVID case tracker.
#[derive(Debug, Clone)]
pub struct CdcCasesScraper {
    client: RestClient,
    measurement: String,
    policy: FieldPolicy,
    data: Option<Snapshot>,
    updated_at: Option<i64>,
    lines: Vec<String>,
}

impl CdcCasesScraper {
    /// Scraper against the public endpoint with default transport settings.
    pub fn new(measurement: impl Into<String>) -> Result<Self> {
        let client = RestClient::builder(CDC_BASE_URL)
            .default_header(ACCEPT, HeaderValue::from_static("application/json"))
            .build()?;
        Self::with_client(client, measurement)
    }

    /// Scraper configured from the export config (measurement and transport
    /// timeout).
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        let client = RestClient::builder(CDC_BASE_URL)
            .default_header(ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(client, config.measurement.as_str())
    }

    /// Scraper over a caller-supplied transport.
    pub fn with_client(client: RestClient, measurement: impl Into<String>) -> Result<Self> {
        Ok(CdcCasesScraper {
            client,
            measurement: measurement.into(),
            policy: FieldPolicy::new(&KEY_MAP, &TAG_KEYS, &IGNORED_KEYS)?,
            data: None,
            updated_at: None,
            lines: Vec::new(),
        })
    }

    /// Fetches and decodes a fresh snapshot, discarding any cached one
    /// first.
    pub fn fetch(&mut self) -> Result<()> {
        if self.data.is_some() {
            self.reset();
        }
        log::debug!("fetching case tracker snapshot from {}", self.client.base_url());
        let snapshot: Snapshot = self
            .client
            .get_json(AJAX_ENDPOINT, &[("id", MAP_DATA_ID)])?;
        log::info!(
            "fetched snapshot: {} regions, updated {}",
            snapshot.regions.len(),
            snapshot.info.update
        );
        self.data = Some(snapshot);
        Ok(())
    }

    /// Seeds the scraper from an already-decoded snapshot payload instead of
    /// fetching. Replaces any cached state.
    pub fn apply_snapshot(&mut self, payload: Value) -> Result<()> {
        self.reset();
        self.data = Some(serde_json::from_value(payload)?);
        Ok(())
    }

    /// Brings lines and metadata up to date with the cached snapshot,
    /// fetching one when nothing is cached.
    ///
    /// Rendering runs only when no lines exist yet; repeat calls on the same
    /// snapshot leave the line sequence untouched.
    pub fn update(&mut self) -> Result<()> {
        if self.data.is_none() {
            self.fetch()?;
        }
        if let Some(snapshot) = &self.data {
            let updated_at = parse_update_time(&snapshot.info.update)?;
            self.updated_at = Some(updated_at);
            if self.lines.is_empty() {
                self.lines = render_lines(
                    &self.policy,
                    &snapshot.regions,
                    &self.measurement,
                    updated_at,
                );
                log::info!(
                    "rendered {} lines from {} regions",
                    self.lines.len(),
                    snapshot.regions.len()
                );
            }
        }
        Ok(())
    }

    /// Discards the cached snapshot, timestamp, and rendered lines.
    pub fn reset(&mut self) {
        self.data = None;
        self.updated_at = None;
        self.lines.clear();
    }

    /// Measurement name used for every generated line.
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Snapshot metadata, once a snapshot is cached.
    pub fn metadata(&self) -> Option<&CsvInfo> {
        self.data.as_ref().map(|snapshot| &snapshot.info)
    }

    /// Number of region records in the cached snapshot.
    pub fn region_count(&self) -> usize {
        self.data.as_ref().map_or(0, |snapshot| snapshot.regions.len())
    }

    /// Snapshot update time as Unix epoch seconds, once updated.
    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Rendered Line Protocol lines (empty until [`update`](Self::update)).
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with newlines: the exact write payload.
    pub fn line_protocol_data(&self) -> String {
        self.lines.join("\n")
    }
}

/// Parses the tracker's update time into Unix epoch seconds.
///
/// The raw value carries no zone; it is interpreted as UTC so output is
/// machine-independent.
fn parse_update_time(raw: &str) -> Result<i64> {
    let parsed = NaiveDateTime::parse_from_str(raw, UPDATE_TIME_FORMAT).map_err(|source| {
        Error::TimestampParse {
            value: raw.to_string(),
            source,
        }
    })?;
    Ok(parsed.and_utc().timestamp())
}
