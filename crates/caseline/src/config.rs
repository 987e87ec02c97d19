// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for the export pipeline.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default outbound request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Export pipeline configuration.
///
/// Loaded from a YAML file; the five connection/measurement keys are
/// required and produce a descriptive error when absent.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Measurement name used in generated Line Protocol data.
    pub measurement: String,
    /// Base URL of the InfluxDB instance (e.g. "https://localhost:8086").
    pub influx_url: String,
    /// InfluxDB organization the target bucket belongs to.
    pub influx_org: String,
    /// Bucket that Line Protocol points are written to.
    pub influx_bucket: String,
    /// API token authorizing GET and POST calls.
    pub influx_token: String,
    /// Verify TLS certificates on HTTPS requests (default true).
    pub https_verify: bool,
    /// Outbound request timeout in seconds (default 30).
    pub request_timeout_secs: u64,
}

/// Raw YAML shape before required-key validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    measurement: Option<String>,
    influx_url: Option<String>,
    influx_org: Option<String>,
    influx_bucket: Option<String>,
    influx_token: Option<String>,
    https_verify: Option<bool>,
    request_timeout_secs: Option<u64>,
}

impl ExportConfig {
    /// Parses configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        Ok(ExportConfig {
            measurement: require(
                raw.measurement,
                "measurement",
                "Measurement name to use in line protocol data generation",
            )?,
            influx_url: require(
                raw.influx_url,
                "influx_url",
                "Base URL of the InfluxDB instance (e.g.: \"https://localhost:8086\")",
            )?,
            influx_org: require(
                raw.influx_org,
                "influx_org",
                "Name of InfluxDB organization the target bucket belongs to",
            )?,
            influx_bucket: require(
                raw.influx_bucket,
                "influx_bucket",
                "Name of bucket to write line protocol data points to",
            )?,
            influx_token: require(
                raw.influx_token,
                "influx_token",
                "API token to use for authorization of GET and POST calls",
            )?,
            https_verify: raw.https_verify.unwrap_or(true),
            request_timeout_secs: raw
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Parses configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

fn require(value: Option<String>, key: &'static str, description: &'static str) -> Result<String> {
    value.ok_or(Error::MissingConfigKey { key, description })
}
