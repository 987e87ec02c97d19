// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB v2 write client.
//!
//! Targets one organization/bucket pair. `write` runs the bucket-existence
//! preflight before posting; `is_authenticated` probes the token against
//! the bucket listing endpoint.

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::auth::TokenAuth;
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::http::RestClient;

/// Path prefix of every v2 API endpoint.
pub const API_ROOT: &str = "/api/v2";

/// Timestamp precision accepted by the write endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Milliseconds (`ms`), the write endpoint's default.
    Milliseconds,
    /// Seconds (`s`).
    Seconds,
    /// Microseconds (`us`).
    Microseconds,
    /// Nanoseconds (`ns`).
    Nanoseconds,
}

impl Precision {
    /// Wire value for the `precision` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Microseconds => "us",
            Precision::Nanoseconds => "ns",
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Milliseconds
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            "us" => Ok(Precision::Microseconds),
            "ns" => Ok(Precision::Nanoseconds),
            other => Err(Error::InvalidPrecision(other.to_string())),
        }
    }
}

/// Acknowledgment from the write endpoint.
///
/// The status is reported as-is; the sink answers 204 on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// HTTP status returned for the write.
    pub status: u16,
}

impl WriteResult {
    /// True when the sink accepted the batch.
    pub fn accepted(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Bucket listing response (only the pieces the preflights read).
#[derive(Debug, Deserialize)]
struct BucketsResponse {
    buckets: Option<Vec<Bucket>>,
}

/// One bucket entry from the listing.
#[derive(Debug, Deserialize)]
struct Bucket {
    name: String,
}

/// Client for one InfluxDB v2 organization/bucket pair.
#[derive(Debug, Clone)]
pub struct InfluxExporter {
    client: RestClient,
    org: String,
    bucket: String,
}

impl InfluxExporter {
    /// Exporter over a caller-supplied transport.
    ///
    /// The client's base URL must already include the [`API_ROOT`] prefix.
    pub fn new(client: RestClient, org: impl Into<String>, bucket: impl Into<String>) -> Self {
        InfluxExporter {
            client,
            org: org.into(),
            bucket: bucket.into(),
        }
    }

    /// Exporter configured from the export config (URL, token, org, bucket,
    /// TLS verification, timeout).
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        let base_url = format!("{}{}", config.influx_url.trim_end_matches('/'), API_ROOT);
        let client = RestClient::builder(&base_url)
            .default_header(ACCEPT, HeaderValue::from_static("application/json"))
            .default_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .auth(TokenAuth::new(config.influx_token.as_str()))
            .verify_tls(config.https_verify)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::new(
            client,
            config.influx_org.as_str(),
            config.influx_bucket.as_str(),
        ))
    }

    /// Target organization.
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Target bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Checks that the target bucket exists in the organization.
    ///
    /// Lists buckets filtered by name; an empty or missing bucket list is
    /// [`Error::BucketNotFound`].
    pub fn bucket_exists(&self) -> Result<()> {
        let response: BucketsResponse = self
            .client
            .get_json("/buckets", &[("name", self.bucket.as_str())])?;
        match response.buckets {
            Some(buckets) if !buckets.is_empty() => {
                for bucket in &buckets {
                    log::debug!("bucket listing match: {}", bucket.name);
                }
                Ok(())
            }
            _ => Err(Error::BucketNotFound(self.bucket.clone())),
        }
    }

    /// Verifies the token against the bucket listing endpoint.
    ///
    /// Any non-2xx status is [`Error::AuthenticationFailed`].
    pub fn is_authenticated(&self) -> Result<()> {
        let response = self.client.get("/buckets", &[])?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::AuthenticationFailed {
                bucket: self.bucket.clone(),
                status: status.as_u16(),
            })
        }
    }

    /// Writes a Line Protocol payload to the bucket.
    ///
    /// Compression is scaffolded but not implemented: a `true` flag fails
    /// before any request is made. The bucket preflight runs before the
    /// write itself.
    pub fn write(
        &self,
        payload: &str,
        precision: Precision,
        compression: bool,
    ) -> Result<WriteResult> {
        if compression {
            return Err(Error::Unsupported("compression is not implemented yet"));
        }
        self.bucket_exists()?;

        let params = [
            ("bucket", self.bucket.as_str()),
            ("org", self.org.as_str()),
            ("precision", precision.as_str()),
        ];
        let response = self.client.post("/write", &params, payload.to_string())?;
        let status = response.status().as_u16();
        log::info!(
            "wrote {} bytes to bucket '{}' with precision '{}' (HTTP {})",
            payload.len(),
            self.bucket,
            precision.as_str(),
            status
        );
        Ok(WriteResult { status })
    }
}
