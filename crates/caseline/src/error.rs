// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared across the scrape and export pipeline.

use std::fmt;

use crate::auth::VALID_AUTH_SCHEMES;

/// Errors returned by caseline operations.
///
/// Covers configuration loading, the scrape transport/decode path, and the
/// InfluxDB write path. All fallible APIs in this crate return [`Result`].
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A required configuration key is absent from the YAML file.
    MissingConfigKey {
        /// Name of the missing key.
        key: &'static str,
        /// What the key configures.
        description: &'static str,
    },
    /// A field policy classifies the same key as both tag and ignored.
    PolicyOverlap(String),
    /// Unknown authorization scheme for the sink API.
    InvalidAuthScheme(String),
    /// Unknown timestamp precision string.
    InvalidPrecision(String),
    /// Config file I/O failed.
    Io(std::io::Error),
    /// YAML parsing failed.
    Yaml(serde_yaml::Error),

    // ========================================================================
    // Scrape Errors
    // ========================================================================
    /// HTTP request failed (connect, send, or timeout).
    Transport(reqwest::Error),
    /// Response body is not decodable JSON, or not the documented shape.
    Parse(serde_json::Error),
    /// Snapshot update time does not match the expected format.
    TimestampParse {
        /// Raw update string from the snapshot metadata.
        value: String,
        /// Underlying parse error.
        source: chrono::ParseError,
    },

    // ========================================================================
    // Sink Errors
    // ========================================================================
    /// The target bucket does not exist in the organization.
    BucketNotFound(String),
    /// The sink rejected the token on the authentication probe.
    AuthenticationFailed {
        /// Target bucket of the exporter performing the probe.
        bucket: String,
        /// HTTP status returned by the probe.
        status: u16,
    },
    /// Requested behavior is recognized but not implemented.
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration
            Error::MissingConfigKey { key, description } => {
                write!(f, "Config is missing required key: {} ({})", key, description)
            }
            Error::PolicyOverlap(keys) => {
                write!(f, "Field policy tag keys and ignored keys overlap: {}", keys)
            }
            Error::InvalidAuthScheme(scheme) => write!(
                f,
                "'{}' is an invalid auth scheme (valid schemes: {})",
                scheme,
                VALID_AUTH_SCHEMES.join(", ")
            ),
            Error::InvalidPrecision(value) => {
                write!(f, "'{}' is an invalid precision (valid: ms, s, us, ns)", value)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Yaml(e) => write!(f, "YAML parse error: {}", e),
            // Scrape
            Error::Transport(e) => write!(f, "HTTP transport error: {}", e),
            Error::Parse(e) => write!(f, "JSON decode error: {}", e),
            Error::TimestampParse { value, source } => {
                write!(f, "Cannot parse snapshot update time '{}': {}", value, source)
            }
            // Sink
            Error::BucketNotFound(bucket) => {
                write!(f, "The specified bucket does not exist: {}", bucket)
            }
            Error::AuthenticationFailed { bucket, status } => {
                write!(f, "Error authenticating to bucket: {} (HTTP {})", bucket, status)
            }
            Error::Unsupported(what) => write!(f, "Not supported: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Yaml(e) => Some(e),
            Error::Transport(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::TimestampParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Yaml(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e)
    }
}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
