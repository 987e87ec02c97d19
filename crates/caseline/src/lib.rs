// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Caseline
//!
//! Scrapes the CDC COVID case tracker and exports the snapshot to
//! InfluxDB v2 as Line Protocol.
//!
//! This crate provides:
//! - A scraper for the public case tracker JSON endpoint
//! - Key classification (rename/tag/ignore) of flat region records
//! - Line Protocol generation with falsy-value filtering
//! - An InfluxDB v2 write client with bucket and auth preflights
//! - YAML-based configuration for the export pipeline
//!
//! # Overview
//!
//! The transform is memoized per snapshot: lines are rendered once per
//! fetch, and `reset()` discards everything for a fresh pull.
//!
//! ```text
//! CDC endpoint --> CdcCasesScraper --> FieldPolicy --> Vec<String> --> InfluxExporter
//!     (JSON)       (fetch + cache)    (tags/fields)   (line protocol)   (/api/v2/write)
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod exporter;
pub mod http;
pub mod influx;
pub mod mapping;
pub mod scraper;

pub use auth::TokenAuth;
pub use config::ExportConfig;
pub use error::{Error, Result};
pub use exporter::{InfluxExporter, Precision, WriteResult};
pub use http::RestClient;
pub use mapping::FieldPolicy;
pub use scraper::CdcCasesScraper;
