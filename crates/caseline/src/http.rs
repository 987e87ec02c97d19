// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Minimal blocking REST transport shared by the scraper and the exporter.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::auth::TokenAuth;
use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::Result;

/// Blocking HTTP client bound to one API base URL.
///
/// Wraps `reqwest::blocking::Client` with the pieces every caller here
/// needs: base-URL joining, optional token auth, and a JSON decode that
/// keeps transport failures distinct from malformed-body failures.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    client: Client,
    auth: Option<TokenAuth>,
}

/// Builder for [`RestClient`].
#[derive(Debug)]
pub struct RestClientBuilder {
    base_url: String,
    headers: HeaderMap,
    auth: Option<TokenAuth>,
    timeout: Duration,
    verify_tls: bool,
}

impl RestClient {
    /// Starts a builder for the given base URL (trailing slashes trimmed).
    pub fn builder(base_url: &str) -> RestClientBuilder {
        RestClientBuilder {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
            auth: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            verify_tls: true,
        }
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET to `endpoint` (a path joined onto the base URL).
    pub fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);
        let mut request = self.client.get(url).query(params);
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth.header_value());
        }
        Ok(request.send()?)
    }

    /// Issues a POST with a text body.
    pub fn post(&self, endpoint: &str, params: &[(&str, &str)], body: String) -> Result<Response> {
        let url = self.url(endpoint);
        log::debug!("POST {} ({} bytes)", url, body.len());
        let mut request = self.client.post(url).query(params).body(body);
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth.header_value());
        }
        Ok(request.send()?)
    }

    /// GETs `endpoint` and decodes the body as JSON.
    ///
    /// Transport failures map to [`crate::Error::Transport`]; a body that is
    /// not valid JSON for `T` maps to [`crate::Error::Parse`].
    pub fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.get(endpoint, params)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

impl RestClientBuilder {
    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches token auth to every request.
    pub fn auth(mut self, auth: TokenAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Overrides the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification when `false`.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<RestClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(self.headers)
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()?;
        Ok(RestClient {
            base_url: self.base_url,
            client,
            auth: self.auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let client = RestClient::builder("http://localhost:8086///")
            .build()
            .expect("build client");
        assert_eq!(client.base_url(), "http://localhost:8086");
    }

    #[test]
    fn endpoint_joins_onto_base_url() {
        let client = RestClient::builder("http://localhost:8086/api/v2/")
            .build()
            .expect("build client");
        assert_eq!(client.url("/buckets"), "http://localhost:8086/api/v2/buckets");
    }
}
