// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Token authentication for the InfluxDB v2 API.

use crate::error::{Error, Result};

/// Authorization schemes accepted by the sink API.
pub const VALID_AUTH_SCHEMES: [&str; 1] = ["Token"];

/// Token credential rendered into the `Authorization` request header.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    scheme: &'static str,
    token: String,
}

impl TokenAuth {
    /// Credential with the default `Token` scheme.
    pub fn new(token: impl Into<String>) -> Self {
        TokenAuth {
            scheme: VALID_AUTH_SCHEMES[0],
            token: token.into(),
        }
    }

    /// Credential with an explicit scheme, validated against
    /// [`VALID_AUTH_SCHEMES`].
    pub fn with_scheme(scheme: &str, token: impl Into<String>) -> Result<Self> {
        match VALID_AUTH_SCHEMES.iter().find(|valid| **valid == scheme) {
            Some(valid) => Ok(TokenAuth {
                scheme: valid,
                token: token.into(),
            }),
            None => Err(Error::InvalidAuthScheme(scheme.to_string())),
        }
    }

    /// Value for the `Authorization` header, e.g. `Token <secret>`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_is_token() {
        let auth = TokenAuth::new("foo");
        assert_eq!(auth.header_value(), "Token foo");
    }

    #[test]
    fn explicit_valid_scheme_is_accepted() {
        let auth = TokenAuth::with_scheme("Token", "baz_token").expect("valid scheme");
        assert_eq!(auth.header_value(), "Token baz_token");
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = TokenAuth::with_scheme("Bearer", "foo").unwrap_err();
        assert!(matches!(err, Error::InvalidAuthScheme(_)));
        assert!(err.to_string().contains("Bearer"));
        assert!(err.to_string().contains("Token"));
    }
}
