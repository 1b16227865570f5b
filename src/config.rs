// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Client Configuration
//!
//! Endpoint templates, SCA header names, and environment variable names used
//! by the client. Everything the Wise API defines as a protocol constant is
//! held here as configuration rather than scattered through the call sites,
//! so tests can substitute a mock base URL and header names.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WISE_API_KEY` | Personal API token | Required |
//! | `WISE_PRIVATE_KEY_PATH` | PEM private key for SCA signing | `keys/wise-private.pem` |
//! | `WISE_BASE_URL` | API base URL override | `https://api.transferwise.com` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::time::Duration;

use crate::error::WiseError;

/// Environment variable name for the Wise personal API token.
pub const API_KEY_ENV: &str = "WISE_API_KEY";

/// Environment variable name for the SCA signing key path.
pub const PRIVATE_KEY_PATH_ENV: &str = "WISE_PRIVATE_KEY_PATH";

/// Environment variable name for overriding the API base URL.
pub const BASE_URL_ENV: &str = "WISE_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.transferwise.com";
const DEFAULT_PRIVATE_KEY_PATH: &str = "keys/wise-private.pem";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// Wise signals SCA by attaching a one-time token to the response headers; the
// retried request echoes the token plus an RSA-SHA256 signature over it.
const DEFAULT_ONE_TIME_TOKEN_HEADER: &str = "x-2fa-approval";
const DEFAULT_SIGNATURE_HEADER: &str = "x-signature";

/// Client configuration for the Wise API.
#[derive(Debug, Clone)]
pub struct WiseConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Response/request header carrying the SCA one-time token.
    pub one_time_token_header: String,
    /// Request header carrying the signature over the one-time token.
    pub signature_header: String,
    /// Per-request timeout for the underlying HTTP client.
    pub timeout: Duration,
}

impl Default for WiseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            one_time_token_header: DEFAULT_ONE_TIME_TOKEN_HEADER.to_string(),
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WiseConfig {
    /// Configuration pointing at a non-default base URL (e.g. a test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Path of the profile listing endpoint.
    pub fn profiles_path(&self) -> String {
        "/v1/profiles".to_string()
    }

    /// Path of the per-profile balance listing endpoint.
    pub fn balances_path(&self, profile_id: u64) -> String {
        format!("/v3/profiles/{profile_id}/balances")
    }

    /// Path of the balance statement download endpoint.
    pub fn statement_path(&self, profile_id: u64, balance_id: u64) -> String {
        format!("/v1/profiles/{profile_id}/balance-statements/{balance_id}/statement.pdf")
    }
}

/// Read a required environment variable, treating blank values as absent.
pub fn env_required(name: &str) -> Result<String, WiseError> {
    env_optional(name).ok_or_else(|| WiseError::Config(format!("{name} is not set")))
}

/// Read an optional environment variable, treating blank values as absent.
pub fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Read an environment variable with a fallback default.
pub fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

/// Default location of the SCA signing key, relative to the working directory.
pub fn default_private_key_path() -> &'static str {
    DEFAULT_PRIVATE_KEY_PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths_interpolate_ids() {
        let config = WiseConfig::default();
        assert_eq!(config.profiles_path(), "/v1/profiles");
        assert_eq!(config.balances_path(42), "/v3/profiles/42/balances");
        assert_eq!(
            config.statement_path(42, 7),
            "/v1/profiles/42/balance-statements/7/statement.pdf"
        );
    }

    #[test]
    fn with_base_url_keeps_header_defaults() {
        let config = WiseConfig::with_base_url("http://127.0.0.1:9999");
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.one_time_token_header, "x-2fa-approval");
        assert_eq!(config.signature_header, "x-signature");
    }

    #[test]
    fn env_helpers_ignore_blank_values() {
        std::env::set_var("WISE_TEST_BLANK_VAR", "   ");
        assert_eq!(env_optional("WISE_TEST_BLANK_VAR"), None);
        assert!(env_required("WISE_TEST_BLANK_VAR").is_err());
        assert_eq!(env_or_default("WISE_TEST_BLANK_VAR", "fallback"), "fallback");
        std::env::remove_var("WISE_TEST_BLANK_VAR");
    }
}
