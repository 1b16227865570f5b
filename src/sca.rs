// SPDX-License-Identifier: AGPL-3.0-or-later

//! Strong Customer Authentication challenge-response executor.
//!
//! Wise protects statement downloads with a single-round proof-of-possession
//! protocol: the first request comes back carrying a one-time token in a
//! response header (in practice alongside a 403); the client signs the token
//! and re-issues the identical request with the token and signature merged
//! into the headers. Exactly one retry is permitted. A second challenge on
//! the retried call is [`WiseError::AuthenticationExhausted`], never a loop,
//! so a permanently-challenging endpoint cannot spin the client.
//!
//! A response is a challenge if and only if it carries the one-time-token
//! header. Detection branches on header presence, not on status code, so a
//! plain 403 (or any other application failure) without the header is
//! returned to the caller as a terminal response after one call.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::WiseConfig;
use crate::error::WiseError;
use crate::signing::ScaSigner;
use crate::transport::{ApiResponse, ApiTransport};

/// Wraps transport calls with the SCA retry.
///
/// Immutable after construction; safe to share across concurrent fetches.
pub struct ScaExecutor {
    transport: ApiTransport,
    signer: Arc<ScaSigner>,
    one_time_token_header: String,
    signature_header: String,
}

impl ScaExecutor {
    pub fn new(transport: ApiTransport, signer: Arc<ScaSigner>, config: &WiseConfig) -> Self {
        Self {
            transport,
            signer,
            one_time_token_header: config.one_time_token_header.clone(),
            signature_header: config.signature_header.clone(),
        }
    }

    /// Execute a GET with at most one signed retry.
    ///
    /// Issues at most two transport calls: one if the first response is not
    /// a challenge, two otherwise. The second response is returned as-is,
    /// success or failure, unless it is itself a challenge.
    pub async fn execute(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, WiseError> {
        let first = self.transport.get(path, query, &[]).await?;

        let Some(token) = self.challenge_token(&first)? else {
            return Ok(first);
        };

        debug!(path, status = %first.status, "SCA challenge received, signing one-time token");
        let signature = self.signer.sign(&token)?;

        let extra = [
            (self.one_time_token_header.as_str(), token),
            (self.signature_header.as_str(), signature),
        ];
        let second = self.transport.get(path, query, &extra).await?;

        if self.challenge_token(&second)?.is_some() {
            warn!(path, status = %second.status, "provider challenged again after signed retry");
            return Err(WiseError::AuthenticationExhausted);
        }

        Ok(second)
    }

    /// Extract the one-time token if the response is challenge-shaped.
    ///
    /// A token header that is present but unreadable is a malformed
    /// challenge, not a silent non-challenge.
    fn challenge_token(&self, response: &ApiResponse) -> Result<Option<String>, WiseError> {
        match response.header(&self.one_time_token_header) {
            None => Ok(None),
            Some(value) => {
                let token = value.to_str().map_err(|_| {
                    WiseError::Protocol(format!(
                        "{} header is not valid ASCII",
                        self.one_time_token_header
                    ))
                })?;
                Ok(Some(token.to_string()))
            }
        }
    }
}
