// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error taxonomy for the statement client.
//!
//! Configuration and profile-resolution errors abort a whole statement batch;
//! everything that can go wrong for a single currency is captured into that
//! currency's [`StatementOutcome`](crate::statements::StatementOutcome)
//! instead of being propagated past the orchestrator.

use crate::profiles::ProfileType;

#[derive(Debug, thiserror::Error)]
pub enum WiseError {
    /// Missing credential or unusable signing key; nothing can proceed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection-level failure (DNS, refused, TLS). Never retried here.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A challenge-shaped response that cannot be acted on.
    #[error("malformed SCA challenge: {0}")]
    Protocol(String),

    /// The provider challenged again after the signed retry. The protocol is
    /// a single round; a second challenge is terminal, not looped.
    #[error("SCA challenge repeated after signed retry")]
    AuthenticationExhausted,

    /// The cryptographic signing primitive failed for one challenge.
    #[error("SCA signing failed: {0}")]
    Signing(String),

    /// No profile of the requested type exists on the account.
    #[error("no {0} profile found on this account")]
    ProfileNotFound(ProfileType),

    /// The provider returned a payload we could not interpret.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_not_found_names_the_requested_type() {
        let err = WiseError::ProfileNotFound(ProfileType::Business);
        assert_eq!(err.to_string(), "no BUSINESS profile found on this account");
    }

    #[test]
    fn exhausted_is_a_terminal_message() {
        let err = WiseError::AuthenticationExhausted;
        assert!(err.to_string().contains("signed retry"));
    }
}
