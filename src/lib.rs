// SPDX-License-Identifier: AGPL-3.0-or-later

//! wise-statements - Wise Balance Statement Retrieval Client
//!
//! This crate downloads per-currency balance statement PDFs from the Wise
//! API, transparently negotiating the provider's Strong Customer
//! Authentication: a single-round challenge in which a one-time token from
//! the response headers is signed with the account holder's RSA key and
//! echoed back on exactly one retry.
//!
//! ## Modules
//!
//! - `config` - endpoint templates, SCA header names, env loading
//! - `signing` - RSA-SHA256 signing of SCA one-time tokens
//! - `transport` - single-attempt HTTP transport
//! - `sca` - challenge-response executor (the protocol core)
//! - `profiles` - profile id and balance resolution, cached per client
//! - `statements` - per-currency statement orchestration

pub mod config;
pub mod error;
pub mod profiles;
pub mod sca;
pub mod signing;
pub mod statements;
pub mod transport;

pub use config::WiseConfig;
pub use error::WiseError;
pub use profiles::ProfileType;
pub use signing::ScaSigner;
pub use statements::{StatementOutcome, StatementType, WiseClient};
