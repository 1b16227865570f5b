// SPDX-License-Identifier: AGPL-3.0-or-later

//! Statement orchestration.
//!
//! Fetches one statement PDF per requested currency over the SCA executor,
//! collecting a per-currency outcome map. Per-currency problems (no balance,
//! download failure, transport error mid-fetch) never abort the batch; only
//! identity resolution and configuration failures do. The result map always
//! carries every requested currency as a key, whatever happened to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::WiseConfig;
use crate::error::WiseError;
use crate::profiles::{AccountResolver, ProfileType};
use crate::sca::ScaExecutor;
use crate::signing::ScaSigner;
use crate::transport::{ApiResponse, ApiTransport};

/// Statement rendering variant offered by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    /// One aggregated line per transaction; the accounting export.
    #[default]
    Compact,
    /// Every individual movement, including conversions and fees.
    Flat,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Compact => "COMPACT",
            StatementType::Flat => "FLAT",
        }
    }
}

/// Parameters of one statement download. Value object; no identity beyond
/// its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    pub balance_id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub statement_type: StatementType,
}

impl StatementRequest {
    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "intervalStart",
                self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            (
                "intervalEnd",
                self.end.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            ("type", self.statement_type.as_str().to_string()),
        ]
    }
}

/// Per-currency result of a statement batch.
#[derive(Debug, Clone)]
pub enum StatementOutcome {
    /// The statement PDF bytes.
    Document(Bytes),
    /// The account holds no balance in this currency; skipped, not fatal.
    NoBalance,
    /// The download failed. `status` is set for application-level failures
    /// (terminal non-2xx after the permitted SCA retry) and `None` when a
    /// transport, protocol, or signing error was captured instead.
    Failed {
        status: Option<StatusCode>,
        detail: String,
    },
    /// The batch was cancelled before this currency completed.
    Cancelled,
}

impl StatementOutcome {
    pub fn is_document(&self) -> bool {
        matches!(self, StatementOutcome::Document(_))
    }
}

/// Wise statement client: resolver plus SCA executor behind one façade.
///
/// The boundary contract for callers: construct once, then
/// [`generate_statements`](WiseClient::generate_statements) per date range.
pub struct WiseClient {
    config: Arc<WiseConfig>,
    resolver: AccountResolver,
    executor: ScaExecutor,
}

impl WiseClient {
    pub fn new(
        config: WiseConfig,
        api_token: impl Into<String>,
        signer: ScaSigner,
        profile_type: ProfileType,
    ) -> Result<Self, WiseError> {
        let config = Arc::new(config);
        let transport = ApiTransport::new(&config, api_token)?;
        let executor = ScaExecutor::new(transport.clone(), Arc::new(signer), &config);
        let resolver = AccountResolver::new(transport, Arc::clone(&config), profile_type);
        Ok(Self {
            config,
            resolver,
            executor,
        })
    }

    /// Download one statement per requested currency.
    pub async fn generate_statements(
        &self,
        currencies: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statement_type: StatementType,
    ) -> Result<BTreeMap<String, StatementOutcome>, WiseError> {
        self.generate_statements_cancellable(
            currencies,
            start,
            end,
            statement_type,
            &CancellationToken::new(),
        )
        .await
    }

    /// Like [`generate_statements`](Self::generate_statements), aborting
    /// in-flight work when `cancel` fires. Currencies not yet completed are
    /// reported as [`StatementOutcome::Cancelled`].
    pub async fn generate_statements_cancellable(
        &self,
        currencies: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statement_type: StatementType,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, StatementOutcome>, WiseError> {
        // Identity resolution happens-before any per-currency fetch and is
        // fatal for the whole batch when it fails.
        let account = self.resolver.resolve().await?;

        let mut results = BTreeMap::new();
        for currency in currencies {
            if results.contains_key(currency) {
                continue;
            }
            if cancel.is_cancelled() {
                results.insert(currency.clone(), StatementOutcome::Cancelled);
                continue;
            }

            let Some(&balance_id) = account.balances.get(currency) else {
                warn!(%currency, "no balance for requested currency, skipping");
                results.insert(currency.clone(), StatementOutcome::NoBalance);
                continue;
            };

            let request = StatementRequest {
                balance_id,
                start,
                end,
                statement_type,
            };
            let path = self.config.statement_path(account.profile_id, balance_id);

            let query = request.query();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => StatementOutcome::Cancelled,
                fetched = self.executor.execute(&path, &query) => {
                    Self::outcome_of(currency, fetched)
                }
            };
            results.insert(currency.clone(), outcome);
        }

        Ok(results)
    }

    /// Fold a terminal response or a captured error into the per-currency
    /// outcome. Errors here stay local to the currency by design.
    fn outcome_of(currency: &str, fetched: Result<ApiResponse, WiseError>) -> StatementOutcome {
        match fetched {
            Ok(response) if response.is_success() => {
                info!(%currency, bytes = response.body.len(), "statement downloaded");
                StatementOutcome::Document(response.body)
            }
            Ok(response) => {
                warn!(%currency, status = %response.status, "statement download failed");
                StatementOutcome::Failed {
                    status: Some(response.status),
                    detail: response.body_text(),
                }
            }
            Err(err) => {
                warn!(%currency, error = %err, "statement fetch errored");
                StatementOutcome::Failed {
                    status: None,
                    detail: err.to_string(),
                }
            }
        }
    }
}
