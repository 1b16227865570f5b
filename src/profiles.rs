// SPDX-License-Identifier: AGPL-3.0-or-later

//! Profile and balance resolution.
//!
//! Identity is resolved at most once per client lifetime: the profile id for
//! the requested profile type, then the currency to balance-id mapping for
//! that profile. Both are cached together and reused for every statement in
//! a run, so all currencies in one batch see the same view of the account.
//! Neither endpoint is SCA-protected, so the resolver talks to the transport
//! directly rather than through the executor.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::WiseConfig;
use crate::error::WiseError;
use crate::transport::ApiTransport;

/// Wise account profile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Business,
    Personal,
}

impl ProfileType {
    /// Wire value as the provider spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Business => "BUSINESS",
            ProfileType::Personal => "PERSONAL",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRecord {
    id: u64,
    #[serde(rename = "type")]
    profile_type: String,
}

#[derive(Debug, Deserialize)]
struct BalanceRecord {
    id: u64,
    currency: String,
}

/// Resolved identity for one client: the profile id plus the mapping of
/// currency to balance id. Read-only once built.
#[derive(Debug)]
pub struct ResolvedAccount {
    pub profile_id: u64,
    pub balances: HashMap<String, u64>,
}

/// Resolves and caches the account identity.
pub struct AccountResolver {
    transport: ApiTransport,
    config: Arc<WiseConfig>,
    profile_type: ProfileType,
    cache: RwLock<Option<Arc<ResolvedAccount>>>,
}

impl AccountResolver {
    pub fn new(transport: ApiTransport, config: Arc<WiseConfig>, profile_type: ProfileType) -> Self {
        Self {
            transport,
            config,
            profile_type,
            cache: RwLock::new(None),
        }
    }

    /// Resolve the account, fetching at most once per client lifetime.
    pub async fn resolve(&self) -> Result<Arc<ResolvedAccount>, WiseError> {
        {
            let cache = self.cache.read().await;
            if let Some(account) = &*cache {
                return Ok(Arc::clone(account));
            }
        }

        let profile_id = self.fetch_profile_id().await?;
        let balances = self.fetch_balances(profile_id).await?;
        info!(
            profile_id,
            currencies = balances.len(),
            "resolved account identity"
        );

        let mut cache = self.cache.write().await;
        // A concurrent caller may have filled the cache while we fetched;
        // keep the first resolution so every fetch in flight shares one view.
        if let Some(account) = &*cache {
            return Ok(Arc::clone(account));
        }
        let account = Arc::new(ResolvedAccount {
            profile_id,
            balances,
        });
        *cache = Some(Arc::clone(&account));
        Ok(account)
    }

    async fn fetch_profile_id(&self) -> Result<u64, WiseError> {
        let path = self.config.profiles_path();
        let response = self.transport.get(&path, &[], &[]).await?;
        if !response.is_success() {
            return Err(WiseError::InvalidResponse(format!(
                "profile listing returned {}: {}",
                response.status,
                response.body_text()
            )));
        }

        let profiles: Vec<ProfileRecord> = serde_json::from_slice(&response.body)
            .map_err(|e| WiseError::InvalidResponse(format!("profile listing: {e}")))?;

        first_matching_profile(&profiles, self.profile_type)
            .ok_or(WiseError::ProfileNotFound(self.profile_type))
    }

    async fn fetch_balances(&self, profile_id: u64) -> Result<HashMap<String, u64>, WiseError> {
        let path = self.config.balances_path(profile_id);
        let response = self
            .transport
            .get(&path, &[("types", "STANDARD".to_string())], &[])
            .await?;
        if !response.is_success() {
            return Err(WiseError::InvalidResponse(format!(
                "balance listing returned {}: {}",
                response.status,
                response.body_text()
            )));
        }

        let records: Vec<BalanceRecord> = serde_json::from_slice(&response.body)
            .map_err(|e| WiseError::InvalidResponse(format!("balance listing: {e}")))?;

        Ok(balance_map(records))
    }
}

/// First profile of the requested type wins; the provider may list several.
fn first_matching_profile(profiles: &[ProfileRecord], wanted: ProfileType) -> Option<u64> {
    profiles
        .iter()
        .find(|p| p.profile_type == wanted.as_str())
        .map(|p| p.id)
}

/// Build the currency map. Duplicate currencies in the provider response
/// overwrite earlier entries (last-wins).
fn balance_map(records: Vec<BalanceRecord>) -> HashMap<String, u64> {
    let mut balances = HashMap::with_capacity(records.len());
    for record in records {
        balances.insert(record.currency, record.id);
    }
    balances
}
