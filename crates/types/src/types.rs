use std::time::Duration;

use serde_derive::{Deserialize, Serialize};
use solana_clock::Slot;
use solana_transaction_error::TransactionError;

use crate::constants::{CONFIRMATION_TIMEOUT, DEFAULT_RENT_EXEMPT_MINIMUM, FINALIZED_OBSERVATIONS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Consecutive `finalized` observations required before a submission returns.
    pub finalized_observations: usize,
    /// Give up waiting for finality after this long.
    pub confirmation_timeout: Duration,
    /// Sleep between status polls. `None` only yields to the scheduler.
    pub poll_interval: Option<Duration>,
    /// Value returned by every rent-exemption query.
    pub rent_exempt_minimum: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            finalized_observations: *FINALIZED_OBSERVATIONS,
            confirmation_timeout: *CONFIRMATION_TIMEOUT,
            poll_interval: None,
            rent_exempt_minimum: DEFAULT_RENT_EXEMPT_MINIMUM,
        }
    }
}

impl ConnectionConfig {
    pub fn with_finalized_observations(mut self, observations: usize) -> Self {
        self.finalized_observations = observations.max(1);
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_rent_exempt_minimum(mut self, lamports: u64) -> Self {
        self.rent_exempt_minimum = lamports;
        self
    }
}

/// Logs and status of a settled transaction, as returned by `get_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub slot: Slot,
    pub meta: TransactionResponseMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponseMeta {
    pub log_messages: Vec<String>,
    pub err: Option<TransactionError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = ConnectionConfig::default()
            .with_finalized_observations(0)
            .with_poll_interval(Some(Duration::from_millis(5)))
            .with_rent_exempt_minimum(42);
        assert_eq!(config.finalized_observations, 1);
        assert_eq!(config.poll_interval, Some(Duration::from_millis(5)));
        assert_eq!(config.rent_exempt_minimum, 42);
    }

    #[test]
    fn test_transaction_response_serializes_camel_case() {
        let response = TransactionResponse {
            slot: 7,
            meta: TransactionResponseMeta {
                log_messages: vec!["Program log: hi".to_string()],
                err: None,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["slot"], 7);
        assert_eq!(value["meta"]["logMessages"][0], "Program log: hi");
        assert!(value["meta"]["err"].is_null());
    }
}
