use std::{fmt::Display, future::Future, pin::Pin, time::Duration};

use jsonrpc_core::{Error, ErrorCode, Result};
use litesvm::{error::LiteSVMError, types::FailedTransactionMetadata};
use serde::Serialize;
use serde_json::json;
use solana_pubkey::Pubkey;

use crate::{rpc::utils::get_simulate_transaction_result, storage::StorageError};

pub type BanksimResult<T> = std::result::Result<T, BanksimError>;

/// JSON-RPC code used by validators when preflight simulation rejects a transaction.
pub const SEND_TRANSACTION_PREFLIGHT_FAILURE: i64 = -32002;

#[derive(Debug, Clone, PartialEq)]
pub struct BanksimError(Error);

impl From<BanksimError> for String {
    fn from(e: BanksimError) -> Self {
        e.0.to_string()
    }
}

impl From<BanksimError> for Error {
    fn from(e: BanksimError) -> Self {
        e.0
    }
}

impl From<Error> for BanksimError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl std::error::Error for BanksimError {}

impl std::fmt::Display for BanksimError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let Error {
            code,
            message,
            data,
        } = &self.0;

        let core = if code.description().eq(message) {
            code.description()
        } else {
            format!("{}: {}", code.description(), message)
        };

        if let Some(data_value) = data {
            write!(f, "{}: {}", core, data_value)
        } else {
            write!(f, "{}", core)
        }
    }
}

impl<T> From<BanksimError> for Pin<Box<dyn Future<Output = Result<T>> + Send>> {
    fn from(e: BanksimError) -> Self {
        Box::pin(async move { Err(e.into()) })
    }
}

impl BanksimError {
    pub fn inner(&self) -> &Error {
        &self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code.clone()
    }

    pub fn message(&self) -> &str {
        &self.0.message
    }

    pub fn is_preflight_failure(&self) -> bool {
        self.0.code == ErrorCode::ServerError(SEND_TRANSACTION_PREFLIGHT_FAILURE)
    }

    /// The engine refused the transaction. The simulation payload is attached the way a
    /// validator reports a failed preflight, so callers can inspect logs and units.
    pub fn engine_rejection(failure: &FailedTransactionMetadata) -> Self {
        let logs = &failure.meta.logs;
        let message = format!(
            "Transaction simulation failed: {}{}",
            failure.err,
            if logs.is_empty() {
                String::new()
            } else {
                format!(": {} log messages:\n{}", logs.len(), logs.join("\n"))
            }
        );
        let result = get_simulate_transaction_result(&failure.meta, Some(failure.err.clone()));
        Self(Error {
            code: ErrorCode::ServerError(SEND_TRANSACTION_PREFLIGHT_FAILURE),
            message,
            data: serde_json::to_value(result).ok(),
        })
    }

    pub fn transaction_not_found<S>(signature: S) -> Self
    where
        S: Display,
    {
        let error = Error::invalid_params(format!("Transaction {signature} not found"));
        Self(error)
    }

    pub fn deserialize_error<D>(typing: &str, data: D) -> Self
    where
        D: Display,
    {
        let mut error = Error::invalid_params(format!("Failed to deserialize {typing}"));
        error.data = Some(json!(data.to_string()));
        Self(error)
    }

    pub fn clock_update<D>(attempts: usize, data: D) -> Self
    where
        D: Display,
    {
        let mut error = Error::internal_error();
        error.message = "Failed to update clock".to_string();
        error.data = Some(json!(format!("{data} (after {attempts} attempts)")));
        Self(error)
    }

    pub fn time_travel<D>(data: D) -> Self
    where
        D: Display,
    {
        Self(Error::invalid_params(format!("Invalid time travel: {data}")))
    }

    pub fn confirmation_timeout<S>(signature: S, timeout: Duration, observed: usize) -> Self
    where
        S: Display,
    {
        let mut error = Error::internal_error();
        error.message = format!("Timed out waiting for transaction {signature} to finalize");
        error.data = Some(json!({
            "timeoutMs": timeout.as_millis() as u64,
            "finalizedObservations": observed,
        }));
        Self(error)
    }

    pub fn confirmation_cancelled<S>(signature: S, observed: usize) -> Self
    where
        S: Display,
    {
        let mut error = Error::internal_error();
        error.message = format!("Confirmation of transaction {signature} was cancelled");
        error.data = Some(json!({ "finalizedObservations": observed }));
        Self(error)
    }

    pub fn account_not_found(pubkey: Pubkey) -> Self {
        Self(Error::invalid_params(format!("Account {pubkey} not found")))
    }

    pub fn unpack_token_account() -> Self {
        let mut error = Error::parse_error();
        error.message = "Failed to unpack token account".to_string();
        Self(error)
    }

    pub fn internal<D>(data: D) -> Self
    where
        D: Serialize,
    {
        let mut error = Error::internal_error();
        error.data = Some(json!(data));
        Self(error)
    }
}

impl From<StorageError> for BanksimError {
    fn from(e: StorageError) -> Self {
        let mut error = Error::internal_error();
        error.data = Some(json!(format!("Storage error: {}", e)));
        BanksimError(error)
    }
}

impl From<LiteSVMError> for BanksimError {
    fn from(e: LiteSVMError) -> Self {
        let mut error = Error::internal_error();
        error.data = Some(json!(format!("LiteSVM error: {}", e)));
        BanksimError(error)
    }
}
