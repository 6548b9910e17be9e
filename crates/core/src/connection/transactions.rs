use std::sync::{Arc, PoisonError, RwLock};

use banksim_types::{TransactionResponse, TransactionResponseMeta};
use solana_signature::Signature;

use crate::{
    engine::{BanksEngine, EngineLocker},
    error::{BanksimError, BanksimResult},
    storage::{Storage, StorageError, new_kv_store},
    types::TransactionRecord,
};

/// Metadata of every transaction submitted through a connection, keyed by base-58 signature.
///
/// The store is scoped to the connection and grows without bound: records are never evicted,
/// which is fine for a test ledger that lives as long as a single test.
#[derive(Clone)]
pub struct TransactionMetadataStore {
    records: Arc<RwLock<Box<dyn Storage<String, TransactionRecord>>>>,
}

impl Default for TransactionMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionMetadataStore {
    pub fn new() -> Self {
        Self::with_storage(new_kv_store())
    }

    pub fn with_storage(storage: Box<dyn Storage<String, TransactionRecord>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(storage)),
        }
    }

    /// Writes the record for a freshly processed transaction. A signature is recorded once.
    pub fn record(&self, record: TransactionRecord) -> BanksimResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&record.signature)? {
            return Err(StorageError::DuplicateKey(
                record.signature,
                "transactions".to_string(),
            )
            .into());
        }
        records.store(record.signature.clone(), record)?;
        Ok(())
    }

    pub fn lookup(&self, signature: &str) -> BanksimResult<Option<TransactionRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&signature.to_string())?)
    }

    pub fn lookup_signature(
        &self,
        signature: &Signature,
    ) -> BanksimResult<Option<TransactionRecord>> {
        self.lookup(&signature.to_string())
    }

    fn require(&self, signature: &Signature) -> BanksimResult<TransactionRecord> {
        self.lookup_signature(signature)?
            .ok_or_else(|| BanksimError::transaction_not_found(signature))
    }

    pub fn len(&self) -> BanksimResult<u64> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.count()?)
    }

    pub fn is_empty(&self) -> BanksimResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Stored logs and error, paired with the slot the engine currently reports for the
    /// signature. Falls back to the recorded slot when the engine has no status for it.
    pub async fn get_transaction<E: BanksEngine>(
        &self,
        engine: &EngineLocker<E>,
        signature: &Signature,
    ) -> BanksimResult<Option<TransactionResponse>> {
        let Some(record) = self.lookup_signature(signature)? else {
            return Ok(None);
        };
        let slot = engine
            .with_engine_reader(|engine| engine.get_transaction_status(signature))
            .await
            .map(|status| status.slot)
            .unwrap_or(record.slot);

        Ok(Some(TransactionResponse {
            slot,
            meta: TransactionResponseMeta {
                log_messages: record.log_messages,
                err: record.err,
            },
        }))
    }

    pub fn find_compute_unit_consumption(&self, signature: &Signature) -> BanksimResult<u64> {
        Ok(self.require(signature)?.compute_units_consumed)
    }

    /// Writes the transaction's logs to the `info` log, one line per message.
    pub fn print_tx_logs(&self, signature: &Signature) -> BanksimResult<Vec<String>> {
        let record = self.require(signature)?;
        info!("Logs for transaction {signature}:");
        for line in &record.log_messages {
            info!("  {line}");
        }
        Ok(record.log_messages)
    }
}
