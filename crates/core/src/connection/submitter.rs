use solana_client::rpc_response::{
    Response as RpcResponse, RpcLogsResponse, RpcResponseContext, RpcSimulateTransactionResult,
};
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_status::TransactionBinaryEncoding;
use tokio_util::sync::CancellationToken;

use super::{
    clock::SimulatedClock, confirmation::ConfirmationTracker,
    subscriptions::SubscriptionRegistry, transactions::TransactionMetadataStore,
};
use crate::{
    engine::{BanksEngine, EngineLocker},
    error::{BanksimError, BanksimResult},
    rpc::utils::{decode_and_deserialize, deserialize_wire, get_simulate_transaction_result},
    types::TransactionRecord,
};

/// Drives a transaction through the engine and everything that follows a successful submission:
/// metadata, finality, the clock step and subscription dispatch, in that order.
pub struct TransactionSubmitter<E> {
    pub(crate) engine: EngineLocker<E>,
    pub(crate) clock: SimulatedClock,
    pub(crate) transactions: TransactionMetadataStore,
    pub(crate) subscriptions: SubscriptionRegistry,
    pub(crate) tracker: ConfirmationTracker,
}

impl<E> Clone for TransactionSubmitter<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            clock: self.clock.clone(),
            transactions: self.transactions.clone(),
            subscriptions: self.subscriptions.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

impl<E: BanksEngine> TransactionSubmitter<E> {
    /// Submits a signed transaction and returns its signature once it is settled.
    ///
    /// A transaction the engine rejects fails here with the engine's error; nothing is
    /// recorded and the clock does not move.
    pub async fn submit(
        &self,
        tx: VersionedTransaction,
        cancellation: &CancellationToken,
    ) -> BanksimResult<Signature> {
        let (slot, result) = self
            .engine
            .with_engine_writer(|engine| {
                let slot = engine.get_slot();
                (slot, engine.try_process_transaction(tx))
            })
            .await;

        let meta = result.map_err(|failure| {
            debug!("Transaction rejected by the engine: {}", failure.err);
            BanksimError::engine_rejection(&failure)
        })?;
        let signature = meta.signature;
        debug!(
            "Transaction {signature} processed at slot {slot} ({} compute units)",
            meta.compute_units_consumed
        );

        self.transactions
            .record(TransactionRecord::from_metadata(&meta, slot))?;

        self.tracker
            .wait_for_finality(&self.engine, &signature, cancellation)
            .await?;

        self.clock.advance_for_transaction(&self.engine).await?;

        self.notify_subscribers(&signature).await?;

        Ok(signature)
    }

    pub async fn submit_raw(
        &self,
        wire: &[u8],
        cancellation: &CancellationToken,
    ) -> BanksimResult<Signature> {
        let tx = deserialize_wire::<VersionedTransaction>(wire)?;
        self.submit(tx, cancellation).await
    }

    pub async fn submit_encoded(
        &self,
        encoded: &str,
        encoding: TransactionBinaryEncoding,
        cancellation: &CancellationToken,
    ) -> BanksimResult<Signature> {
        let tx = decode_and_deserialize::<VersionedTransaction>(encoded, encoding)?;
        self.submit(tx, cancellation).await
    }

    async fn notify_subscribers(&self, signature: &Signature) -> BanksimResult<()> {
        if self.subscriptions.has_logs_subscribers() {
            if let Some(transaction) = self
                .transactions
                .get_transaction(&self.engine, signature)
                .await?
            {
                let logs = RpcLogsResponse {
                    signature: signature.to_string(),
                    err: transaction.meta.err.map(|e| e.into()),
                    logs: transaction.meta.log_messages,
                };
                self.subscriptions
                    .notify_logs_subscribers(&logs, &RpcResponseContext::new(transaction.slot));
            }
        }

        self.subscriptions
            .notify_account_subscribers(&self.engine)
            .await
    }

    /// Runs the transaction without committing anything. Engine failures are reported in
    /// the result's `err` rather than as an error.
    pub async fn simulate(
        &self,
        tx: VersionedTransaction,
    ) -> BanksimResult<RpcResponse<RpcSimulateTransactionResult>> {
        let (slot, result) = self
            .engine
            .with_engine_reader(|engine| (engine.get_slot(), engine.simulate_transaction(tx)))
            .await;

        let value = match result {
            Ok(info) => get_simulate_transaction_result(&info.meta, None),
            Err(failure) => get_simulate_transaction_result(&failure.meta, Some(failure.err)),
        };
        Ok(RpcResponse {
            context: RpcResponseContext::new(slot),
            value,
        })
    }
}
