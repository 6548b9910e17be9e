//! A Solana RPC connection served by an in-process engine.
//!
//! [`BankrunConnection`] answers the calls client code makes against a validator: sending
//! and simulating transactions, reading accounts and signature statuses, and subscribing to
//! logs and account changes. Every successful submission settles before it returns: its
//! metadata is recorded, finality is observed, the ledger clock moves one slot and one second
//! forward, then subscribers are notified.

pub mod accounts;
pub mod clock;
pub mod confirmation;
pub mod submitter;
pub mod subscriptions;
pub mod transactions;

use std::sync::Arc;

use accounts::AccountInfoResolver;
use banksim_types::{ConnectionConfig, TransactionResponse};
use clock::SimulatedClock;
use confirmation::ConfirmationTracker;
use solana_account::Account;
use solana_account_decoder::{UiAccount, UiAccountEncoding};
use solana_client::{
    rpc_config::RpcTransactionLogsFilter,
    rpc_response::{
        Response as RpcResponse, RpcBlockhash, RpcLogsResponse, RpcResponseContext,
        RpcSimulateTransactionResult,
    },
};
use solana_clock::{Clock, Slot, UnixTimestamp};
use solana_commitment_config::CommitmentLevel;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_error::TransactionError;
use solana_transaction_status::{TransactionBinaryEncoding, TransactionStatus};
use submitter::TransactionSubmitter;
use subscriptions::{SubscriptionId, SubscriptionRegistry};
use tokio_util::sync::CancellationToken;
use transactions::TransactionMetadataStore;

use crate::{
    engine::{BanksEngine, EngineLocker, LiteSvmEngine},
    error::BanksimResult,
    types::TokenAccount,
};

pub struct BankrunConnection<E: BanksEngine = LiteSvmEngine> {
    engine: EngineLocker<E>,
    config: ConnectionConfig,
    clock: SimulatedClock,
    accounts: AccountInfoResolver<E>,
    transactions: TransactionMetadataStore,
    subscriptions: SubscriptionRegistry,
    submitter: TransactionSubmitter<E>,
}

impl<E: BanksEngine> Clone for BankrunConnection<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            accounts: self.accounts.clone(),
            transactions: self.transactions.clone(),
            subscriptions: self.subscriptions.clone(),
            submitter: self.submitter.clone(),
        }
    }
}

impl<E: BanksEngine> BankrunConnection<E> {
    pub fn new(engine: E) -> BanksimResult<Self> {
        Self::with_config(engine, ConnectionConfig::default())
    }

    pub fn with_config(engine: E, config: ConnectionConfig) -> BanksimResult<Self> {
        let clock = SimulatedClock::new(engine.get_clock()?);
        let engine = EngineLocker::new(engine);
        let transactions = TransactionMetadataStore::new();
        let subscriptions = SubscriptionRegistry::new();
        let submitter = TransactionSubmitter {
            engine: engine.clone(),
            clock: clock.clone(),
            transactions: transactions.clone(),
            subscriptions: subscriptions.clone(),
            tracker: ConfirmationTracker::from_config(&config),
        };
        debug!("Connection created with {config:?}");

        Ok(Self {
            accounts: AccountInfoResolver::new(engine.clone()),
            engine,
            config,
            clock,
            transactions,
            subscriptions,
            submitter,
        })
    }

    pub fn engine(&self) -> &EngineLocker<E> {
        &self.engine
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub fn transactions(&self) -> &TransactionMetadataStore {
        &self.transactions
    }

    pub async fn send_transaction(
        &self,
        tx: impl Into<VersionedTransaction>,
    ) -> BanksimResult<Signature> {
        self.submitter
            .submit(tx.into(), &CancellationToken::new())
            .await
    }

    /// Like [`Self::send_transaction`], giving up on finality once `cancellation` fires.
    pub async fn send_transaction_with_cancellation(
        &self,
        tx: impl Into<VersionedTransaction>,
        cancellation: &CancellationToken,
    ) -> BanksimResult<Signature> {
        self.submitter.submit(tx.into(), cancellation).await
    }

    pub async fn send_raw_transaction(&self, wire: &[u8]) -> BanksimResult<Signature> {
        self.submitter
            .submit_raw(wire, &CancellationToken::new())
            .await
    }

    pub async fn send_encoded_transaction(
        &self,
        encoded: &str,
        encoding: TransactionBinaryEncoding,
    ) -> BanksimResult<Signature> {
        self.submitter
            .submit_encoded(encoded, encoding, &CancellationToken::new())
            .await
    }

    pub async fn simulate_transaction(
        &self,
        tx: impl Into<VersionedTransaction>,
    ) -> BanksimResult<RpcResponse<RpcSimulateTransactionResult>> {
        self.submitter.simulate(tx.into()).await
    }

    pub async fn get_account_info(&self, pubkey: &Pubkey) -> BanksimResult<Option<Account>> {
        self.accounts.get_account_info(pubkey).await
    }

    pub async fn get_account_info_and_context(
        &self,
        pubkey: &Pubkey,
    ) -> BanksimResult<RpcResponse<Option<Account>>> {
        self.accounts.get_account_info_and_context(pubkey).await
    }

    pub async fn get_parsed_account_info(
        &self,
        pubkey: &Pubkey,
    ) -> BanksimResult<RpcResponse<Option<UiAccount>>> {
        self.accounts
            .get_ui_account_info(pubkey, UiAccountEncoding::JsonParsed)
            .await
    }

    pub async fn get_ui_account_info(
        &self,
        pubkey: &Pubkey,
        encoding: UiAccountEncoding,
    ) -> BanksimResult<RpcResponse<Option<UiAccount>>> {
        self.accounts.get_ui_account_info(pubkey, encoding).await
    }

    pub async fn get_multiple_accounts_info(
        &self,
        pubkeys: &[Pubkey],
    ) -> BanksimResult<Vec<Option<Account>>> {
        self.accounts.get_multiple_accounts_info(pubkeys).await
    }

    pub async fn get_token_account(&self, pubkey: &Pubkey) -> BanksimResult<TokenAccount> {
        self.accounts.get_token_account(pubkey).await
    }

    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> BanksimResult<RpcResponse<Option<TransactionStatus>>> {
        let (slot, value) = self
            .engine
            .with_engine_reader(|engine| {
                (engine.get_slot(), engine.get_transaction_status(signature))
            })
            .await;
        Ok(RpcResponse {
            context: RpcResponseContext::new(slot),
            value,
        })
    }

    pub async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> BanksimResult<Option<TransactionResponse>> {
        self.transactions
            .get_transaction(&self.engine, signature)
            .await
    }

    pub async fn get_latest_blockhash(
        &self,
        commitment: CommitmentLevel,
    ) -> BanksimResult<RpcBlockhash> {
        let (blockhash, last_valid_block_height) = self
            .engine
            .with_engine_reader(|engine| engine.get_latest_blockhash(commitment))
            .await;
        Ok(RpcBlockhash {
            blockhash: blockhash.to_string(),
            last_valid_block_height,
        })
    }

    pub fn on_logs<F>(&self, filter: RpcTransactionLogsFilter, callback: F) -> SubscriptionId
    where
        F: Fn(RpcLogsResponse, RpcResponseContext) + Send + Sync + 'static,
    {
        self.subscriptions.on_logs(filter, Arc::new(callback))
    }

    pub fn remove_on_logs_listener(&self, id: SubscriptionId) {
        self.subscriptions.remove_on_logs_listener(id);
    }

    pub fn on_account_change<F>(&self, pubkey: Pubkey, callback: F) -> SubscriptionId
    where
        F: Fn(Option<Account>, RpcResponseContext) + Send + Sync + 'static,
    {
        self.subscriptions.on_account_change(pubkey, Arc::new(callback))
    }

    pub fn remove_account_change_listener(&self, id: SubscriptionId) {
        self.subscriptions.remove_account_change_listener(id);
    }

    /// Resolves right away: if the signature is known, `callback` runs once with its result
    /// before this returns. Nothing is kept around for later notifications.
    pub fn on_signature<F>(
        &self,
        signature: &Signature,
        callback: F,
    ) -> BanksimResult<SubscriptionId>
    where
        F: FnOnce(Option<TransactionError>, RpcResponseContext),
    {
        let id = self.subscriptions.next_subscription_id();
        if let Some(record) = self.transactions.lookup_signature(signature)? {
            callback(record.err, RpcResponseContext::new(self.clock.slot()));
        }
        Ok(id)
    }

    pub fn remove_signature_listener(&self, _id: SubscriptionId) {}

    /// Every account is treated as needing the same balance, whatever its size.
    pub fn get_minimum_balance_for_rent_exemption(&self, _data_len: usize) -> u64 {
        self.config.rent_exempt_minimum
    }

    pub async fn get_slot(&self) -> Slot {
        self.engine.with_engine_reader(|engine| engine.get_slot()).await
    }

    /// Unix timestamp of the simulated clock.
    pub fn get_time(&self) -> UnixTimestamp {
        self.clock.unix_timestamp()
    }

    pub async fn advance_time(&self, seconds: i64) -> BanksimResult<Clock> {
        self.clock.advance_time(&self.engine, seconds).await
    }

    pub async fn set_timestamp(&self, timestamp: UnixTimestamp) -> BanksimResult<Clock> {
        self.clock.set_timestamp(&self.engine, timestamp).await
    }

    pub fn find_compute_unit_consumption(&self, signature: &Signature) -> BanksimResult<u64> {
        self.transactions.find_compute_unit_consumption(signature)
    }

    pub fn print_tx_logs(&self, signature: &Signature) -> BanksimResult<Vec<String>> {
        self.transactions.print_tx_logs(signature)
    }

    pub fn transaction_count(&self) -> BanksimResult<u64> {
        self.transactions.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
