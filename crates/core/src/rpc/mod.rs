//! The client-facing connection surface.
//!
//! [`LedgerConnection`] lists the calls client code makes against a networked validator.
//! Async calls return `jsonrpc_core` futures and errors so callers see the same shapes a
//! real endpoint would hand back. [`BankrunConnection`] implements it on top of an
//! in-process engine.

pub mod utils;

use banksim_types::TransactionResponse;
use jsonrpc_core::{BoxFuture, Result};
use solana_account::Account;
use solana_client::{
    rpc_config::RpcTransactionLogsFilter,
    rpc_response::{
        Response as RpcResponse, RpcBlockhash, RpcResponseContext, RpcSimulateTransactionResult,
    },
};
use solana_clock::Slot;
use solana_commitment_config::CommitmentLevel;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_error::TransactionError;
use solana_transaction_status::TransactionStatus;

use crate::{
    connection::{
        BankrunConnection,
        subscriptions::{AccountChangeCallback, LogsCallback, SubscriptionId},
    },
    engine::BanksEngine,
};

pub type SignatureCallback = Box<dyn FnOnce(Option<TransactionError>, RpcResponseContext) + Send>;

pub trait LedgerConnection: Send + Sync {
    fn send_transaction(&self, tx: VersionedTransaction) -> BoxFuture<Result<Signature>>;

    fn send_raw_transaction(&self, wire: Vec<u8>) -> BoxFuture<Result<Signature>>;

    fn simulate_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> BoxFuture<Result<RpcResponse<RpcSimulateTransactionResult>>>;

    fn get_account_info(&self, pubkey: Pubkey) -> BoxFuture<Result<Option<Account>>>;

    fn get_account_info_and_context(
        &self,
        pubkey: Pubkey,
    ) -> BoxFuture<Result<RpcResponse<Option<Account>>>>;

    fn get_multiple_accounts_info(
        &self,
        pubkeys: Vec<Pubkey>,
    ) -> BoxFuture<Result<Vec<Option<Account>>>>;

    fn get_signature_status(
        &self,
        signature: Signature,
    ) -> BoxFuture<Result<RpcResponse<Option<TransactionStatus>>>>;

    fn get_transaction(
        &self,
        signature: Signature,
    ) -> BoxFuture<Result<Option<TransactionResponse>>>;

    fn get_latest_blockhash(
        &self,
        commitment: Option<CommitmentLevel>,
    ) -> BoxFuture<Result<RpcBlockhash>>;

    fn get_slot(&self) -> BoxFuture<Result<Slot>>;

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> BoxFuture<Result<u64>>;

    fn on_logs(&self, filter: RpcTransactionLogsFilter, callback: LogsCallback) -> SubscriptionId;

    fn remove_on_logs_listener(&self, id: SubscriptionId) -> BoxFuture<Result<()>>;

    fn on_account_change(
        &self,
        pubkey: Pubkey,
        callback: AccountChangeCallback,
    ) -> SubscriptionId;

    fn remove_account_change_listener(&self, id: SubscriptionId) -> BoxFuture<Result<()>>;

    fn on_signature(
        &self,
        signature: Signature,
        callback: SignatureCallback,
    ) -> Result<SubscriptionId>;

    fn remove_signature_listener(&self, id: SubscriptionId) -> BoxFuture<Result<()>>;
}

impl<E: BanksEngine> LedgerConnection for BankrunConnection<E> {
    fn send_transaction(&self, tx: VersionedTransaction) -> BoxFuture<Result<Signature>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.send_transaction(tx).await?) })
    }

    fn send_raw_transaction(&self, wire: Vec<u8>) -> BoxFuture<Result<Signature>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.send_raw_transaction(&wire).await?) })
    }

    fn simulate_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> BoxFuture<Result<RpcResponse<RpcSimulateTransactionResult>>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.simulate_transaction(tx).await?) })
    }

    fn get_account_info(&self, pubkey: Pubkey) -> BoxFuture<Result<Option<Account>>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.get_account_info(&pubkey).await?) })
    }

    fn get_account_info_and_context(
        &self,
        pubkey: Pubkey,
    ) -> BoxFuture<Result<RpcResponse<Option<Account>>>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.get_account_info_and_context(&pubkey).await?) })
    }

    fn get_multiple_accounts_info(
        &self,
        pubkeys: Vec<Pubkey>,
    ) -> BoxFuture<Result<Vec<Option<Account>>>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.get_multiple_accounts_info(&pubkeys).await?) })
    }

    fn get_signature_status(
        &self,
        signature: Signature,
    ) -> BoxFuture<Result<RpcResponse<Option<TransactionStatus>>>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.get_signature_status(&signature).await?) })
    }

    fn get_transaction(
        &self,
        signature: Signature,
    ) -> BoxFuture<Result<Option<TransactionResponse>>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.get_transaction(&signature).await?) })
    }

    fn get_latest_blockhash(
        &self,
        commitment: Option<CommitmentLevel>,
    ) -> BoxFuture<Result<RpcBlockhash>> {
        let connection = self.clone();
        let commitment = commitment.unwrap_or(CommitmentLevel::Finalized);
        Box::pin(async move { Ok(connection.get_latest_blockhash(commitment).await?) })
    }

    fn get_slot(&self) -> BoxFuture<Result<Slot>> {
        let connection = self.clone();
        Box::pin(async move { Ok(connection.get_slot().await) })
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> BoxFuture<Result<u64>> {
        let lamports = BankrunConnection::get_minimum_balance_for_rent_exemption(self, data_len);
        Box::pin(async move { Ok(lamports) })
    }

    fn on_logs(&self, filter: RpcTransactionLogsFilter, callback: LogsCallback) -> SubscriptionId {
        self.subscriptions().on_logs(filter, callback)
    }

    fn remove_on_logs_listener(&self, id: SubscriptionId) -> BoxFuture<Result<()>> {
        BankrunConnection::remove_on_logs_listener(self, id);
        Box::pin(async move { Ok(()) })
    }

    fn on_account_change(
        &self,
        pubkey: Pubkey,
        callback: AccountChangeCallback,
    ) -> SubscriptionId {
        self.subscriptions().on_account_change(pubkey, callback)
    }

    fn remove_account_change_listener(&self, id: SubscriptionId) -> BoxFuture<Result<()>> {
        BankrunConnection::remove_account_change_listener(self, id);
        Box::pin(async move { Ok(()) })
    }

    fn on_signature(
        &self,
        signature: Signature,
        callback: SignatureCallback,
    ) -> Result<SubscriptionId> {
        Ok(BankrunConnection::on_signature(self, &signature, callback)?)
    }

    fn remove_signature_listener(&self, id: SubscriptionId) -> BoxFuture<Result<()>> {
        BankrunConnection::remove_signature_listener(self, id);
        Box::pin(async move { Ok(()) })
    }
}
