//! The execution engine seam.
//!
//! A [`BanksEngine`] is the in-process ledger a [`crate::connection::BankrunConnection`]
//! drives. It executes transactions, owns accounts and sysvars, and reports the status of
//! the signatures it has processed. Engine calls are synchronous; the connection wraps the
//! engine in an [`EngineLocker`] and awaits the lock around every call.

pub mod lite_svm;
pub mod locker;

use litesvm::types::{FailedTransactionMetadata, SimulatedTransactionInfo, TransactionResult};
use solana_account::Account;
use solana_clock::{Clock, Slot};
use solana_commitment_config::CommitmentLevel;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_status::TransactionStatus;

pub use lite_svm::LiteSvmEngine;
pub use locker::EngineLocker;

use crate::error::BanksimResult;

pub trait BanksEngine: Send + Sync + 'static {
    /// Executes the transaction. `Err` means the engine rejected it and nothing was committed.
    fn try_process_transaction(&mut self, tx: VersionedTransaction) -> TransactionResult;

    fn simulate_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> Result<SimulatedTransactionInfo, FailedTransactionMetadata>;

    fn get_account(&self, pubkey: &Pubkey) -> BanksimResult<Option<Account>>;

    fn set_account(&mut self, pubkey: Pubkey, account: Account) -> BanksimResult<()>;

    fn get_slot(&self) -> Slot;

    fn get_clock(&self) -> BanksimResult<Clock>;

    fn set_clock(&mut self, clock: &Clock) -> BanksimResult<()>;

    fn warp_to_slot(&mut self, slot: Slot) -> BanksimResult<()>;

    /// Status of a previously processed signature, `None` if the engine never saw it.
    fn get_transaction_status(&self, signature: &Signature) -> Option<TransactionStatus>;

    /// Returns the latest blockhash and the last block height at which it is valid.
    fn get_latest_blockhash(&self, commitment: CommitmentLevel) -> (Hash, u64);

    fn airdrop(&mut self, pubkey: &Pubkey, lamports: u64) -> TransactionResult;
}
