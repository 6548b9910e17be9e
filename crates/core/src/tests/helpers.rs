#![allow(dead_code)]
use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use banksim_types::{ConnectionConfig, DEFAULT_FINALIZED_OBSERVATIONS, DEFAULT_PAYER_AIRDROP};
use crossbeam_channel::Receiver;
use litesvm::types::{FailedTransactionMetadata, SimulatedTransactionInfo, TransactionResult};
use solana_account::Account;
use solana_clock::{Clock, Slot};
use solana_commitment_config::CommitmentLevel;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};

use crate::{
    context::BanksimContext,
    engine::{BanksEngine, LiteSvmEngine},
    error::{BanksimError, BanksimResult},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn initial_clock() -> Clock {
    Clock {
        slot: 123,
        epoch_start_timestamp: 123,
        epoch: 1,
        leader_schedule_epoch: 1,
        unix_timestamp: 123,
    }
}

/// LiteSVM with knobs for the failure modes a real ledger can show.
pub struct ScriptedEngine {
    pub inner: LiteSvmEngine,
    /// The next `n` clock writes fail.
    pub failing_clock_writes: usize,
    /// Statuses are reported as `confirmed` instead of `finalized`.
    pub withhold_finality: bool,
    /// The status poll with this 1-based index is reported as `confirmed`.
    pub interrupt_finality_at: Option<usize>,
    /// Reads of these accounts fail.
    pub failing_account_reads: HashSet<Pubkey>,
    pub status_polls: AtomicUsize,
    pub warps: Vec<Slot>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        let mut inner = LiteSvmEngine::new();
        inner.svm.set_sysvar::<Clock>(&initial_clock());
        Self {
            inner,
            failing_clock_writes: 0,
            withhold_finality: false,
            interrupt_finality_at: None,
            failing_account_reads: HashSet::new(),
            status_polls: AtomicUsize::new(0),
            warps: vec![],
        }
    }

    pub fn status_polls(&self) -> usize {
        self.status_polls.load(Ordering::SeqCst)
    }

    pub fn reset_status_polls(&self) {
        self.status_polls.store(0, Ordering::SeqCst);
    }
}

impl BanksEngine for ScriptedEngine {
    fn try_process_transaction(&mut self, tx: VersionedTransaction) -> TransactionResult {
        self.inner.try_process_transaction(tx)
    }

    fn simulate_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> Result<SimulatedTransactionInfo, FailedTransactionMetadata> {
        self.inner.simulate_transaction(tx)
    }

    fn get_account(&self, pubkey: &Pubkey) -> BanksimResult<Option<Account>> {
        if self.failing_account_reads.contains(pubkey) {
            return Err(BanksimError::internal(format!("account {pubkey} unavailable")));
        }
        self.inner.get_account(pubkey)
    }

    fn set_account(&mut self, pubkey: Pubkey, account: Account) -> BanksimResult<()> {
        self.inner.set_account(pubkey, account)
    }

    fn get_slot(&self) -> Slot {
        self.inner.get_slot()
    }

    fn get_clock(&self) -> BanksimResult<Clock> {
        self.inner.get_clock()
    }

    fn set_clock(&mut self, clock: &Clock) -> BanksimResult<()> {
        if self.failing_clock_writes > 0 {
            self.failing_clock_writes -= 1;
            return Err(BanksimError::internal("clock sysvar is busy"));
        }
        self.inner.set_clock(clock)
    }

    fn warp_to_slot(&mut self, slot: Slot) -> BanksimResult<()> {
        self.warps.push(slot);
        self.inner.warp_to_slot(slot)
    }

    fn get_transaction_status(&self, signature: &Signature) -> Option<TransactionStatus> {
        let poll = self.status_polls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut status = self.inner.get_transaction_status(signature)?;
        if self.withhold_finality || self.interrupt_finality_at == Some(poll) {
            status.confirmation_status = Some(TransactionConfirmationStatus::Confirmed);
        }
        Some(status)
    }

    fn get_latest_blockhash(&self, commitment: CommitmentLevel) -> (Hash, u64) {
        self.inner.get_latest_blockhash(commitment)
    }

    fn airdrop(&mut self, pubkey: &Pubkey, lamports: u64) -> TransactionResult {
        self.inner.airdrop(pubkey, lamports)
    }
}

pub fn test_config() -> ConnectionConfig {
    ConnectionConfig::default()
        .with_finalized_observations(DEFAULT_FINALIZED_OBSERVATIONS)
        .with_confirmation_timeout(Duration::from_secs(10))
        .with_poll_interval(None)
}

pub async fn setup() -> BanksimContext<ScriptedEngine> {
    setup_with_config(test_config()).await
}

pub async fn setup_with_config(config: ConnectionConfig) -> BanksimContext<ScriptedEngine> {
    init_logger();
    BanksimContext::with_engine(ScriptedEngine::new(), config, DEFAULT_PAYER_AIRDROP)
        .await
        .unwrap()
}

/// Runs `script` against the engine behind the context's connection.
pub async fn script<F>(context: &BanksimContext<ScriptedEngine>, script: F)
where
    F: FnOnce(&mut ScriptedEngine),
{
    context.connection.engine().with_engine_writer(script).await
}

pub fn drain<T>(rx: &Receiver<T>) -> Vec<T> {
    rx.try_iter().collect()
}
