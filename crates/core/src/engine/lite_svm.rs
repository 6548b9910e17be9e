use std::collections::HashMap;

use banksim_types::MAX_PROCESSING_AGE;
use litesvm::{
    LiteSVM,
    types::{FailedTransactionMetadata, SimulatedTransactionInfo, TransactionResult},
};
use solana_account::Account;
use solana_clock::{Clock, Slot};
use solana_commitment_config::CommitmentLevel;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use solana_transaction_error::TransactionError;
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};

use super::BanksEngine;
use crate::error::BanksimResult;

/// Where and how a signature landed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProcessedSignature {
    slot: Slot,
    err: Option<TransactionError>,
}

/// [`BanksEngine`] backed by LiteSVM.
///
/// Every transaction LiteSVM accepts is final as soon as it executes, so statuses are
/// reported as `finalized` from the moment they are recorded.
#[derive(Clone)]
pub struct LiteSvmEngine {
    pub svm: LiteSVM,
    processed: HashMap<Signature, ProcessedSignature>,
}

impl Default for LiteSvmEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteSvmEngine {
    /// LiteSVM with blockhash checks disabled, so transactions signed against a blockhash
    /// from an earlier slot still land.
    pub fn new() -> Self {
        Self::from_svm(LiteSVM::new().with_blockhash_check(false))
    }

    pub fn from_svm(svm: LiteSVM) -> Self {
        Self {
            svm,
            processed: HashMap::new(),
        }
    }

    pub fn with_sigverify(mut self, sigverify: bool) -> Self {
        self.svm = self.svm.with_sigverify(sigverify);
        self
    }

    pub fn with_blockhash_check(mut self, check: bool) -> Self {
        self.svm = self.svm.with_blockhash_check(check);
        self
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    fn record(&mut self, signature: Signature, err: Option<TransactionError>) {
        let slot = self.get_slot();
        self.processed.insert(signature, ProcessedSignature { slot, err });
    }
}

impl BanksEngine for LiteSvmEngine {
    fn try_process_transaction(&mut self, tx: VersionedTransaction) -> TransactionResult {
        let result = self.svm.send_transaction(tx);
        if let Ok(meta) = &result {
            self.record(meta.signature, None);
        }
        result
    }

    fn simulate_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> Result<SimulatedTransactionInfo, FailedTransactionMetadata> {
        self.svm.simulate_transaction(tx)
    }

    fn get_account(&self, pubkey: &Pubkey) -> BanksimResult<Option<Account>> {
        Ok(self.svm.get_account(pubkey))
    }

    fn set_account(&mut self, pubkey: Pubkey, account: Account) -> BanksimResult<()> {
        self.svm.set_account(pubkey, account)?;
        Ok(())
    }

    fn get_slot(&self) -> Slot {
        self.svm.get_sysvar::<Clock>().slot
    }

    fn get_clock(&self) -> BanksimResult<Clock> {
        Ok(self.svm.get_sysvar::<Clock>())
    }

    fn set_clock(&mut self, clock: &Clock) -> BanksimResult<()> {
        self.svm.set_sysvar::<Clock>(clock);
        Ok(())
    }

    fn warp_to_slot(&mut self, slot: Slot) -> BanksimResult<()> {
        self.svm.warp_to_slot(slot);
        // each slot gets its own blockhash
        self.svm.expire_blockhash();
        Ok(())
    }

    fn get_transaction_status(&self, signature: &Signature) -> Option<TransactionStatus> {
        let processed = self.processed.get(signature)?;
        let status = match &processed.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        };
        Some(TransactionStatus {
            slot: processed.slot,
            confirmations: None,
            status: status.map_err(Into::into),
            err: processed.err.clone().map(Into::into),
            confirmation_status: Some(TransactionConfirmationStatus::Finalized),
        })
    }

    fn get_latest_blockhash(&self, _commitment: CommitmentLevel) -> (Hash, u64) {
        (self.svm.latest_blockhash(), self.get_slot() + MAX_PROCESSING_AGE)
    }

    fn airdrop(&mut self, pubkey: &Pubkey, lamports: u64) -> TransactionResult {
        let result = self.svm.airdrop(pubkey, lamports);
        if let Ok(meta) = &result {
            self.record(meta.signature, None);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use solana_keypair::Keypair;
    use solana_signer::Signer;

    use super::*;

    #[test]
    fn test_airdrop_is_reported_finalized() {
        let mut engine = LiteSvmEngine::new();
        let recipient = Keypair::new().pubkey();
        let meta = engine.airdrop(&recipient, 42).unwrap();

        let status = engine.get_transaction_status(&meta.signature).unwrap();
        assert_eq!(
            status.confirmation_status,
            Some(TransactionConfirmationStatus::Finalized)
        );
        assert!(status.err.is_none());
        assert_eq!(engine.get_account(&recipient).unwrap().unwrap().lamports, 42);
        assert_eq!(engine.processed_count(), 1);
    }

    #[test]
    fn test_unknown_signature_has_no_status() {
        let engine = LiteSvmEngine::new();
        assert!(engine.get_transaction_status(&Signature::default()).is_none());
    }

    #[test]
    fn test_warp_and_clock() {
        let mut engine = LiteSvmEngine::new();
        let (before, _) = engine.get_latest_blockhash(CommitmentLevel::Finalized);
        engine.warp_to_slot(50).unwrap();
        assert_eq!(engine.get_slot(), 50);

        let mut clock = engine.get_clock().unwrap();
        clock.unix_timestamp = 1_700_000_000;
        engine.set_clock(&clock).unwrap();
        assert_eq!(engine.get_clock().unwrap().unix_timestamp, 1_700_000_000);

        let (after, last_valid) = engine.get_latest_blockhash(CommitmentLevel::Finalized);
        assert_ne!(before, after);
        assert_eq!(last_valid, 50 + MAX_PROCESSING_AGE);
    }
}
