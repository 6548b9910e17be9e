use banksim_types::{ConnectionConfig, DEFAULT_PAYER_AIRDROP};
use solana_clock::{Clock, UnixTimestamp};
use solana_commitment_config::CommitmentLevel;
use solana_hash::Hash;
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_message::Message;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;
use solana_transaction::Transaction;

use crate::{
    connection::BankrunConnection,
    engine::{BanksEngine, LiteSvmEngine},
    error::{BanksimError, BanksimResult},
};

/// A connection plus a funded payer, for tests that build transactions from instructions.
pub struct BanksimContext<E: BanksEngine = LiteSvmEngine> {
    pub connection: BankrunConnection<E>,
    payer: Keypair,
}

impl BanksimContext<LiteSvmEngine> {
    pub async fn new() -> BanksimResult<Self> {
        Self::with_engine(
            LiteSvmEngine::new(),
            ConnectionConfig::default(),
            DEFAULT_PAYER_AIRDROP,
        )
        .await
    }
}

impl<E: BanksEngine> BanksimContext<E> {
    /// Wraps `engine` in a connection and airdrops `payer_lamports` to a fresh payer.
    pub async fn with_engine(
        engine: E,
        config: ConnectionConfig,
        payer_lamports: u64,
    ) -> BanksimResult<Self> {
        let payer = Keypair::new();
        let connection = BankrunConnection::with_config(engine, config)?;
        if payer_lamports > 0 {
            let payer_pubkey = payer.pubkey();
            connection
                .engine()
                .with_engine_writer(|engine| engine.airdrop(&payer_pubkey, payer_lamports))
                .await
                .map_err(|failure| BanksimError::engine_rejection(&failure))?;
            debug!("Funded payer {payer_pubkey} with {payer_lamports} lamports");
        }
        Ok(Self { connection, payer })
    }

    pub fn payer(&self) -> &Keypair {
        &self.payer
    }

    /// Builds a transaction from `instructions` against the latest blockhash, pays for it with
    /// the context payer, signs it with the payer and `additional_signers`, and submits it.
    pub async fn send_transaction(
        &self,
        instructions: &[Instruction],
        additional_signers: &[&Keypair],
    ) -> BanksimResult<Signature> {
        let blockhash = self.get_latest_blockhash().await?;
        let message = Message::new(instructions, Some(&self.payer.pubkey()));

        let mut signers = Vec::with_capacity(additional_signers.len() + 1);
        signers.push(&self.payer);
        signers.extend_from_slice(additional_signers);

        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(signers.as_slice(), blockhash)
            .map_err(|e| BanksimError::internal(format!("Failed to sign transaction: {e}")))?;
        self.connection.send_transaction(tx).await
    }

    /// Transfers `lamports` from the payer to `recipient`.
    pub async fn fund_keypair(
        &self,
        recipient: &Pubkey,
        lamports: u64,
    ) -> BanksimResult<Signature> {
        let ix = system_instruction::transfer(&self.payer.pubkey(), recipient, lamports);
        self.send_transaction(&[ix], &[]).await
    }

    pub async fn get_latest_blockhash(&self) -> BanksimResult<Hash> {
        let (blockhash, _) = self
            .connection
            .engine()
            .with_engine_reader(|engine| engine.get_latest_blockhash(CommitmentLevel::Finalized))
            .await;
        Ok(blockhash)
    }

    pub fn print_tx_logs(&self, signature: &Signature) -> BanksimResult<Vec<String>> {
        self.connection.print_tx_logs(signature)
    }

    pub async fn move_time_forward(&self, seconds: i64) -> BanksimResult<Clock> {
        self.connection.advance_time(seconds).await
    }

    pub async fn set_timestamp(&self, timestamp: UnixTimestamp) -> BanksimResult<Clock> {
        self.connection.set_timestamp(timestamp).await
    }
}
