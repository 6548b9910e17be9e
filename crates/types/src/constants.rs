use std::time::Duration;

pub use solana_native_token::LAMPORTS_PER_SOL;

/// Number of consecutive `finalized` status observations required before a
/// submitted transaction is considered settled.
pub const DEFAULT_FINALIZED_OBSERVATIONS: usize = 10;

/// Upper bound on the time spent waiting for a transaction to settle.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 30_000;

/// Balance reported for every rent-exemption query, regardless of account size.
pub const DEFAULT_RENT_EXEMPT_MINIMUM: u64 = 10 * LAMPORTS_PER_SOL;

/// Number of slots a blockhash stays valid for.
pub const MAX_PROCESSING_AGE: u64 = 150;

/// Lamports airdropped to the context payer when none is configured.
pub const DEFAULT_PAYER_AIRDROP: u64 = 1_000 * LAMPORTS_PER_SOL;

lazy_static::lazy_static! {
    /// Configurable via BANKSIM_FINALIZED_OBSERVATIONS env var.
    pub static ref FINALIZED_OBSERVATIONS: usize = {
        std::env::var("BANKSIM_FINALIZED_OBSERVATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_FINALIZED_OBSERVATIONS)
    };

    /// Configurable via BANKSIM_CONFIRMATION_TIMEOUT_MS env var.
    pub static ref CONFIRMATION_TIMEOUT: Duration = {
        let ms = std::env::var("BANKSIM_CONFIRMATION_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_MS);
        Duration::from_millis(ms)
    };
}
