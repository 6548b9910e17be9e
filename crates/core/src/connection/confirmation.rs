use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use banksim_types::ConnectionConfig;
use solana_signature::Signature;
use solana_transaction_status::TransactionConfirmationStatus;
use tokio_util::sync::CancellationToken;

use crate::{
    engine::{BanksEngine, EngineLocker},
    error::{BanksimError, BanksimResult},
};

/// Polls the engine until a signature has been seen `finalized` enough times in a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationTracker {
    pub required_observations: usize,
    pub timeout: Duration,
    pub poll_interval: Option<Duration>,
}

impl ConfirmationTracker {
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            required_observations: config.finalized_observations.max(1),
            timeout: config.confirmation_timeout,
            poll_interval: config.poll_interval,
        }
    }

    /// Waits for `required_observations` consecutive `finalized` statuses.
    ///
    /// Any other answer, including no status at all, resets the count. Each poll takes the
    /// engine lock on its own and the loop yields between polls, so the timeout and the
    /// cancellation token are always able to interrupt it.
    pub async fn wait_for_finality<E: BanksEngine>(
        &self,
        engine: &EngineLocker<E>,
        signature: &Signature,
        cancellation: &CancellationToken,
    ) -> BanksimResult<()> {
        let observed = AtomicUsize::new(0);

        let poll = async {
            let mut consecutive = 0;
            loop {
                let finalized = engine
                    .with_engine_reader(|engine| engine.get_transaction_status(signature))
                    .await
                    .and_then(|status| status.confirmation_status)
                    .is_some_and(|status| status == TransactionConfirmationStatus::Finalized);

                if finalized {
                    consecutive += 1;
                } else if consecutive > 0 {
                    debug!(
                        "Finality streak for {signature} reset after {consecutive} observations"
                    );
                    consecutive = 0;
                }
                observed.store(consecutive, Ordering::Relaxed);

                if consecutive >= self.required_observations {
                    return;
                }
                match self.poll_interval {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => tokio::task::yield_now().await,
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                Err(BanksimError::confirmation_cancelled(
                    signature,
                    observed.load(Ordering::Relaxed),
                ))
            }
            result = tokio::time::timeout(self.timeout, poll) => {
                result.map_err(|_| {
                    BanksimError::confirmation_timeout(
                        signature,
                        self.timeout,
                        observed.load(Ordering::Relaxed),
                    )
                })
            }
        }
    }
}

impl Default for ConfirmationTracker {
    fn default() -> Self {
        Self::from_config(&ConnectionConfig::default())
    }
}
