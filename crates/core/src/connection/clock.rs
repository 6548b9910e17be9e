use std::sync::{Arc, PoisonError, RwLock};

use solana_clock::{Clock, Slot, UnixTimestamp};

use crate::{
    engine::{BanksEngine, EngineLocker},
    error::{BanksimError, BanksimResult},
    helpers::time_travel::{advance_clock_by_seconds, clock_at_timestamp, next_slot_clock},
};

/// The post-submission clock step is attempted at most this many times.
pub const CLOCK_UPDATE_ATTEMPTS: usize = 2;

/// The connection's view of the ledger clock.
///
/// The engine's `Clock` sysvar is the source of truth; this keeps the last value the
/// connection committed so reads do not have to take the engine lock.
#[derive(Clone, Debug)]
pub struct SimulatedClock {
    current: Arc<RwLock<Clock>>,
}

impl SimulatedClock {
    pub fn new(clock: Clock) -> Self {
        Self {
            current: Arc::new(RwLock::new(clock)),
        }
    }

    pub fn current(&self) -> Clock {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn slot(&self) -> Slot {
        self.current().slot
    }

    pub fn unix_timestamp(&self) -> UnixTimestamp {
        self.current().unix_timestamp
    }

    fn store(&self, clock: Clock) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = clock;
    }

    /// Moves the ledger one slot and one second forward after a processed transaction.
    ///
    /// The target slot is computed once, so a retried attempt lands on the same slot instead
    /// of advancing twice.
    pub async fn advance_for_transaction<E: BanksEngine>(
        &self,
        engine: &EngineLocker<E>,
    ) -> BanksimResult<Clock> {
        let next_slot = engine.with_engine_reader(|engine| engine.get_slot()).await + 1;

        let committed = match engine
            .with_engine_writer(|engine| commit_next_slot(engine, next_slot))
            .await
        {
            Ok(clock) => clock,
            Err(e) => {
                warn!("Clock update to slot {next_slot} failed, retrying: {e}");
                engine
                    .with_engine_writer(|engine| commit_next_slot(engine, next_slot))
                    .await
                    .map_err(|e| BanksimError::clock_update(CLOCK_UPDATE_ATTEMPTS, e))?
            }
        };

        debug!(
            "Clock advanced to slot {} (unix timestamp {})",
            committed.slot, committed.unix_timestamp
        );
        self.store(committed.clone());
        Ok(committed)
    }

    /// Adds `seconds` to the unix timestamp. The slot does not move.
    pub async fn advance_time<E: BanksEngine>(
        &self,
        engine: &EngineLocker<E>,
        seconds: i64,
    ) -> BanksimResult<Clock> {
        let clock = engine
            .with_engine_writer(|engine| {
                let current = engine.get_clock()?;
                let next = advance_clock_by_seconds(&current, seconds)?;
                engine.set_clock(&next)?;
                Ok::<_, BanksimError>(next)
            })
            .await?;
        info!(
            "Moved time forward by {seconds}s to unix timestamp {}",
            clock.unix_timestamp
        );
        self.store(clock.clone());
        Ok(clock)
    }

    /// Sets the unix timestamp to `timestamp`. The slot does not move.
    pub async fn set_timestamp<E: BanksEngine>(
        &self,
        engine: &EngineLocker<E>,
        timestamp: UnixTimestamp,
    ) -> BanksimResult<Clock> {
        let clock = engine
            .with_engine_writer(|engine| {
                let next = clock_at_timestamp(&engine.get_clock()?, timestamp);
                engine.set_clock(&next)?;
                Ok::<_, BanksimError>(next)
            })
            .await?;
        info!("Set unix timestamp to {timestamp}");
        self.store(clock.clone());
        Ok(clock)
    }

    /// Re-reads the clock from the engine, for when something else moved it.
    pub async fn refresh<E: BanksEngine>(&self, engine: &EngineLocker<E>) -> BanksimResult<Clock> {
        let clock = engine.with_engine_reader(|engine| engine.get_clock()).await?;
        self.store(clock.clone());
        Ok(clock)
    }
}

fn commit_next_slot<E: BanksEngine>(engine: &mut E, next_slot: Slot) -> BanksimResult<Clock> {
    engine.warp_to_slot(next_slot)?;
    let current = engine.get_clock()?;
    let next = next_slot_clock(&current, next_slot)?;
    engine.set_clock(&next)?;
    Ok(next)
}
