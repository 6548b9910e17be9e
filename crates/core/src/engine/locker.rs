use std::sync::Arc;

use tokio::sync::RwLock;

use super::BanksEngine;

/// Shared handle over the engine. Every clone points at the same engine instance.
pub struct EngineLocker<E>(pub Arc<RwLock<E>>);

impl<E> Clone for EngineLocker<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E: BanksEngine> EngineLocker<E> {
    pub fn new(engine: E) -> Self {
        Self(Arc::new(RwLock::new(engine)))
    }

    /// Runs a read-only operation against the engine.
    /// The lock is released before this returns, so `reader` must not await.
    pub async fn with_engine_reader<T, F>(&self, reader: F) -> T
    where
        F: FnOnce(&E) -> T,
    {
        let read_guard = self.0.read().await;
        reader(&read_guard)
    }

    /// Runs a mutating operation against the engine under the write lock.
    pub async fn with_engine_writer<T, F>(&self, writer: F) -> T
    where
        F: FnOnce(&mut E) -> T,
    {
        let mut write_guard = self.0.write().await;
        writer(&mut write_guard)
    }
}
