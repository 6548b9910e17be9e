use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;
use solana_account::Account;
use solana_client::{
    rpc_config::RpcTransactionLogsFilter,
    rpc_response::{RpcLogsResponse, RpcResponseContext},
};
use solana_pubkey::Pubkey;

use crate::{
    engine::{BanksEngine, EngineLocker},
    error::BanksimResult,
};

pub type SubscriptionId = u64;

pub type LogsCallback = Arc<dyn Fn(RpcLogsResponse, RpcResponseContext) + Send + Sync>;
pub type AccountChangeCallback = Arc<dyn Fn(Option<Account>, RpcResponseContext) + Send + Sync>;

#[derive(Clone)]
pub enum Subscription {
    /// The filter is kept for introspection; every logs subscriber hears every transaction.
    Logs {
        filter: RpcTransactionLogsFilter,
        callback: LogsCallback,
    },
    AccountChange {
        pubkey: Pubkey,
        callback: AccountChangeCallback,
    },
}

impl Subscription {
    pub fn is_logs(&self) -> bool {
        matches!(self, Subscription::Logs { .. })
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subscription::Logs { filter, .. } => {
                f.debug_struct("Logs").field("filter", filter).finish()
            }
            Subscription::AccountChange { pubkey, .. } => f
                .debug_struct("AccountChange")
                .field("pubkey", pubkey)
                .finish(),
        }
    }
}

/// Logs and account watchers, kept in registration order.
///
/// Ids come from one counter shared by every subscription kind (signature listeners
/// included), start at zero and are never reused.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    next_id: Arc<AtomicU64>,
    entries: Arc<RwLock<IndexMap<SubscriptionId, Subscription>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_subscription_id(&self) -> SubscriptionId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn insert(&self, subscription: Subscription) -> SubscriptionId {
        let id = self.next_subscription_id();
        debug!("Registering subscription {id}: {subscription:?}");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, subscription);
        id
    }

    pub fn on_logs(
        &self,
        filter: RpcTransactionLogsFilter,
        callback: LogsCallback,
    ) -> SubscriptionId {
        self.insert(Subscription::Logs { filter, callback })
    }

    pub fn on_account_change(
        &self,
        pubkey: Pubkey,
        callback: AccountChangeCallback,
    ) -> SubscriptionId {
        self.insert(Subscription::AccountChange { pubkey, callback })
    }

    /// Removes the subscription `id`, whatever its kind. Returns `false` for unknown ids.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&id);
        if let Some(subscription) = &removed {
            debug!("Removed subscription {id}: {subscription:?}");
        }
        removed.is_some()
    }

    pub fn remove_on_logs_listener(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }

    pub fn remove_account_change_listener(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: SubscriptionId) -> Option<Subscription> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn has_logs_subscribers(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(Subscription::is_logs)
    }

    // Callbacks are cloned out so none of them runs while the registry is locked.
    fn logs_callbacks(&self) -> Vec<LogsCallback> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|subscription| match subscription {
                Subscription::Logs { callback, .. } => Some(callback.clone()),
                Subscription::AccountChange { .. } => None,
            })
            .collect()
    }

    fn account_watchers(&self) -> Vec<(Pubkey, AccountChangeCallback)> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|subscription| match subscription {
                Subscription::AccountChange { pubkey, callback } => {
                    Some((*pubkey, callback.clone()))
                }
                Subscription::Logs { .. } => None,
            })
            .collect()
    }

    /// Hands `logs` to every logs subscriber in registration order.
    pub fn notify_logs_subscribers(&self, logs: &RpcLogsResponse, context: &RpcResponseContext) {
        for callback in self.logs_callbacks() {
            callback(logs.clone(), context.clone());
        }
    }

    /// Re-reads every watched account and hands the fresh snapshot to its watcher, whether or
    /// not the last transaction touched it.
    ///
    /// The first account that cannot be read aborts the round; watchers after it are not
    /// notified.
    pub async fn notify_account_subscribers<E: BanksEngine>(
        &self,
        engine: &EngineLocker<E>,
    ) -> BanksimResult<()> {
        for (pubkey, callback) in self.account_watchers() {
            let (slot, account) = engine
                .with_engine_reader(|engine| {
                    engine
                        .get_account(&pubkey)
                        .map(|account| (engine.get_slot(), account))
                })
                .await
                .inspect_err(|e| warn!("Unable to refresh watched account {pubkey}: {e}"))?;
            callback(account, RpcResponseContext::new(slot));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn noop_logs() -> LogsCallback {
        Arc::new(|_, _| {})
    }

    fn noop_account() -> AccountChangeCallback {
        Arc::new(|_, _| {})
    }

    #[test]
    fn test_ids_are_shared_and_increasing() {
        let registry = SubscriptionRegistry::new();
        let a = registry.on_logs(RpcTransactionLogsFilter::All, noop_logs());
        let b = registry.on_account_change(Pubkey::new_unique(), noop_account());
        let c = registry.next_subscription_id();
        let d = registry.on_logs(RpcTransactionLogsFilter::All, noop_logs());
        assert_eq!((a, b, c, d), (0, 1, 2, 3));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let registry = SubscriptionRegistry::new();
        let a = registry.on_logs(RpcTransactionLogsFilter::All, noop_logs());
        assert!(registry.remove_on_logs_listener(a));
        let b = registry.on_logs(RpcTransactionLogsFilter::All, noop_logs());
        assert_eq!(b, a + 1);
    }

    #[test]
    fn test_removal_ignores_kind_and_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let logs = registry.on_logs(RpcTransactionLogsFilter::All, noop_logs());
        let account = registry.on_account_change(Pubkey::new_unique(), noop_account());

        assert!(!registry.remove_on_logs_listener(999));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove_on_logs_listener(account));
        assert!(!registry.remove_account_change_listener(account));
        assert!(registry.get(account).is_none());
        assert!(registry.has_logs_subscribers());

        assert!(registry.remove_account_change_listener(logs));
        assert!(!registry.has_logs_subscribers());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_logs_dispatch_follows_registration_order() {
        let registry = SubscriptionRegistry::new();
        let seen = Arc::new(Mutex::new(vec![]));
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            registry.on_logs(
                RpcTransactionLogsFilter::Mentions(vec![Pubkey::new_unique().to_string()]),
                Arc::new(move |_, _| seen.lock().unwrap().push(tag)),
            );
        }

        let logs = RpcLogsResponse {
            signature: "sig".to_string(),
            err: None,
            logs: vec![],
        };
        registry.notify_logs_subscribers(&logs, &RpcResponseContext::new(5));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_callback_may_unsubscribe_during_dispatch() {
        let registry = SubscriptionRegistry::new();
        let inner = registry.clone();
        let id = Arc::new(AtomicU64::new(u64::MAX));
        let id_in_callback = id.clone();
        let subscribed = registry.on_logs(
            RpcTransactionLogsFilter::All,
            Arc::new(move |_, _| {
                inner.remove_on_logs_listener(id_in_callback.load(Ordering::SeqCst));
            }),
        );
        id.store(subscribed, Ordering::SeqCst);

        let logs = RpcLogsResponse {
            signature: "sig".to_string(),
            err: None,
            logs: vec![],
        };
        registry.notify_logs_subscribers(&logs, &RpcResponseContext::new(1));
        assert!(registry.is_empty());
    }
}
