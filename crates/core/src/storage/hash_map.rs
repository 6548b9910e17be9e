use std::hash::Hash;

pub use std::collections::HashMap;

use super::{Storage, StorageResult};

impl<K, V> Storage<K, V> for HashMap<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn store(&mut self, key: K, value: V) -> StorageResult<()> {
        self.insert(key, value);
        Ok(())
    }

    fn get(&self, key: &K) -> StorageResult<Option<V>> {
        Ok(HashMap::get(self, key).cloned())
    }

    fn contains_key(&self, key: &K) -> StorageResult<bool> {
        Ok(HashMap::contains_key(self, key))
    }

    fn count(&self) -> StorageResult<u64> {
        Ok(self.len() as u64)
    }
}
