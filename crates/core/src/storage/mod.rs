mod hash_map;

pub use hash_map::HashMap as StorageHashMap;

/// Builds the default in-memory key/value store.
pub fn new_kv_store<K, V>() -> Box<dyn Storage<K, V>>
where
    K: Eq + std::hash::Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Box::new(StorageHashMap::new())
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to acquire lock for storage")]
    LockError,
    #[error("Key '{0}' is already present in '{1}' storage")]
    DuplicateKey(String, String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub trait Storage<K, V>: Send + Sync {
    fn store(&mut self, key: K, value: V) -> StorageResult<()>;
    fn get(&self, key: &K) -> StorageResult<Option<V>>;
    fn contains_key(&self, key: &K) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns the number of entries in the storage.
    fn count(&self) -> StorageResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_map_storage() {
        let mut db: Box<dyn Storage<String, u64>> = new_kv_store();
        assert_eq!(db.count().unwrap(), 0);
        db.store("a".to_string(), 1).unwrap();
        db.store("b".to_string(), 2).unwrap();

        assert_eq!(db.get(&"a".to_string()).unwrap(), Some(1));
        assert_eq!(db.get(&"c".to_string()).unwrap(), None);
        assert!(db.contains_key(&"b".to_string()).unwrap());
        assert!(!db.contains_key(&"c".to_string()).unwrap());
        assert_eq!(db.count().unwrap(), 2);

        db.store("a".to_string(), 3).unwrap();
        assert_eq!(db.get(&"a".to_string()).unwrap(), Some(3));
        assert_eq!(db.count().unwrap(), 2);
    }
}
