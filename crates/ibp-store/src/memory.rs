//! 記憶體儲存（測試與暫時性規劃用）

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use serde_json::Value;

use crate::{Collection, DocumentStore, StoreError};

/// 記憶體儲存
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<Collection, Value>>,
    rejected: RwLock<HashSet<Collection>>,
}

impl MemoryStore {
    /// 創建空的記憶體儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：預先放入文件
    pub fn with_document(self, collection: Collection, document: Value) -> Self {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(collection, document);
        }
        self
    }

    /// 讓指定集合的寫入失敗
    pub fn reject_writes(&self, collection: Collection) {
        if let Ok(mut rejected) = self.rejected.write() {
            rejected.insert(collection);
        }
    }

    /// 恢復指定集合的寫入
    pub fn accept_writes(&self, collection: Collection) {
        if let Ok(mut rejected) = self.rejected.write() {
            rejected.remove(&collection);
        }
    }

    /// 目前文件內容的複本
    pub fn snapshot(&self, collection: Collection) -> Option<Value> {
        self.documents
            .read()
            .ok()
            .and_then(|documents| documents.get(&collection).cloned())
    }
}

impl DocumentStore for MemoryStore {
    fn read_raw(&self, collection: Collection) -> Result<Option<Value>, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.get(&collection).cloned())
    }

    fn write_raw(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        let rejected = self.rejected.read().map_err(|_| StoreError::Poisoned)?;
        if rejected.contains(&collection) {
            return Err(StoreError::Rejected(collection));
        }

        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        documents.insert(collection, document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overwrite() {
        let store = MemoryStore::new();
        store.write_raw(Collection::Demand, json!([1])).unwrap();
        store.write_raw(Collection::Demand, json!([2])).unwrap();
        assert_eq!(store.snapshot(Collection::Demand), Some(json!([2])));
    }

    #[test]
    fn test_rejected_writes() {
        let store = MemoryStore::new().with_document(Collection::Pnl, json!({ "monthlySales": 1 }));
        store.reject_writes(Collection::Pnl);

        assert!(matches!(
            store.write_raw(Collection::Pnl, json!({})),
            Err(StoreError::Rejected(Collection::Pnl))
        ));
        assert_eq!(store.snapshot(Collection::Pnl), Some(json!({ "monthlySales": 1 })));

        store.accept_writes(Collection::Pnl);
        assert!(store.write_raw(Collection::Pnl, json!({})).is_ok());
    }
}
