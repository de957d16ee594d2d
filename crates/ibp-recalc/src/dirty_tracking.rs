//! 髒標記追蹤

use std::collections::BTreeSet;

use ibp_store::Collection;

/// 會觸發重新計算的上游集合
pub const UPSTREAM: [Collection; 5] = [
    Collection::Demand,
    Collection::Bom,
    Collection::PurchasePrices,
    Collection::SalePrices,
    Collection::Pnl,
];

/// 髒標記追蹤器
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty_collections: BTreeSet<Collection>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記集合為髒，非上游集合忽略並回傳 false
    pub fn mark_dirty(&mut self, collection: Collection) -> bool {
        if !UPSTREAM.contains(&collection) {
            return false;
        }
        self.dirty_collections.insert(collection);
        true
    }

    /// 檢查集合是否為髒
    pub fn is_dirty(&self, collection: Collection) -> bool {
        self.dirty_collections.contains(&collection)
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_collections.is_empty()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_collections.clear();
    }

    /// 取出並清除所有髒集合
    pub fn take_dirty(&mut self) -> Vec<Collection> {
        std::mem::take(&mut self.dirty_collections)
            .into_iter()
            .collect()
    }

    /// 獲取所有髒集合
    pub fn dirty_collections(&self) -> Vec<Collection> {
        self.dirty_collections.iter().copied().collect()
    }
}
