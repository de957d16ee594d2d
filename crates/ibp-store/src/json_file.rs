//! JSON 檔案儲存：每個集合一個 `<name>.json`

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{Collection, DocumentStore, StoreError};

/// JSON 檔案儲存
///
/// 寫入先寫暫存檔再改名，單一文件的覆寫為原子操作。
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// 創建新的檔案儲存（目錄於第一次寫入時建立）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 集合對應的檔案路徑
    pub fn path_of(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }
}

impl DocumentStore for JsonFileStore {
    fn read_raw(&self, collection: Collection) -> Result<Option<Value>, StoreError> {
        let path = self.path_of(collection);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { collection, source }),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Parse { collection, source })
    }

    fn write_raw(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io { collection, source })?;

        let content = serde_json::to_string_pretty(&document)
            .map_err(|source| StoreError::Serialize { collection, source })?;

        let target = self.path_of(collection);
        let staging = self.root.join(format!(".{}.tmp", collection.file_name()));

        fs::write(&staging, content).map_err(|source| StoreError::Io { collection, source })?;
        fs::rename(&staging, &target).map_err(|source| StoreError::Io { collection, source })?;

        Ok(())
    }
}
