use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, trace, warn};

use super::{RecordStore, RecordStoreFactory};
use crate::errors::{ReflinkerError, Result};
use crate::storage::models::{RecordKey, RecordValue};

const FILE_SUFFIX: &str = ".json";
const TMP_SUFFIX: &str = ".tmp";

/// 单个短码的持久化文档
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecords {
    code: String,
    #[serde(default)]
    records: BTreeMap<RecordKey, RecordValue>,
}

/// 每个短码一个 JSON 文件
///
/// 首次访问时加载文件，之后读操作走内存副本。
/// 每次 put 都会完整写入临时文件再 rename 覆盖，保证单次写入原子。
pub struct FileRecordStore {
    code: String,
    path: PathBuf,
    records: Option<BTreeMap<RecordKey, RecordValue>>,
}

impl FileRecordStore {
    pub fn new<T: Into<String>>(data_dir: &Path, code: T) -> Self {
        let code = code.into();
        let path = data_dir.join(file_name_for(&code));
        Self {
            code,
            path,
            records: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn loaded(&mut self) -> Result<&mut BTreeMap<RecordKey, RecordValue>> {
        if self.records.is_none() {
            let records = load_from_file(&self.path, &self.code).await?;
            debug!(
                "FileRecordStore[{}]: loaded {} records from {}",
                self.code,
                records.len(),
                self.path.display()
            );
            self.records = Some(records);
        }
        Ok(self.records.get_or_insert_with(BTreeMap::new))
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn get(&mut self, key: &RecordKey) -> Result<Option<RecordValue>> {
        trace!("FileRecordStore[{}]: get {}", self.code, key);
        Ok(self.loaded().await?.get(key).cloned())
    }

    async fn put(&mut self, key: RecordKey, value: RecordValue) -> Result<()> {
        trace!("FileRecordStore[{}]: put {}", self.code, key);
        self.loaded().await?;

        let Some(records) = self.records.as_mut() else {
            return Err(ReflinkerError::storage(format!(
                "record store for {} is not loaded",
                self.code
            )));
        };

        let previous = records.insert(key.clone(), value);
        if let Err(e) = save_to_file(&self.path, &self.code, records).await {
            // 写入失败时回滚内存副本
            match previous {
                Some(old) => records.insert(key, old),
                None => records.remove(&key),
            };
            error!(
                "FileRecordStore[{}]: failed to persist {}: {}",
                self.code,
                self.path.display(),
                e
            );
            return Err(e);
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<BTreeMap<RecordKey, RecordValue>> {
        Ok(self.loaded().await?.clone())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

async fn load_from_file(path: &Path, code: &str) -> Result<BTreeMap<RecordKey, RecordValue>> {
    match fs::read_to_string(path).await {
        Ok(content) => {
            let stored: StoredRecords = serde_json::from_str(&content).map_err(|e| {
                ReflinkerError::serialization(format!(
                    "Failed to parse record file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if stored.code != code {
                return Err(ReflinkerError::serialization(format!(
                    "Record file {} belongs to code '{}', expected '{}'",
                    path.display(),
                    stored.code,
                    code
                )));
            }
            Ok(stored.records)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(ReflinkerError::storage(format!(
            "Failed to read record file {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn save_to_file(
    path: &Path,
    code: &str,
    records: &BTreeMap<RecordKey, RecordValue>,
) -> Result<()> {
    #[derive(Serialize)]
    struct StoredRecordsRef<'a> {
        code: &'a str,
        records: &'a BTreeMap<RecordKey, RecordValue>,
    }

    let json = serde_json::to_vec_pretty(&StoredRecordsRef { code, records })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(TMP_SUFFIX);
    let tmp_path = PathBuf::from(tmp_path);

    if let Err(e) = write_and_replace(&tmp_path, path, &json).await {
        // 失败时不留下临时文件
        if let Err(cleanup) = fs::remove_file(&tmp_path).await
            && cleanup.kind() != ErrorKind::NotFound
        {
            warn!(
                "Failed to remove temp file {}: {}",
                tmp_path.display(),
                cleanup
            );
        }
        return Err(e.into());
    }
    Ok(())
}

async fn write_and_replace(tmp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(tmp_path, path).await
}

/// 短码 URL 编码后作为文件名，避免路径分隔符
fn file_name_for(code: &str) -> String {
    format!("{}{}", urlencoding::encode(code), FILE_SUFFIX)
}

fn code_from_file_name(name: &str) -> Option<String> {
    let encoded = name.strip_suffix(FILE_SUFFIX)?;
    urlencoding::decode(encoded).ok().map(|c| c.into_owned())
}

/// 基于数据目录的文件存储工厂
#[derive(Debug, Clone)]
pub struct FileStoreFactory {
    data_dir: PathBuf,
}

impl FileStoreFactory {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 创建数据目录（启动时调用）
    pub async fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            ReflinkerError::storage(format!(
                "Failed to create data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })
    }

    /// 列出已持久化的短码
    pub async fn list_codes(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut codes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(code) = entry.file_name().to_str().and_then(code_from_file_name) {
                codes.push(code);
            }
        }
        codes.sort();
        Ok(codes)
    }
}

impl RecordStoreFactory for FileStoreFactory {
    fn open(&self, code: &str) -> Box<dyn RecordStore> {
        Box::new(FileRecordStore::new(&self.data_dir, code))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_escapes_separators() {
        assert_eq!(file_name_for("abc123"), "abc123.json");
        assert_eq!(file_name_for("a/b"), "a%2Fb.json");
        assert_eq!(code_from_file_name("a%2Fb.json").as_deref(), Some("a/b"));
    }

    #[test]
    fn test_tmp_files_are_not_codes() {
        assert_eq!(code_from_file_name("abc.json.tmp"), None);
        assert_eq!(code_from_file_name("notes.txt"), None);
    }
}
