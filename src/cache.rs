// 磁盘缓存模块
// 按用途分区（diff / llm），按文件修改时间判断过期

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::errors::CacheError;

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 3600);

/// 缓存分区
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheNamespace {
    /// Pull request diff payloads
    Diff,
    /// LLM analysis payloads
    Llm,
}

impl CacheNamespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheNamespace::Diff => "diff",
            CacheNamespace::Llm => "llm",
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            CacheNamespace::Diff => "diff_cache",
            CacheNamespace::Llm => "api_cache",
        }
    }
}

/// File-backed key/value store.
///
/// Entries older than `max_age` are treated as absent and removed on the
/// lookup that notices them. There is no locking: concurrent writers to the
/// same key race and the last write wins.
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
    max_age: Duration,
}

impl Cache {
    pub fn new(root: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            root: root.into(),
            max_age,
        }
    }

    /// 生成缓存键：命名空间前缀 + 内容的 SHA-256
    pub fn key(namespace: CacheNamespace, content: &str) -> String {
        let digest = Sha256::digest(content.as_bytes());
        format!("{}-{}", namespace.prefix(), hex::encode(digest))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, namespace: CacheNamespace) -> PathBuf {
        self.root.join(namespace.dir_name())
    }

    fn entry_path(&self, namespace: CacheNamespace, key: &str) -> PathBuf {
        self.dir(namespace).join(format!("{key}.json"))
    }

    /// 创建缓存根目录和各分区目录
    pub fn ensure_dirs(&self) -> Result<(), CacheError> {
        for namespace in [CacheNamespace::Diff, CacheNamespace::Llm] {
            let dir = self.dir(namespace);
            std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io(dir, e))?;
        }
        Ok(())
    }

    /// Return the stored payload, or `None` when missing or stale.
    pub fn get(&self, namespace: CacheNamespace, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(namespace, key);
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(path, e)),
        };

        let modified = metadata.modified().map_err(|e| CacheError::Io(path.clone(), e))?;
        // mtime 在未来时视为刚写入
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age > self.max_age {
            tracing::debug!(key, age_secs = age.as_secs(), "Removing stale cache entry");
            std::fs::remove_file(&path).map_err(|e| CacheError::Io(path.clone(), e))?;
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| CacheError::Io(path, e))?;
        Ok(Some(content))
    }

    /// 无条件写入，必要时创建父目录
    pub fn put(&self, namespace: CacheNamespace, key: &str, value: &str) -> Result<(), CacheError> {
        let dir = self.dir(namespace);
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io(dir, e))?;

        let path = self.entry_path(namespace, key);
        std::fs::write(&path, value).map_err(|e| CacheError::Io(path, e))
    }

    /// Like [`Cache::get`], but a read failure is logged and reported as a miss.
    pub fn load(&self, namespace: CacheNamespace, key: &str) -> Option<String> {
        match self.get(namespace, key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Could not read from cache: {}", e);
                None
            }
        }
    }

    /// Like [`Cache::put`], but a write failure is logged and swallowed.
    pub fn store(&self, namespace: CacheNamespace, key: &str, value: &str) {
        if let Err(e) = self.put(namespace, key, value) {
            tracing::warn!("Could not save to cache: {}", e);
        }
    }
}
