//! 订阅缓存 (Subscription Cache)
//!
//! 以 URL 的 BLAKE3 摘要为文件名落盘，按文件修改时间判断是否过期。
//! 所有读写经过进程级读写锁，锁内只做同步文件操作。

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use tracing::debug;

use crate::core::error::Result;
use crate::utils::digest_hex;

static CACHE_LOCK: RwLock<()> = parking_lot::const_rwlock(());

#[derive(Debug, Clone)]
pub struct SubscriptionCache {
    dir: PathBuf,
    ttl: Duration,
}

impl SubscriptionCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    /// 缓存文件路径
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(digest_hex(url))
    }

    /// 读取未过期的缓存内容
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(url);
        let _guard = CACHE_LOCK.read();

        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        if modified + self.ttl <= SystemTime::now() {
            debug!("缓存已过期: {}", url);
            return None;
        }
        fs::read(&path).ok()
    }

    /// 写入缓存，覆盖旧内容
    pub fn put(&self, url: &str, body: &[u8]) -> Result<()> {
        let path = self.entry_path(url);
        let _guard = CACHE_LOCK.write();

        fs::create_dir_all(&self.dir)?;
        fs::write(&path, body)?;
        Ok(())
    }
}
