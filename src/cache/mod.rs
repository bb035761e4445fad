//! Content-addressed on-disk cache of fetched bodies + metadata (spec §3
//! `HTTPEntry`, §4.1 `HTTPCache`).
//!
//! Layout under the configured directory: one pair per entry,
//! `<sha256(url)>.meta.json` and `<sha256(url)>.body`. Metadata writes are
//! atomic (write-temp-then-rename) so a crash never leaves a metadata file
//! pointing at a missing body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};


/// Persistent metadata record for a cached HTTP response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpEntry {
    pub url: String,
    pub content_type: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub saved_at_utc: DateTime<Utc>,
}

/// SHA-256 hex digest of the canonical request URL. Deterministic for
/// identical URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_url(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Permission mode for cache files/dirs.
#[derive(Debug, Clone, Copy)]
pub struct CachePerms {
    pub strict: bool,
}

impl CachePerms {
    fn file_mode(self) -> u32 {
        if self.strict {
            0o600
        } else {
            0o644
        }
    }

    fn dir_mode(self) -> u32 {
        if self.strict {
            0o700
        } else {
            0o755
        }
    }
}

impl Default for CachePerms {
    fn default() -> Self {
        Self { strict: true }
    }
}

pub struct HttpCache {
    dir: PathBuf,
    perms: CachePerms,
}

impl HttpCache {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::with_perms(dir, CachePerms::default())
    }

    pub fn with_perms(dir: impl Into<PathBuf>, perms: CachePerms) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        set_mode(&dir, perms.dir_mode())?;
        Ok(Self { dir, perms })
    }

    fn meta_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.meta.json", key.as_str()))
    }

    fn body_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.body", key.as_str()))
    }

    /// Returns parsed metadata or `None` if absent or corrupt. A metadata
    /// file whose body is missing is treated as a miss (and reported via
    /// `None`, not an error).
    pub fn load_meta(&self, url: &str) -> Option<HttpEntry> {
        let key = CacheKey::for_url(url);
        let meta_path = self.meta_path(&key);
        let body_path = self.body_path(&key);
        if !body_path.exists() {
            return None;
        }
        let raw = std::fs::read_to_string(&meta_path).ok()?;
        match serde_json::from_str::<HttpEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(?e, path = %meta_path.display(), "corrupt cache metadata, treating as miss");
                None
            }
        }
    }

    pub fn load_body(&self, url: &str) -> Option<Vec<u8>> {
        let key = CacheKey::for_url(url);
        std::fs::read(self.body_path(&key)).ok()
    }

    /// Write body then atomically rename metadata into place. Access
    /// updates mtime (via the fresh write) to support LRU eviction.
    pub fn save(
        &self,
        url: &str,
        content_type: &str,
        etag: Option<String>,
        last_modified: Option<String>,
        body: &[u8],
    ) -> anyhow::Result<()> {
        let key = CacheKey::for_url(url);
        let body_path = self.body_path(&key);
        std::fs::write(&body_path, body)?;
        set_mode(&body_path, self.perms.file_mode())?;

        let entry = HttpEntry {
            url: url.to_string(),
            content_type: content_type.to_string(),
            etag,
            last_modified,
            saved_at_utc: Utc::now(),
        };
        let meta_path = self.meta_path(&key);
        let tmp_path = self.dir.join(format!("{}.meta.json.tmp", key.as_str()));
        {
            let mut f = std::fs::File::create(&tmp_path)?;
            f.write_all(serde_json::to_string(&entry)?.as_bytes())?;
            f.flush()?;
        }
        set_mode(&tmp_path, self.perms.file_mode())?;
        std::fs::rename(&tmp_path, &meta_path)?;
        debug!(url, path = %meta_path.display(), "cache entry saved");
        Ok(())
    }

    /// Touch both files to refresh mtime, supporting LRU tracking on a pure
    /// cache hit (no re-save).
    pub fn touch(&self, url: &str) {
        let key = CacheKey::for_url(url);
        let now = filetime::FileTime::now();
        for path in [self.meta_path(&key), self.body_path(&key)] {
            let _ = filetime::set_file_mtime(&path, now);
        }
    }

    /// Remove entries whose `saved_at` is older than `max_age`. Returns the
    /// number of entries removed. Disk errors abort only the failing
    /// eviction; the count reflects successes so far.
    pub fn purge_by_age(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - chrono::Duration::from_std(max_age).unwrap_or_default();
        let mut removed = 0;
        for key in self.list_keys() {
            if let Some(entry) = self.load_meta_by_key(&key) {
                if entry.saved_at_utc < cutoff && self.remove(&key).is_ok() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Evict least-recently-used entries (by the newer of metadata/body
    /// mtime) until both limits are satisfied. A non-positive limit disables
    /// that dimension.
    pub fn enforce_limits(&self, max_bytes: Option<u64>, max_count: Option<usize>) -> usize {
        let max_bytes = max_bytes.filter(|&b| b > 0);
        let max_count = max_count.filter(|&c| c > 0);
        if max_bytes.is_none() && max_count.is_none() {
            return 0;
        }

        let mut entries: Vec<(CacheKey, std::time::SystemTime, u64)> = Vec::new();
        for key in self.list_keys() {
            let meta_path = self.meta_path(&key);
            let body_path = self.body_path(&key);
            let meta_mtime = std::fs::metadata(&meta_path).and_then(|m| m.modified()).ok();
            let body_meta = std::fs::metadata(&body_path).ok();
            let body_mtime = body_meta.as_ref().and_then(|m| m.modified().ok());
            let size = body_meta.map(|m| m.len()).unwrap_or(0);
            let newest = match (meta_mtime, body_mtime) {
                (Some(a), Some(b)) => a.max(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => continue,
            };
            entries.push((key, newest, size));
        }

        entries.sort_by_key(|(_, mtime, _)| *mtime);

        let mut total_bytes: u64 = entries.iter().map(|(_, _, s)| s).sum();
        let mut total_count = entries.len();
        let mut removed = 0;

        for (key, _, size) in entries {
            let over_bytes = max_bytes.is_some_and(|limit| total_bytes > limit);
            let over_count = max_count.is_some_and(|limit| total_count > limit);
            if !over_bytes && !over_count {
                break;
            }
            if self.remove(&key).is_ok() {
                removed += 1;
                total_bytes = total_bytes.saturating_sub(size);
                total_count = total_count.saturating_sub(1);
            }
        }
        removed
    }

    fn remove(&self, key: &CacheKey) -> std::io::Result<()> {
        let meta = std::fs::remove_file(self.meta_path(key));
        let body = std::fs::remove_file(self.body_path(key));
        meta.and(body)
    }

    fn load_meta_by_key(&self, key: &CacheKey) -> Option<HttpEntry> {
        let raw = std::fs::read_to_string(self.meta_path(key)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn list_keys(&self) -> Vec<CacheKey> {
        let Ok(read_dir) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        read_dir
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                name.strip_suffix(".meta.json")
                    .map(|hash| CacheKey(hash.to_string()))
            })
            .collect()
    }
}

fn set_mode(path: &Path, mode: u32) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}
