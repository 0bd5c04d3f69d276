//! Compiled shader cache.
//!
//! Entries are keyed by stage, compile target and the SHA-256 of the
//! uncompiled source, so an edited source or a different GLSL target never
//! hits a stale entry. Two tiers:
//!
//! - memory: bounded by entry count, oldest entry evicted first
//! - disk (optional): one JSON file per entry, `<dir>/<key>.cache`
//!
//! A disk hit is promoted into memory. Entries older than the configured
//! max age, or written by another format version, are misses.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use retrofx_core::ShaderStage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

/// Bumped whenever the entry layout or the compiler output changes.
pub const CACHE_FORMAT_VERSION: u32 = 2;

/// Hex digits of the target digest kept in a key.
const TARGET_TAG_LEN: usize = 8;

const ENTRY_EXTENSION: &str = "cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed cache entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One cached compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedShader {
    pub compiled_source: String,
    /// Unix time in milliseconds.
    pub created_at_ms: u64,
    /// Hex SHA-256 of the uncompiled source.
    pub source_hash: String,
    /// Compile target the entry was produced for, see
    /// [`ShaderCache::with_target`].
    pub target: String,
    pub version: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub disk_entries: usize,
    pub total_disk_bytes: u64,
}

pub struct ShaderCache {
    memory: Mutex<HashMap<String, CachedShader>>,
    disk_dir: Option<PathBuf>,
    max_age: Duration,
    memory_capacity: usize,
    target: String,
}

impl ShaderCache {
    /// A cache without a disk tier.
    pub fn in_memory(max_age: Duration, memory_capacity: usize) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            disk_dir: None,
            max_age,
            memory_capacity,
            target: String::new(),
        }
    }

    /// Tag entries with the compile target, typically
    /// [`retrofx_glsl::ShaderPreprocessor::fingerprint`]. Entries written
    /// for another target are never returned.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// A cache persisting entries under `dir`, which is created if needed.
    /// Expired and unreadable entries already on disk are removed.
    pub fn with_disk(
        dir: impl Into<PathBuf>,
        max_age: Duration,
        memory_capacity: usize,
    ) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let cache = Self {
            disk_dir: Some(dir),
            ..Self::in_memory(max_age, memory_capacity)
        };
        cache.prune();
        Ok(cache)
    }

    pub fn disk_dir(&self) -> Option<&Path> {
        self.disk_dir.as_deref()
    }

    /// `"<stage code>_<target tag>_<sha256 hex of source>"`.
    pub fn cache_key(&self, source: &str, stage: ShaderStage) -> String {
        self.key_for(stage, &hash_source(source))
    }

    pub fn get(&self, source: &str, stage: ShaderStage) -> Option<String> {
        self.get_at(source, stage, unix_now_ms())
    }

    pub fn put(&self, source: &str, stage: ShaderStage, compiled: &str) {
        let hash = hash_source(source);
        let key = self.key_for(stage, &hash);
        let entry = CachedShader {
            compiled_source: compiled.to_string(),
            created_at_ms: unix_now_ms(),
            source_hash: hash,
            target: self.target.clone(),
            version: CACHE_FORMAT_VERSION,
        };
        self.store(key, entry);
    }

    /// Drop every entry from both tiers.
    pub fn clear(&self) {
        debug!("clearing shader cache");
        self.memory.lock().clear();
        for path in self.disk_entries() {
            remove_entry_file(&path);
        }
    }

    pub fn stats(&self) -> CacheStats {
        let files = self.disk_entries();
        CacheStats {
            memory_entries: self.memory.lock().len(),
            disk_entries: files.len(),
            total_disk_bytes: files
                .iter()
                .filter_map(|path| fs::metadata(path).ok())
                .map(|meta| meta.len())
                .sum(),
        }
    }

    /// Remove expired, foreign-version and unreadable disk entries, and
    /// trim memory back to capacity.
    pub fn prune(&self) {
        let now = unix_now_ms();
        for path in self.disk_entries() {
            let keep = read_entry(&path)
                .map(|entry| entry.version == CACHE_FORMAT_VERSION && !self.is_expired(&entry, now))
                .unwrap_or(false);
            if !keep {
                debug!("removing stale cache file {}", path.display());
                remove_entry_file(&path);
            }
        }

        let mut memory = self.memory.lock();
        memory.retain(|_, entry| !self.is_expired(entry, now));
        evict_oldest(&mut memory, self.memory_capacity);
    }

    fn get_at(&self, source: &str, stage: ShaderStage, now_ms: u64) -> Option<String> {
        let hash = hash_source(source);
        let key = self.key_for(stage, &hash);

        {
            let mut memory = self.memory.lock();
            if let Some(entry) = memory.get(&key) {
                if self.is_valid(entry, &hash, now_ms) {
                    debug!(key = %key, "cache hit (memory)");
                    return Some(entry.compiled_source.clone());
                }
                memory.remove(&key);
            }
        }

        if let Some(entry) = self.load_from_disk(&key) {
            if self.is_valid(&entry, &hash, now_ms) {
                debug!(key = %key, "cache hit (disk)");
                let compiled = entry.compiled_source.clone();
                self.insert_memory(key, entry);
                return Some(compiled);
            }
        }

        debug!(key = %key, "cache miss");
        None
    }

    fn store(&self, key: String, entry: CachedShader) {
        if let Err(e) = self.save_to_disk(&key, &entry) {
            warn!(key = %key, "failed to save cache file: {e}");
        }
        debug!(key = %key, "cached shader");
        self.insert_memory(key, entry);
    }

    fn insert_memory(&self, key: String, entry: CachedShader) {
        let mut memory = self.memory.lock();
        memory.insert(key, entry);
        evict_oldest(&mut memory, self.memory_capacity);
    }

    fn key_for(&self, stage: ShaderStage, source_hash: &str) -> String {
        let target_hash = hash_source(&self.target);
        format!(
            "{}_{}_{}",
            stage.code(),
            &target_hash[..TARGET_TAG_LEN],
            source_hash
        )
    }

    fn is_valid(&self, entry: &CachedShader, hash: &str, now_ms: u64) -> bool {
        entry.version == CACHE_FORMAT_VERSION
            && entry.source_hash == hash
            && entry.target == self.target
            && !self.is_expired(entry, now_ms)
    }

    fn is_expired(&self, entry: &CachedShader, now_ms: u64) -> bool {
        u128::from(now_ms.saturating_sub(entry.created_at_ms)) > self.max_age.as_millis()
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        self.disk_dir
            .as_ref()
            .map(|dir| dir.join(format!("{key}.{ENTRY_EXTENSION}")))
    }

    fn load_from_disk(&self, key: &str) -> Option<CachedShader> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return None;
        }
        match read_entry(&path) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key, "failed to load cache file: {e}");
                remove_entry_file(&path);
                None
            }
        }
    }

    fn save_to_disk(&self, key: &str, entry: &CachedShader) -> Result<(), CacheError> {
        let Some(path) = self.entry_path(key) else {
            return Ok(());
        };
        // Write then rename so readers never see a torn entry.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(entry)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn disk_entries(&self) -> Vec<PathBuf> {
        let Some(dir) = &self.disk_dir else {
            return Vec::new();
        };
        let Ok(read_dir) = fs::read_dir(dir) else {
            return Vec::new();
        };
        read_dir
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION))
            .collect()
    }
}

fn remove_entry_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("failed to remove cache file {}: {e}", path.display());
    }
}

fn read_entry(path: &Path) -> Result<CachedShader, CacheError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn evict_oldest(memory: &mut HashMap<String, CachedShader>, capacity: usize) {
    if memory.len() <= capacity {
        return;
    }
    let mut by_age: Vec<(u64, String)> = memory
        .iter()
        .map(|(key, entry)| (entry.created_at_ms, key.clone()))
        .collect();
    by_age.sort();
    let excess = memory.len() - capacity;
    for (_, key) in by_age.into_iter().take(excess) {
        memory.remove(&key);
    }
    debug!(removed = excess, "trimmed memory cache");
}

fn hash_source(source: &str) -> String {
    Sha256::digest(source.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);
    const SOURCE: &str = "void main() { gl_FragColor = vec4(1.0); }";

    #[test]
    fn key_shape() {
        let cache = ShaderCache::in_memory(WEEK, 4);
        assert_eq!(
            cache.cache_key("", ShaderStage::Fragment),
            "1_e3b0c442_e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(cache.cache_key("x", ShaderStage::Vertex).starts_with("0_e3b0c442_"));

        let tagged = ShaderCache::in_memory(WEEK, 4).with_target("#version 120");
        assert_ne!(
            tagged.cache_key("x", ShaderStage::Vertex),
            cache.cache_key("x", ShaderStage::Vertex)
        );
    }

    #[test]
    fn targets_do_not_share_entries() {
        let dir = tempfile::tempdir().unwrap();
        let es = ShaderCache::with_disk(dir.path(), WEEK, 4)
            .unwrap()
            .with_target("#version 100");
        let desktop = ShaderCache::with_disk(dir.path(), WEEK, 4)
            .unwrap()
            .with_target("#version 120");

        es.put(SOURCE, ShaderStage::Fragment, "es output");
        assert_eq!(desktop.get(SOURCE, ShaderStage::Fragment), None);

        desktop.put(SOURCE, ShaderStage::Fragment, "desktop output");
        assert_eq!(es.get(SOURCE, ShaderStage::Fragment).as_deref(), Some("es output"));
        assert_eq!(
            desktop.get(SOURCE, ShaderStage::Fragment).as_deref(),
            Some("desktop output")
        );
        assert_eq!(es.stats().disk_entries, 2);
    }

    #[test]
    fn entry_for_another_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ShaderCache::with_disk(dir.path(), WEEK, 4)
            .unwrap()
            .with_target("#version 100");
        let key = cache.cache_key(SOURCE, ShaderStage::Fragment);
        let foreign = CachedShader {
            compiled_source: "wrong target".into(),
            created_at_ms: unix_now_ms(),
            source_hash: hash_source(SOURCE),
            target: "#version 140".into(),
            version: CACHE_FORMAT_VERSION,
        };
        fs::write(
            dir.path().join(format!("{key}.cache")),
            serde_json::to_vec(&foreign).unwrap(),
        )
        .unwrap();

        assert_eq!(cache.get(SOURCE, ShaderStage::Fragment), None);
    }

    #[test]
    fn memory_round_trip() {
        let cache = ShaderCache::in_memory(WEEK, 4);
        assert_eq!(cache.get(SOURCE, ShaderStage::Fragment), None);

        cache.put(SOURCE, ShaderStage::Fragment, "compiled");
        assert_eq!(cache.get(SOURCE, ShaderStage::Fragment).as_deref(), Some("compiled"));
        assert_eq!(cache.get(SOURCE, ShaderStage::Vertex), None);
        assert_eq!(cache.get("other", ShaderStage::Fragment), None);
    }

    #[test]
    fn expired_entries_miss() {
        let cache = ShaderCache::in_memory(Duration::from_secs(60), 4);
        cache.put(SOURCE, ShaderStage::Fragment, "compiled");

        let later = unix_now_ms() + 61_000;
        assert_eq!(cache.get_at(SOURCE, ShaderStage::Fragment, later), None);
        assert_eq!(cache.stats().memory_entries, 0);
    }

    #[test]
    fn memory_capacity_evicts_oldest() {
        let cache = ShaderCache::in_memory(WEEK, 2);
        for (i, source) in ["a", "b", "c"].iter().enumerate() {
            cache.insert_memory(
                cache.cache_key(source, ShaderStage::Fragment),
                CachedShader {
                    compiled_source: source.to_string(),
                    created_at_ms: unix_now_ms() - 1_000 + i as u64,
                    source_hash: hash_source(source),
                    target: String::new(),
                    version: CACHE_FORMAT_VERSION,
                },
            );
        }
        assert_eq!(cache.stats().memory_entries, 2);
        assert_eq!(cache.get("a", ShaderStage::Fragment), None);
        assert_eq!(cache.get("c", ShaderStage::Fragment).as_deref(), Some("c"));
    }

    #[test]
    fn disk_tier_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = ShaderCache::with_disk(dir.path(), WEEK, 4).unwrap();
            cache.put(SOURCE, ShaderStage::Fragment, "compiled");
            assert_eq!(cache.stats().disk_entries, 1);
        }

        let cache = ShaderCache::with_disk(dir.path(), WEEK, 4).unwrap();
        assert_eq!(cache.stats().memory_entries, 0);
        assert_eq!(cache.get(SOURCE, ShaderStage::Fragment).as_deref(), Some("compiled"));
        assert_eq!(cache.stats().memory_entries, 1);
        assert!(cache.stats().total_disk_bytes > 0);
    }

    #[test]
    fn corrupt_disk_entry_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ShaderCache::with_disk(dir.path(), WEEK, 4).unwrap();
        let key = cache.cache_key(SOURCE, ShaderStage::Fragment);
        let path = dir.path().join(format!("{key}.cache"));
        fs::write(&path, b"not json").unwrap();

        assert_eq!(cache.get(SOURCE, ShaderStage::Fragment), None);
        assert!(!path.exists());
    }

    #[test]
    fn prune_drops_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = CachedShader {
            compiled_source: "old".into(),
            created_at_ms: 0,
            source_hash: hash_source("old"),
            target: String::new(),
            version: CACHE_FORMAT_VERSION,
        };
        let foreign = CachedShader {
            version: CACHE_FORMAT_VERSION + 1,
            created_at_ms: unix_now_ms(),
            ..stale.clone()
        };
        fs::write(dir.path().join("1_stale.cache"), serde_json::to_vec(&stale).unwrap()).unwrap();
        fs::write(dir.path().join("1_foreign.cache"), serde_json::to_vec(&foreign).unwrap()).unwrap();
        fs::write(dir.path().join("1_garbage.cache"), b"{").unwrap();
        fs::write(dir.path().join("README"), b"not an entry").unwrap();

        let cache = ShaderCache::with_disk(dir.path(), WEEK, 4).unwrap();
        assert_eq!(cache.stats().disk_entries, 0);
        assert!(dir.path().join("README").exists());
    }

    #[test]
    fn clear_empties_both_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ShaderCache::with_disk(dir.path(), WEEK, 4).unwrap();
        cache.put("a", ShaderStage::Vertex, "A");
        cache.put("b", ShaderStage::Fragment, "B");
        assert_eq!(
            cache.stats(),
            CacheStats {
                memory_entries: 2,
                disk_entries: 2,
                total_disk_bytes: cache.stats().total_disk_bytes,
            }
        );

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
