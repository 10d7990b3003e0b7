//! Local disk cache for report results.
//!
//! One file per fingerprint under the cache dir; the file's mtime is the
//! entry's creation time. Entries older than the configured TTL are misses
//! (lazy expiry) and are deleted by the startup sweep.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::report::TabularResult;

/// Disk-backed result cache with a single process-wide TTL.
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    /// A store rooted at `dir` whose entries live for `ttl`.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Deterministic cache key for one report request.
    ///
    /// The four identity fields are canonicalized as sorted-key JSON and
    /// hashed, so the same inputs always map to the same hex string no
    /// matter how the request was assembled.
    pub fn fingerprint(
        property_id: &str,
        report_key: &str,
        start_date: &str,
        end_date: &str,
    ) -> String {
        let mut fields = BTreeMap::new();
        fields.insert("end_date", end_date);
        fields.insert("property_id", property_id);
        fields.insert("report_key", report_key);
        fields.insert("start_date", start_date);
        let canonical = serde_json::to_string(&fields).unwrap_or_default();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    /// Fresh entry or miss.
    ///
    /// Expired, unreadable, and malformed entries are all misses; the
    /// caller re-runs the report as if nothing were cached.
    pub fn get(&self, fingerprint: &str) -> Option<TabularResult> {
        let path = self.entry_path(fingerprint);
        let age = entry_age(&path)?;
        if age >= self.ttl {
            tracing::debug!("Cache entry {fingerprint} expired ({}s old)", age.as_secs());
            return None;
        }
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to read cache entry {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str::<TabularResult>(&data) {
            Ok(result) if result.is_well_formed() => Some(result),
            Ok(_) => {
                tracing::warn!(
                    "Cache entry {} has mismatched row widths, ignoring",
                    path.display()
                );
                None
            }
            Err(e) => {
                tracing::warn!("Corrupt cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Persist `result`, replacing any prior entry with the same
    /// fingerprint. The write goes through a temp file in the cache dir and
    /// an atomic rename.
    pub fn put(&self, fingerprint: &str, result: &TabularResult) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache dir {}", self.dir.display()))?;
        let path = self.entry_path(fingerprint);
        let json = serde_json::to_string_pretty(result)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("Failed to create cache temp file")?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace cache entry {}", path.display()))?;
        Ok(())
    }

    /// Delete every entry older than the TTL; returns how many went.
    ///
    /// Run once at session start. Individual failures are logged and
    /// skipped so one undeletable file cannot abort the session.
    pub fn sweep(&self) -> usize {
        self.remove_entries(|age| age >= self.ttl)
    }

    /// Delete every entry regardless of age; returns how many went.
    pub fn clear(&self) -> usize {
        self.remove_entries(|_| true)
    }

    /// Number of entries currently on disk, fresh or not.
    pub fn count(&self) -> usize {
        self.entries().count()
    }

    fn entries(&self) -> impl Iterator<Item = PathBuf> {
        fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
    }

    fn remove_entries(&self, should_remove: impl Fn(Duration) -> bool) -> usize {
        let mut removed = 0;
        for path in self.entries() {
            let Some(age) = entry_age(&path) else {
                continue;
            };
            if !should_remove(age) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!("Failed to remove cache entry {}: {e}", path.display());
                }
            }
        }
        removed
    }
}

/// Age of the file at `path` from its mtime, `None` when unreadable.
fn entry_age(path: &Path) -> Option<Duration> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    // A file touched "in the future" (clock skew) counts as brand new.
    Some(modified.elapsed().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    const WEEK: Duration = Duration::from_secs(604_800);

    fn sample_result() -> TabularResult {
        let mut result = TabularResult::new("Top Cities by Active Users", &["City", "Active Users"]);
        result.rows.push(vec!["London".into(), "100".into()]);
        result.rows.push(vec!["Paris".into(), "42".into()]);
        result
    }

    /// Push a cache entry's mtime into the past.
    fn age_entry(store: &CacheStore, fingerprint: &str, secs: u64) {
        let path = store.entry_path(fingerprint);
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");
        let b = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_changes_with_every_field() {
        let base = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");
        let variants = [
            CacheStore::fingerprint("124", "top_cities", "2024-01-01", "2024-01-07"),
            CacheStore::fingerprint("123", "top_pages", "2024-01-01", "2024-01-07"),
            CacheStore::fingerprint("123", "top_cities", "2024-01-02", "2024-01-07"),
            CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-08"),
        ];
        for variant in &variants {
            assert_ne!(&base, variant);
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), WEEK);
        let fp = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");

        assert!(store.get(&fp).is_none());
        store.put(&fp, &sample_result()).unwrap();
        assert_eq!(store.get(&fp), Some(sample_result()));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn expired_entry_is_a_miss_without_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(3600));
        let fp = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");

        store.put(&fp, &sample_result()).unwrap();
        age_entry(&store, &fp, 7200);

        assert!(store.get(&fp).is_none());
        // The stale file is still on disk until a sweep runs.
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), WEEK);
        let fp = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");

        fs::write(store.entry_path(&fp), "not json at all").unwrap();
        assert!(store.get(&fp).is_none());
    }

    #[test]
    fn malformed_rows_are_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), WEEK);
        let fp = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");

        let mut bad = sample_result();
        bad.rows.push(vec!["only one cell".into()]);
        let json = serde_json::to_string(&bad).unwrap();
        fs::write(store.entry_path(&fp), json).unwrap();

        assert!(store.get(&fp).is_none());
    }

    #[test]
    fn sweep_removes_only_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(3600));
        let stale = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");
        let fresh = CacheStore::fingerprint("123", "top_pages", "2024-01-01", "2024-01-07");

        store.put(&stale, &sample_result()).unwrap();
        store.put(&fresh, &sample_result()).unwrap();
        age_entry(&store, &stale, 7200);

        assert_eq!(store.sweep(), 1);
        assert!(store.get(&stale).is_none());
        assert!(store.get(&fresh).is_some());
    }

    #[test]
    fn sweep_on_missing_dir_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("never-created"), WEEK);
        assert_eq!(store.sweep(), 0);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), WEEK);
        store
            .put(
                &CacheStore::fingerprint("1", "a", "s", "e"),
                &sample_result(),
            )
            .unwrap();
        store
            .put(
                &CacheStore::fingerprint("2", "b", "s", "e"),
                &sample_result(),
            )
            .unwrap();

        assert_eq!(store.clear(), 2);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn put_overwrites_prior_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), WEEK);
        let fp = CacheStore::fingerprint("123", "top_cities", "2024-01-01", "2024-01-07");

        store.put(&fp, &sample_result()).unwrap();
        let mut updated = sample_result();
        updated.rows.push(vec!["Berlin".into(), "7".into()]);
        store.put(&fp, &updated).unwrap();

        assert_eq!(store.get(&fp), Some(updated));
        assert_eq!(store.count(), 1);
    }
}
