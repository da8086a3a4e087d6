// piiguard/src/utils/token_file.rs
//! A token store kept as a single JSON document on disk.
//!
//! Every operation takes an advisory lock on a sidecar `.lock` file (shared
//! for reads, exclusive for read-modify-write) so that concurrent `piiguard`
//! processes do not lose each other's tokens. Writes go to a temporary file
//! that is renamed over the store.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use log::debug;
use piiguard_core::{PiiGuardError, TokenMapping, TokenStore};

const STORE_FILE_TMP_SUFFIX: &str = "tmp";
const STORE_FILE_LOCK_SUFFIX: &str = "lock";

type Entries = HashMap<String, TokenMapping>;

#[derive(Debug, Clone)]
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/piiguard/tokens.json`, or `./piiguard_tokens.json` when
    /// the platform has no config directory.
    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("piiguard").join("tokens.json"),
            None => PathBuf::from("piiguard_tokens.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Physically removes expired mappings. Returns how many were dropped.
    pub async fn purge_expired(&self) -> Result<usize, PiiGuardError> {
        let path = self.path.clone();
        run_blocking(move || {
            let _lock = acquire_lock(&path, true)?;
            let mut entries = read_entries(&path)?;
            let now = Utc::now();
            let before = entries.len();
            entries.retain(|_, m| !m.is_expired_at(now));
            let removed = before - entries.len();
            if removed > 0 {
                write_entries(&path, &entries)?;
            }
            Ok(removed)
        })
        .await
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn put(&self, mapping: TokenMapping) -> Result<(), PiiGuardError> {
        let path = self.path.clone();
        run_blocking(move || {
            let _lock = acquire_lock(&path, true)?;
            let mut entries = read_entries(&path)?;
            entries.insert(mapping.token.clone(), mapping);
            write_entries(&path, &entries)
        })
        .await
    }

    async fn get(&self, token: &str) -> Result<TokenMapping, PiiGuardError> {
        let path = self.path.clone();
        let token = token.to_string();
        run_blocking(move || {
            let _lock = acquire_lock(&path, false)?;
            let mut entries = read_entries(&path)?;
            match entries.remove(&token) {
                None => Err(PiiGuardError::TokenNotFound(token)),
                Some(m) if m.is_expired() => Err(PiiGuardError::TokenExpired(token)),
                Some(m) => Ok(m),
            }
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, PiiGuardError>
where
    F: FnOnce() -> Result<T, PiiGuardError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PiiGuardError::StoreError(format!("token store task failed: {}", e)))?
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn store_error(context: &str, path: &Path, e: impl std::fmt::Display) -> PiiGuardError {
    PiiGuardError::StoreError(format!("{} {}: {}", context, path.display(), e))
}

/// Held for the duration of one store operation; unlocked on drop.
struct LockGuard(File);

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

fn acquire_lock(path: &Path, exclusive: bool) -> Result<LockGuard, PiiGuardError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| store_error("Failed to create directory for", path, e))?;
    }
    let lock_path = sibling(path, STORE_FILE_LOCK_SUFFIX);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| store_error("Failed to open lock file", &lock_path, e))?;
    let locked = if exclusive { file.lock_exclusive() } else { file.lock_shared() };
    locked.map_err(|e| store_error("Failed to lock", &lock_path, e))?;
    Ok(LockGuard(file))
}

fn read_entries(path: &Path) -> Result<Entries, PiiGuardError> {
    if !path.exists() {
        return Ok(Entries::new());
    }
    let mut raw = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut raw))
        .map_err(|e| store_error("Failed to read token store", path, e))?;
    if raw.is_empty() {
        return Ok(Entries::new());
    }
    serde_json::from_slice(&raw).map_err(|e| store_error("Failed to parse token store", path, e))
}

fn write_entries(path: &Path, entries: &Entries) -> Result<(), PiiGuardError> {
    let json = serde_json::to_vec_pretty(entries).map_err(|e| store_error("Failed to encode token store", path, e))?;
    let tmp_path = sibling(path, STORE_FILE_TMP_SUFFIX);
    {
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut tmp = options
            .open(&tmp_path)
            .map_err(|e| store_error("Failed to create", &tmp_path, e))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.flush())
            .map_err(|e| store_error("Failed to write", &tmp_path, e))?;
    }
    fs::rename(&tmp_path, path).map_err(|e| store_error("Failed to replace token store", path, e))?;
    debug!("Token store {} now holds {} mappings", path.display(), entries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_log::test;

    fn mapping(token: &str, hours: i64) -> TokenMapping {
        TokenMapping {
            token: token.to_string(),
            entity_type: "SSN".to_string(),
            original_value: "123-45-6789".to_string(),
            expires_at: Utc::now() + Duration::hours(hours),
        }
    }

    #[test(tokio::test)]
    async fn put_get_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");
        JsonFileTokenStore::new(&path).put(mapping("tok_1", 1)).await.unwrap();

        let reopened = JsonFileTokenStore::new(&path);
        assert_eq!(reopened.get("tok_1").await.unwrap().original_value, "123-45-6789");
        assert!(!sibling(&path, STORE_FILE_TMP_SUFFIX).exists());
    }

    #[test(tokio::test)]
    async fn expired_and_missing_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileTokenStore::new(dir.path().join("tokens.json"));
        store.put(mapping("tok_old", -1)).await.unwrap();
        store.put(mapping("tok_new", 1)).await.unwrap();

        assert!(matches!(store.get("tok_old").await, Err(PiiGuardError::TokenExpired(_))));
        assert!(matches!(store.get("tok_nope").await, Err(PiiGuardError::TokenNotFound(_))));
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(matches!(store.get("tok_old").await, Err(PiiGuardError::TokenNotFound(_))));
        assert!(store.get("tok_new").await.is_ok());
    }

    #[test(tokio::test)]
    async fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, b"not json").unwrap();
        let err = JsonFileTokenStore::new(&path).get("tok_1").await.unwrap_err();
        assert!(matches!(err, PiiGuardError::StoreError(_)));
        assert!(!err.is_missing_token());
    }

    #[test(tokio::test)]
    async fn concurrent_puts_keep_every_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileTokenStore::new(dir.path().join("tokens.json"));
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.put(mapping(&format!("tok_{}", i), 1)).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        for i in 0..8 {
            assert!(store.get(&format!("tok_{}", i)).await.is_ok());
        }
    }
}
