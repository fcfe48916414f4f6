//! Per-host field files for post-crawl aggregation

use crate::fields::{derive_fields, RequestedField};
use crate::output::CrawlResult;
use crate::url::hostname;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Appends field values to `{scheme}_{host}_{field}.txt` files
///
/// Every write opens, appends and closes its file, so any number of workers
/// can store into the same file without sharing a handle or a lock. Failed
/// writes are dropped: the field store is a side channel, never the record
/// of the crawl.
#[derive(Debug, Clone)]
pub struct FieldStore {
    directory: PathBuf,
}

impl FieldStore {
    /// Creates the store, making the directory if needed
    pub fn new(directory: impl Into<PathBuf>) -> std::io::Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file a field of `url` is stored in
    pub fn file_path(&self, url: &Url, field: &str) -> PathBuf {
        self.directory
            .join(format!("{}_{}_{}.txt", url.scheme(), hostname(url), field))
    }

    /// Appends one value for a field of a result URL
    pub fn persist(&self, result_url: &str, field: &str, value: &str) {
        let Ok(url) = Url::parse(result_url) else {
            return;
        };
        let path = self.file_path(&url, field);

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(format!("{}\n", value).as_bytes()));

        if let Err(e) = written {
            tracing::trace!("Dropped {} value for {}: {}", field, path.display(), e);
        }
    }

    /// Derives the requested fields of a result and appends every non-empty row
    pub fn store(&self, result: &CrawlResult, requested: &[RequestedField]) {
        for row in derive_fields(result, requested) {
            if !row.value.is_empty() {
                self.persist(&result.url, &row.field, &row.value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldRegistry;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_file_naming() {
        let dir = TempDir::new().unwrap();
        let store = FieldStore::new(dir.path()).unwrap();
        let url = Url::parse("https://a.example.com:8443/x").unwrap();
        assert_eq!(
            store.file_path(&url, "path"),
            dir.path().join("https_a.example.com_path.txt")
        );
    }

    #[test]
    fn test_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("fields").join("run1");
        let store = FieldStore::new(&nested).unwrap();
        assert!(store.directory().is_dir());
    }

    #[test]
    fn test_persist_appends_lines() {
        let dir = TempDir::new().unwrap();
        let store = FieldStore::new(dir.path()).unwrap();

        store.persist("https://example.com/a", "path", "/a");
        store.persist("https://example.com/b", "path", "/b");

        let content =
            std::fs::read_to_string(dir.path().join("https_example.com_path.txt")).unwrap();
        assert_eq!(content, "/a\n/b\n");
    }

    #[test]
    fn test_persist_swallows_errors() {
        let dir = TempDir::new().unwrap();
        let store = FieldStore::new(dir.path().join("gone")).unwrap();
        std::fs::remove_dir(store.directory()).unwrap();

        store.persist("https://example.com/a", "path", "/a");
        store.persist("not a url", "path", "/a");

        assert!(!store.directory().exists());
    }

    #[test]
    fn test_store_writes_multi_valued_rows() {
        let dir = TempDir::new().unwrap();
        let store = FieldStore::new(dir.path()).unwrap();
        let requested = FieldRegistry::default().parse("key,dir").unwrap();

        store.store(&CrawlResult::new("http://example.com/a/b.php?id=1&q=2"), &requested);

        let keys = std::fs::read_to_string(dir.path().join("http_example.com_key.txt")).unwrap();
        assert_eq!(keys, "id\nq\n");
        let dirs = std::fs::read_to_string(dir.path().join("http_example.com_dir.txt")).unwrap();
        assert_eq!(dirs, "/a/\n");
    }

    #[test]
    fn test_concurrent_persist_keeps_every_line() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FieldStore::new(dir.path()).unwrap());
        let workers = 16;
        let per_worker = 50;

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..per_worker {
                        store.persist(
                            "https://example.com/",
                            "url",
                            &format!("https://example.com/{}/{}", worker, i),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content =
            std::fs::read_to_string(dir.path().join("https_example.com_url.txt")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), workers * per_worker);
        for worker in 0..workers {
            for i in 0..per_worker {
                let expected = format!("https://example.com/{}/{}", worker, i);
                assert!(lines.contains(&expected.as_str()), "missing {}", expected);
            }
        }
    }
}
