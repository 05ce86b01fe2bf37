//! The writable artifact directory.

use crate::error::{ErrorKind, Result};
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// A flat directory of downloaded release binaries.
///
/// Names must be bare filenames (the deterministic slugs from
/// [`slug`](crate::slug) always are); anything resembling a path is rejected
/// before it touches the filesystem.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open the store rooted at an absolute directory, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidRoot(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidRoot(root));
            }
        } else {
            // Non-async: happens once at startup, not worth an async constructor.
            sync_create_dir(&root).map_err(ErrorKind::Io)?;
        }
        Ok(Self { root })
    }

    fn checked_path(&self, name: &str) -> Result<PathBuf> {
        let hostile = name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..");
        if hostile {
            exn::bail!(ErrorKind::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Open a writer that *truncates* any existing artifact of the same name.
    ///
    /// Truncation matters: a partial file left behind by a failed download
    /// must be overwritten, never appended to, on the next attempt.
    pub async fn create(&self, name: &str) -> Result<ArtifactWriter> {
        let path = self.checked_path(name)?;
        let file = fs::File::create(&path).await.map_err(ErrorKind::Io)?;
        Ok(ArtifactWriter { file, written: 0 })
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.checked_path(name)?;
        Ok(fs::try_exists(&path).await.map_err(ErrorKind::Io)?)
    }

    /// Size of a stored artifact in bytes.
    pub async fn size(&self, name: &str) -> Result<u64> {
        let path = self.checked_path(name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::NotFound(name.to_string()))
            }
            Err(err) => exn::bail!(ErrorKind::Io(err)),
        }
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.checked_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::NotFound(name.to_string()))
            }
            Err(err) => exn::bail!(ErrorKind::Io(err)),
        }
    }
}

/// An in-progress artifact write.
///
/// Callers must finish with [`sync`](Self::sync) before treating the
/// artifact as durably written — the download worker's ordering invariant
/// (bytes on disk before the version pointer advances) depends on it.
#[derive(Debug)]
pub struct ArtifactWriter {
    file: fs::File,
    written: u64,
}

impl ArtifactWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await.map_err(ErrorKind::Io)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Cumulative bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and fsync, consuming the writer. Returns total bytes written.
    pub async fn sync(mut self) -> Result<u64> {
        self.file.flush().await.map_err(ErrorKind::Io)?;
        self.file.sync_all().await.map_err(ErrorKind::Io)?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_absolute_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(ArtifactStore::new(temp_dir.path()).is_ok());
        assert!(ArtifactStore::new("relative/path").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("repo");
        ArtifactStore::new(&root).unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_write_and_stat() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp_dir.path()).unwrap();
        let mut writer = store.create("app_arm64.apk").await.unwrap();
        writer.write_chunk(b"0123456789").await.unwrap();
        writer.write_chunk(b"abcdef").await.unwrap();
        assert_eq!(writer.written(), 16);
        assert_eq!(writer.sync().await.unwrap(), 16);
        assert!(store.exists("app_arm64.apk").await.unwrap());
        assert_eq!(store.size("app_arm64.apk").await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_create_truncates_previous_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp_dir.path()).unwrap();

        let mut writer = store.create("app.apk").await.unwrap();
        writer.write_chunk(&[0xAA; 1024]).await.unwrap();
        writer.sync().await.unwrap();

        // A shorter re-download must not leave stale tail bytes behind.
        let mut writer = store.create("app.apk").await.unwrap();
        writer.write_chunk(&[0xBB; 16]).await.unwrap();
        writer.sync().await.unwrap();
        assert_eq!(store.size("app.apk").await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_rejects_pathlike_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp_dir.path()).unwrap();
        for name in ["", "../escape.apk", "a/b.apk", "a\\b.apk", ".hidden"] {
            let err = store.create(name).await.unwrap_err();
            assert!(matches!(&*err, ErrorKind::InvalidName(_)), "{name:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp_dir.path()).unwrap();
        let writer = store.create("gone.apk").await.unwrap();
        writer.sync().await.unwrap();
        store.delete("gone.apk").await.unwrap();
        assert!(!store.exists("gone.apk").await.unwrap());
        let err = store.delete("gone.apk").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
