use anyhow::{bail, Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Holds uploaded files on disk for the duration of a request, organized by date.
pub struct UploadStorage {
    base_dir: PathBuf,
}

impl UploadStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Save upload bytes under `<base>/<Y>/<m>/<d>/<uuid>.<ext>`.
    ///
    /// The original extension is kept so media-type inference on the saved
    /// path sees the same name the client sent.
    pub async fn save(&self, original_filename: &str, data: &[u8]) -> Result<PathBuf> {
        let date_dir = Local::now().format("%Y/%m/%d").to_string();
        let abs_dir = self.base_dir.join(&date_dir);
        fs::create_dir_all(&abs_dir)
            .await
            .context("Failed to create upload directory")?;

        let stored_name = match Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let abs_path = abs_dir.join(stored_name);
        fs::write(&abs_path, data)
            .await
            .context("Failed to write upload")?;
        Ok(abs_path)
    }

    /// Delete a saved upload. Missing files are not an error.
    pub async fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to delete upload"),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Writes fetched document content into `<dir>/<id>.txt`.
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name an id is exported under.
    pub fn file_name(id: &str) -> String {
        format!("{}.txt", id)
    }

    /// Write `content` verbatim, replacing any existing export for `id`.
    pub async fn write(&self, id: &str, content: &str) -> Result<PathBuf> {
        if !is_safe_id(id) {
            bail!("Refusing to export unsafe document id {:?}", id);
        }
        let path = self.dir.join(Self::file_name(id));
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// True when `id` can be used as a single file name component.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_keeps_extension_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let path = storage.save("a.txt", b"hello12345").await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().unwrap(), "txt");
        assert_eq!(std::fs::read(&path).unwrap(), b"hello12345");
    }

    #[tokio::test]
    async fn same_name_uploads_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let a = storage.save("report.pdf", b"one").await.unwrap();
        let b = storage.save("report.pdf", b"two").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn client_path_components_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let path = storage.save("../../etc/passwd", b"x").await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.extension().is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let path = storage.save("a.bin", b"x").await.unwrap();
        storage.remove(&path).await.unwrap();
        assert!(!path.exists());
        storage.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path());

        writer.write("abc123", "old content").await.unwrap();
        let path = writer.write("abc123", "XYZ").await.unwrap();
        assert_eq!(path, dir.path().join("abc123.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "XYZ");
    }

    #[tokio::test]
    async fn export_refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path().join("exports"));
        assert!(writer.write("../escape", "x").await.is_err());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn safe_id_rules() {
        assert!(is_safe_id("abc123"));
        assert!(is_safe_id("Zx-_9.q"));
        assert!(!is_safe_id(""));
        assert!(!is_safe_id(".."));
        assert!(!is_safe_id("a/b"));
        assert!(!is_safe_id("a\\b"));
    }
}
