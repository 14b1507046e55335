use std::io;
use std::path::PathBuf;

use uuid::Uuid;

/// Directory of uploaded documents. Each file is stored under its document id,
/// never under the client-supplied name.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn path_for(&self, document_id: Uuid) -> PathBuf {
        self.root.join(document_id.to_string())
    }

    pub async fn write(&self, document_id: Uuid, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::write(self.path_for(document_id), bytes).await
    }

    pub async fn read(&self, document_id: Uuid) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path_for(document_id)).await
    }

    /// Returns `false` when there was no file to remove.
    pub async fn remove(&self, document_id: Uuid) -> io::Result<bool> {
        match tokio::fs::remove_file(self.path_for(document_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let id = Uuid::new_v4();

        store.write(id, b"resume body").await.unwrap();
        assert_eq!(store.read(id).await.unwrap(), b"resume body");
        assert!(store.path_for(id).ends_with(id.to_string()));

        assert!(store.remove(id).await.unwrap());
        assert!(!store.remove(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.read(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_ensure_root_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("a").join("b"));
        store.ensure_root().await.unwrap();
        store.write(Uuid::nil(), b"x").await.unwrap();
        assert!(store.path_for(Uuid::nil()).exists());
    }
}
