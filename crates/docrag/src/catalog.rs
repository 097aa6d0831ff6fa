//! Local implementations of the external collaborator interfaces.
//!
//! The core treats document metadata and raw-file storage as external
//! systems; the CLI backs them with a JSON file and the local filesystem.

use async_trait::async_trait;
use docrag_core::{BlobStorage, Document, DocumentCatalog, Error};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Document catalog persisted as a JSON file.
pub struct FileCatalog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCatalog {
    /// Create a catalog backed by the given file.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<Document>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[async_trait]
impl DocumentCatalog for FileCatalog {
    async fn save_document(&self, document: &Document) -> Result<(), Error> {
        let _guard = self.lock.lock().await;

        let mut documents = self.read_all().await?;
        documents.push(document.clone());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&documents)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn list_documents(&self, tenant_id: &str) -> Result<Vec<Document>, Error> {
        let documents = self.read_all().await?;
        Ok(documents
            .into_iter()
            .filter(|d| d.tenant_id == tenant_id)
            .collect())
    }
}

/// Raw-file storage over the local filesystem: the storage reference is the
/// file path.
pub struct LocalBlobStorage;

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn read_file(&self, storage_ref: &str) -> Result<Vec<u8>, Error> {
        Ok(tokio::fs::read(storage_ref).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docrag_core::DocumentFormat;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn sample_document(tenant: &str, filename: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            tenant_id: tenant.to_string(),
            filename: filename.to_string(),
            format: DocumentFormat::Text,
            size_bytes: 42,
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let dir = tempdir().unwrap();
        let catalog = FileCatalog::new(dir.path().join("catalog.json"));

        catalog
            .save_document(&sample_document("tenant-a", "one.txt"))
            .await
            .unwrap();
        catalog
            .save_document(&sample_document("tenant-a", "two.txt"))
            .await
            .unwrap();
        catalog
            .save_document(&sample_document("tenant-b", "other.txt"))
            .await
            .unwrap();

        let docs = catalog.list_documents("tenant-a").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.tenant_id == "tenant-a"));
    }

    #[tokio::test]
    async fn test_list_with_no_catalog_file() {
        let dir = tempdir().unwrap();
        let catalog = FileCatalog::new(dir.path().join("missing.json"));

        let docs = catalog.list_documents("tenant-a").await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_blob_storage_reads_local_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, b"payload").unwrap();

        let storage = LocalBlobStorage;
        let bytes = storage
            .read_file(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[tokio::test]
    async fn test_blob_storage_missing_file_is_io_error() {
        let storage = LocalBlobStorage;
        let err = storage.read_file("/nonexistent/blob").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
