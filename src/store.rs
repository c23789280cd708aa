//! Almacenes de documentos: de dónde salen los bytes de cada PDF.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{RagError, Result};
use crate::models::{Document, Locator};

/// Fuente de documentos. Debe fallar con `NotFound` o `StoreUnavailable`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, locator: &Locator) -> Result<Document>;
}

/// Almacén sobre el sistema de archivos: `root/<bucket>/<clave>`.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, locator: &Locator) -> Result<PathBuf> {
        for part in [&locator.bucket, &locator.key] {
            let safe = Path::new(part)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
            if !safe {
                return Err(RagError::NotFound(format!(
                    "Localizador fuera del almacén: {locator}"
                )));
            }
        }
        Ok(self.root.join(&locator.bucket).join(&locator.key))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn fetch(&self, locator: &Locator) -> Result<Document> {
        let path = self.resolve(locator)?;
        debug!(path = %path.display(), "Leyendo documento del almacén local");

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Document {
                source: locator.clone(),
                bytes,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RagError::NotFound(format!(
                "No existe el documento {locator}"
            ))),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Fallo de E/S en el almacén local");
                Err(RagError::StoreUnavailable(format!(
                    "No se pudo leer {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

/// Almacén en memoria, útil para pruebas y para llamantes que ya tienen los bytes.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Locator, Vec<u8>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, locator: Locator, bytes: impl Into<Vec<u8>>) {
        self.documents.write().await.insert(locator, bytes.into());
    }

    pub async fn remove(&self, locator: &Locator) -> bool {
        self.documents.write().await.remove(locator).is_some()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn fetch(&self, locator: &Locator) -> Result<Document> {
        let documents = self.documents.read().await;
        let bytes = documents
            .get(locator)
            .ok_or_else(|| RagError::NotFound(format!("No existe el documento {locator}")))?;
        Ok(Document {
            source: locator.clone(),
            bytes: bytes.clone(),
        })
    }
}
