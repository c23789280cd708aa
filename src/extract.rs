//! Extracción de texto por páginas a partir de los bytes de un documento.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// Convierte bytes en una lista de páginas de texto (la página 1 es el índice 0).
///
/// Las páginas en blanco se conservan para no desplazar la numeración; el
/// llamante decide si un documento sin texto útil es un error.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Extractor de PDF basado en `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPages;

#[async_trait]
impl PageExtractor for PdfPages {
    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let data = bytes.to_vec();
        // pdf-extract es síncrono y puede entrar en pánico con fuentes raras.
        let joined = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&data)
        })
        .await;

        match joined {
            Ok(Ok(pages)) => {
                debug!(pages = pages.len(), "Texto extraído del PDF");
                Ok(pages)
            }
            Ok(Err(e)) => Err(RagError::UnreadableDocument(format!(
                "No se pudo extraer texto del PDF: {e}"
            ))),
            Err(e) => {
                warn!(error = %e, "La extracción del PDF abortó");
                Err(RagError::UnreadableDocument(format!(
                    "La extracción del PDF abortó: {e}"
                )))
            }
        }
    }
}

/// Texto plano UTF-8 con las páginas separadas por salto de página (`\x0c`),
/// el formato habitual de los volcados de capa de texto.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextPages;

#[async_trait]
impl PageExtractor for PlainTextPages {
    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            RagError::UnreadableDocument(format!("El texto no es UTF-8 válido: {e}"))
        })?;
        Ok(text.split('\x0c').map(str::to_string).collect())
    }
}
