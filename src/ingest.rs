//! Ingesta de un documento: extracción de texto por páginas, troceado en
//! chunks, embeddings y construcción del índice de similitud en memoria.
//!
//! Cada llamada recalcula todo desde cero; no hay caché entre peticiones.

use std::time::Instant;

use tracing::{debug, info};

use crate::{
    config::RagConfig,
    deadline,
    error::{RagError, Result},
    extract::PageExtractor,
    llm::EmbeddingProvider,
    models::Chunk,
    vector_store::SimilarityIndex,
};

/// Convierte los bytes de un documento en un [`SimilarityIndex`].
///
/// Falla con `UnreadableDocument` si no hay texto extraíble y propaga tal cual
/// los errores del proveedor de embeddings. Nunca devuelve un índice a medias.
pub async fn ingest(
    extractor: &dyn PageExtractor,
    embedder: &dyn EmbeddingProvider,
    bytes: &[u8],
    cfg: &RagConfig,
) -> Result<SimilarityIndex> {
    let started = Instant::now();

    // --- Fase 1: Texto y chunks ---
    // pdf-extract puede colgarse con fuentes problemáticas.
    let pages = deadline::within(
        cfg.provider_timeout,
        extractor.extract_pages(bytes),
        RagError::UnreadableDocument,
    )
    .await?;
    let page_count = pages.len();
    let chunks = chunk_pages(&pages, cfg.chunk_max_chars);
    if chunks.is_empty() {
        return Err(RagError::UnreadableDocument(format!(
            "Ninguna de las {page_count} páginas tiene texto extraíble"
        )));
    }
    debug!(pages = page_count, chunks = chunks.len(), "Documento troceado");

    // --- Fase 2: Embeddings ---
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = deadline::within(
        cfg.provider_timeout,
        embedder.embed_batch(&texts),
        RagError::EmbeddingProviderError,
    )
    .await?;

    if embeddings.len() != chunks.len() {
        return Err(RagError::EmbeddingProviderError(format!(
            "Número de embeddings ({}) distinto al número de chunks ({})",
            embeddings.len(),
            chunks.len()
        )));
    }

    let index = SimilarityIndex::from_pairs(chunks.into_iter().zip(embeddings).collect())?;

    info!(
        pages = page_count,
        chunks = index.len(),
        dimensions = index.dimensions(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Documento ingerido"
    );
    Ok(index)
}

/// Trocea las páginas en chunks que nunca cruzan una frontera de página.
///
/// Con `max_chars == 0` cada página con texto es un único chunk. Las páginas
/// en blanco no generan chunks pero conservan su número.
pub fn chunk_pages(pages: &[String], max_chars: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for (page_idx, page) in pages.iter().enumerate() {
        let page_text = page.trim();
        if page_text.is_empty() {
            continue;
        }
        let pieces = if max_chars == 0 {
            vec![page_text.to_string()]
        } else {
            split_into_chunks(page_text, max_chars)
        };
        for text in pieces {
            chunks.push(Chunk {
                index: chunks.len(),
                page: page_idx + 1,
                text,
            });
        }
    }
    chunks
}

/// Agrupa párrafos (separados por línea en blanco) hasta `max_chars`
/// caracteres. Un párrafo que por sí solo excede el límite se corta.
fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let len = paragraph.chars().count();

        if len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(hard_split(paragraph, max_chars));
            continue;
        }

        if current_len + len + 2 > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push_str("\n\n");
            current_len += 2;
        }
        current.push_str(paragraph);
        current_len += len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn hard_split(paragraph: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect::<String>().trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}
