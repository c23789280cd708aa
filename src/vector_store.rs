//! Índice de similitud en memoria para los chunks de un único documento.
//!
//! Búsqueda exhaustiva por similitud coseno: con un documento por petición no
//! hace falta un índice aproximado. El índice pertenece a una sola petición y
//! se descarta al terminar.

use tracing::debug;

use crate::{
    error::{RagError, Result},
    llm::EmbeddingProvider,
    models::{Chunk, RetrievalResult, ScoredChunk},
};

/// Secuencia ordenada de pares (chunk, embedding) de un documento.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    entries: Vec<(Chunk, Vec<f64>)>,
    dimensions: usize,
}

impl SimilarityIndex {
    /// Construye el índice comprobando que todos los embeddings tienen la
    /// misma dimensión, no están vacíos y solo contienen valores finitos.
    pub fn from_pairs(entries: Vec<(Chunk, Vec<f64>)>) -> Result<Self> {
        let dimensions = entries.first().map(|(_, e)| e.len()).unwrap_or(0);
        if !entries.is_empty() && dimensions == 0 {
            return Err(RagError::EmbeddingProviderError(
                "El proveedor devolvió un embedding vacío".into(),
            ));
        }
        if let Some((chunk, emb)) = entries.iter().find(|(_, e)| e.len() != dimensions) {
            return Err(RagError::EmbeddingProviderError(format!(
                "Embedding del chunk {} con dimensión {} (se esperaba {dimensions})",
                chunk.index,
                emb.len()
            )));
        }
        if let Some((chunk, _)) = entries.iter().find(|(_, e)| !is_finite(e)) {
            return Err(RagError::EmbeddingProviderError(format!(
                "Embedding del chunk {} con valores no finitos",
                chunk.index
            )));
        }
        Ok(Self { entries, dimensions })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|(c, _)| c)
    }

    /// Los `top_k` chunks más parecidos a `query`, por puntuación descendente.
    /// Los empates conservan el orden original de los chunks.
    pub fn search(&self, query: &[f64], top_k: usize) -> Result<RetrievalResult> {
        if top_k == 0 {
            return Err(RagError::InvalidTopK(top_k));
        }
        if !self.is_empty() && query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if !is_finite(query) {
            return Err(RagError::EmbeddingProviderError(
                "Embedding de la consulta con valores no finitos".into(),
            ));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(embedding, query),
            })
            .collect();

        // sort_by es estable: los empates quedan en orden de chunk.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);

        Ok(RetrievalResult { matches: scored })
    }
}

fn is_finite(embedding: &[f64]) -> bool {
    embedding.iter().all(|x| x.is_finite())
}

/// Similitud coseno; 0.0 si alguno de los vectores tiene norma cero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Embebe `query_text` con el mismo proveedor usado para el índice y devuelve
/// los `top_k` chunks más relevantes.
pub async fn retrieve(
    index: &SimilarityIndex,
    embedder: &dyn EmbeddingProvider,
    query_text: &str,
    top_k: usize,
) -> Result<RetrievalResult> {
    if top_k == 0 {
        return Err(RagError::InvalidTopK(top_k));
    }
    let query_vec = embedder.embed(query_text).await?;
    let result = index.search(&query_vec, top_k)?;

    debug!(
        top_k,
        returned = result.len(),
        best_score = result.matches.first().map(|m| m.score),
        "Recuperación completada"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize) -> Chunk {
        Chunk {
            index,
            page: index + 1,
            text: format!("página {}", index + 1),
        }
    }

    fn index_of(vectors: &[[f64; 2]]) -> SimilarityIndex {
        SimilarityIndex::from_pairs(
            vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (chunk(i), v.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn cosine_of_parallel_and_orthogonal_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn search_orders_by_descending_score() {
        let index = index_of(&[[0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
        let result = index.search(&[1.0, 0.1], 3).unwrap();
        let order: Vec<usize> = result.chunks().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn ties_keep_chunk_order() {
        let index = index_of(&[[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 0.0]]);
        let result = index.search(&[1.0, 0.0], 3).unwrap();
        let order: Vec<usize> = result.chunks().map(|c| c.index).collect();
        assert_eq!(order, vec![0, 2, 3]);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = index_of(&[[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(index.search(&[1.0, 1.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = index_of(&[[1.0, 0.0]]);
        assert!(matches!(index.search(&[1.0, 0.0], 0), Err(RagError::InvalidTopK(0))));
    }

    #[test]
    fn query_dimension_must_match() {
        let index = index_of(&[[1.0, 0.0]]);
        let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn mixed_dimensions_are_rejected_at_build() {
        let err = SimilarityIndex::from_pairs(vec![
            (chunk(0), vec![1.0, 0.0]),
            (chunk(1), vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, RagError::EmbeddingProviderError(_)));
    }

    #[test]
    fn non_finite_chunk_embeddings_are_rejected_at_build() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = SimilarityIndex::from_pairs(vec![
                (chunk(0), vec![0.1, 1.0]),
                (chunk(1), vec![bad, 0.0]),
                (chunk(2), vec![1.0, 0.0]),
            ])
            .unwrap_err();
            assert!(matches!(err, RagError::EmbeddingProviderError(_)));
        }
    }

    #[test]
    fn non_finite_query_is_rejected() {
        let index = index_of(&[[0.1, 1.0], [1.0, 0.0]]);
        for bad in [[f64::NAN, 0.0], [1.0, f64::INFINITY]] {
            let err = index.search(&bad, 2).unwrap_err();
            assert!(matches!(err, RagError::EmbeddingProviderError(_)));
        }
    }

    #[test]
    fn zero_norm_chunk_ranks_below_any_match() {
        let index = index_of(&[[0.1, 1.0], [0.0, 0.0], [1.0, 0.0]]);
        let result = index.search(&[1.0, 0.0], 3).unwrap();
        let order: Vec<usize> = result.chunks().map(|c| c.index).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }
}
