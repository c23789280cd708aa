//! Taxonomía de errores del núcleo RAG.
//!
//! Todos los errores son terminales para la petición en curso: el núcleo no
//! reintenta nada y nunca devuelve resultados parciales. El llamante decide
//! cómo traducir cada tipo a su transporte (HTTP, código de salida, ...).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    /// Los bytes no se pudieron convertir en texto (PDF corrupto, codificación
    /// no soportada o ninguna página con texto).
    #[error("Documento ilegible: {0}")]
    UnreadableDocument(String),

    #[error("Error del proveedor de embeddings: {0}")]
    EmbeddingProviderError(String),

    /// El embedding de la consulta no tiene la misma dimensión que el índice.
    #[error("Dimensión incompatible: el índice usa {expected} y la consulta {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("top_k inválido ({0}): debe ser mayor que cero")]
    InvalidTopK(usize),

    #[error("Error del proveedor de generación: {0}")]
    GenerationProviderError(String),

    #[error("Almacén de documentos no disponible: {0}")]
    StoreUnavailable(String),

    #[error("Documento no encontrado: {0}")]
    NotFound(String),
}

impl RagError {
    /// Identificador estable del tipo de error, pensado para que la capa de
    /// transporte lo mapee sin depender del texto del mensaje.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnreadableDocument(_) => "unreadable_document",
            Self::EmbeddingProviderError(_) => "embedding_provider_error",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::InvalidTopK(_) => "invalid_top_k",
            Self::GenerationProviderError(_) => "generation_provider_error",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::NotFound(_) => "not_found",
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
