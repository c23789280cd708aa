//! Modelos de dominio: documentos, chunks, resultados de recuperación y respuestas.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RagError, Result};

/// Ubicación de un documento en el almacén (equivalente a bucket + clave).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub bucket: String,
    pub key: String,
}

impl Locator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Interpreta `"bucket/clave/con/barras"`: el primer segmento es el bucket.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim().trim_start_matches('/');
        match s.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(bucket, key))
            }
            _ => Err(RagError::NotFound(format!(
                "Localizador sin el formato 'bucket/clave': '{s}'"
            ))),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Contenido bruto de un documento tal como lo devuelve el almacén.
/// Inmutable una vez obtenido.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: Locator,
    pub bytes: Vec<u8>,
}

/// Trozo contiguo de texto extraído de una página.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// Posición del chunk dentro del documento (0, 1, 2, ...).
    pub index: usize,
    /// Página de origen, empezando en 1.
    pub page: usize,
    pub text: String,
}

/// Un chunk recuperado junto con su puntuación de similitud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}

/// Chunks más relevantes para una consulta, en orden de puntuación descendente.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub matches: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.matches.iter().map(|m| &m.chunk)
    }
}

/// Elemento de una lista numerada de recomendaciones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub number: u64,
    pub recommendation: String,
}

/// Resultado final de una petición: texto libre o lista estructurada.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Text(String),
    Recommendations(Vec<Recommendation>),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(t) => Some(t),
            Answer::Recommendations(_) => None,
        }
    }

    pub fn as_recommendations(&self) -> Option<&[Recommendation]> {
        match self {
            Answer::Recommendations(items) => Some(items),
            Answer::Text(_) => None,
        }
    }
}

/// Recorta `s` a `max` caracteres (no bytes) para registrar texto del usuario.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
