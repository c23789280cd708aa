//! Carga y gestión de configuración: parámetros del núcleo RAG y del ejecutable
//! (proveedor LLM, almacén de documentos).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RagError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Gemini,
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }
}

/// Parámetros del pipeline de ingesta + recuperación + generación.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Número de chunks recuperados por consulta.
    pub top_k: usize,
    pub temperature: f64,
    /// Tamaño máximo de un chunk dentro de una página. 0 = un chunk por página.
    pub chunk_max_chars: usize,
    /// Límite por llamada externa (almacén, embeddings, generación).
    pub provider_timeout: Option<Duration>,
    /// Consulta usada para recuperar contexto en modo recomendación.
    pub recommendation_query: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            temperature: 0.7,
            chunk_max_chars: 1200,
            provider_timeout: Some(Duration::from_secs(60)),
            recommendation_query: "travel preparation packing checklist".to_string(),
        }
    }
}

impl RagConfig {
    pub fn validate(&self) -> std::result::Result<(), RagError> {
        if self.top_k == 0 {
            return Err(RagError::InvalidTopK(self.top_k));
        }
        Ok(())
    }
}

/// Configuración completa del ejecutable.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm_provider: LlmProvider,
    pub llm_embedding_model: String,
    pub llm_chat_model: String,

    pub document_root: PathBuf,
    pub document_bucket: String,

    pub rag: RagConfig,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que [`AppConfig::from_env`] pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let document_root = lookup("DOCUMENT_ROOT")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("Falta DOCUMENT_ROOT en el entorno"))?;
        let document_bucket =
            lookup("DOCUMENT_BUCKET").unwrap_or_else(|| "travel-pdfs".to_string());

        let llm_provider = lookup("LLM_PROVIDER")
            .unwrap_or_else(|| "openai".to_string())
            .parse::<LlmProvider>()?;

        let llm_embedding_model = lookup("LLM_EMBEDDING_MODEL")
            .unwrap_or_else(|| "text-embedding-3-small".to_string());
        let llm_chat_model =
            lookup("LLM_CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let mut rag = RagConfig::default();
        if let Some(v) = lookup("RAG_TOP_K") {
            rag.top_k = v.parse().with_context(|| format!("RAG_TOP_K inválido: {v}"))?;
        }
        if let Some(v) = lookup("RAG_TEMPERATURE") {
            rag.temperature = v
                .parse()
                .with_context(|| format!("RAG_TEMPERATURE inválido: {v}"))?;
        }
        if let Some(v) = lookup("RAG_CHUNK_MAX_CHARS") {
            rag.chunk_max_chars = v
                .parse()
                .with_context(|| format!("RAG_CHUNK_MAX_CHARS inválido: {v}"))?;
        }
        if let Some(v) = lookup("RAG_PROVIDER_TIMEOUT_SECS") {
            let secs: u64 = v
                .parse()
                .with_context(|| format!("RAG_PROVIDER_TIMEOUT_SECS inválido: {v}"))?;
            rag.provider_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(v) = lookup("RAG_RECOMMENDATION_QUERY") {
            rag.recommendation_query = v;
        }
        rag.validate()?;

        Ok(Self {
            llm_provider,
            llm_embedding_model,
            llm_chat_model,
            document_root,
            document_bucket,
            rag,
        })
    }
}
