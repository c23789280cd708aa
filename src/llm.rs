//! Proveedores de embeddings y de generación de texto.
//!
//! El núcleo sólo conoce los traits [`EmbeddingProvider`] y
//! [`GenerationProvider`]; [`LlmManager`] los implementa sobre Rig para
//! OpenAI y Gemini. Los clientes se construyen una vez al arrancar y se
//! inyectan en el servicio.

use anyhow::{anyhow, Result as AnyResult};
use async_trait::async_trait;
use futures::future::try_join_all;
use rig::client::{CompletionClient as _, EmbeddingsClient as _, ProviderClient as _};
use rig::completion::Prompt;
use rig::embeddings::EmbeddingModel as _;
use rig::providers::{gemini, openai};
use tracing::debug;

use crate::config::{AppConfig, LlmProvider};
use crate::error::{RagError, Result};

/// Calcula embeddings de dimensión fija para un proveedor dado.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;

    /// Embeddings de varios textos, en el mismo orden. Por defecto lanza una
    /// llamada a [`EmbeddingProvider::embed`] por texto.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        try_join_all(texts.iter().map(|t| self.embed(t))).await
    }
}

/// Modelo generativo: una llamada, un texto de salida.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String>;
}

#[derive(Clone)]
enum Clients {
    OpenAI(openai::Client),
    Gemini(gemini::Client),
}

/// Gestor de LLMs y embeddings respaldado por Rig.
#[derive(Clone)]
pub struct LlmManager {
    clients: Clients,
    pub provider: LlmProvider,
    pub embedding_model: String,
    pub chat_model: String,
}

impl std::fmt::Debug for LlmManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmManager")
            .field("provider", &self.provider)
            .field("embedding_model", &self.embedding_model)
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

impl LlmManager {
    /// Construye el manager a partir de la configuración. La clave del
    /// proveedor se lee del entorno (`OPENAI_API_KEY` / `GEMINI_API_KEY`).
    pub fn from_config(cfg: &AppConfig) -> AnyResult<Self> {
        let clients = match cfg.llm_provider {
            LlmProvider::OpenAI => {
                require_env("OPENAI_API_KEY")?;
                Clients::OpenAI(openai::Client::from_env())
            }
            LlmProvider::Gemini => {
                require_env("GEMINI_API_KEY")?;
                Clients::Gemini(gemini::Client::from_env())
            }
        };

        Ok(Self {
            clients,
            provider: cfg.llm_provider.clone(),
            embedding_model: cfg.llm_embedding_model.clone(),
            chat_model: cfg.llm_chat_model.clone(),
        })
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        let requested = texts.len();
        let embeddings = match &self.clients {
            Clients::OpenAI(client) => client
                .embedding_model(&self.embedding_model)
                .embed_texts(texts)
                .await
                .map_err(|e| RagError::EmbeddingProviderError(e.to_string()))?,
            Clients::Gemini(client) => client
                .embedding_model(&self.embedding_model)
                .embed_texts(texts)
                .await
                .map_err(|e| RagError::EmbeddingProviderError(e.to_string()))?,
        };

        if embeddings.len() != requested {
            return Err(RagError::EmbeddingProviderError(format!(
                "Número de embeddings ({}) distinto al número de textos ({})",
                embeddings.len(),
                requested
            )));
        }
        Ok(embeddings.into_iter().map(|e| e.vec).collect())
    }
}

fn require_env(key: &str) -> AnyResult<()> {
    std::env::var(key)
        .map(|_| ())
        .map_err(|_| anyhow!("Falta {key} en el entorno"))
}

#[async_trait]
impl EmbeddingProvider for LlmManager {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.embed_texts(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| {
                RagError::EmbeddingProviderError("El proveedor no devolvió ningún embedding".into())
            })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(texts = texts.len(), model = %self.embedding_model, "Embeddings en bloque");
        self.embed_texts(texts.to_vec()).await
    }
}

#[async_trait]
impl GenerationProvider for LlmManager {
    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String> {
        let answer = match &self.clients {
            Clients::OpenAI(client) => {
                let agent = client
                    .agent(&self.chat_model)
                    .temperature(temperature)
                    .build();
                agent.prompt(prompt).await
            }
            Clients::Gemini(client) => {
                let agent = client
                    .agent(&self.chat_model)
                    .temperature(temperature)
                    .build();
                agent.prompt(prompt).await
            }
        };
        answer.map_err(|e| RagError::GenerationProviderError(e.to_string()))
    }
}
