//! Servicio RAG sobre un único documento de destino.
//!
//! Flujo por petición:
//!   1. (Opcional) Obtener los bytes del documento desde el almacén.
//!   2. Ingesta: páginas → chunks → embeddings → índice en memoria.
//!   3. Recuperación de los `top_k` chunks más parecidos a la consulta.
//!   4. Construcción del prompt con una de las dos plantillas fijas.
//!   5. Una única llamada al modelo generativo; en modo recomendación la
//!      salida se convierte en una lista numerada.
//!
//! Nada se comparte entre peticiones: el índice vive sólo durante la llamada.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    config::RagConfig,
    deadline,
    error::{RagError, Result},
    extract::{PageExtractor, PdfPages},
    ingest,
    llm::{EmbeddingProvider, GenerationProvider},
    models::{truncate_chars, Answer, Locator, RetrievalResult},
    parse::parse_numbered_list,
    prompt::{self, PromptKind},
    store::DocumentStore,
    vector_store::{self, SimilarityIndex},
};

/// Longitud máxima del texto de usuario que se deja en los logs.
const LOG_PREVIEW_CHARS: usize = 300;

/// Punto de entrada del núcleo. Los proveedores se inyectan al construirlo.
#[derive(Clone)]
pub struct TravelRag {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn PageExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    config: RagConfig,
}

impl TravelRag {
    /// Crea el servicio con extracción de PDF. Falla si la configuración no es válida.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        config: RagConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            extractor: Arc::new(PdfPages),
            embedder,
            generator,
            config,
        })
    }

    /// Sustituye el extractor de páginas (por defecto [`PdfPages`]).
    pub fn with_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // ENTRADAS PÚBLICAS
    // ---------------------------------------------------------------------

    /// Responde a `query` usando el documento dado.
    pub async fn answer_question(&self, document: &[u8], query: &str) -> Result<Answer> {
        let span = info_span!(
            "answer_question",
            request_id = %Uuid::new_v4(),
            query = truncate_chars(query, LOG_PREVIEW_CHARS),
        );
        async {
            let index = self.ingest(document).await?;
            let result = self.retrieve(&index, query, self.config.top_k).await?;
            self.generate_answer(&result, query).await
        }
        .instrument(span)
        .await
    }

    /// Recomienda preparativos de viaje a partir del documento dado.
    pub async fn recommend_preparations(&self, document: &[u8]) -> Result<Answer> {
        let span = info_span!("recommend_preparations", request_id = %Uuid::new_v4());
        async {
            let index = self.ingest(document).await?;
            let result = self
                .retrieve(&index, &self.config.recommendation_query, self.config.top_k)
                .await?;
            self.generate_recommendations(&result).await
        }
        .instrument(span)
        .await
    }

    /// Igual que [`TravelRag::answer_question`], obteniendo antes el documento del almacén.
    pub async fn answer_question_at(&self, locator: &Locator, query: &str) -> Result<Answer> {
        let bytes = self.fetch(locator).await?;
        self.answer_question(&bytes, query).await
    }

    /// Igual que [`TravelRag::recommend_preparations`], obteniendo antes el documento del almacén.
    pub async fn recommend_preparations_at(&self, locator: &Locator) -> Result<Answer> {
        let bytes = self.fetch(locator).await?;
        self.recommend_preparations(&bytes).await
    }

    // ---------------------------------------------------------------------
    // ETAPAS
    // ---------------------------------------------------------------------

    pub async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>> {
        let doc = deadline::within(
            self.config.provider_timeout,
            self.store.fetch(locator),
            RagError::StoreUnavailable,
        )
        .await?;
        info!(locator = %doc.source, bytes = doc.bytes.len(), "Documento obtenido");
        Ok(doc.bytes)
    }

    pub async fn ingest(&self, document: &[u8]) -> Result<SimilarityIndex> {
        ingest::ingest(
            self.extractor.as_ref(),
            self.embedder.as_ref(),
            document,
            &self.config,
        )
        .await
    }

    pub async fn retrieve(
        &self,
        index: &SimilarityIndex,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalResult> {
        deadline::within(
            self.config.provider_timeout,
            vector_store::retrieve(index, self.embedder.as_ref(), query, top_k),
            RagError::EmbeddingProviderError,
        )
        .await
    }

    /// Modo pregunta-respuesta: devuelve el texto del modelo sin tocar.
    pub async fn generate_answer(&self, result: &RetrievalResult, query: &str) -> Result<Answer> {
        let context = prompt::build_context(result);
        let prompt = prompt::render(PromptKind::Question, &context, Some(query));
        let text = self.complete(&prompt).await?;
        Ok(Answer::Text(text))
    }

    /// Modo recomendación: la salida del modelo se convierte en lista numerada.
    pub async fn generate_recommendations(&self, result: &RetrievalResult) -> Result<Answer> {
        let context = prompt::build_context(result);
        let prompt = prompt::render(PromptKind::Recommendations, &context, None);
        let text = self.complete(&prompt).await?;
        let items = parse_numbered_list(&text);
        info!(items = items.len(), "Recomendaciones generadas");
        Ok(Answer::Recommendations(items))
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let text = deadline::within(
            self.config.provider_timeout,
            self.generator.complete(prompt, self.config.temperature),
            RagError::GenerationProviderError,
        )
        .await?;
        info!(
            prompt_chars = prompt.chars().count(),
            answer_chars = text.chars().count(),
            "Respuesta del modelo recibida"
        );
        Ok(text)
    }
}
