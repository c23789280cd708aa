//! Proveedores de prueba deterministas.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use travel_rag::{
    Document, DocumentStore, EmbeddingProvider, GenerationProvider, InMemoryDocumentStore,
    Locator, PageExtractor, PlainTextPages, RagConfig, RagError, Result, TravelRag,
};

/// Histograma de letras a-z: textos distintos dan vectores distinguibles.
#[derive(Default)]
pub struct LetterEmbedder {
    pub calls: AtomicUsize,
}

pub fn letter_histogram(text: &str) -> Vec<f64> {
    let mut v = vec![0.0; 26];
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    v
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(letter_histogram(text))
    }
}

/// Falla siempre, como un proveedor caído.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        Err(RagError::EmbeddingProviderError("servicio caído".into()))
    }
}

/// Embebe los chunks con 26 dimensiones pero la consulta con 3.
pub struct ShrinkingQueryEmbedder;

#[async_trait]
impl EmbeddingProvider for ShrinkingQueryEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        Ok(vec![1.0, 0.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        Ok(texts.iter().map(|t| letter_histogram(t)).collect())
    }
}

/// Nunca termina a tiempo.
pub struct SlowEmbedder;

#[async_trait]
impl EmbeddingProvider for SlowEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(letter_histogram(text))
    }
}

/// Almacén que no responde.
pub struct SlowStore;

#[async_trait]
impl DocumentStore for SlowStore {
    async fn fetch(&self, locator: &Locator) -> Result<Document> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Document { source: locator.clone(), bytes: two_page_document() })
    }
}

/// Extractor colgado, como pdf-extract con una fuente rota.
pub struct StuckExtractor;

#[async_trait]
impl PageExtractor for StuckExtractor {
    async fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![PAGE_ONE.to_string()])
    }
}

/// Devuelve el prompt tal cual y guarda el último recibido.
#[derive(Default)]
pub struct EchoGenerator {
    pub calls: AtomicUsize,
    pub last: Mutex<Option<(String, f64)>>,
}

impl EchoGenerator {
    pub fn last_prompt(&self) -> Option<String> {
        self.last.lock().unwrap().as_ref().map(|(p, _)| p.clone())
    }

    pub fn last_temperature(&self) -> Option<f64> {
        self.last.lock().unwrap().as_ref().map(|(_, t)| *t)
    }
}

#[async_trait]
impl GenerationProvider for EchoGenerator {
    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((prompt.to_string(), temperature));
        Ok(prompt.to_string())
    }
}

/// Devuelve siempre el mismo texto.
pub struct CannedGenerator(pub String);

#[async_trait]
impl GenerationProvider for CannedGenerator {
    async fn complete(&self, _prompt: &str, _temperature: f64) -> Result<String> {
        Ok(self.0.clone())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl GenerationProvider for FailingGenerator {
    async fn complete(&self, _prompt: &str, _temperature: f64) -> Result<String> {
        Err(RagError::GenerationProviderError("cuota agotada".into()))
    }
}

/// Tarda más que cualquier límite razonable.
pub struct SlowGenerator;

#[async_trait]
impl GenerationProvider for SlowGenerator {
    async fn complete(&self, prompt: &str, _temperature: f64) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(prompt.to_string())
    }
}

pub const PAGE_ONE: &str = "Lisbon trams climb steep hills near the castle.";
pub const PAGE_TWO: &str = "Summer evenings are warm; pack light linen clothing.";

pub fn two_page_document() -> Vec<u8> {
    format!("{PAGE_ONE}\x0c{PAGE_TWO}").into_bytes()
}

pub fn locator() -> Locator {
    Locator::new("gg-pdfbucket", "europe/lisbon.pdf")
}

pub async fn store_with_lisbon() -> Arc<InMemoryDocumentStore> {
    let store = InMemoryDocumentStore::new();
    store.insert(locator(), two_page_document()).await;
    Arc::new(store)
}

pub async fn service(
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    config: RagConfig,
) -> TravelRag {
    TravelRag::new(store_with_lisbon().await, embedder, generator, config)
        .unwrap()
        .with_extractor(Arc::new(PlainTextPages))
}

pub fn timeout_config() -> RagConfig {
    RagConfig {
        provider_timeout: Some(Duration::from_secs(5)),
        ..RagConfig::default()
    }
}
