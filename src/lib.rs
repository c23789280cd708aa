//! Preguntas y recomendaciones de equipaje sobre el PDF de un destino de viaje,
//! mediante recuperación aumentada (RAG) sobre un índice en memoria por petición.

pub mod config;
mod deadline;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod parse;
pub mod prompt;
pub mod rag;
pub mod store;
pub mod vector_store;

pub use config::{AppConfig, LlmProvider, RagConfig};
pub use error::{RagError, Result};
pub use extract::{PageExtractor, PdfPages, PlainTextPages};
pub use llm::{EmbeddingProvider, GenerationProvider, LlmManager};
pub use models::{Answer, Chunk, Document, Locator, Recommendation, RetrievalResult, ScoredChunk};
pub use parse::parse_numbered_list;
pub use rag::TravelRag;
pub use store::{DocumentStore, InMemoryDocumentStore, LocalDocumentStore};
pub use vector_store::{cosine_similarity, retrieve, SimilarityIndex};
