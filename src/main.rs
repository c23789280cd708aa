use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use travel_rag::{
    Answer, AppConfig, LlmManager, LocalDocumentStore, Locator, RagError, TravelRag,
};

#[derive(Parser)]
#[command(name = "travel-rag", version, about = "Consultas RAG sobre PDFs de destinos de viaje")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Responde a una pregunta sobre el PDF de un destino.
    Ask {
        /// Clave del PDF dentro del bucket.
        key: String,
        question: String,
        /// Bucket; por defecto DOCUMENT_BUCKET.
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Recomienda qué preparar y llevar para un destino.
    Recommend {
        key: String,
        #[arg(long)]
        bucket: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Error de arranque: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // 2. Configuración y proveedores, una sola vez por proceso
    let cfg = AppConfig::from_env().context("Error al cargar la configuración")?;
    let llm = Arc::new(LlmManager::from_config(&cfg).context("Error inicializando LLM Manager")?);
    let store = Arc::new(LocalDocumentStore::new(cfg.document_root.clone()));
    let rag = TravelRag::new(store, llm.clone(), llm, cfg.rag.clone())?;

    info!(
        provider = ?cfg.llm_provider,
        root = %cfg.document_root.display(),
        "Servicio RAG listo"
    );

    // 3. Ejecutar la orden
    let result = match cli.command {
        Command::Ask { key, question, bucket } => {
            let locator = Locator::new(bucket.unwrap_or_else(|| cfg.document_bucket.clone()), key);
            rag.answer_question_at(&locator, &question).await
        }
        Command::Recommend { key, bucket } => {
            let locator = Locator::new(bucket.unwrap_or_else(|| cfg.document_bucket.clone()), key);
            rag.recommend_preparations_at(&locator).await
        }
    };

    // 4. Traducir el resultado a salida JSON y código de salida
    match result {
        Ok(answer) => {
            let body = match answer {
                Answer::Text(text) => json!({ "answer": text }),
                Answer::Recommendations(items) => json!({ "recommendations": items }),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(kind = err.kind(), "La petición falló: {err}");
            eprintln!("{}", json!({ "error": err.to_string(), "kind": err.kind() }));
            Ok(ExitCode::from(exit_code_for(&err)))
        }
    }
}

fn exit_code_for(err: &RagError) -> u8 {
    match err {
        RagError::NotFound(_) => 2,
        RagError::InvalidTopK(_)
        | RagError::UnreadableDocument(_)
        | RagError::DimensionMismatch { .. } => 3,
        RagError::EmbeddingProviderError(_)
        | RagError::GenerationProviderError(_)
        | RagError::StoreUnavailable(_) => 4,
    }
}
