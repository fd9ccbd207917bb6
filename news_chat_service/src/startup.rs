use std::{net::TcpListener, sync::Arc};

use actix_web::{dev::Server, web, App, HttpServer};
use common::helper::error_chain_fmt;
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{QdrantSettings, Settings},
    domain::services::{
        generative_client::GenerativeClient, vector_collection_store::VectorCollectionStore,
    },
    ports::{
        embeddings_port::{EmbeddingsError, EmbeddingsPort},
        feed_source_port::{FeedSourceError, FeedSourcePort},
        generate_content_port::GenerateContentPort,
        session_repository::SessionRepository,
        vector_index_port::VectorIndexPort,
    },
    repositories::{
        embeddings_jina_repository::EmbeddingsJinaRepository,
        feed_source_http_repository::FeedSourceHttpRepository,
        generate_content_gemini_repository::GenerateContentGeminiRepository,
        session_memory_repository::SessionMemoryRepository,
        vector_index_qdrant_repository::VectorIndexQdrantRepository,
    },
    routes::{chat, clear_session, create_session, health_check, session_history},
    use_cases::{answer_chat::AnswerChatUseCase, ingest_feeds::IngestFeedsUseCase},
};

/// Clients to the external systems, shared by every request and by the ingestion
pub struct Adapters {
    pub embeddings: Arc<dyn EmbeddingsPort>,
    pub vector_index: Arc<dyn VectorIndexPort>,
    pub generate_content: Arc<dyn GenerateContentPort>,
    pub feed_source: Arc<dyn FeedSourcePort>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Adapters {
    /// Builds the production adapters: Jina, Qdrant, Gemini, HTTP feeds and in-memory sessions
    pub fn try_from_settings(settings: &Settings) -> Result<Self, ApplicationBuildError> {
        let qdrant_client = get_qdrant_client(&settings.qdrant)?;

        Ok(Self {
            embeddings: Arc::new(EmbeddingsJinaRepository::try_new(&settings.embeddings)?),
            vector_index: Arc::new(VectorIndexQdrantRepository::new(qdrant_client)),
            generate_content: Arc::new(GenerateContentGeminiRepository::new(&settings.generative)),
            feed_source: Arc::new(FeedSourceHttpRepository::try_new()?),
            sessions: Arc::new(SessionMemoryRepository::new()),
        })
    }
}

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
    ingestion: Option<JoinHandle<()>>,
}

#[derive(thiserror::Error)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),
    #[error(transparent)]
    EmbeddingsError(#[from] EmbeddingsError),
    #[error(transparent)]
    FeedSourceError(#[from] FeedSourceError),
}

impl std::fmt::Debug for ApplicationBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl Application {
    #[tracing::instrument(name = "Building application")]
    pub async fn build(settings: Settings) -> Result<Self, ApplicationBuildError> {
        let adapters = Adapters::try_from_settings(&settings)?;
        Self::build_with_adapters(settings, adapters)
    }

    /// Wires the services on top of the given adapters, binds the listener and,
    /// if enabled, starts the ingestion in the background.
    ///
    /// Serving does not wait for the ingestion: early queries can hit an empty
    /// or half-filled collection.
    pub fn build_with_adapters(
        settings: Settings,
        adapters: Adapters,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let store = Arc::new(VectorCollectionStore::new(
            adapters.vector_index.clone(),
            &settings.qdrant.collection,
        ));

        let generative_client = Arc::new(GenerativeClient::new(
            adapters.generate_content.clone(),
            settings.generative.backoff_policy(),
            settings.generative.max_history,
        ));

        let answer_chat = AnswerChatUseCase::new(
            adapters.embeddings.clone(),
            store.clone(),
            generative_client,
        )
        .with_top_k(settings.chat.top_k)
        .with_history_mode(settings.chat.history_mode);

        let ingestion = if settings.ingestion.enabled {
            let ingest_feeds = IngestFeedsUseCase::new(
                store,
                adapters.embeddings.clone(),
                adapters.feed_source.clone(),
                settings.ingestion.feeds.clone(),
            )
            .with_limits(
                settings.ingestion.max_items_per_feed,
                settings.ingestion.max_articles,
            );

            Some(spawn_ingestion(ingest_feeds))
        } else {
            info!("Ingestion disabled");
            None
        };

        let server = run(listener, answer_chat, adapters.sessions)?;

        Ok(Self {
            server,
            port,
            ingestion,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        let result = self.server.await;

        if let Some(ingestion) = self.ingestion {
            ingestion.abort();
        }

        info!("👋 Bye!");
        result
    }
}

/// Runs the ingestion once, its failure only gets logged
fn spawn_ingestion(ingest_feeds: IngestFeedsUseCase) -> JoinHandle<()> {
    tokio::spawn(async move {
        match ingest_feeds.run().await {
            Ok(report) => info!(?report, "Ingestion completed"),
            Err(error) => error!(?error, "Ingestion failed"),
        }
    })
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
pub fn run(
    listener: TcpListener,
    answer_chat: AnswerChatUseCase,
    sessions: Arc<dyn SessionRepository>,
) -> Result<Server, std::io::Error> {
    // Shared among all actix-web workers
    let answer_chat = web::Data::new(answer_chat);
    let sessions: web::Data<dyn SessionRepository> = web::Data::from(sessions);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/session", web::post().to(create_session))
            .route("/session/{session_id}", web::delete().to(clear_session))
            .route("/history/{session_id}", web::get().to(session_history))
            .route("/chat", web::post().to(chat))
            .app_data(answer_chat.clone())
            .app_data(sessions.clone())
    })
    .listen(listener)?
    .run();

    // No await
    Ok(server)
}

/// Set up a client to Qdrant
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, ApplicationBuildError> {
    let qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    QdrantClient::new(Some(qdrant_config))
        .map_err(|e| ApplicationBuildError::QdrantError(e.to_string()))
}
