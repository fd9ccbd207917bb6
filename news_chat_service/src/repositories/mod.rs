pub mod embeddings_jina_repository;
pub mod feed_source_http_repository;
pub mod generate_content_gemini_repository;
pub mod session_memory_repository;
pub mod vector_index_qdrant_repository;
