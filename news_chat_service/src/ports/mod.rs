pub mod embeddings_port;
pub mod feed_source_port;
pub mod generate_content_port;
pub mod session_repository;
pub mod vector_index_port;
