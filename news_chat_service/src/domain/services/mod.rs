pub mod backoff;
pub mod conversation_assembler;
pub mod generative_client;
pub mod text_sanitizer;
pub mod vector_collection_store;
