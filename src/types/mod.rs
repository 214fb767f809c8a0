mod api;

pub use api::{ApiMessage, ChatCompletionChunk, ChunkChoice, ChunkDelta, ModelInfo, ModelList};
