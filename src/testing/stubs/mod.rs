pub mod chunk_stream;

pub use chunk_stream::ChunkStream;
