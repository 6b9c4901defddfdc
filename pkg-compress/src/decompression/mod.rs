//! Decompression handling.

mod decoder;
pub use decoder::CompressionDecoder;

mod settings;
pub use settings::DecompressionSettings;
