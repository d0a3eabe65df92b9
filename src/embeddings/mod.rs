// Sentence embeddings — the text → vector provider used by both parsers.

pub mod download;
pub mod onnx;
pub mod traits;
