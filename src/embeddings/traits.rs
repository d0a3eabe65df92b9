// Text embedder trait — the seam between the pipeline and the model.
//
// The pipeline only ever needs "text in, vector out". The default
// implementation runs a local ONNX sentence transformer; tests plug in
// deterministic fakes.

use anyhow::Result;
use async_trait::async_trait;

/// Maps text to a fixed-dimension embedding vector.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text.
    async fn embed_text(&self, text: &str) -> Result<Vec<f64>>;

    /// Embed multiple texts, returning vectors in the same order.
    /// The default calls embed_text sequentially; models that
    /// batch efficiently should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_text(text).await?);
        }
        Ok(vectors)
    }
}
