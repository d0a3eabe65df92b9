// Fetches the sentence embedding model (all-MiniLM-L6-v2, ONNX export plus
// tokenizer) from HuggingFace into the platform data directory, e.g.
// ~/.local/share/thematic/models/all-MiniLM-L6-v2/ on Linux.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Name of the model, used as the subdirectory under the model dir.
pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Local file names inside the model's subdirectory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

const HF_BASE_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// One file the embedder needs on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFile {
    /// Path within the HuggingFace repo.
    pub remote: &'static str,
    /// File name inside the model subdirectory.
    pub local: &'static str,
}

impl ModelFile {
    fn url(&self) -> String {
        format!("{HF_BASE_URL}/{}", self.remote)
    }
}

/// Everything `SentenceEmbedder::load` opens. The tokenizer is small, so it
/// goes first and a bad network shows up before the 90 MB model transfer.
pub const MODEL_FILES: &[ModelFile] = &[
    ModelFile {
        remote: "tokenizer.json",
        local: TOKENIZER_FILE,
    },
    ModelFile {
        remote: "onnx/model.onnx",
        local: MODEL_FILE,
    },
];

/// Default base directory for model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thematic")
        .join("models")
}

/// Subdirectory within `base` holding this model's files.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join(EMBEDDING_MODEL_NAME)
}

/// Model files not yet present under `base`, in download order.
pub fn missing_files(base: &Path) -> Vec<&'static ModelFile> {
    let model_dir = embedding_model_dir(base);
    MODEL_FILES
        .iter()
        .filter(|file| !model_dir.join(file.local).exists())
        .collect()
}

/// Whether every model file is on disk.
pub fn embedding_files_present(base: &Path) -> bool {
    missing_files(base).is_empty()
}

/// Download whatever model files are missing under `base`.
pub async fn download_model(base: &Path) -> Result<()> {
    let model_dir = embedding_model_dir(base);
    std::fs::create_dir_all(&model_dir)
        .with_context(|| format!("Failed to create model directory: {}", model_dir.display()))?;

    println!("\nSentence embedding model ({EMBEDDING_MODEL_NAME}):");

    let missing = missing_files(base);
    for file in MODEL_FILES.iter().filter(|f| !missing.contains(f)) {
        println!("  {} (already exists)", file.local);
    }
    if missing.is_empty() {
        info!(dir = %model_dir.display(), "Embedding model already downloaded");
        return Ok(());
    }

    let client = reqwest::Client::new();
    for file in missing {
        println!("  Downloading {}...", file.local);
        fetch(&client, file, &model_dir.join(file.local)).await?;
    }

    Ok(())
}

/// Stream one file into `dest` through a `.part` sibling, so an interrupted
/// transfer never leaves a file that `missing_files` would accept.
async fn fetch(client: &reqwest::Client, file: &ModelFile, dest: &Path) -> Result<()> {
    let url = file.url();
    let mut response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let progress = progress_bar(response.content_length())?;

    let mut part_name = dest.as_os_str().to_owned();
    part_name.push(".part");
    let part_path = PathBuf::from(part_name);
    let mut out = std::fs::File::create(&part_path)
        .with_context(|| format!("Failed to create {}", part_path.display()))?;

    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?
    {
        out.write_all(&chunk)
            .with_context(|| format!("Failed to write {}", part_path.display()))?;
        progress.inc(chunk.len() as u64);
    }
    out.flush()?;
    drop(out);

    std::fs::rename(&part_path, dest)
        .with_context(|| format!("Failed to move {} into place", dest.display()))?;

    progress.finish_and_clear();
    info!(url = %url, bytes = progress.position(), dest = %dest.display(), "Downloaded model file");
    Ok(())
}

/// A byte bar when the server reports a length, a spinner otherwise.
fn progress_bar(content_length: Option<u64>) -> Result<ProgressBar> {
    let bar = match content_length {
        Some(size) => ProgressBar::new(size).with_style(
            ProgressStyle::with_template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                .progress_chars("=> "),
        ),
        None => ProgressBar::new_spinner()
            .with_style(ProgressStyle::with_template("    {spinner} {bytes}")?),
    };
    Ok(bar)
}
