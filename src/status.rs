// System status display — shows DB stats, pipeline artifacts, model presence.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::db::Database;
use crate::embeddings::download::embedding_files_present;
use crate::output::theme_names::load_theme_names;

/// Display system status to the terminal.
///
/// `db` is `None` when the database file doesn't exist yet.
pub async fn show(config: &Config, db: Option<&dyn Database>) -> Result<()> {
    match db {
        Some(db) => {
            let file_size = std::fs::metadata(&config.db_path)
                .map(|m| format_bytes(m.len()))
                .unwrap_or_else(|_| "unknown".to_string());
            println!("Database: {} ({})", config.db_path, file_size);
            println!("Stored companies: {}", db.company_count().await?);
        }
        None => {
            println!("Database: not initialized");
            println!("  Run `thematic init` to set up the database.");
        }
    }

    let dataset_path = config.dataset_path();
    println!(
        "Dataset: {}",
        artifact_state(&dataset_path, "run `thematic process`")
    );

    let theme_names_path = config.theme_names_path();
    match load_theme_names(&theme_names_path) {
        Ok(names) => println!(
            "Theme names: {} ({} themes)",
            theme_names_path.display(),
            names.len()
        ),
        Err(_) => println!(
            "Theme names: {}",
            artifact_state(&theme_names_path, "run `thematic process`")
        ),
    }

    if embedding_files_present(&config.model_dir) {
        println!("Embedding model: {}", config.embedding_dir().display());
    } else {
        println!("Embedding model: not downloaded");
        println!("  Run `thematic download-model` to fetch it.");
    }

    Ok(())
}

fn artifact_state(path: &Path, hint: &str) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("missing ({hint})")
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_artifact_state_missing() {
        let state = artifact_state(Path::new("/nonexistent/output.jsonl"), "run it");
        assert_eq!(state, "missing (run it)");
    }
}
