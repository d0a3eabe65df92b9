// Theme-name list — newline-delimited names of every valid theme.
//
// The web API loads this at startup to reject unknown theme filters
// before touching the database.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use tracing::info;

use crate::ingest::themes::read_lines_from_file;

/// File name of the theme-name list inside the output directory.
pub const THEME_NAMES_FILE: &str = "theme_names.txt";

/// Write one theme name per line (no trailing newline).
pub fn save_theme_names<'a, I>(path: &Path, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let content = names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    super::write_atomic(path, content.as_bytes())?;
    info!("Done saving keys of themes into: {}", path.display());
    Ok(())
}

/// Load the theme-name list written by the pipeline, keeping file order.
pub fn load_theme_names(path: &Path) -> Result<IndexSet<String>> {
    let names = read_lines_from_file(path).with_context(|| {
        format!(
            "Theme name list unavailable at {}. Run `thematic process` first.",
            path.display()
        )
    })?;
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_theme_names() {
        let dir = std::env::temp_dir().join(format!("thematic-names-{}", std::process::id()));
        let path = dir.join(THEME_NAMES_FILE);
        let names = vec!["ev".to_string(), "cloud-computing".to_string()];

        save_theme_names(&path, &names).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "ev\ncloud-computing"
        );

        let loaded = load_theme_names(&path).unwrap();
        assert_eq!(
            loaded.iter().collect::<Vec<_>>(),
            vec!["ev", "cloud-computing"]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_mentions_process() {
        let path = std::env::temp_dir().join("thematic-missing-dir/theme_names.txt");
        let err = load_theme_names(&path).unwrap_err();
        assert!(format!("{err:#}").contains("thematic process"));
    }
}
