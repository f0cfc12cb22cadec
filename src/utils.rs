use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::IMG_FORMATS;

/// Read and parse a JSON file straight from a buffered file stream
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path)
        .map_err(|e| ConvertError::skip(path, format!("failed to open JSON file: {}", e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ConvertError::skip(path, format!("failed to parse JSON: {}", e)))
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create an output directory if needed; existing contents are kept
pub fn create_output_directory(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        log::debug!("Directory {:?} already exists, reusing it.", path);
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Candidate paths for an image known only by its stem
pub fn stem_candidates(images_dir: &Path, stem: &str) -> Vec<PathBuf> {
    IMG_FORMATS
        .iter()
        .map(|ext| images_dir.join(format!("{}.{}", stem, ext)))
        .collect()
}

/// First candidate that exists as a regular file
pub fn first_existing(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|path| path.is_file())
}

/// Output stem made safe for the output tree, with an optional dataset prefix
pub fn output_name(prefix: &str, stem: &str) -> String {
    sanitize_filename::sanitize(format!("{}{}", prefix, stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_candidates_order() {
        let candidates = stem_candidates(Path::new("imgs"), "001");
        assert_eq!(candidates[0], Path::new("imgs/001.png"));
        assert_eq!(candidates[1], Path::new("imgs/001.jpg"));
        assert_eq!(candidates.len(), IMG_FORMATS.len());
    }

    #[test]
    fn test_first_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jpg = temp_dir.path().join("a.jpg");
        fs::write(&jpg, b"jpg").unwrap();

        let candidates = stem_candidates(temp_dir.path(), "a");
        assert_eq!(first_existing(&candidates), Some(&jpg));
        assert_eq!(first_existing(&stem_candidates(temp_dir.path(), "b")), None);
    }

    #[test]
    fn test_create_output_directory_keeps_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("labels");
        create_output_directory(&dir).unwrap();
        fs::write(dir.join("keep.txt"), "0 0.5 0.5 0.1 0.1").unwrap();

        create_output_directory(&dir).unwrap();
        assert!(dir.join("keep.txt").exists());
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name("ped_", "001"), "ped_001");
        assert_eq!(output_name("", "a/b"), "ab");
    }

    #[test]
    fn test_read_json_reports_skippable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, ConvertError::SkippableFile { .. }));
    }
}
