//! Label vocabulary report over LabelMe annotation trees.

use dashmap::DashMap;
use jwalk::WalkDir;
use log::{info, warn};
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::utils::read_json;

#[derive(Debug, Deserialize)]
struct ScanShape {
    label: Option<String>,
}

// Only `shapes` matters here; documents without it contribute nothing
#[derive(Debug, Deserialize)]
struct ScanDocument {
    #[serde(default)]
    shapes: Vec<ScanShape>,
}

/// Label counts for one scanned directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelScan {
    pub root: PathBuf,
    /// Sorted by descending count, then by label
    pub counts: Vec<(String, usize)>,
    pub errors: Vec<String>,
}

impl LabelScan {
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Scanning {}...", self.root.display())];
        lines.extend(self.errors.iter().cloned());
        lines.push("Unique Labels Found:".to_string());
        lines.extend(self.counts.iter().map(|(label, count)| format!("{}: {}", label, count)));
        lines.push("-".repeat(20));
        lines
    }
}

/// Count shape labels in every JSON file below `root`
pub fn scan_labels(root: &Path) -> LabelScan {
    let label_counts: DashMap<String, usize> = DashMap::new();
    let errors = Mutex::new(Vec::new());

    WalkDir::new(root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "json")
        })
        .map(|e| e.path())
        .par_bridge()
        .for_each(|json_path| match read_json::<ScanDocument>(&json_path) {
            Ok(document) => {
                for shape in document.shapes {
                    let label = shape.label.unwrap_or_else(|| "unknown".to_string());
                    *label_counts.entry(label).or_insert(0) += 1;
                }
            }
            Err(e) => {
                let message = format!("Error reading {}: {}", json_path.display(), e);
                match errors.lock() {
                    Ok(mut errors) => errors.push(message),
                    Err(poisoned) => poisoned.into_inner().push(message),
                }
            }
        });

    let mut counts: Vec<(String, usize)> = label_counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut errors = errors.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    errors.sort();

    LabelScan {
        root: root.to_path_buf(),
        counts,
        errors,
    }
}

/// Scan each directory in turn and concatenate their report sections.
///
/// A directory that does not exist is logged and reported with an empty
/// section; the remaining directories are still scanned.
pub fn scan_report(dirs: &[PathBuf]) -> Vec<String> {
    let mut lines = Vec::new();
    for dir in dirs {
        let scan = if dir.is_dir() {
            info!("Scanning {}...", dir.display());
            scan_labels(dir)
        } else {
            warn!("The specified directory does not exist: {}", dir.display());
            LabelScan {
                root: dir.clone(),
                ..LabelScan::default()
            }
        };
        lines.extend(scan.report_lines());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_counts_labels() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(
            root.join("a/1.json"),
            r#"{"shapes": [{"label": "龋病"}, {"label": "龋病"}, {"label": "牙髓炎"}]}"#,
        )
        .unwrap();
        fs::write(root.join("a/b/2.json"), r#"{"shapes": [{"label": "牙髓炎"}, {}]}"#).unwrap();
        fs::write(root.join("a/b/3.json"), r#"{"images": []}"#).unwrap();
        fs::write(root.join("broken.json"), "{").unwrap();

        let scan = scan_labels(root);
        assert_eq!(
            scan.counts,
            vec![
                ("牙髓炎".to_string(), 2),
                ("龋病".to_string(), 2),
                ("unknown".to_string(), 1),
            ]
        );
        assert_eq!(scan.errors.len(), 1);

        let lines = scan.report_lines();
        assert!(lines[0].starts_with("Scanning "));
        assert_eq!(lines.last().unwrap(), "--------------------");
        assert!(lines.contains(&"unknown: 1".to_string()));
    }

    #[test]
    fn test_missing_directory_keeps_scanning() {
        let temp_dir = tempfile::tempdir().unwrap();
        let present = temp_dir.path().join("present");
        fs::create_dir_all(&present).unwrap();
        fs::write(present.join("1.json"), r#"{"shapes": [{"label": "龋病"}]}"#).unwrap();
        let missing = temp_dir.path().join("missing");

        let lines = scan_report(&[missing.clone(), present.clone()]);
        assert_eq!(
            lines,
            vec![
                format!("Scanning {}...", missing.display()),
                "Unique Labels Found:".to_string(),
                "-".repeat(20),
                format!("Scanning {}...", present.display()),
                "Unique Labels Found:".to_string(),
                "龋病: 1".to_string(),
                "-".repeat(20),
            ]
        );
    }
}
