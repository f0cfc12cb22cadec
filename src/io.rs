use std::fs::{self, copy, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::category::CategoryMap;
use crate::conversion::ConvertedLabels;
use crate::types::{ImageEntry, OutputDirs};
use crate::utils::{create_output_directory, first_existing, output_name};

/// Set up the `images/` and `labels/` directories of the output tree
pub fn setup_output_directories(output: &Path) -> std::io::Result<OutputDirs> {
    let root = create_output_directory(output)?;
    let images_dir = create_output_directory(&root.join("images"))?;
    let labels_dir = create_output_directory(&root.join("labels"))?;
    Ok(OutputDirs {
        root,
        images_dir,
        labels_dir,
    })
}

/// Result of writing one image's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { label: PathBuf, image: PathBuf },
    MissingImage,
    NoLabels,
}

/// Copy the source image and write the label file for one entry.
///
/// The source image is located before anything is written, so a missing
/// image leaves no trace in the output tree. The image goes first and the
/// label second; a label that cannot be written takes the fresh image copy
/// with it. When the destination already is the source file the copy is
/// skipped, since copying a file onto itself truncates it.
pub fn write_artifact_pair(
    entry: &ImageEntry,
    labels: &ConvertedLabels,
    output_dirs: &OutputDirs,
    prefix: &str,
) -> std::io::Result<WriteOutcome> {
    if labels.is_empty() {
        return Ok(WriteOutcome::NoLabels);
    }
    let source_image = match first_existing(&entry.candidates) {
        Some(path) => path,
        None => return Ok(WriteOutcome::MissingImage),
    };

    let name = output_name(prefix, &entry.stem);
    let label_path = output_dirs.labels_dir.join(format!("{}.txt", name));
    let image_path = match source_image.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => output_dirs.images_dir.join(format!("{}.{}", name, ext)),
        None => output_dirs.images_dir.join(&name),
    };

    let copied = if is_same_file(source_image, &image_path) {
        debug!("{} is already in place", image_path.display());
        false
    } else {
        copy(source_image, &image_path)?;
        true
    };

    if let Err(e) = write_label_file(&label_path, labels) {
        if copied {
            let _ = fs::remove_file(&image_path);
        }
        let _ = fs::remove_file(&label_path);
        return Err(e);
    }

    Ok(WriteOutcome::Written {
        label: label_path,
        image: image_path,
    })
}

fn write_label_file(path: &Path, labels: &ConvertedLabels) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(labels.to_file_content().as_bytes())?;
    writer.flush()
}

// Both paths exist and resolve to the same file
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(output_dirs: &OutputDirs, category_map: &CategoryMap) -> std::io::Result<PathBuf> {
    let dataset_yaml_path = output_dirs.root.join("dataset.yaml");
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path)?);
    let absolute_path = fs::canonicalize(&output_dirs.root)?;
    let mut yaml_content = format!(
        "path: {}\ntrain: images\nval: images\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");
    for (id, name) in category_map.names() {
        yaml_content.push_str(&format!("    {}: {}\n", id, name));
    }
    dataset_yaml.write_all(yaml_content.as_bytes())?;
    dataset_yaml.flush()?;
    Ok(dataset_yaml_path)
}

/// Write report lines to a text file
pub fn write_report(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()
}
