use log::{error, info, warn};

use crate::config::ConvertConfig;
use crate::conversion::convert_to_yolo_format;
use crate::error::{ConvertError, Result};
use crate::io::{create_dataset_yaml, setup_output_directories, write_artifact_pair, write_report, WriteOutcome};
use crate::schema::SourceDocument;
use crate::types::ProcessingStats;
use crate::utils::create_progress_bar;

/// Main conversion pipeline.
///
/// Fatal configuration problems are reported before any output directory
/// is created. After that, each image is converted on its own and failures
/// only skip that image.
pub fn process_dataset(config: &ConvertConfig) -> Result<ProcessingStats> {
    let document = SourceDocument::load(config.schema, &config.source)?;
    if !config.images_dir.is_dir() {
        return Err(ConvertError::fatal(format!(
            "image directory does not exist: {}",
            config.images_dir.display()
        )));
    }

    let category_map = document.category_map(&config.target_classes);
    if category_map.is_empty() {
        warn!("No source category maps to a target class; nothing will be written.");
    }
    for (key, class_id) in category_map.entries() {
        info!("Category mapping: {} -> {}", key, class_id);
    }

    let output_dirs = setup_output_directories(&config.output)?;
    info!(
        "Converting {} {:?} records into {}",
        document.len(),
        config.schema,
        output_dirs.root.display()
    );

    let mut stats = ProcessingStats::new();
    let pb = create_progress_bar(document.len() as u64, "Convert");

    for entry in document.entries(&config.images_dir) {
        stats.increment_total();
        pb.inc(1);

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("{}", e);
                stats.increment_skipped_invalid();
                continue;
            }
        };

        let labels = convert_to_yolo_format(&entry, &category_map);
        stats.add_dropped(labels.dropped);

        match write_artifact_pair(&entry, &labels, &output_dirs, &config.prefix) {
            Ok(WriteOutcome::Written { .. }) => stats.increment_successful(),
            Ok(WriteOutcome::NoLabels) => stats.increment_skipped_no_annotations(),
            Ok(WriteOutcome::MissingImage) => {
                warn!("Image file not found for {}", entry.image.file_name);
                stats.increment_skipped_missing_image();
            }
            Err(e) => {
                error!("Failed to write output for {}: {}", entry.image.file_name, e);
                stats.increment_skipped_invalid();
            }
        }
    }
    pb.finish_with_message("Conversion complete");

    stats.print_summary();

    if config.dataset_yaml {
        let path = create_dataset_yaml(&output_dirs, &category_map)?;
        info!("Wrote {}", path.display());
    }
    if let Some(report) = &config.report {
        write_report(report, &stats.summary_lines())?;
        info!("Wrote {}", report.display());
    }

    Ok(stats)
}
