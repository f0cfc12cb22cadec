use log::debug;

use crate::category::CategoryMap;
use crate::geometry::YoloBox;
use crate::types::ImageEntry;

/// Label lines for one image plus the number of annotations left out
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConvertedLabels {
    pub lines: Vec<String>,
    pub dropped: usize,
}

impl ConvertedLabels {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Label file body: one line per box, no trailing newline
    pub fn to_file_content(&self) -> String {
        self.lines.join("\n")
    }
}

/// Convert an image's annotations to YOLO bbox lines.
///
/// Annotations whose category has no mapping are dropped, not errors, and
/// counted together with those the adapter already discarded.
pub fn convert_to_yolo_format(entry: &ImageEntry, category_map: &CategoryMap) -> ConvertedLabels {
    let mut converted = ConvertedLabels {
        lines: Vec::with_capacity(entry.annotations.len()),
        dropped: entry.dropped,
    };

    for annotation in &entry.annotations {
        let class_id = match category_map.get(&annotation.category) {
            Some(class_id) => class_id,
            None => {
                debug!(
                    "Dropping unmapped category {} on {}",
                    annotation.category, entry.image.file_name
                );
                converted.dropped += 1;
                continue;
            }
        };

        match YoloBox::from_region(&annotation.region, entry.image.width, entry.image.height) {
            Some(yolo) => converted.lines.push(yolo.to_line(class_id)),
            None => converted.dropped += 1,
        }
    }

    converted
}
