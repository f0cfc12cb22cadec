use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// Image extensions tried, in order, when an image is located by stem
pub const IMG_FORMATS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

// A LabelMe shape: a labelled polygon (or rectangle given by two corners)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shape {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub points: Vec<(f64, f64)>,
}

// One LabelMe document, describing a single image
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub image_height: Option<u32>,
    pub image_width: Option<u32>,
}

/// Native category identifier of a source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKey {
    Label(String),
    Id(u32),
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CategoryKey::Label(label) => write!(f, "{:?}", label),
            CategoryKey::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Pixel-space geometry of an annotated region.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Axis-aligned `[x_min, y_min, width, height]`
    Box {
        x_min: f64,
        y_min: f64,
        width: f64,
        height: f64,
    },
    Polygon(Vec<(f64, f64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceAnnotation {
    pub category: CategoryKey,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: u64,
    /// File name as recorded by the source dataset; may carry a subdirectory
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// An image together with the regions annotated on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub image: ImageRecord,
    pub annotations: Vec<SourceAnnotation>,
    /// Regions the adapter could not use (no label, too few points, no category)
    pub dropped: usize,
    /// Name shared by the emitted label file and image copy, before prefixing
    pub stem: String,
    /// Where the image is expected to live on disk, resolved by the adapter
    pub candidates: Vec<PathBuf>,
}

// Paths of the merged output tree
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_images: usize,
    pub successful_conversions: usize,
    pub skipped_missing_image: usize,
    pub skipped_no_annotations: usize,
    pub skipped_invalid: usize,
    pub dropped_annotations: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_total(&mut self) {
        self.total_images += 1;
    }

    pub fn increment_successful(&mut self) {
        self.successful_conversions += 1;
    }

    pub fn increment_skipped_missing_image(&mut self) {
        self.skipped_missing_image += 1;
    }

    pub fn increment_skipped_no_annotations(&mut self) {
        self.skipped_no_annotations += 1;
    }

    pub fn increment_skipped_invalid(&mut self) {
        self.skipped_invalid += 1;
    }

    pub fn add_dropped(&mut self, count: usize) {
        self.dropped_annotations += count;
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped_missing_image + self.skipped_no_annotations + self.skipped_invalid
    }

    /// Render the summary as report lines
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            "=== Processing Summary ===".to_string(),
            format!("Total images processed: {}", self.total_images),
            format!("Successful conversions: {}", self.successful_conversions),
            format!("Skipped (missing image file): {}", self.skipped_missing_image),
            format!("Skipped (no mapped annotations): {}", self.skipped_no_annotations),
            format!("Skipped (invalid annotation file): {}", self.skipped_invalid),
            format!("Dropped annotations (unmapped or unusable): {}", self.dropped_annotations),
        ]
    }

    pub fn print_summary(&self) {
        for line in self.summary_lines() {
            log::info!("{}", line);
        }

        let total_skipped = self.total_skipped();
        if total_skipped > 0 {
            log::warn!(
                "Total skipped images: {} (missing image file: {}, no mapped annotations: {}, invalid: {})",
                total_skipped,
                self.skipped_missing_image,
                self.skipped_no_annotations,
                self.skipped_invalid
            );
        }
    }
}
