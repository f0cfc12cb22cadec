//! Dental X-ray annotation converter
//!
//! Converts LabelMe polygon JSON, COCO instance JSON and DENTEX COCO-variant
//! JSON into YOLO bounding-box labels, copying the images alongside so several
//! source datasets can be merged into one training tree.

pub mod category;
pub mod coco;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod io;
pub mod scan;
pub mod schema;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use category::{CategoryMap, TargetClass};
pub use config::{Cli, Command, ConvertConfig};
pub use dataset::process_dataset;
pub use error::ConvertError;
pub use geometry::YoloBox;
pub use scan::{scan_labels, scan_report};
pub use schema::Schema;
pub use types::{ImageEntry, ProcessingStats};
