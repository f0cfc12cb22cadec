use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::schema::Schema;

/// Convert dental X-ray annotations (LabelMe, COCO, DENTEX) to a YOLO dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert annotations into YOLO labels and copy their images
    Convert(ConvertArgs),
    /// Count the LabelMe labels found under one or more directories
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Layout of the source annotations
    #[arg(long, value_enum)]
    pub schema: Schema,

    /// LabelMe: directory of JSON files. COCO/DENTEX: the JSON document
    #[arg(short = 's', long)]
    pub source: PathBuf,

    /// Directory holding the source images
    #[arg(short = 'i', long)]
    pub images: Option<PathBuf>,

    /// Output directory; receives images/ and labels/
    #[arg(short = 'o', long, env = "DENTAL2YOLO_OUTPUT")]
    pub output: PathBuf,

    /// Prefix for output file names, keeps merged datasets apart
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Ordered class names to keep (COCO/DENTEX only)
    #[arg(long = "target-classes", value_delimiter = ',')]
    pub target_classes: Vec<String>,

    /// Also write dataset.yaml into the output directory
    #[arg(long = "dataset-yaml")]
    pub dataset_yaml: bool,

    /// Write the processing summary to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directories to scan for LabelMe JSON files
    #[arg(required = true)]
    pub dirs: Vec<PathBuf>,

    /// Report file
    #[arg(long, default_value = "labels_report.txt")]
    pub report: PathBuf,
}

/// Everything a conversion pass needs, independent of the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    pub schema: Schema,
    pub source: PathBuf,
    pub images_dir: PathBuf,
    pub output: PathBuf,
    pub prefix: String,
    pub target_classes: Vec<String>,
    pub dataset_yaml: bool,
    pub report: Option<PathBuf>,
}

impl ConvertConfig {
    pub fn new(schema: Schema, source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let source = source.into();
        Self {
            schema,
            images_dir: default_images_dir(schema, &source),
            source,
            output: output.into(),
            prefix: String::new(),
            target_classes: Vec::new(),
            dataset_yaml: false,
            report: None,
        }
    }

    pub fn with_images_dir(mut self, images_dir: impl Into<PathBuf>) -> Self {
        self.images_dir = images_dir.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_target_classes(mut self, target_classes: Vec<String>) -> Self {
        self.target_classes = target_classes;
        self
    }
}

impl From<ConvertArgs> for ConvertConfig {
    fn from(args: ConvertArgs) -> Self {
        let images_dir = args
            .images
            .unwrap_or_else(|| default_images_dir(args.schema, &args.source));
        Self {
            schema: args.schema,
            source: args.source,
            images_dir,
            output: args.output,
            prefix: args.prefix,
            target_classes: args.target_classes,
            dataset_yaml: args.dataset_yaml,
            report: args.report,
        }
    }
}

// LabelMe: `images/` next to the label directory. COCO: next to the document.
fn default_images_dir(schema: Schema, source: &Path) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    match schema {
        Schema::LabelMe => parent.join("images"),
        Schema::Coco | Schema::Dentex => parent.to_path_buf(),
    }
}
