//! Source schema adapters.
//!
//! Each supported annotation layout is loaded into a typed document and
//! flattened into [`ImageEntry`] values, so the rest of the pipeline never
//! looks at raw JSON.

use clap::ValueEnum;
use glob::glob;
use log::debug;
use std::path::{Path, PathBuf};

use crate::category::CategoryMap;
use crate::coco::{group_by_image, CocoFile, DentexFile, Image};
use crate::error::{ConvertError, Result};
use crate::types::{CategoryKey, ImageAnnotation, ImageEntry, ImageRecord, Region, SourceAnnotation};
use crate::utils::{read_json, stem_candidates};

/// Supported annotation layouts
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Schema {
    /// One LabelMe polygon JSON per image
    #[value(name = "labelme")]
    LabelMe,
    /// One COCO instance JSON per split
    Coco,
    /// DENTEX COCO variant with a disease taxonomy
    Dentex,
}

/// A loaded annotation source, ready to be flattened into image entries
#[derive(Debug)]
pub enum SourceDocument {
    LabelMe(Vec<PathBuf>),
    Coco(CocoFile),
    Dentex(DentexFile),
}

impl SourceDocument {
    /// Load the source for `schema`.
    ///
    /// A missing source path or an unreadable COCO/DENTEX document is fatal.
    /// LabelMe files are only listed here and parsed one by one later.
    pub fn load(schema: Schema, source: &Path) -> Result<Self> {
        if !source.exists() {
            return Err(ConvertError::fatal(format!(
                "annotation source does not exist: {}",
                source.display()
            )));
        }

        match schema {
            Schema::LabelMe => {
                if !source.is_dir() {
                    return Err(ConvertError::fatal(format!(
                        "LabelMe source must be a directory of JSON files: {}",
                        source.display()
                    )));
                }
                Ok(SourceDocument::LabelMe(list_json_files(source)?))
            }
            Schema::Coco => read_json::<CocoFile>(source)
                .map(SourceDocument::Coco)
                .map_err(|e| ConvertError::fatal(e.to_string())),
            Schema::Dentex => read_json::<DentexFile>(source)
                .map(SourceDocument::Dentex)
                .map_err(|e| ConvertError::fatal(e.to_string())),
        }
    }

    /// Category table for this source
    pub fn category_map(&self, allowlist: &[String]) -> CategoryMap {
        match self {
            SourceDocument::LabelMe(_) => CategoryMap::pediatric(),
            SourceDocument::Coco(doc) => CategoryMap::for_coco(&doc.categories, allowlist),
            SourceDocument::Dentex(doc) => CategoryMap::for_coco(&doc.categories_3, allowlist),
        }
    }

    /// Number of entries `entries` will yield
    pub fn len(&self) -> usize {
        match self {
            SourceDocument::LabelMe(files) => files.len(),
            SourceDocument::Coco(doc) => doc.images.len(),
            SourceDocument::Dentex(doc) => doc.images.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into one entry per image; per-file failures are yielded as errors
    pub fn entries<'a>(
        &'a self,
        images_dir: &'a Path,
    ) -> Box<dyn Iterator<Item = Result<ImageEntry>> + 'a> {
        match self {
            SourceDocument::LabelMe(files) => Box::new(
                files
                    .iter()
                    .map(move |json_path| labelme_entry(json_path, images_dir)),
            ),
            SourceDocument::Coco(doc) => {
                let grouped = group_by_image(&doc.annotations, |a| a.image_id);
                Box::new(doc.images.iter().map(move |image| {
                    let annotations: Vec<SourceAnnotation> = grouped
                        .get(&image.id)
                        .map(|anns| {
                            anns.iter()
                                .map(|ann| SourceAnnotation {
                                    category: CategoryKey::Id(ann.category_id),
                                    region: bbox_region(ann.bbox),
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    coco_entry(image, annotations, 0, vec![images_dir.join(&image.file_name)])
                }))
            }
            SourceDocument::Dentex(doc) => {
                let grouped = group_by_image(&doc.annotations, |a| a.image_id);
                Box::new(doc.images.iter().map(move |image| {
                    let mut annotations = Vec::new();
                    let mut dropped = 0;
                    for ann in grouped.get(&image.id).into_iter().flatten() {
                        match ann.disease_id() {
                            Some(id) => annotations.push(SourceAnnotation {
                                category: CategoryKey::Id(id),
                                region: bbox_region(ann.bbox),
                            }),
                            None => {
                                debug!("Annotation on {} has no category", image.file_name);
                                dropped += 1;
                            }
                        }
                    }
                    coco_entry(
                        image,
                        annotations,
                        dropped,
                        dentex_candidates(images_dir, &image.file_name),
                    )
                }))
            }
        }
    }
}

/// All `*.json` files below `dir`, sorted by path
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("**").join("*.json");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| ConvertError::fatal(format!("non UTF-8 path: {}", dir.display())))?;
    let mut files: Vec<PathBuf> = glob(pattern)
        .map_err(|e| ConvertError::fatal(format!("invalid glob pattern {}: {}", pattern, e)))?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one LabelMe file into an image entry
pub fn labelme_entry(json_path: &Path, images_dir: &Path) -> Result<ImageEntry> {
    let annotation: ImageAnnotation = read_json(json_path)?;

    let (width, height) = match (annotation.image_width, annotation.image_height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(ConvertError::skip(json_path, "missing image dimensions")),
    };
    let stem = json_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ConvertError::skip(json_path, "file name is not valid UTF-8"))?
        .to_string();

    let mut annotations = Vec::with_capacity(annotation.shapes.len());
    let mut dropped = 0;
    for shape in annotation.shapes {
        match shape.label {
            Some(label) if shape.points.len() >= 2 => annotations.push(SourceAnnotation {
                category: CategoryKey::Label(label),
                region: Region::Polygon(shape.points),
            }),
            label => {
                debug!("Dropping shape {:?} in {}: no label or too few points", label, json_path.display());
                dropped += 1;
            }
        }
    }

    let mut candidates = stem_candidates(images_dir, &stem);
    if let (Some(image_path), Some(json_dir)) = (&annotation.image_path, json_path.parent()) {
        candidates.push(json_dir.join(image_path));
    }

    Ok(ImageEntry {
        image: ImageRecord {
            id: 0,
            file_name: annotation.image_path.unwrap_or_else(|| stem.clone()),
            width,
            height,
        },
        annotations,
        dropped,
        stem,
        candidates,
    })
}

fn coco_entry(
    image: &Image,
    annotations: Vec<SourceAnnotation>,
    dropped: usize,
    candidates: Vec<PathBuf>,
) -> Result<ImageEntry> {
    if image.width == 0 || image.height == 0 {
        return Err(ConvertError::skip(&image.file_name, "missing image dimensions"));
    }
    let stem = Path::new(&image.file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ConvertError::skip(&image.file_name, "image file name has no stem"))?
        .to_string();

    Ok(ImageEntry {
        image: ImageRecord {
            id: image.id,
            file_name: image.file_name.clone(),
            width: image.width,
            height: image.height,
        },
        annotations,
        dropped,
        stem,
        candidates,
    })
}

fn bbox_region(bbox: [f64; 4]) -> Region {
    let [x_min, y_min, width, height] = bbox;
    Region::Box {
        x_min,
        y_min,
        width,
        height,
    }
}

/// DENTEX file names may carry a subdirectory; fall back to the base name
fn dentex_candidates(images_dir: &Path, file_name: &str) -> Vec<PathBuf> {
    let mut candidates = vec![images_dir.join(file_name)];
    if let Some(base) = Path::new(file_name).file_name() {
        let fallback = images_dir.join(base);
        if !candidates.contains(&fallback) {
            candidates.push(fallback);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_labelme_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let json_path = temp_dir.path().join("label/001.json");
        write(
            &json_path,
            r#"{
                "imageWidth": 640,
                "imageHeight": 480,
                "shapes": [
                    {"label": "龋病", "points": [[10, 10], [10, 50], [60, 50], [60, 10]]},
                    {"label": "龋病", "points": [[5, 5]]},
                    {"points": [[0, 0], [20, 20]], "shape_type": "rectangle"}
                ]
            }"#,
        );

        let images_dir = temp_dir.path().join("images");
        let entry = labelme_entry(&json_path, &images_dir).unwrap();
        assert_eq!(entry.stem, "001");
        assert_eq!((entry.image.width, entry.image.height), (640, 480));
        assert_eq!(entry.annotations.len(), 1);
        assert_eq!(entry.dropped, 2);
        assert_eq!(entry.annotations[0].category, CategoryKey::Label("龋病".to_string()));
        assert_eq!(entry.candidates[0], images_dir.join("001.png"));
    }

    #[test]
    fn test_labelme_missing_dimensions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let json_path = temp_dir.path().join("002.json");
        write(&json_path, r#"{"imageWidth": 0, "shapes": []}"#);

        let err = labelme_entry(&json_path, temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::SkippableFile { .. }));
        assert!(err.to_string().contains("missing image dimensions"));
    }

    #[test]
    fn test_load_missing_source_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.json");
        for schema in [Schema::LabelMe, Schema::Coco, Schema::Dentex] {
            let err = SourceDocument::load(schema, &missing).unwrap_err();
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_coco_entries_join_by_image_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let json_path = temp_dir.path().join("train.json");
        write(
            &json_path,
            r#"{
                "images": [
                    {"id": 10, "file_name": "a.png", "width": 1000, "height": 800},
                    {"id": 11, "file_name": "b.png", "width": 1000, "height": 800}
                ],
                "categories": [{"id": 1, "name": "Caries"}],
                "annotations": [
                    {"image_id": 11, "category_id": 1, "bbox": [1, 2, 3, 4]},
                    {"image_id": 10, "category_id": 1, "bbox": [5, 6, 7, 8]},
                    {"image_id": 11, "category_id": 1, "bbox": [9, 9, 9, 9]}
                ]
            }"#,
        );

        let doc = SourceDocument::load(Schema::Coco, &json_path).unwrap();
        let entries: Vec<_> = doc
            .entries(temp_dir.path())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stem, "a");
        assert_eq!(entries[0].annotations.len(), 1);
        assert_eq!(entries[1].annotations.len(), 2);
        assert_eq!(
            entries[1].annotations[0].region,
            Region::Box { x_min: 1.0, y_min: 2.0, width: 3.0, height: 4.0 }
        );
    }

    #[test]
    fn test_dentex_candidates() {
        let candidates = dentex_candidates(Path::new("xrays"), "train/train_1.png");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("xrays/train/train_1.png"),
                PathBuf::from("xrays/train_1.png")
            ]
        );
        assert_eq!(dentex_candidates(Path::new("xrays"), "t.png").len(), 1);
    }

    #[test]
    fn test_list_json_files_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(&temp_dir.path().join("b.json"), "{}");
        write(&temp_dir.path().join("sub/a.json"), "{}");
        write(&temp_dir.path().join("a.json"), "{}");
        write(&temp_dir.path().join("c.txt"), "");

        let files = list_json_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }
}
