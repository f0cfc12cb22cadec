//! COCO format data structures
//!
//! Input-side documents for plain COCO instance files and for the DENTEX
//! variant, which carries its disease taxonomy in `categories_3` and
//! `category_id_3`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// COCO category information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

/// COCO image information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub id: u64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// COCO annotation information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub image_id: u64,
    pub category_id: u32,
    pub bbox: [f64; 4], // [x, y, width, height]
}

/// Complete COCO document for one split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoFile {
    pub images: Vec<Image>,
    pub categories: Vec<Category>,
    pub annotations: Vec<Annotation>,
}

/// DENTEX annotation: the disease id may be missing, then the primary id applies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DentexAnnotation {
    pub image_id: u64,
    #[serde(default)]
    pub category_id: Option<u32>,
    #[serde(default)]
    pub category_id_3: Option<u32>,
    pub bbox: [f64; 4],
}

impl DentexAnnotation {
    pub fn disease_id(&self) -> Option<u32> {
        self.category_id_3.or(self.category_id)
    }
}

/// DENTEX quadrant/enumeration/disease document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DentexFile {
    pub images: Vec<Image>,
    pub categories_3: Vec<Category>,
    pub annotations: Vec<DentexAnnotation>,
}

/// Group items by image id, keeping document order within each group
pub fn group_by_image<T>(items: &[T], image_id: impl Fn(&T) -> u64) -> HashMap<u64, Vec<&T>> {
    let mut grouped: HashMap<u64, Vec<&T>> = HashMap::new();
    for item in items {
        grouped.entry(image_id(item)).or_default().push(item);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dentex_falls_back_to_primary_id() {
        let json = r#"{"image_id": 1, "category_id": 4, "bbox": [0, 0, 1, 1]}"#;
        let annotation: DentexAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(annotation.disease_id(), Some(4));

        let json = r#"{"image_id": 1, "category_id": 4, "category_id_3": 2, "bbox": [0, 0, 1, 1]}"#;
        let annotation: DentexAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(annotation.disease_id(), Some(2));
    }

    #[test]
    fn test_dentex_requires_disease_categories() {
        let json = r#"{"images": [], "categories": [], "annotations": []}"#;
        assert!(serde_json::from_str::<DentexFile>(json).is_err());
    }

    #[test]
    fn test_group_by_image() {
        let annotations = vec![
            Annotation { image_id: 2, category_id: 0, bbox: [0.0; 4] },
            Annotation { image_id: 1, category_id: 1, bbox: [0.0; 4] },
            Annotation { image_id: 2, category_id: 2, bbox: [0.0; 4] },
        ];
        let grouped = group_by_image(&annotations, |a| a.image_id);
        let ids: Vec<u32> = grouped[&2].iter().map(|a| a.category_id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(grouped[&1].len(), 1);
    }
}
