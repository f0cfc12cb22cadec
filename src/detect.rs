//! Object detector seam used by the interactive front end.
//!
//! Inference itself happens in an external model runtime; this module only
//! fixes the shape of what a detector returns and how the front end lists it.

use std::path::Path;

use crate::category::TargetClass;

/// One detected region, box in pixel `[x_min, y_min, x_max, y_max]`
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

/// A trained detector.
pub trait ObjectDetector {
    type Error: std::error::Error;

    /// Detections at or above `confidence`, in the detector's own order.
    fn detect(&self, image: &Path, confidence: f32) -> Result<Vec<Detection>, Self::Error>;

    /// Human-readable name of a class id
    fn class_name(&self, class_id: u32) -> Option<&str> {
        TargetClass::from_id(class_id).map(TargetClass::name)
    }
}

/// Result list shown next to the annotated image, e.g. `Caries: 87.50%`.
///
/// Detections below `confidence` are left out, in case the detector does
/// not apply the threshold itself.
pub fn summarize_detections<D: ObjectDetector + ?Sized>(
    detector: &D,
    detections: &[Detection],
    confidence: f32,
) -> Vec<String> {
    detections
        .iter()
        .filter(|detection| detection.confidence >= confidence)
        .map(|detection| {
            let name = detector
                .class_name(detection.class_id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("class {}", detection.class_id));
            format!("{}: {:.2}%", name, detection.confidence * 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct NoModel;

    impl fmt::Display for NoModel {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "no model loaded")
        }
    }

    impl std::error::Error for NoModel {}

    struct FixedDetector(Vec<Detection>);

    impl ObjectDetector for FixedDetector {
        type Error = NoModel;

        fn detect(&self, _image: &Path, confidence: f32) -> Result<Vec<Detection>, NoModel> {
            Ok(self
                .0
                .iter()
                .filter(|d| d.confidence >= confidence)
                .cloned()
                .collect())
        }
    }

    fn detection(class_id: u32, confidence: f32) -> Detection {
        Detection {
            class_id,
            confidence,
            bbox: [0.0, 0.0, 10.0, 10.0],
        }
    }

    #[test]
    fn test_summarize_detections() {
        let detector = FixedDetector(vec![detection(1, 0.875), detection(3, 0.1), detection(9, 0.5)]);
        let detections = detector.detect(Path::new("x.png"), 0.0).unwrap();

        let lines = summarize_detections(&detector, &detections, 0.25);
        assert_eq!(lines, vec!["Caries: 87.50%", "class 9: 50.00%"]);
    }

    #[test]
    fn test_detector_threshold() {
        let detector = FixedDetector(vec![detection(0, 0.3), detection(2, 0.9)]);
        let detections = detector.detect(Path::new("x.png"), 0.5).unwrap();
        assert_eq!(detections, vec![detection(2, 0.9)]);
        assert!(summarize_detections(&detector, &[], 0.25).is_empty());
    }
}
