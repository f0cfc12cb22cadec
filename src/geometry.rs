//! Pixel boxes to normalized YOLO boxes and back.

use crate::types::Region;

/// A box in YOLO's normalized center format, every field in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloBox {
    /// Normalize an axis-aligned `[x_min, y_min, w, h]` pixel box.
    ///
    /// Each of the four outputs is clamped to `[0, 1]` independently.
    /// Zero-area boxes are returned as-is.
    pub fn from_xywh(
        x_min: f64,
        y_min: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let img_w = image_width as f64;
        let img_h = image_height as f64;
        Self {
            x_center: clamp_unit((x_min + width / 2.0) / img_w),
            y_center: clamp_unit((y_min + height / 2.0) / img_h),
            width: clamp_unit(width / img_w),
            height: clamp_unit(height / img_h),
        }
    }

    /// Bounding box of a polygon, clamped to the image before normalizing.
    ///
    /// Returns `None` for an empty point list.
    pub fn from_polygon(points: &[(f64, f64)], image_width: u32, image_height: u32) -> Option<Self> {
        let (x_min, y_min, x_max, y_max) = polygon_extrema(points)?;
        let (x_min, y_min) = clamp_coords(x_min, y_min, image_width, image_height);
        let (x_max, y_max) = clamp_coords(x_max, y_max, image_width, image_height);
        Some(Self::from_xywh(
            x_min,
            y_min,
            x_max - x_min,
            y_max - y_min,
            image_width,
            image_height,
        ))
    }

    pub fn from_region(region: &Region, image_width: u32, image_height: u32) -> Option<Self> {
        match region {
            Region::Box {
                x_min,
                y_min,
                width,
                height,
            } => Some(Self::from_xywh(
                *x_min,
                *y_min,
                *width,
                *height,
                image_width,
                image_height,
            )),
            Region::Polygon(points) => Self::from_polygon(points, image_width, image_height),
        }
    }

    /// Format as a label line: class id first, six decimals per value.
    pub fn to_line(&self, class_id: u32) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            class_id, self.x_center, self.y_center, self.width, self.height
        )
    }

    /// Parse a `<class> <cx> <cy> <w> <h>` label line.
    pub fn parse_line(line: &str) -> Option<(u32, Self)> {
        let mut fields = line.split_whitespace();
        let class_id = fields.next()?.parse().ok()?;
        let mut values = [0.0f64; 4];
        for value in values.iter_mut() {
            *value = fields.next()?.parse().ok()?;
        }
        if fields.next().is_some() {
            return None;
        }
        Some((
            class_id,
            Self {
                x_center: values[0],
                y_center: values[1],
                width: values[2],
                height: values[3],
            },
        ))
    }

    /// Expand back to a pixel `[x_min, y_min, w, h]` box.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> [f64; 4] {
        let img_w = image_width as f64;
        let img_h = image_height as f64;
        let width = self.width * img_w;
        let height = self.height * img_h;
        [
            self.x_center * img_w - width / 2.0,
            self.y_center * img_h - height / 2.0,
            width,
            height,
        ]
    }
}

/// Min/max over all points as `(x_min, y_min, x_max, y_max)`
pub fn polygon_extrema(points: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x_min, y_min, x_max, y_max), &(x, y)| {
            (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
        },
    ))
}

/// Clamp coordinates to image bounds
pub fn clamp_coords(x: f64, y: f64, width: u32, height: u32) -> (f64, f64) {
    let x = x.max(0.0).min(width as f64);
    let y = y.max(0.0).min(height as f64);
    (x, y)
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
