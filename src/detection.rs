use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb, Xywh};

/// One detector output for one object in one frame.
///
/// On the wire a detection is stored the way detector dumps record it:
/// center, size, confidence `p` and class `c`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "DetectionRecord", into = "DetectionRecord")]
pub struct Detection {
    pub bbox: BBox<Ltrb>,
    pub confidence: f32,
    pub class: i32,
}

impl Detection {
    #[inline]
    pub fn new(bbox: BBox<Ltrb>, confidence: f32, class: i32) -> Self {
        Self {
            bbox,
            confidence,
            class,
        }
    }

    #[inline]
    pub fn ltrb(xmin: f32, ymin: f32, xmax: f32, ymax: f32, confidence: f32, class: i32) -> Self {
        Self::new(BBox::ltrb(xmin, ymin, xmax, ymax), confidence, class)
    }

    #[inline(always)]
    pub fn centroid(&self) -> na::Point2<f32> {
        self.bbox.centroid()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct DetectionRecord {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    #[serde(rename = "p")]
    confidence: f32,
    #[serde(rename = "c")]
    class: i32,
}

impl From<DetectionRecord> for Detection {
    fn from(r: DetectionRecord) -> Self {
        Detection::new(BBox::xywh(r.x, r.y, r.w, r.h).as_ltrb(), r.confidence, r.class)
    }
}

impl From<Detection> for DetectionRecord {
    fn from(d: Detection) -> Self {
        let b: BBox<Xywh> = (&d.bbox).into();

        DetectionRecord {
            x: b.cx(),
            y: b.cy(),
            w: b.width(),
            h: b.height(),
            confidence: d.confidence,
            class: d.class,
        }
    }
}
