use nalgebra as na;

use crate::bbox::{BBox, Ltrb};
use crate::Detection;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: u32,
    pub centroid: na::Point2<f32>,
    pub bbox: BBox<Ltrb>,
    pub confidence: f32,
    pub class: i32,

    // frames since the last match
    pub age: u32,

    // matched frames, creation included
    pub hits: u32,
}

impl Track {
    pub(crate) fn spawn(track_id: u32, det: &Detection) -> Self {
        Self {
            track_id,
            centroid: det.centroid(),
            bbox: det.bbox,
            confidence: det.confidence,
            class: det.class,
            age: 0,
            hits: 1,
        }
    }

    pub(crate) fn refresh(&mut self, det: &Detection) {
        self.centroid = det.centroid();
        self.bbox = det.bbox;
        self.confidence = det.confidence;
        self.class = det.class;
        self.age = 0;
        self.hits += 1;
    }

    #[inline]
    pub fn is_confirmed(&self, min_hits: u32) -> bool {
        self.hits >= min_hits
    }
}
