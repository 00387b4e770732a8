pub mod associator;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod frame;
pub mod pipeline;
pub mod source;
pub mod store;

mod track;

pub use associator::Associator;
pub use config::{Config, DetectorConfig, MatchingPolicy, TrackerConfig};
pub use detection::Detection;
pub use error::Error;
pub use frame::Frame;
pub use pipeline::{DetectionSource, FramePipeline, TrackSink};
pub use store::TrackStore;
pub use track::Track;

use std::collections::HashMap;
use std::rc::Rc;

pub trait Tracking {
    fn update(&mut self, frames: &[Frame], src: &str);
    fn tracks(&self, src: &str) -> Rc<[Track]>;
}

/// Tracks several sources at once, each with its own store and id sequence.
pub struct CentroidTracker {
    associator: Associator,
    stores: HashMap<String, TrackStore>,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            associator: Associator::new(config),
            stores: HashMap::new(),
        })
    }

    #[inline]
    pub fn store(&self, src: &str) -> Option<&TrackStore> {
        self.stores.get(src)
    }
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self {
            associator: Associator::default(),
            stores: HashMap::new(),
        }
    }
}

impl crate::Tracking for CentroidTracker {
    fn update(&mut self, frames: &[Frame], src: &str) {
        let store = self.stores.entry(src.to_string()).or_default();

        for frame in frames {
            let prev = std::mem::take(store);
            *store = self.associator.step(prev, &frame.detections);
        }
    }

    /// Confirmed tracks of `src`.
    #[inline]
    fn tracks(&self, src: &str) -> Rc<[Track]> {
        if let Some(store) = self.stores.get(src) {
            let min_hits = self.associator.config().min_hits;

            return store
                .visible(min_hits)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
                .into();
        }

        Rc::new([])
    }
}
