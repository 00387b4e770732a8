use tracing::trace;

use crate::associator::Associator;
use crate::config::TrackerConfig;
use crate::error::Error;
use crate::store::TrackStore;
use crate::{Frame, Track};

/// Produces per-frame detection batches, already filtered to the wanted
/// classes and confidence.
pub trait DetectionSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, Error>;
}

/// Consumes the confirmed tracks of every frame.
pub trait TrackSink {
    fn consume(&mut self, frame: &Frame, tracks: &[&Track]) -> Result<(), Error>;

    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Drives one stream: owns its only live `TrackStore`.
pub struct FramePipeline {
    associator: Associator,
    store: TrackStore,
    frames: u64,
}

impl FramePipeline {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            associator: Associator::new(config),
            store: TrackStore::new(),
            frames: 0,
        })
    }

    #[inline]
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the store by one frame and returns the confirmed tracks.
    pub fn process(&mut self, frame: &Frame) -> Vec<&Track> {
        let prev = std::mem::take(&mut self.store);
        self.store = self.associator.step(prev, &frame.detections);
        self.frames += 1;

        let visible = self.store.visible(self.associator.config().min_hits);

        trace!(
            frame = frame.index,
            ts = frame.timestamp,
            detections = frame.len(),
            tracks = self.store.len(),
            visible = visible.len(),
            "frame processed"
        );

        visible
    }

    /// Pulls every frame from `source` and hands the confirmed tracks to
    /// each sink. Returns the number of processed frames.
    pub fn run<S: DetectionSource>(
        &mut self,
        source: &mut S,
        sinks: &mut [&mut dyn TrackSink],
    ) -> Result<u64, Error> {
        let start = self.frames;

        while let Some(frame) = source.next_frame()? {
            let visible = self.process(&frame);

            for sink in sinks.iter_mut() {
                sink.consume(&frame, &visible)?;
            }
        }

        for sink in sinks.iter_mut() {
            sink.finish()?;
        }

        Ok(self.frames - start)
    }
}
