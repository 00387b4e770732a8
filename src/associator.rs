use munkres::{solve_assignment, WeightMatrix};
use nalgebra as na;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::config::{MatchingPolicy, TrackerConfig};
use crate::store::TrackStore;
use crate::{Detection, Track};

/// Per track row the matched detection column, per detection column whether
/// any track took it.
type Mapping = (Vec<Option<usize>>, Vec<bool>);

/// Turns the previous frame's store and the current detections into the
/// next frame's store.
#[derive(Debug, Clone, Default)]
pub struct Associator {
    config: TrackerConfig,
}

impl Associator {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn step(&self, prev: TrackStore, detections: &[Detection]) -> TrackStore {
        let (mut next, tracks) = prev.into_successor();
        let centroids: Vec<_> = detections.iter().map(Detection::centroid).collect();
        let distances = distance_matrix(&tracks, &centroids);

        let (matches, assigned) = match self.config.matching {
            MatchingPolicy::LastWriteWins => last_write_wins(&distances, self.config.max_distance),
            MatchingPolicy::Optimal => optimal(&distances, self.config.max_distance),
        };

        for (mut track, matched) in tracks.into_iter().zip(matches) {
            if let Some(j) = matched {
                track.refresh(&detections[j]);
                next.insert(track);
                continue;
            }

            track.age += 1;
            if track.age <= self.config.max_age {
                next.insert(track);
            } else {
                debug!(track_id = track.track_id, hits = track.hits, "track dropped");
            }
        }

        for (j, det) in detections.iter().enumerate() {
            if assigned[j] {
                continue;
            }

            match next.spawn(det) {
                Some(id) => debug!(track_id = id, class = det.class, "track spawned"),
                None => warn!(class = det.class, "track ids exhausted, detection dropped"),
            }
        }

        next
    }
}

/// Euclidean distances, rows are tracks and columns are detections.
pub fn distance_matrix(tracks: &[Track], centroids: &[na::Point2<f32>]) -> Array2<f32> {
    Array2::from_shape_fn((tracks.len(), centroids.len()), |(i, j)| {
        na::distance(&tracks[i].centroid, &centroids[j])
    })
}

// Visits pairs row by row and lets the later pair win on both sides: a
// detection belongs to the last track it was paired with, and a track keeps
// the last detection it still owns. Every candidate detection counts as
// assigned, even one whose owner kept a later detection.
fn last_write_wins(distances: &Array2<f32>, max_distance: f32) -> Mapping {
    let (rows, cols) = distances.dim();
    let mut owner = vec![None; cols];
    let mut assigned = vec![false; cols];

    for ((i, j), &d) in distances.indexed_iter() {
        if d <= max_distance {
            owner[j] = Some(i);
            assigned[j] = true;
        }
    }

    let mut matches = vec![None; rows];
    for (j, i) in owner.into_iter().enumerate() {
        if let Some(i) = i {
            matches[i] = Some(j);
        }
    }

    (matches, assigned)
}

fn optimal(distances: &Array2<f32>, max_distance: f32) -> Mapping {
    let (rows, cols) = distances.dim();
    let mut matches = vec![None; rows];
    let mut assigned = vec![false; cols];

    if rows == 0 || cols == 0 {
        return (matches, assigned);
    }

    let n = rows.max(cols);

    // any in-range pair is cheaper than leaving a row unmatched
    let gate = (max_distance + 1.0) * n as f32;

    let mut weights = WeightMatrix::from_fn(n, |(r, c)| {
        if r < rows && c < cols && distances[[r, c]] <= max_distance {
            distances[[r, c]]
        } else {
            gate
        }
    });

    match solve_assignment(&mut weights) {
        Ok(positions) => {
            for p in positions {
                if p.row < rows && p.column < cols && distances[[p.row, p.column]] <= max_distance
                {
                    matches[p.row] = Some(p.column);
                    assigned[p.column] = true;
                }
            }
        }
        Err(err) => warn!("assignment could not be solved: {:?}", err),
    }

    (matches, assigned)
}
