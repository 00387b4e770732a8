use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// How candidate (track, detection) pairs are turned into matches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchingPolicy {
    /// Every pair within `max_distance` is a candidate and a later candidate
    /// overwrites an earlier one sharing its track or its detection. Each
    /// detection refreshes at most one track.
    #[default]
    LastWriteWins,

    /// One-to-one minimum total distance assignment.
    Optimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum centroid distance in px for a detection to match a track
    pub max_distance: f32,
    /// Consecutive missed frames a track survives
    pub max_age: u32,
    /// Matched frames before a track becomes visible
    pub min_hits: u32,
    pub matching: MatchingPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_distance: 80.0,
            max_age: 5,
            min_hits: 3,
            matching: MatchingPolicy::LastWriteWins,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(Error::Config(format!(
                "max_distance must be a finite non-negative number, got {}",
                self.max_distance
            )));
        }

        if self.min_hits == 0 {
            return Err(Error::Config("min_hits must be at least 1".into()));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub confidence_threshold: f32,
    pub classes: Vec<i32>,
}

impl DetectorConfig {
    pub fn new(confidence_threshold: f32, classes: Vec<i32>) -> Self {
        Self {
            confidence_threshold,
            classes,
        }
    }

    /// An empty class list accepts every class.
    #[inline]
    pub fn accepts(&self, confidence: f32, class: i32) -> bool {
        confidence >= self.confidence_threshold
            && (self.classes.is_empty() || self.classes.contains(&class))
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        // pedestrian, car, bus, motor
        Self::new(0.4, vec![0, 3, 8, 9])
    }
}

pub const VISDRONE_NAMES: [&str; 10] = [
    "pedestrian",
    "people",
    "bicycle",
    "car",
    "van",
    "truck",
    "tricycle",
    "awning-tricycle",
    "bus",
    "motor",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub detector: DetectorConfig,
    pub class_names: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            detector: DetectorConfig::default(),
            class_names: VISDRONE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.tracker.validate()?;

        Ok(config)
    }

    #[inline]
    pub fn class_name(&self, class: i32) -> String {
        class_name(&self.class_names, class)
    }
}

/// Name of `class`, or the number itself when there is no name for it.
pub fn class_name(names: &[String], class: i32) -> String {
    usize::try_from(class)
        .ok()
        .and_then(|idx| names.get(idx))
        .cloned()
        .unwrap_or_else(|| class.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TrackerConfig::default();

        assert_eq!(c.max_distance, 80.0);
        assert_eq!(c.max_age, 5);
        assert_eq!(c.min_hits, 3);
        assert_eq!(c.matching, MatchingPolicy::LastWriteWins);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: Config =
            serde_json::from_str(r#"{"tracker":{"max_age":10,"matching":"optimal"}}"#).unwrap();

        assert_eq!(c.tracker.max_age, 10);
        assert_eq!(c.tracker.max_distance, 80.0);
        assert_eq!(c.tracker.matching, MatchingPolicy::Optimal);
        assert_eq!(c.detector, DetectorConfig::default());
        assert_eq!(c.class_name(8), "bus");
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = TrackerConfig::default();
        c.min_hits = 0;
        assert!(matches!(c.validate(), Err(Error::Config(_))));

        let mut c = TrackerConfig::default();
        c.max_distance = f32::NAN;
        assert!(c.validate().is_err());

        c.max_distance = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn detector_filter() {
        let d = DetectorConfig::default();

        assert!(d.accepts(0.4, 3));
        assert!(!d.accepts(0.39, 3));
        assert!(!d.accepts(0.9, 1));
        assert!(DetectorConfig::new(0.0, vec![]).accepts(0.1, 42));
    }

    #[test]
    fn unknown_class_name_falls_back_to_number() {
        let c = Config::default();

        assert_eq!(c.class_name(0), "pedestrian");
        assert_eq!(c.class_name(12), "12");
        assert_eq!(c.class_name(-1), "-1");
    }
}
