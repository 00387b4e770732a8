use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::config::DetectorConfig;
use crate::error::Error;
use crate::pipeline::DetectionSource;
use crate::{Detection, Frame};

/// Replays recorded detector output.
///
/// Every non-blank line holds one frame as `<offset in ms>: <json array>`,
/// the array elements being detections. Detections the detector config
/// would not let through are dropped on read.
pub struct ReplaySource<R: BufRead> {
    lines: Lines<R>,
    line: usize,
    index: u64,
    filter: DetectorConfig,
}

impl ReplaySource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, filter: DetectorConfig) -> Result<Self, Error> {
        let file = File::open(path)?;

        Ok(Self::new(BufReader::new(file), filter))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R, filter: DetectorConfig) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            index: 0,
            filter,
        }
    }

    fn parse(&self, text: &str) -> Result<(f32, Vec<Detection>), Error> {
        let bad = |message: String| Error::Format {
            line: self.line,
            message,
        };

        let (ts, vector) = text
            .split_once(':')
            .ok_or_else(|| bad("expected `:`".into()))?;

        let ts: f64 = ts
            .trim()
            .parse()
            .map_err(|err| bad(format!("parse timestamp failed: {}", err)))?;

        let dets: Vec<Detection> = serde_json::from_str(vector)
            .map_err(|err| bad(format!("parse json failed: {}", err)))?;

        Ok(((ts / 1000.0) as f32, dets))
    }
}

impl<R: BufRead> DetectionSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        while let Some(text) = self.lines.next() {
            let text = text?;
            self.line += 1;

            if text.trim().is_empty() {
                continue;
            }

            let (ts, mut dets) = self.parse(&text)?;
            dets.retain(|d| self.filter.accepts(d.confidence, d.class));

            self.index += 1;
            return Ok(Some(Frame::new(self.index, ts, dets)));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"0: [{"x":50,"y":50,"w":20,"h":20,"p":0.9,"c":3}]

500: [{"x":52,"y":50,"w":20,"h":20,"p":0.3,"c":3},{"x":200,"y":80,"w":10,"h":30,"p":0.8,"c":1}]
1000: []
"#;

    #[test]
    fn replays_frames_in_order() {
        let mut src = ReplaySource::new(DUMP.as_bytes(), DetectorConfig::new(0.0, vec![]));

        let f1 = src.next_frame().unwrap().unwrap();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.timestamp, 0.0);
        assert_eq!(f1.detections[0].bbox.as_slice(), &[40.0, 40.0, 60.0, 60.0]);

        let f2 = src.next_frame().unwrap().unwrap();
        assert_eq!(f2.index, 2);
        assert_eq!(f2.timestamp, 0.5);
        assert_eq!(f2.len(), 2);

        let f3 = src.next_frame().unwrap().unwrap();
        assert!(f3.is_empty());

        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn applies_detector_filter() {
        let mut src = ReplaySource::new(DUMP.as_bytes(), DetectorConfig::default());

        assert_eq!(src.next_frame().unwrap().unwrap().len(), 1);
        // low confidence car and a class outside the default set
        assert!(src.next_frame().unwrap().unwrap().is_empty());
    }

    #[test]
    fn reports_line_of_bad_record() {
        let text = "0: []\nnonsense\n";
        let mut src = ReplaySource::new(text.as_bytes(), DetectorConfig::default());

        assert!(src.next_frame().unwrap().is_some());
        match src.next_frame() {
            Err(Error::Format { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other.map(|f| f.map(|f| f.index))),
        }
    }

    #[test]
    fn reports_bad_json() {
        let mut src = ReplaySource::new("10: [{\"x\":1}]".as_bytes(), DetectorConfig::default());

        assert!(matches!(src.next_frame(), Err(Error::Format { line: 1, .. })));
    }
}
