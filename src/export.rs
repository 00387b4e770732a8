use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;

use crate::config::class_name;
use crate::error::Error;
use crate::pipeline::TrackSink;
use crate::{Frame, Track};

pub const CSV_HEADER: &str = "Frame,Class,ID,Xmin,Ymin,Xmax,Ymax";

/// Writes one CSV row per confirmed track per frame.
///
/// Exported ids are dense: the first track ever written gets 1, the next
/// new one 2, and so on, so ids of tracks that never got confirmed leave
/// no gaps.
pub struct CsvExporter<W: Write> {
    writer: W,
    class_names: Vec<String>,
    ids: HashMap<u32, u32>,
    header_written: bool,
}

impl<W: Write> CsvExporter<W> {
    pub fn new(writer: W, class_names: Vec<String>) -> Self {
        Self {
            writer,
            class_names,
            ids: HashMap::new(),
            header_written: false,
        }
    }

    fn export_id(&mut self, track_id: u32) -> u32 {
        let next = self.ids.len() as u32 + 1;
        *self.ids.entry(track_id).or_insert(next)
    }

    fn write_header(&mut self) -> Result<(), Error> {
        if !self.header_written {
            writeln!(self.writer, "{}", CSV_HEADER)?;
            self.header_written = true;
        }

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TrackSink for CsvExporter<W> {
    fn consume(&mut self, frame: &Frame, tracks: &[&Track]) -> Result<(), Error> {
        self.write_header()?;

        for t in tracks {
            let id = self.export_id(t.track_id);
            let class = class_name(&self.class_names, t.class);
            let b = &t.bbox;

            writeln!(
                self.writer,
                "{},{},{},{},{},{},{}",
                frame.index,
                class,
                id,
                b.left(),
                b.top(),
                b.right(),
                b.bottom()
            )?;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.write_header()?;
        self.writer.flush()?;

        Ok(())
    }
}

/// Counts distinct confirmed tracks per class. A track is counted once, by
/// the class it had when first seen.
#[derive(Debug, Default)]
pub struct ObjectCounter {
    seen: HashSet<u32>,
    counts: BTreeMap<i32, usize>,
}

impl ObjectCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> &BTreeMap<i32, usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.seen.len()
    }
}

impl TrackSink for ObjectCounter {
    fn consume(&mut self, _frame: &Frame, tracks: &[&Track]) -> Result<(), Error> {
        for t in tracks {
            if self.seen.insert(t.track_id) {
                *self.counts.entry(t.class).or_insert(0) += 1;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Detection;

    fn track(id: u32, class: i32, ltrb: [f32; 4]) -> Track {
        let det = Detection::ltrb(ltrb[0], ltrb[1], ltrb[2], ltrb[3], 0.9, class);

        Track {
            track_id: id,
            centroid: det.centroid(),
            bbox: det.bbox,
            confidence: det.confidence,
            class,
            age: 0,
            hits: 3,
        }
    }

    fn names() -> Vec<String> {
        crate::config::VISDRONE_NAMES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn writes_rows_with_dense_ids() {
        let mut csv = CsvExporter::new(Vec::new(), names());
        let a = track(4, 3, [1.0, 2.0, 3.0, 4.0]);
        let b = track(9, 8, [10.0, 20.0, 30.5, 40.0]);
        let c = track(2, 42, [0.0, 0.0, 1.0, 1.0]);

        csv.consume(&Frame::new(1, 0.0, vec![]), &[&a]).unwrap();
        csv.consume(&Frame::new(2, 0.04, vec![]), &[&a, &b]).unwrap();
        csv.consume(&Frame::new(3, 0.08, vec![]), &[&c]).unwrap();
        csv.finish().unwrap();

        let out = String::from_utf8(csv.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(
            lines,
            vec![
                CSV_HEADER,
                "1,car,1,1,2,3,4",
                "2,car,1,1,2,3,4",
                "2,bus,2,10,20,30.5,40",
                "3,42,3,0,0,1,1",
            ]
        );
    }

    #[test]
    fn header_only_without_tracks() {
        let mut csv = CsvExporter::new(Vec::new(), names());
        csv.finish().unwrap();

        assert_eq!(String::from_utf8(csv.into_inner()).unwrap(), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn counts_each_track_once() {
        let mut counter = ObjectCounter::new();
        let frame = Frame::new(1, 0.0, vec![]);
        let a = track(1, 3, [0.0, 0.0, 1.0, 1.0]);
        let b = track(2, 3, [0.0, 0.0, 1.0, 1.0]);
        let mut a2 = track(1, 0, [0.0, 0.0, 1.0, 1.0]);
        a2.hits = 4;
        let c = track(3, 0, [0.0, 0.0, 1.0, 1.0]);

        counter.consume(&frame, &[&a]).unwrap();
        counter.consume(&frame, &[&a2, &b]).unwrap();
        counter.consume(&frame, &[&c]).unwrap();

        assert_eq!(counter.total(), 3);
        assert_eq!(counter.counts().get(&3), Some(&2));
        assert_eq!(counter.counts().get(&0), Some(&1));
    }
}
