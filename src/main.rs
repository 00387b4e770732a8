use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::info;

use ctrack::config::{class_name, Config};
use ctrack::export::{CsvExporter, ObjectCounter};
use ctrack::source::ReplaySource;
use ctrack::{FramePipeline, MatchingPolicy, TrackSink};

#[derive(Parser, Debug)]
#[command(name = "ctrack", about = "Centroid tracking over recorded detections")]
struct Args {
    /// Detector dump, one `<offset ms>: <json array>` line per frame
    #[arg(long, value_name = "PATH")]
    detections: PathBuf,
    #[arg(long, value_name = "PATH", default_value = "detections.csv")]
    output: PathBuf,
    /// JSON config; command line values override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long)]
    max_distance: Option<f32>,
    #[arg(long)]
    max_age: Option<u32>,
    #[arg(long)]
    min_hits: Option<u32>,
    #[arg(long)]
    confidence: Option<f32>,
    /// Comma separated class ids to keep
    #[arg(long, value_delimiter = ',')]
    classes: Option<Vec<i32>>,
    /// One-to-one assignment instead of last-write-wins matching
    #[arg(long)]
    optimal: bool,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(v) = self.max_distance {
            config.tracker.max_distance = v;
        }
        if let Some(v) = self.max_age {
            config.tracker.max_age = v;
        }
        if let Some(v) = self.min_hits {
            config.tracker.min_hits = v;
        }
        if let Some(v) = self.confidence {
            config.detector.confidence_threshold = v;
        }
        if let Some(v) = &self.classes {
            config.detector.classes = v.clone();
        }
        if self.optimal {
            config.tracker.matching = MatchingPolicy::Optimal;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let config = args.load_config()?;
    info!(tracker = ?config.tracker, detector = ?config.detector, "starting");

    let mut source = ReplaySource::open(&args.detections, config.detector.clone())
        .with_context(|| format!("Failed to open {}", args.detections.display()))?;

    let out = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut csv = CsvExporter::new(BufWriter::new(out), config.class_names.clone());
    let mut counter = ObjectCounter::new();

    let mut pipeline = FramePipeline::new(config.tracker.clone())?;
    let frames = {
        let mut sinks: [&mut dyn TrackSink; 2] = [&mut csv, &mut counter];
        pipeline.run(&mut source, &mut sinks)?
    };

    info!(frames, objects = counter.total(), "processing finished");
    for (class, count) in counter.counts() {
        info!("{}: {}", class_name(&config.class_names, *class), count);
    }
    info!("tracks written to {}", args.output.display());

    Ok(())
}
