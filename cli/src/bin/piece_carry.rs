use carry::{Compositor, ImageSequenceSink, ImageSequenceSource, Session};
use clap::{Parser, Subcommand};
use cli::{CarryConfig, PieceRecord, config_schema};
use color_eyre::eyre::Result;
use hand::{PinchDetector, ReplayHandTracker};
use pieces::{PieceDetectorBuilder, SegmentationSettings};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session from a configuration file
    Run {
        /// Path to the TOML or JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Segment a single image and report the pieces found
    Detect {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Resolution scale used for contour detection, in (0, 1]
        #[arg(long, default_value = "1.0")]
        ratio: f32,
        /// Boxes must be larger than this on both sides (pixels)
        #[arg(long, default_value = "50.0")]
        min_box_size: f32,
        /// Contours with fewer points are ignored
        #[arg(long, default_value = "20")]
        complexity: usize,
        /// Save every masked piece as a PNG in this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Write the piece records here instead of stdout
        #[arg(short, long)]
        json_output: Option<PathBuf>,
    },
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { config } => {
            run_session(config).await?;
        }
        Commands::Detect {
            input,
            ratio,
            min_box_size,
            complexity,
            export_dir,
            json_output,
        } => {
            let settings = SegmentationSettings {
                process_ratio: *ratio,
                contour_complexity_threshold: *complexity,
                min_box_size: *min_box_size,
                ..Default::default()
            };
            detect_pieces(input, &settings, export_dir.as_deref(), json_output.as_deref())?;
        }
        Commands::Schema => {
            println!("{}", config_schema()?);
        }
    }

    Ok(())
}

async fn run_session(config_path: &Path) -> Result<()> {
    let config = CarryConfig::from_file(config_path)?;
    info!("Loaded configuration from {}", config_path.display());

    let detector = PieceDetectorBuilder::from_settings(&config.segmentation).build()?;
    let hand_tracker = ReplayHandTracker::from_file(&config.hands)?
        .with_min_score(config.gesture.min_hand_score);
    if hand_tracker.remaining() == 0 {
        warn!("Hand recording {} is empty, nothing will be picked up", config.hands.display());
    }

    let mut session = Session::new(
        detector,
        hand_tracker,
        PinchDetector::new(config.gesture.pinch_ratio),
        Compositor::new(config.render.clone()),
    );
    let mut source = ImageSequenceSource::open(&config.input_dir)?;
    let mut sink = ImageSequenceSink::create(&config.output_dir)?;

    let summary = session.run(&mut source, &mut sink).await?;
    info!(
        "✅ {} frames rendered to {} ({} segmentation passes, {} pick-ups, {} drops)",
        summary.frames,
        config.output_dir.display(),
        summary.segmentation_passes,
        summary.acquisitions,
        summary.releases,
    );
    Ok(())
}

fn detect_pieces(
    input: &Path,
    settings: &SegmentationSettings,
    export_dir: Option<&Path>,
    json_output: Option<&Path>,
) -> Result<()> {
    let frame = image::open(input)?.to_rgba8();
    info!("Loaded {} ({}x{})", input.display(), frame.width(), frame.height());

    let mut detector = PieceDetectorBuilder::from_settings(settings).build()?;
    info!("{}", detector.info());
    let pieces = detector.process(&frame)?;
    info!("Found {} pieces", pieces.len());

    if let Some(dir) = export_dir {
        std::fs::create_dir_all(dir)?;
        for (index, piece) in pieces.iter().enumerate() {
            let path = dir.join(format!("piece_{index:03}.png"));
            piece.image.save(&path)?;
            info!("Saved piece {} -> {}", index, path.display());
        }
    }

    let records = pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| PieceRecord::from_piece(index, piece))
        .collect::<Result<Vec<_>, _>>()?;
    let json = serde_json::to_string_pretty(&records)?;

    match json_output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Piece records written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
