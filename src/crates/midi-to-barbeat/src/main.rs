use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use midi_to_barbeat::{render_tracks, MidiData, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "midi-to-barbeat")]
#[command(about = "Convert MIDI files to bar|beat notation", long_about = None)]
struct Args {
    /// Path to the MIDI file (default: uses first .mid file in current directory)
    #[arg(short, long)]
    midi: Option<PathBuf>,

    /// Output file path (default: `<midi-name>.barbeat`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of file
    #[arg(long)]
    stdout: bool,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,

    /// Snap timing to 1/N of a beat. 0 keeps the raw tick timing.
    #[arg(short, long, default_value = "48")]
    grid: u32,

    /// Treat tracks named like drums (kick, snare, hat...) as drum tracks
    #[arg(long)]
    detect_drum_names: bool,

    /// Additional 1-based MIDI channels to encode in drum mode
    #[arg(long, value_delimiter = ',')]
    force_drums: Vec<u8>,

    /// Emit a JSON array of tracks instead of one line per track
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let midi_path = if let Some(path) = args.midi {
        if !path.exists() {
            anyhow::bail!("MIDI file not found: {}", path.display());
        }
        path
    } else {
        find_first_midi_file()?
    };

    let output_path = if let Some(path) = args.output {
        path
    } else {
        let stem = midi_path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        PathBuf::from(format!("{}.barbeat", stem))
    };

    log::info!("Processing MIDI file: {}", midi_path.display());

    let midi_data = MidiData::from_file(&midi_path)?;

    let options = RenderOptions {
        grid: args.grid,
        detect_drum_names: args.detect_drum_names,
        forced_drum_channels: args.force_drums
            .iter()
            .filter(|&&channel| channel >= 1)
            .map(|channel| channel - 1)
            .collect(),
    };
    let tracks = render_tracks(&midi_data, &options)?;

    let output = if args.json {
        serde_json::to_string_pretty(&tracks)?
    } else {
        tracks
            .iter()
            .map(|track| track.notation.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };

    if args.stdout {
        println!("{}", output);
    } else {
        fs::write(&output_path, format!("{}\n", output))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        log::info!("Output saved to {}", output_path.display());
    }

    Ok(())
}

fn find_first_midi_file() -> Result<PathBuf> {
    let entries = fs::read_dir(".")
        .context("Failed to read current directory")?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("mid") {
            return Ok(path);
        }
    }

    anyhow::bail!("No MIDI files found in current directory")
}
