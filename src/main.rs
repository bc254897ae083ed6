use anyhow::{Context, Result};
use barbeat_core::{NotationOptions, NoteEvent};
use barbeat_notation::{interpret, normalize, serialize};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "barbeat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encode, decode and validate bar|beat note notation", long_about = None)]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON array of note events as notation
    Encode {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        time: TimeArgs,
    },
    /// Decode notation into a JSON array of note events
    Decode {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        time: TimeArgs,

        /// Print compact JSON on one line
        #[arg(long)]
        compact: bool,
    },
    /// Check that notation interprets without errors
    Validate {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        time: TimeArgs,
    },
    /// Rewrite notation in its shortest canonical form
    Fmt {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        time: TimeArgs,
    },
}

#[derive(Args)]
struct Input {
    /// Inline input (default: read stdin)
    text: Option<String>,

    /// Read input from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,
}

impl Input {
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    }
}

#[derive(Args)]
struct TimeArgs {
    /// Beats per bar (overrides the time signature numerator)
    #[arg(long)]
    beats_per_bar: Option<u32>,

    /// Time signature such as 3/4 or 6/8
    #[arg(long, value_name = "N/D", value_parser = parse_time_signature)]
    time_sig: Option<(u32, u32)>,

    /// Encode one entry per pitch with repeat patterns
    #[arg(long)]
    drums: bool,
}

impl TimeArgs {
    fn options(&self) -> NotationOptions {
        let mut options = match self.time_sig {
            Some((numerator, denominator)) => {
                NotationOptions::with_time_signature(numerator, denominator)
            }
            None => NotationOptions::default(),
        };
        options.beats_per_bar = self.beats_per_bar;
        options.drum_mode = self.drums;
        options
    }
}

fn parse_time_signature(text: &str) -> Result<(u32, u32), String> {
    let (numerator, denominator) = text
        .split_once('/')
        .ok_or_else(|| format!("expected N/D, got '{}'", text))?;
    let numerator = numerator
        .trim()
        .parse()
        .map_err(|_| format!("invalid numerator '{}'", numerator))?;
    let denominator = denominator
        .trim()
        .parse()
        .map_err(|_| format!("invalid denominator '{}'", denominator))?;
    Ok((numerator, denominator))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode { input, time } => {
            let source = input.read()?;
            let notes: Vec<NoteEvent> =
                serde_json::from_str(&source).context("Failed to parse note events as JSON")?;
            debug!("encoding {} notes", notes.len());
            let text = serialize(&notes, &time.options())?;
            println!("{}", text);
            Ok(())
        }
        Commands::Decode { input, time, compact } => {
            let source = input.read()?;
            let notes = interpret(source.trim(), &time.options())?;
            let json = if compact {
                serde_json::to_string(&notes)?
            } else {
                serde_json::to_string_pretty(&notes)?
            };
            println!("{}", json);
            Ok(())
        }
        Commands::Validate { input, time } => {
            let source = input.read()?;
            match interpret(source.trim(), &time.options()) {
                Ok(notes) => {
                    println!("✓ Notation is valid ({} notes)", notes.len());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("✗ {:?} error: {}", e.kind(), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Fmt { input, time } => {
            let source = input.read()?;
            println!("{}", normalize(source.trim(), &time.options())?);
            Ok(())
        }
    }
}
