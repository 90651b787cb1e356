use ax25::{Address, DecodeError, Frame, RepeaterPath};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tnc::{Config, Tnc, TncError, write_pcm};

/// AFSK1200 packet radio encoder and decoder
#[derive(Parser, Debug)]
#[command(version, about = "AFSK1200 packet radio encoder and decoder", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a UI frame into raw signed 16-bit little-endian PCM
    Encode {
        /// Sending station, e.g. N0CALL-1
        #[arg(short, long)]
        source: Address,
        /// Destination, e.g. APRS
        #[arg(short, long)]
        destination: Address,
        /// Comma-separated repeater path, e.g. WIDE1-1,WIDE2-1
        #[arg(long, value_delimiter = ',')]
        via: Vec<Address>,
        /// Output file; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Info field text
        message: String,
    },

    /// Decode raw signed 16-bit little-endian PCM and print frames
    Decode {
        /// Input file; standard input when omitted
        input: Option<PathBuf>,
    },
}

fn encode(
    config: &Config,
    frame: Frame,
    output: Option<&Path>,
) -> Result<(), TncError> {
    let mut tnc = Tnc::new(config, |_: Frame, _: bool, _: Option<DecodeError>| {})?;
    let samples = tnc.transmit(&frame)?;
    log::info!("{frame}: {} samples", samples.len());

    match output {
        Some(path) => write_pcm(&samples, BufWriter::new(File::create(path)?))?,
        None => write_pcm(&samples, io::stdout().lock())?,
    }
    Ok(())
}

fn decode(config: &Config, input: Option<&Path>) -> Result<(), TncError> {
    let mut tnc = Tnc::new(config, |frame: Frame, valid: bool, error: Option<DecodeError>| {
        if valid {
            println!("{frame}");
        } else {
            println!("{frame} [invalid]");
            if let Some(error) = error {
                log::debug!("{error}");
            }
        }
    })?;

    match input {
        Some(path) => tnc.receive_stream(BufReader::new(File::open(path)?))?,
        None => tnc.receive_stream(io::stdin().lock())?,
    }

    let stats = tnc.stats();
    log::info!(
        "{} frames ({} with bad FCS), {} malformed, {} sync losses, {} overflows",
        stats.frames,
        stats.checksum_failures,
        stats.malformed,
        stats.sync_losses,
        stats.overflows
    );
    Ok(())
}

fn run(args: Args) -> Result<(), TncError> {
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Commands::Encode {
            source,
            destination,
            via,
            output,
            message,
        } => {
            let frame = Frame::ui(destination, source, message).via(RepeaterPath::new(via)?);
            encode(&config, frame, output.as_deref())
        }
        Commands::Decode { input } => decode(&config, input.as_deref()),
    }
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
