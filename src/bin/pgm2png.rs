use std::path::PathBuf;

use clap::Parser;
use pgm2png::{EncodeOptions, FilterStrategy, Interlacing, PgmEncoding, MAX_COMPRESSION, PNG};

/// Convert a greyscale PGM image to PNG (or back, going by the output extension).
#[derive(Parser)]
#[command(name = "pgm2png", version)]
struct Cli {
    /// Image to read, PGM or PNG.
    #[arg(default_value = "Lena_gaussianBlur.pgm")]
    input: PathBuf,
    /// Image to write; `.png` or `.pgm`. Overwritten if it exists.
    #[arg(default_value = "output.png")]
    output: PathBuf,
    /// Scanline filter used for PNG output.
    #[arg(long, value_enum, default_value_t = FilterStrategy::Adaptive)]
    filter: FilterStrategy,
    /// zlib compression level for PNG output.
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=MAX_COMPRESSION as i64))]
    compression: u8,
    /// Pixel ordering for PNG output.
    #[arg(long, value_enum, default_value_t = Interlacing::None)]
    interlace: Interlacing,
    /// Write PGM output as plain text (P2) instead of binary (P5).
    #[arg(long)]
    plain: bool,
    /// List the chunks of the written PNG.
    #[arg(long)]
    inspect: bool,
    /// Increase logging; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = match cli.verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(verbosity);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    let options = EncodeOptions {
        compression: cli.compression,
        filter: cli.filter,
        interlacing: cli.interlace,
        pgm_encoding: if cli.plain {
            PgmEncoding::Plain
        } else {
            PgmEncoding::Raw
        },
    };
    let conversion = pgm2png::convert_with(&cli.input, &cli.output, &options)?;
    println!("Saved image: {}", cli.output.display());

    if cli.inspect && conversion.dest_format == pgm2png::ImageFormat::Png {
        for chunk in PNG::chunks(&std::fs::read(&cli.output)?)? {
            println!("{} ({} bytes)", chunk.chunk_type, chunk.length);
        }
    }
    Ok(())
}
