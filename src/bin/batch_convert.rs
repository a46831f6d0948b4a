use anyhow::Context;
use clap::Parser;
use log::warn;
use pgm2png::EncodeOptions;
use std::{ffi::OsStr, fs, path::PathBuf};

/// Convert every `.pgm` file in a directory to PNG and record the results.
#[derive(Parser)]
#[command(name = "batch-convert")]
struct Cli {
    /// Directory holding the PGM files.
    input_dir: PathBuf,
    /// Directory the PNG files and `results.json` are written to.
    #[arg(default_value = "converted")]
    output_dir: PathBuf,
    /// Increase logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    fs::create_dir_all(&cli.output_dir).context(format!(
        "Failed to create output folder {}",
        cli.output_dir.display()
    ))?;
    let mut sources: Vec<PathBuf> = fs::read_dir(&cli.input_dir)
        .context(format!(
            "Failed to read input folder {}",
            cli.input_dir.display()
        ))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(OsStr::to_str)
                    .map(|extension| extension.eq_ignore_ascii_case("pgm"))
                    .unwrap_or(false)
        })
        .collect();
    sources.sort();

    let options = EncodeOptions::default();
    let mut converted = Vec::with_capacity(sources.len());
    let mut failed = vec![];
    for source in sources {
        let Some(stem) = source.file_stem().and_then(OsStr::to_str) else {
            warn!("Skipping {}: file name isn't valid UTF-8", source.display());
            continue;
        };
        let dest = cli.output_dir.join(format!("{stem}.png"));
        match pgm2png::convert_with(&source, &dest, &options) {
            Ok(conversion) => converted.push(serde_json::json!({
                "name": stem,
                "width": conversion.width,
                "height": conversion.height,
                "bit_depth": conversion.bit_depth.bits(),
                "bytes": conversion.bytes_written,
            })),
            Err(e) => {
                let e = anyhow::Error::from(e);
                warn!("Skipping {stem}: {e:#}");
                failed.push(serde_json::json!({
                    "name": stem,
                    "error": format!("{e:#}"),
                }));
            }
        }
    }
    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    let results = serde_json::json!({
        "date": now,
        "converted": converted,
        "failed": failed,
    });
    fs::write(cli.output_dir.join("results.json"), results.to_string())?;
    println!(
        "Converted {} images, {} failed",
        converted.len(),
        failed.len()
    );
    Ok(())
}
