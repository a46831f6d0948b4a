use anyhow::{anyhow, bail, ensure};
use log::debug;

use crate::image::{pixel_count, BitDepth, Image};

use self::header::{parse_header, plain_sample, PgmHeader};

mod header;

/// Longest line written in plain PGM output.
const PLAIN_LINE_WIDTH: usize = 70;

/// Raster encoding of a PGM file.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy, clap::ValueEnum)]
pub enum PgmEncoding {
    /// `P2`: decimal samples as text.
    Plain,
    /// `P5`: binary samples, big-endian when wider than a byte.
    #[default]
    Raw,
}
impl PgmEncoding {
    fn magic(&self) -> &'static str {
        match self {
            Self::Plain => "P2",
            Self::Raw => "P5",
        }
    }
}

pub struct PGM;

impl PGM {
    pub(crate) fn has_magic(bytes: &[u8]) -> bool {
        bytes.starts_with(b"P2") || bytes.starts_with(b"P5")
    }

    /// Decodes the first image of a plain or raw PGM file.
    pub fn decode(bytes: &[u8]) -> anyhow::Result<Image> {
        let (raster, header) = parse_header(bytes)?;
        debug!("PGM header: {header:?}");
        let samples = match header.encoding {
            PgmEncoding::Raw => read_raw(raster, &header)?,
            PgmEncoding::Plain => read_plain(raster, &header)?,
        };
        Image::new(
            header.width,
            header.height,
            BitDepth::for_max_value(header.max_value),
            samples,
        )
    }

    /// Encodes `image` with a maxval matching its bit depth.
    pub fn encode(image: &Image, encoding: PgmEncoding) -> Vec<u8> {
        let max_value = image.bit_depth().max_value();
        let mut bytes = format!(
            "{}\n{} {}\n{}\n",
            encoding.magic(),
            image.width(),
            image.height(),
            max_value
        )
        .into_bytes();
        match encoding {
            PgmEncoding::Raw if max_value > u8::MAX as u16 => {
                for sample in image.samples() {
                    bytes.extend(sample.to_be_bytes());
                }
            }
            PgmEncoding::Raw => bytes.extend(image.samples().iter().map(|&sample| sample as u8)),
            PgmEncoding::Plain => {
                for row in image.rows() {
                    write_plain_row(row, &mut bytes);
                }
            }
        }
        bytes
    }
}

fn read_raw(raster: &[u8], header: &PgmHeader) -> anyhow::Result<Vec<u16>> {
    let count = pixel_count(header.width, header.height)?;
    let sample_size = if header.max_value > u8::MAX as u16 { 2 } else { 1 };
    let expected = count
        .checked_mul(sample_size)
        .ok_or_else(|| anyhow!("PGM raster is too large"))?;
    ensure!(
        raster.len() >= expected,
        "PGM raster is truncated: expected {expected} bytes, found {}",
        raster.len()
    );
    if raster.len() > expected {
        debug!("Ignoring {} trailing bytes", raster.len() - expected);
    }
    let samples: Vec<u16> = if sample_size == 2 {
        raster[..expected]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect()
    } else {
        raster[..expected].iter().map(|&b| b as u16).collect()
    };
    check_max_value(&samples, header.max_value)?;
    Ok(samples)
}

fn read_plain(raster: &[u8], header: &PgmHeader) -> anyhow::Result<Vec<u16>> {
    let count = pixel_count(header.width, header.height)?;
    // Every sample takes a digit and all but the last a separator.
    ensure!(
        count <= raster.len() / 2 + 1,
        "PGM raster is truncated: {count} samples can't fit in {} bytes",
        raster.len()
    );
    let mut samples = Vec::with_capacity(count);
    let mut rest = raster;
    for index in 0..count {
        let (remaining, sample) = plain_sample(rest).map_err(|_| {
            anyhow!("PGM raster is truncated or malformed at sample {index} of {count}")
        })?;
        if sample > header.max_value as u32 {
            bail!(
                "Sample {sample} at index {index} exceeds maxval {}",
                header.max_value
            );
        }
        samples.push(sample as u16);
        rest = remaining;
    }
    Ok(samples)
}

fn check_max_value(samples: &[u16], max_value: u16) -> anyhow::Result<()> {
    match samples.iter().position(|&sample| sample > max_value) {
        Some(index) => bail!(
            "Sample {} at index {index} exceeds maxval {max_value}",
            samples[index]
        ),
        None => Ok(()),
    }
}

fn write_plain_row(row: &[u16], out: &mut Vec<u8>) {
    let mut line_len = 0;
    for sample in row {
        let token = sample.to_string();
        if line_len > 0 {
            if line_len + 1 + token.len() > PLAIN_LINE_WIDTH {
                out.push(b'\n');
                line_len = 0;
            } else {
                out.push(b' ');
                line_len += 1;
            }
        }
        out.extend(token.as_bytes());
        line_len += token.len();
    }
    out.push(b'\n');
}
