use anyhow::{anyhow, bail, ensure};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{multispace1, one_of, u32 as decimal},
    combinator::{opt, value},
    multi::many1_count,
    sequence::{pair, preceded},
    IResult,
};

use super::PgmEncoding;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct PgmHeader {
    pub(crate) encoding: PgmEncoding,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) max_value: u16,
}

/// Parses the header, returning it with the raster that follows.
pub(crate) fn parse_header(input: &[u8]) -> anyhow::Result<(&[u8], PgmHeader)> {
    match input.get(..2) {
        Some(b"P2" | b"P5") => (),
        Some([b'P', kind @ b'1'..=b'7']) => bail!(
            "Unsupported Netpbm format P{}, only greyscale P2 and P5 are handled",
            *kind as char
        ),
        _ => bail!("input doesn't start with a PGM magic number"),
    }
    let (raster, (encoding, width, height, max_value)) =
        header(input).map_err(|e| anyhow!("Malformed PGM header ({:?})", e.map(|e| e.code)))?;
    ensure!(
        width > 0 && height > 0,
        "Image dimensions must be non-zero, got {width}x{height}"
    );
    ensure!(
        (1..=u16::MAX as u32).contains(&max_value),
        "maxval must be between 1 and 65535, got {max_value}"
    );
    Ok((
        raster,
        PgmHeader {
            encoding,
            width,
            height,
            max_value: max_value as u16,
        },
    ))
}

fn header(input: &[u8]) -> IResult<&[u8], (PgmEncoding, u32, u32, u32)> {
    let (input, encoding) = magic(input)?;
    let (input, width) = preceded(separator, decimal)(input)?;
    let (input, height) = preceded(separator, decimal)(input)?;
    let (input, max_value) = preceded(separator, decimal)(input)?;
    // Exactly one whitespace byte separates maxval from the raster.
    let (input, _) = one_of(" \t\r\n")(input)?;
    Ok((input, (encoding, width, height, max_value)))
}

fn magic(input: &[u8]) -> IResult<&[u8], PgmEncoding> {
    alt((
        value(PgmEncoding::Plain, tag("P2")),
        value(PgmEncoding::Raw, tag("P5")),
    ))(input)
}

fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), pair(tag("#"), opt(is_not("\r\n"))))(input)
}

/// Whitespace and comments, at least one byte of either.
pub(crate) fn separator(input: &[u8]) -> IResult<&[u8], ()> {
    value((), many1_count(alt((value((), multispace1), comment))))(input)
}

/// A decimal sample in a plain raster, optionally preceded by separators.
pub(crate) fn plain_sample(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(opt(separator), decimal)(input)
}
