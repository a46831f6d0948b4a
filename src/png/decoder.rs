use std::{iter::Peekable, marker::PhantomData};

use anyhow::{anyhow, bail, ensure};
use log::debug;
use nom::{bytes::complete::tag, IResult};

use super::chunks::{ihdr::IHDRChunk, iter_chunks, Chunk, ChunkIter};

pub(crate) const SIGNATURE: &[u8; 8] = b"\x89PNG\x0d\x0a\x1a\x0a";

/// Walks a PNG's chunks in the order the format requires.
pub(crate) struct PNGDecoder<'a, State>(Peekable<ChunkIter<'a>>, PhantomData<State>);

pub(crate) struct Start;
pub(crate) struct Header;
pub(crate) struct ImageData;

impl<'a> PNGDecoder<'a, Start> {
    pub(crate) fn new(data: &'a [u8]) -> anyhow::Result<Self> {
        let (rest, _) = parse_signature(data)
            .map_err(|_| anyhow!("input doesn't start with expected signature"))?;
        Ok(Self(iter_chunks(rest).peekable(), PhantomData))
    }

    pub(crate) fn parse_ihdr(mut self) -> anyhow::Result<(PNGDecoder<'a, Header>, IHDRChunk)> {
        match self.0.next().transpose()? {
            Some(Chunk::IHDR(ihdr)) => {
                debug!("IHDR: {ihdr:?}");
                Ok((PNGDecoder(self.0, PhantomData), ihdr))
            }
            Some(other) => bail!(
                "Expected IHDR as the first chunk, found {}",
                String::from_utf8_lossy(other.chunk_type())
            ),
            None => bail!("PNG has no chunks"),
        }
    }
}

impl<'a> PNGDecoder<'a, Header> {
    /// Concatenates the payloads of the consecutive IDAT chunks.
    pub(crate) fn collect_idat(mut self) -> anyhow::Result<(PNGDecoder<'a, ImageData>, Vec<u8>)> {
        loop {
            match self.0.peek() {
                Some(Ok(Chunk::IDAT(_))) => break,
                Some(Ok(_)) => skip_chunk(self.0.next().transpose()?)?,
                Some(Err(_)) => {
                    self.0.next().transpose()?;
                }
                None => bail!("Couldn't find an IDAT"),
            }
        }
        let mut compressed = vec![];
        let mut count = 0;
        while let Some(Ok(Chunk::IDAT(_))) = self.0.peek() {
            if let Some(Ok(Chunk::IDAT(idat))) = self.0.next() {
                compressed.extend_from_slice(idat.data);
                count += 1;
            }
        }
        debug!("Read {} bytes of image data from {count} IDAT chunks", compressed.len());
        Ok((PNGDecoder(self.0, PhantomData), compressed))
    }
}

impl<'a> PNGDecoder<'a, ImageData> {
    /// Checks the chunks after the image data, up to and including IEND.
    pub(crate) fn finish(mut self) -> anyhow::Result<()> {
        while let Some(chunk) = self.0.next().transpose()? {
            match chunk {
                Chunk::IEND => return Ok(()),
                Chunk::IDAT(_) => bail!("IDAT chunks must be consecutive"),
                other => skip_chunk(Some(other))?,
            }
        }
        bail!("PNG ended without an IEND chunk")
    }
}

fn skip_chunk(chunk: Option<Chunk<'_>>) -> anyhow::Result<()> {
    match chunk {
        Some(Chunk::Unknown(raw)) => {
            ensure!(
                !raw.is_critical(),
                "Unsupported critical chunk {}",
                raw.name()
            );
            debug!("Skipping {} chunk ({} bytes)", raw.name(), raw.data.len());
            Ok(())
        }
        Some(Chunk::IHDR(_)) => bail!("Duplicate IHDR chunk"),
        Some(Chunk::IEND) => bail!("IEND before image data"),
        Some(Chunk::IDAT(_)) | None => Ok(()),
    }
}

pub(crate) fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&SIGNATURE[..])(input)
}
