use std::borrow::Cow;

use super::ParseableChunk;

pub(crate) const HEADER: &[u8; 4] = b"IDAT";

/// Largest IDAT payload written by the encoder.
pub(crate) const MAX_IDAT_SIZE: usize = 1 << 16;

#[derive(Debug)]
pub(crate) struct IDATChunk<'a> {
    pub(crate) data: &'a [u8],
}
impl<'a> ParseableChunk<'a> for IDATChunk<'a> {
    const HEADER: &'static [u8; 4] = HEADER;

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self> {
        Ok(IDATChunk { data: chunk_data })
    }

    fn data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.data)
    }
}

/// Splits a compressed stream into framed IDAT chunks.
pub(crate) fn write_idats(compressed: &[u8]) -> Vec<u8> {
    compressed
        .chunks(MAX_IDAT_SIZE)
        .flat_map(|data| IDATChunk { data }.to_bytes())
        .collect()
}
