use std::borrow::Cow;

use anyhow::ensure;

use super::ParseableChunk;

pub(crate) const HEADER: &[u8; 4] = b"IEND";

pub(crate) struct IENDChunk;
impl<'a> ParseableChunk<'a> for IENDChunk {
    const HEADER: &'static [u8; 4] = HEADER;

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self> {
        ensure!(chunk_data.is_empty(), "IEND chunk must be empty");
        Ok(Self)
    }

    fn data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&[])
    }
}
