use anyhow::{anyhow, ensure, Context};
use nom::{
    bytes::complete::take, combinator::verify, number::complete::be_u32, sequence::tuple, IResult,
};

mod crc;
pub(crate) mod idat;
pub(crate) mod iend;
pub(crate) mod ihdr;

/// Chunk data lengths are limited to 2^31 - 1 bytes.
pub(crate) const MAX_CHUNK_LENGTH: u32 = (1 << 31) - 1;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug)]
pub(crate) enum Chunk<'a> {
    IHDR(ihdr::IHDRChunk),
    IDAT(idat::IDATChunk<'a>),
    IEND,
    Unknown(RawChunk<'a>),
}
impl Chunk<'_> {
    pub(crate) fn chunk_type(&self) -> &[u8; 4] {
        match self {
            Chunk::IHDR(_) => ihdr::HEADER,
            Chunk::IDAT(_) => idat::HEADER,
            Chunk::IEND => iend::HEADER,
            Chunk::Unknown(raw) => raw.chunk_type,
        }
    }

    pub(crate) fn data_len(&self) -> usize {
        match self {
            Chunk::IHDR(_) => ihdr::DATA_LENGTH,
            Chunk::IDAT(idat) => idat.data.len(),
            Chunk::IEND => 0,
            Chunk::Unknown(raw) => raw.data.len(),
        }
    }
}

pub(crate) fn iter_chunks(source: &[u8]) -> ChunkIter {
    ChunkIter {
        source,
        finished: false,
    }
}

pub(crate) struct ChunkIter<'a> {
    source: &'a [u8],
    finished: bool,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = anyhow::Result<Chunk<'a>>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.source.is_empty() {
            self.finished = true;
            return None;
        }
        match parse_chunk(self.source) {
            Ok((rest, chunk)) => {
                self.source = rest;
                if matches!(chunk, Chunk::IEND) {
                    self.finished = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct RawChunk<'a> {
    pub(crate) chunk_type: &'a [u8; 4],
    pub(crate) data: &'a [u8],
}
impl RawChunk<'_> {
    /// Critical chunks have an uppercase first letter and can't be skipped.
    pub(crate) fn is_critical(&self) -> bool {
        self.chunk_type[0].is_ascii_uppercase()
    }

    pub(crate) fn name(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.chunk_type)
    }
}

fn parse_chunk(input: &[u8]) -> anyhow::Result<(&[u8], Chunk<'_>)> {
    let (rest, (chunk_type, chunk_data, crc)) = framed_chunk(input)
        .map_err(|e| anyhow!("Truncated or oversized chunk ({:?})", e.map(|e| e.code)))?;
    let chunk_type: &[u8; 4] = chunk_type
        .try_into()
        .context("Chunk type should be 4 bytes")?;
    let expected = crc::chunk_crc(chunk_type, chunk_data);
    ensure!(
        crc == expected,
        "CRC mismatch in {} chunk: stored {crc:#010x}, computed {expected:#010x}",
        String::from_utf8_lossy(chunk_type)
    );
    let chunk = match chunk_type {
        ihdr::HEADER => Chunk::IHDR(ihdr::IHDRChunk::from_bytes(chunk_data)?),
        idat::HEADER => Chunk::IDAT(idat::IDATChunk::from_bytes(chunk_data)?),
        iend::HEADER => {
            iend::IENDChunk::from_bytes(chunk_data)?;
            Chunk::IEND
        }
        _ => Chunk::Unknown(RawChunk {
            chunk_type,
            data: chunk_data,
        }),
    };
    Ok((rest, chunk))
}

fn framed_chunk(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8], u32)> {
    let (input, length) = verify(be_u32, |length: &u32| *length <= MAX_CHUNK_LENGTH)(input)?;
    tuple((take(4usize), take(length as usize), be_u32))(input)
}

/// Frames `data` as a chunk: length, type, data, CRC.
pub(crate) fn write_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() + 12);
    bytes.extend((data.len() as u32).to_be_bytes());
    bytes.extend(chunk_type);
    bytes.extend(data);
    bytes.extend(crc::chunk_crc(chunk_type, data).to_be_bytes());
    bytes
}

pub(crate) trait ParseableChunk<'a>: Sized {
    const HEADER: &'static [u8; 4];

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self>;
    fn data(&self) -> std::borrow::Cow<'_, [u8]>;

    fn to_bytes(&self) -> Vec<u8> {
        write_chunk(Self::HEADER, &self.data())
    }
}
