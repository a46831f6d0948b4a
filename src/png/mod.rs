use anyhow::{anyhow, bail};
use log::debug;

use crate::{image::Image, options::EncodeOptions};

use self::{
    chunks::{idat::write_idats, iend::IENDChunk, ihdr::ColorType, ihdr::IHDRChunk, ParseableChunk},
    decoder::{parse_signature, PNGDecoder, SIGNATURE},
    image_data::{compress_data, decompress_data},
};

mod chunks;
mod decoder;
mod filters;
mod image_data;
mod interlacing;
mod scanlines;

pub use chunks::ihdr::Interlacing;
pub use filters::FilterStrategy;

/// Type and data length of one chunk in a PNG stream.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ChunkInfo {
    pub chunk_type: String,
    pub length: usize,
}

pub struct PNG;

impl PNG {
    pub(crate) fn has_signature(bytes: &[u8]) -> bool {
        bytes.starts_with(SIGNATURE)
    }

    /// Decodes a greyscale PNG.
    pub fn decode(bytes: &[u8]) -> anyhow::Result<Image> {
        let decoder = PNGDecoder::new(bytes)?;
        let (decoder, header) = decoder.parse_ihdr()?;
        if header.color_type != ColorType::Greyscale {
            bail!(
                "Unsupported colour type {:?}, only greyscale images can be converted",
                header.color_type
            );
        }
        let (decoder, compressed) = decoder.collect_idat()?;
        decoder.finish()?;
        let samples = decompress_data(&compressed, &header)?;
        Image::new(header.width, header.height, header.bit_depth, samples)
    }

    /// Encodes `image` as a greyscale PNG at the image's own bit depth.
    pub fn encode(image: &Image, options: &EncodeOptions) -> Vec<u8> {
        let header = IHDRChunk::greyscale(
            image.width(),
            image.height(),
            image.bit_depth(),
            options.interlacing,
        );
        let compressed = compress_data(image, &header, options.filter, options.compression_level());
        debug!(
            "Compressed {}x{} image into {} bytes",
            image.width(),
            image.height(),
            compressed.len()
        );
        let mut bytes = SIGNATURE.to_vec();
        bytes.extend(header.to_bytes());
        bytes.extend(write_idats(&compressed));
        bytes.extend(IENDChunk.to_bytes());
        bytes
    }

    /// Lists the chunks of a PNG stream without decoding the image data.
    pub fn chunks(bytes: &[u8]) -> anyhow::Result<Vec<ChunkInfo>> {
        let (rest, _) = parse_signature(bytes)
            .map_err(|_| anyhow!("input doesn't start with expected signature"))?;
        chunks::iter_chunks(rest)
            .map(|chunk| {
                let chunk = chunk?;
                Ok(ChunkInfo {
                    chunk_type: String::from_utf8_lossy(chunk.chunk_type()).into_owned(),
                    length: chunk.data_len(),
                })
            })
            .collect()
    }
}
