use std::borrow::Cow;

use anyhow::{anyhow, bail, ensure};
use nom::{bytes::complete::take, number::complete::be_u32, sequence::tuple, IResult};

use super::ParseableChunk;
use crate::{image::BitDepth, utils::packed_len};

pub(crate) const HEADER: &[u8; 4] = b"IHDR";
pub(crate) const DATA_LENGTH: usize = 13;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct IHDRChunk {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) bit_depth: BitDepth,
    pub(crate) color_type: ColorType,
    pub(crate) interlace_method: Interlacing,
}
impl IHDRChunk {
    pub(crate) fn greyscale(
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        interlace_method: Interlacing,
    ) -> Self {
        Self {
            width,
            height,
            bit_depth,
            color_type: ColorType::Greyscale,
            interlace_method,
        }
    }

    /// Byte distance to the corresponding byte of the previous pixel when filtering.
    pub(crate) fn filter_width(&self) -> usize {
        let channel_count = self.color_type.channel_count() as usize;
        let sample_width = usize::max(self.bit_depth.bits() as usize / 8, 1);
        channel_count * sample_width
    }

    pub(crate) fn pixel_width(&self) -> u8 {
        self.color_type.channel_count() * self.bit_depth.bits()
    }

    /// Bytes in a row of `width` pixels, excluding the filter type byte.
    pub(crate) fn row_size(&self, width: usize) -> usize {
        packed_len(width, self.pixel_width())
    }
}
impl<'a> ParseableChunk<'a> for IHDRChunk {
    const HEADER: &'static [u8; 4] = HEADER;

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self> {
        ensure!(
            chunk_data.len() == DATA_LENGTH,
            "IHDR should hold {DATA_LENGTH} bytes, found {}",
            chunk_data.len()
        );
        let (_, (width, height, other_bytes)) = parse_fields(chunk_data)
            .map_err(|e| anyhow!("Malformed IHDR ({:?})", e.map(|e| e.code)))?;
        let [bit_depth, color_type, compression_method, filter_method, interlace_method] =
            other_bytes
        else {
            bail!("IHDR is missing its trailing fields");
        };
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be non-zero, got {width}x{height}"
        );
        ensure!(
            *compression_method == 0,
            "Unknown compression method {compression_method}"
        );
        ensure!(*filter_method == 0, "Unknown filter method {filter_method}");
        let color_type = ColorType::try_from(*color_type)?;
        let bit_depth = BitDepth::try_from(*bit_depth)?;
        ensure!(
            color_type.allows(bit_depth),
            "Bit depth {} is not allowed for {color_type:?}",
            bit_depth.bits()
        );
        Ok(IHDRChunk {
            width,
            height,
            bit_depth,
            color_type,
            interlace_method: Interlacing::try_from(*interlace_method)?,
        })
    }

    fn data(&self) -> Cow<'_, [u8]> {
        let mut bytes = Vec::with_capacity(DATA_LENGTH);
        bytes.extend(self.width.to_be_bytes());
        bytes.extend(self.height.to_be_bytes());
        bytes.extend([
            self.bit_depth.bits(),
            self.color_type as u8,
            0,
            0,
            self.interlace_method as u8,
        ]);
        Cow::Owned(bytes)
    }
}

fn parse_fields(chunk_data: &[u8]) -> IResult<&[u8], (u32, u32, &[u8])> {
    tuple((be_u32, be_u32, take(5usize)))(chunk_data)
}

#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub(crate) enum ColorType {
    #[default]
    Greyscale = 0,
    Truecolor = 2,
    IndexedColor = 3,
    GreyscaleWithAlpha = 4,
    TruecolorWithAlpha = 6,
}
impl TryFrom<u8> for ColorType {
    type Error = anyhow::Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Greyscale),
            2 => Ok(Self::Truecolor),
            3 => Ok(Self::IndexedColor),
            4 => Ok(Self::GreyscaleWithAlpha),
            6 => Ok(Self::TruecolorWithAlpha),
            i => Err(anyhow!("Invalid colour type {i}")),
        }
    }
}
impl ColorType {
    pub(crate) fn channel_count(&self) -> u8 {
        match self {
            Self::Greyscale => 1,
            Self::IndexedColor => 1,
            Self::GreyscaleWithAlpha => 2,
            Self::Truecolor => 3,
            Self::TruecolorWithAlpha => 4,
        }
    }

    fn allows(&self, bit_depth: BitDepth) -> bool {
        match self {
            Self::Greyscale => true,
            Self::IndexedColor => bit_depth <= BitDepth::Eight,
            _ => bit_depth >= BitDepth::Eight,
        }
    }
}

/// Pixel ordering of the image data.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy, clap::ValueEnum)]
pub enum Interlacing {
    #[default]
    None,
    Adam7,
}
impl TryFrom<u8> for Interlacing {
    type Error = anyhow::Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Adam7),
            i => Err(anyhow!("Unknown interlace method {i}")),
        }
    }
}
