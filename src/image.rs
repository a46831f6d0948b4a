use anyhow::{anyhow, bail, ensure};

/// Bits per greyscale sample.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum BitDepth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
}
impl BitDepth {
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Largest sample value representable at this depth.
    pub fn max_value(self) -> u16 {
        match self {
            Self::Sixteen => u16::MAX,
            depth => (1 << depth.bits()) - 1,
        }
    }

    /// The narrowest byte-aligned depth that holds samples up to `max_value`.
    pub fn for_max_value(max_value: u16) -> Self {
        if max_value <= u8::MAX as u16 {
            Self::Eight
        } else {
            Self::Sixteen
        }
    }
}
impl TryFrom<u8> for BitDepth {
    type Error = anyhow::Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            i => Err(anyhow!("Invalid bit depth {i}")),
        }
    }
}

/// A decoded single-channel raster, samples stored row-major.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    bit_depth: BitDepth,
    samples: Vec<u16>,
}
impl Image {
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        samples: Vec<u16>,
    ) -> anyhow::Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be non-zero, got {width}x{height}"
        );
        let expected = pixel_count(width, height)?;
        ensure!(
            samples.len() == expected,
            "Expected {expected} samples for a {width}x{height} image, got {}",
            samples.len()
        );
        let max_value = bit_depth.max_value();
        if let Some((index, sample)) = samples
            .iter()
            .enumerate()
            .find(|(_, &sample)| sample > max_value)
        {
            bail!(
                "Sample {sample} at index {index} doesn't fit in {} bits",
                bit_depth.bits()
            );
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.samples
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, u16> {
        self.samples.chunks(self.width as usize)
    }
}

pub(crate) fn pixel_count(width: u32, height: u32) -> anyhow::Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("Image of {width}x{height} is too large"))
}
