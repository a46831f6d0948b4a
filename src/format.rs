use std::{fmt, path::Path};

use crate::{image::Image, options::EncodeOptions, pgm::PGM, png::PNG};

/// Container formats the converter reads and writes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImageFormat {
    Pgm,
    Png,
}
impl ImageFormat {
    /// Sniffs the format from the leading bytes of a file.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if PNG::has_signature(bytes) {
            Some(Self::Png)
        } else if PGM::has_magic(bytes) {
            Some(Self::Pgm)
        } else {
            None
        }
    }

    /// Picks the format from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "png" => Some(Self::Png),
            "pgm" => Some(Self::Pgm),
            _ => None,
        }
    }

    pub fn decode(self, bytes: &[u8]) -> anyhow::Result<Image> {
        match self {
            Self::Pgm => PGM::decode(bytes),
            Self::Png => PNG::decode(bytes),
        }
    }

    pub fn encode(self, image: &Image, options: &EncodeOptions) -> Vec<u8> {
        match self {
            Self::Pgm => PGM::encode(image, options.pgm_encoding),
            Self::Png => PNG::encode(image, options),
        }
    }
}
impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pgm => "PGM",
            Self::Png => "PNG",
        })
    }
}
