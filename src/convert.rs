use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use log::{debug, info};

use crate::{
    error::ConvertError,
    format::ImageFormat,
    image::{BitDepth, Image},
    options::EncodeOptions,
};

/// What a successful conversion read and wrote.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Conversion {
    pub source_format: ImageFormat,
    pub dest_format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub bytes_written: usize,
}

/// Decodes `source` and writes it to `dest` in the format named by its extension.
///
/// The source is decoded in full before `dest` is touched, so a failed decode
/// never creates the destination. An existing destination is overwritten.
pub fn convert(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<Conversion, ConvertError> {
    convert_with(source, dest, &EncodeOptions::default())
}

pub fn convert_with(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &EncodeOptions,
) -> Result<Conversion, ConvertError> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    let (source_format, image) = read_image(source).map_err(|e| ConvertError::decode(source, e))?;
    let (dest_format, bytes_written) =
        write_image(&image, dest, options).map_err(|e| ConvertError::encode(dest, e))?;
    info!(
        "Wrote {} image to {} ({bytes_written} bytes)",
        dest_format,
        dest.display()
    );
    Ok(Conversion {
        source_format,
        dest_format,
        width: image.width(),
        height: image.height(),
        bit_depth: image.bit_depth(),
        bytes_written,
    })
}

/// Reads and decodes an image file, sniffing its format from the content.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Image, ConvertError> {
    let path = path.as_ref();
    read_image(path)
        .map(|(_, image)| image)
        .map_err(|e| ConvertError::decode(path, e))
}

/// Encodes `image` to `path`, returning the number of bytes written.
pub fn encode_file(
    image: &Image,
    path: impl AsRef<Path>,
    options: &EncodeOptions,
) -> Result<usize, ConvertError> {
    let path = path.as_ref();
    write_image(image, path, options)
        .map(|(_, written)| written)
        .map_err(|e| ConvertError::encode(path, e))
}

fn read_image(path: &Path) -> anyhow::Result<(ImageFormat, Image)> {
    let bytes = fs::read(path).with_context(|| format!("Unable to open: <{}>", path.display()))?;
    let format = ImageFormat::from_magic(&bytes)
        .ok_or_else(|| anyhow!("Unrecognised image format, expected PGM or PNG"))?;
    debug!("Read {} bytes of {format} from {}", bytes.len(), path.display());
    let image = format.decode(&bytes)?;
    debug!(
        "Decoded {}x{} image with {}-bit samples",
        image.width(),
        image.height(),
        image.bit_depth().bits()
    );
    Ok((format, image))
}

fn write_image(
    image: &Image,
    path: &Path,
    options: &EncodeOptions,
) -> anyhow::Result<(ImageFormat, usize)> {
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        anyhow!(
            "Unrecognised output extension for {}, expected .png or .pgm",
            path.display()
        )
    })?;
    let bytes = format.encode(image, options);
    fs::write(path, &bytes).with_context(|| format!("Unable to write: <{}>", path.display()))?;
    debug!("Wrote {} bytes of {format} to {}", bytes.len(), path.display());
    Ok((format, bytes.len()))
}
