use anyhow::{anyhow, ensure, Context};
use log::debug;
use miniz_oxide::{deflate::compress_to_vec_zlib, inflate::decompress_to_vec_zlib_with_limit};

use super::{
    chunks::ihdr::IHDRChunk,
    filters::{filter_scanline, reconstruct_scanline, Filter, FilterStrategy},
    interlacing::passes,
    scanlines::{pack_samples, unpack_samples},
};
use crate::image::{pixel_count, Image};

/// Size of the filtered, uncompressed stream: one filter byte per row of every pass.
fn filtered_size(header: &IHDRChunk) -> usize {
    passes(
        header.width as usize,
        header.height as usize,
        header.interlace_method,
    )
    .iter()
    .map(|pass| pass.height * (header.row_size(pass.width) + 1))
    .sum()
}

pub(crate) fn compress_data(
    image: &Image,
    header: &IHDRChunk,
    strategy: FilterStrategy,
    level: u8,
) -> Vec<u8> {
    let bpp = header.filter_width();
    let samples = image.samples();
    let mut filtered = Vec::with_capacity(filtered_size(header));
    let mut filter_counts = [0usize; 5];
    for mut pass in passes(
        header.width as usize,
        header.height as usize,
        header.interlace_method,
    ) {
        let row_size = header.row_size(pass.width);
        let mut previous = vec![0; row_size];
        let mut row_samples = Vec::with_capacity(pass.width);
        let mut row = Vec::with_capacity(row_size);
        for _ in 0..pass.height {
            row_samples.clear();
            row_samples.extend(
                pass.pixel_indices
                    .by_ref()
                    .take(pass.width)
                    .map(|index| samples[index]),
            );
            row.clear();
            pack_samples(&row_samples, header.bit_depth, &mut row);
            let filter = filter_scanline(&row, &previous, bpp, strategy, &mut filtered);
            filter_counts[filter as usize] += 1;
            std::mem::swap(&mut previous, &mut row);
        }
    }
    debug!("Filter usage (None, Sub, Up, Average, Paeth): {filter_counts:?}");
    compress_to_vec_zlib(&filtered, level)
}

pub(crate) fn decompress_data(compressed_data: &[u8], header: &IHDRChunk) -> anyhow::Result<Vec<u16>> {
    let expected = filtered_size(header);
    let mut data = decompress_to_vec_zlib_with_limit(compressed_data, expected)
        .map_err(|e| anyhow!("{e:?}"))
        .context("Failed to decompress image data.")?;
    ensure!(
        data.len() == expected,
        "Image data is truncated: expected {expected} bytes, found {}",
        data.len()
    );

    let bpp = header.filter_width();
    let mut samples = vec![0; pixel_count(header.width, header.height)?];
    let mut rest = data.as_mut_slice();
    for mut pass in passes(
        header.width as usize,
        header.height as usize,
        header.interlace_method,
    ) {
        let row_size = header.row_size(pass.width);
        let mut previous = vec![0; row_size];
        for _ in 0..pass.height {
            let (scanline, remaining) = std::mem::take(&mut rest).split_at_mut(row_size + 1);
            rest = remaining;
            let (filter_type, row) = scanline.split_at_mut(1);
            let filter = Filter::try_from(filter_type[0])?;
            reconstruct_scanline(filter, row, &previous, bpp);
            for (index, sample) in pass
                .pixel_indices
                .by_ref()
                .take(pass.width)
                .zip(unpack_samples(row, pass.width, header.bit_depth))
            {
                samples[index] = sample;
            }
            previous.copy_from_slice(row);
        }
    }
    Ok(samples)
}
