use crate::{image::BitDepth, utils::packed_len};

/// Packs greyscale samples into scanline bytes, most significant bits first.
pub(crate) fn pack_samples(samples: &[u16], bit_depth: BitDepth, out: &mut Vec<u8>) {
    match bit_depth {
        BitDepth::Sixteen => {
            for sample in samples {
                out.extend(sample.to_be_bytes());
            }
        }
        BitDepth::Eight => out.extend(samples.iter().map(|&sample| sample as u8)),
        depth => {
            let bits = depth.bits() as usize;
            let per_byte = 8 / bits;
            for group in samples.chunks(per_byte) {
                let byte = group.iter().enumerate().fold(0u8, |byte, (i, &sample)| {
                    byte | ((sample as u8) << (8 - bits * (i + 1)))
                });
                out.push(byte);
            }
        }
    }
}

/// Unpacks `width` samples from a reconstructed scanline.
pub(crate) fn unpack_samples(
    row: &[u8],
    width: usize,
    bit_depth: BitDepth,
) -> impl Iterator<Item = u16> + '_ {
    let bits = bit_depth.bits() as usize;
    let row = &row[..packed_len(width, bit_depth.bits()).min(row.len())];
    (0..width).map_while(move |i| match bit_depth {
        BitDepth::Sixteen => Some(u16::from_be_bytes([*row.get(2 * i)?, *row.get(2 * i + 1)?])),
        BitDepth::Eight => row.get(i).map(|&b| b as u16),
        _ => {
            let bit_offset = i * bits;
            let byte = *row.get(bit_offset / 8)?;
            let shift = 8 - bits - bit_offset % 8;
            let mask = (1u8 << bits) - 1;
            Some(((byte >> shift) & mask) as u16)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{pack_samples, unpack_samples};
    use crate::image::BitDepth;

    fn packed(samples: &[u16], bit_depth: BitDepth) -> Vec<u8> {
        let mut out = vec![];
        pack_samples(samples, bit_depth, &mut out);
        out
    }

    #[test]
    fn sub_byte_samples_pack_high_bits_first() {
        assert_eq!(packed(&[1, 0, 1, 1, 0, 0, 0, 0, 1], BitDepth::One), [0b1011_0000, 0b1000_0000]);
        assert_eq!(packed(&[3, 0, 2], BitDepth::Two), [0b1100_1000]);
        assert_eq!(packed(&[0xa, 0x5, 0xf], BitDepth::Four), [0xa5, 0xf0]);
    }

    #[test]
    fn sixteen_bit_samples_are_big_endian() {
        assert_eq!(packed(&[0x1234, 0xff00], BitDepth::Sixteen), [0x12, 0x34, 0xff, 0x00]);
    }

    #[test]
    fn unpacking_restores_samples() {
        let cases: [(&[u16], BitDepth); 5] = [
            (&[1, 0, 1, 1, 0, 0, 0, 0, 1], BitDepth::One),
            (&[3, 0, 2, 1, 1], BitDepth::Two),
            (&[0xa, 0x5, 0xf], BitDepth::Four),
            (&[0, 128, 255], BitDepth::Eight),
            (&[0x1234, 0xff00, 1], BitDepth::Sixteen),
        ];
        for (samples, depth) in cases {
            let bytes = packed(samples, depth);
            let unpacked: Vec<u16> = unpack_samples(&bytes, samples.len(), depth).collect();
            assert_eq!(unpacked, samples, "{depth:?}");
        }
    }

    #[test]
    fn unpacking_ignores_padding_bits() {
        let unpacked: Vec<u16> = unpack_samples(&[0b1011_1111], 3, BitDepth::One).collect();
        assert_eq!(unpacked, [1, 0, 1]);
    }
}
