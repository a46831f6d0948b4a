pub(crate) const fn div_ceil(lhs: usize, rhs: usize) -> usize {
    let d = lhs / rhs;
    let r = lhs % rhs;
    if r > 0 && rhs > 0 {
        d + 1
    } else {
        d
    }
}

/// Number of bytes needed to hold `width` samples of `bits` bits each.
pub(crate) const fn packed_len(width: usize, bits: u8) -> usize {
    div_ceil(width * bits as usize, 8)
}
