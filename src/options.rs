use crate::{
    pgm::PgmEncoding,
    png::{FilterStrategy, Interlacing},
};

/// Highest zlib level `miniz_oxide` understands.
pub const MAX_COMPRESSION: u8 = 10;

/// Knobs for writing the destination image. Options that don't apply to
/// the destination format are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// zlib level for PNG output, 0 (store) to 10.
    pub compression: u8,
    pub filter: FilterStrategy,
    pub interlacing: Interlacing,
    pub pgm_encoding: PgmEncoding,
}
impl EncodeOptions {
    pub(crate) fn compression_level(&self) -> u8 {
        self.compression.min(MAX_COMPRESSION)
    }
}
impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: 6,
            filter: FilterStrategy::default(),
            interlacing: Interlacing::default(),
            pgm_encoding: PgmEncoding::default(),
        }
    }
}
