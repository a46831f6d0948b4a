mod convert;
mod error;
mod format;
mod image;
mod options;
pub mod pgm;
pub mod png;
mod utils;

pub use convert::{convert, convert_with, decode_file, encode_file, Conversion};
pub use error::ConvertError;
pub use format::ImageFormat;
pub use image::{BitDepth, Image};
pub use options::{EncodeOptions, MAX_COMPRESSION};
pub use pgm::{PgmEncoding, PGM};
pub use png::{ChunkInfo, FilterStrategy, Interlacing, PNG};
