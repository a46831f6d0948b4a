use std::ops::Range;

use super::chunks::ihdr::Interlacing;
use crate::utils::div_ceil;

/// Where a reduced image's pixels sit in the full image: first row and
/// column, then the spacing between picked rows and columns.
#[derive(Debug, Clone, Copy)]
struct Layout {
    row: usize,
    column: usize,
    row_step: usize,
    column_step: usize,
}

const fn layout(row: usize, column: usize, row_step: usize, column_step: usize) -> Layout {
    Layout {
        row,
        column,
        row_step,
        column_step,
    }
}

const FULL: [Layout; 1] = [layout(0, 0, 1, 1)];

const ADAM7: [Layout; 7] = [
    layout(0, 0, 8, 8),
    layout(0, 4, 8, 8),
    layout(4, 0, 8, 4),
    layout(0, 2, 4, 4),
    layout(2, 0, 4, 2),
    layout(0, 1, 2, 2),
    layout(1, 0, 2, 1),
];

/// The reduced images making up the image data, in storage order.
///
/// Passes without pixels are absent from the data stream, so they are left out.
pub(crate) fn passes(width: usize, height: usize, interlacing: Interlacing) -> Vec<SubImage> {
    let layouts: &[Layout] = match interlacing {
        Interlacing::None => &FULL,
        Interlacing::Adam7 => &ADAM7,
    };
    layouts
        .iter()
        .map(|layout| SubImage::new(*layout, width, height))
        .filter(|pass| pass.width > 0 && pass.height > 0)
        .collect()
}

#[derive(Debug)]
pub(crate) struct SubImage {
    pub(crate) width: usize,
    pub(crate) height: usize,
    /// Indices into the full image's samples, in the sub image's row-major order.
    pub(crate) pixel_indices: PixelIndices,
}
impl SubImage {
    fn new(layout: Layout, image_width: usize, image_height: usize) -> Self {
        let width = div_ceil(image_width.saturating_sub(layout.column), layout.column_step);
        let height = div_ceil(image_height.saturating_sub(layout.row), layout.row_step);
        Self {
            width,
            height,
            pixel_indices: PixelIndices {
                layout,
                image_width,
                width,
                positions: 0..width * height,
            },
        }
    }
}

#[derive(Debug)]
pub(crate) struct PixelIndices {
    layout: Layout,
    image_width: usize,
    width: usize,
    positions: Range<usize>,
}
impl Iterator for PixelIndices {
    type Item = usize;
    fn next(&mut self) -> Option<Self::Item> {
        let position = self.positions.next()?;
        let row = self.layout.row + position / self.width * self.layout.row_step;
        let column = self.layout.column + position % self.width * self.layout.column_step;
        Some(row * self.image_width + column)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}
