use anyhow::anyhow;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Filter {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}
impl Filter {
    const ALL: [Filter; 5] = [
        Filter::None,
        Filter::Sub,
        Filter::Up,
        Filter::Average,
        Filter::Paeth,
    ];

    fn predict(&self, a: u8, b: u8, c: u8) -> u8 {
        match self {
            Filter::None => 0,
            Filter::Sub => a,
            Filter::Up => b,
            Filter::Average => ((a as u16 + b as u16) / 2) as u8,
            Filter::Paeth => paeth_predictor(a, b, c),
        }
    }

    pub(crate) fn filter(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        x.wrapping_sub(self.predict(a, b, c))
    }

    pub(crate) fn reconstruct(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        x.wrapping_add(self.predict(a, b, c))
    }
}
impl TryFrom<u8> for Filter {
    type Error = anyhow::Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Filter::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| anyhow!("Unknown filter type {value}"))
    }
}

fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// How the encoder picks a filter for each scanline.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy, clap::ValueEnum)]
pub enum FilterStrategy {
    None,
    Sub,
    Up,
    Average,
    Paeth,
    /// Per row, whichever filter gives the smallest sum of absolute residuals.
    #[default]
    Adaptive,
}
impl FilterStrategy {
    fn fixed(&self) -> Option<Filter> {
        match self {
            Self::None => Some(Filter::None),
            Self::Sub => Some(Filter::Sub),
            Self::Up => Some(Filter::Up),
            Self::Average => Some(Filter::Average),
            Self::Paeth => Some(Filter::Paeth),
            Self::Adaptive => None,
        }
    }
}

fn apply_filter(filter: Filter, row: &[u8], previous: &[u8], bpp: usize, out: &mut Vec<u8>) {
    for (i, &x) in row.iter().enumerate() {
        let a = if i >= bpp { row[i - bpp] } else { 0 };
        let b = previous[i];
        let c = if i >= bpp { previous[i - bpp] } else { 0 };
        out.push(filter.filter(x, a, b, c));
    }
}

fn residual_cost(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&v| (v as i8).unsigned_abs() as u64)
        .sum()
}

/// Appends the filter type byte and the filtered `row` to `out`.
///
/// `previous` is the unfiltered row above, all zeroes for the first row of a pass.
pub(crate) fn filter_scanline(
    row: &[u8],
    previous: &[u8],
    bpp: usize,
    strategy: FilterStrategy,
    out: &mut Vec<u8>,
) -> Filter {
    let filter = strategy.fixed().unwrap_or_else(|| {
        let mut scratch = Vec::with_capacity(row.len());
        Filter::ALL
            .into_iter()
            .min_by_key(|&filter| {
                scratch.clear();
                apply_filter(filter, row, previous, bpp, &mut scratch);
                residual_cost(&scratch)
            })
            .unwrap_or(Filter::None)
    });
    out.push(filter as u8);
    apply_filter(filter, row, previous, bpp, out);
    filter
}

/// Undoes `filter` on `row` in place, `previous` being the already reconstructed row above.
pub(crate) fn reconstruct_scanline(filter: Filter, row: &mut [u8], previous: &[u8], bpp: usize) {
    for i in 0..row.len() {
        let a = if i >= bpp { row[i - bpp] } else { 0 };
        let b = previous[i];
        let c = if i >= bpp { previous[i - bpp] } else { 0 };
        row[i] = filter.reconstruct(row[i], a, b, c);
    }
}
