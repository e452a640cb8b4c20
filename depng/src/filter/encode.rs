//! Forward filtering, the encoder side of [`FilterType`].
//!
//! Decoding never needs this; it produces filtered input for round trips and
//! benchmarks.

use super::{Error, FilterType, Geometry, Result};
use super::paeth::paeth;

/// Filters one row of raw bytes into `out`. `prior` is the raw row above, or
/// `None` for the first row.
pub fn filter_row(filter: FilterType, bpp: usize, prior: Option<&[u8]>, raw: &[u8], out: &mut [u8]) {
    debug_assert_eq!(raw.len(), out.len());
    let up = |i: usize| prior.map_or(0, |p| p[i]);

    for i in 0..raw.len() {
        let (a, c) = if i >= bpp { (raw[i-bpp], up(i-bpp)) } else { (0, 0) };
        let b = up(i);
        let predicted = match filter {
            FilterType::None  => 0,
            FilterType::Sub   => a,
            FilterType::Up    => b,
            FilterType::Avg   => ((u16::from(a) + u16::from(b)) >> 1) as u8,
            FilterType::Paeth => paeth(a, b, c),
        };
        out[i] = raw[i].wrapping_sub(predicted);
    }
}

/// Filters `height` rows of `width * bpp` raw bytes, choosing each row's
/// filter with `pick(row)`, and returns the tagged buffer.
pub fn filter_image<F>(raw: &[u8], geometry: &Geometry, mut pick: F) -> Result<Vec<u8>>
where
    F: FnMut(usize) -> FilterType,
{
    let stride = geometry.bpl - 1;
    if raw.len() != geometry.height * stride {
        return Err(Error::bad_geometry(format!(
            "raw image holds {} bytes, expected {} rows of {}", raw.len(), geometry.height, stride
        )));
    }

    let bpp = geometry.bpp.into_usize();
    let mut out = vec![0u8; geometry.len()];
    let mut prior: Option<&[u8]> = None;

    for (j, (src, dst)) in raw.chunks_exact(stride).zip(out.chunks_exact_mut(geometry.bpl)).enumerate() {
        let filter = pick(j);
        dst[0] = filter.tag();
        filter_row(filter, bpp, prior, src, &mut dst[1..]);
        prior = Some(src);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{defilter, defilter_reference, BytesPerPixel};
    use quickcheck::{quickcheck, TestResult};

    #[test]
    fn sub_row_holds_deltas() {
        let raw = [5, 5, 5, 10, 10, 10];
        let mut out = [0u8; 6];
        filter_row(FilterType::Sub, 3, None, &raw, &mut out);
        assert_eq!(out, [5, 5, 5, 5, 5, 5]);
    }

    #[test]
    fn raw_size_must_match() {
        let g = Geometry::for_width(4, 2, 3).unwrap();
        let err = filter_image(&[0u8; 23], &g, |_| FilterType::None).unwrap_err();
        assert_eq!(err.kind(), crate::filter::ErrorKind::BadGeometry);
    }

    #[test]
    fn every_filter_round_trips_for_every_bpp() {
        for bpp in BytesPerPixel::ALL.iter() {
            let n = bpp.into_usize();
            for width in [1usize, 2, 3, 7, 8, 9, 17].iter() {
                let g = Geometry::for_width(*width, 5, n).unwrap();
                let raw: Vec<u8> = (0..g.height * width * n).map(|i| (i * 89 + i / 7) as u8).collect();

                for filter in FilterType::ALL.iter() {
                    let filtered = filter_image(&raw, &g, |_| *filter).unwrap();

                    let mut fast = filtered.clone();
                    defilter(&mut fast, g.height, n, g.bpl).unwrap();
                    let mut slow = filtered.clone();
                    defilter_reference(&mut slow, g.height, n, g.bpl).unwrap();

                    for (j, row) in fast.chunks_exact(g.bpl).enumerate() {
                        assert_eq!(row[0], filter.tag());
                        assert_eq!(&row[1..], &raw[j * width * n..(j + 1) * width * n], "{} bpp={} w={}", filter, n, width);
                    }
                    assert_eq!(fast, slow);
                }
            }
        }
    }

    quickcheck! {
        fn mixed_filters_round_trip(raw: Vec<u8>, tags: Vec<u8>, bpp_index: usize, width: u8) -> TestResult {
            let n = BytesPerPixel::ALL[bpp_index % 6].into_usize();
            let width = width as usize % 12 + 1;
            let height = raw.len() / (width * n);
            if height == 0 || tags.is_empty() {
                return TestResult::discard();
            }
            let raw = &raw[..height * width * n];
            let g = Geometry::for_width(width, height, n).unwrap();
            let filtered = filter_image(raw, &g, |j| FilterType::ALL[tags[j % tags.len()] as usize % 5]).unwrap();

            let mut buf = filtered;
            defilter(&mut buf, height, n, g.bpl).unwrap();
            let ok = buf.chunks_exact(g.bpl).zip(raw.chunks_exact(width * n)).all(|(row, src)| &row[1..] == src);
            TestResult::from_bool(ok)
        }
    }
}
