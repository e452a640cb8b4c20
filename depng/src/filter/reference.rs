// Literal byte-at-a-time reconstruction. Every optimized path is tested against this.
use super::{FilterType, Geometry};
use super::paeth::paeth;

/// `rows` is exactly `geometry.len()` bytes with every tag already validated.
pub(super) fn unfilter(rows: &mut [u8], geometry: &Geometry) {
    let bpp = geometry.bpp.into_usize();
    let mut prior: Option<&[u8]> = None;

    for row in rows.chunks_exact_mut(geometry.bpl) {
        let (tag, cur) = match row.split_first_mut() {
            Some(split) => split,
            None => return,
        };
        if let Some(filter) = FilterType::from_u8(*tag) {
            unfilter_row(filter, bpp, prior, cur);
        }
        prior = Some(&*cur);
    }
}

fn unfilter_row(filter: FilterType, bpp: usize, prior: Option<&[u8]>, cur: &mut [u8]) {
    // the row above row 0 is all zero
    let up = |i: usize| prior.map_or(0, |p| p[i]);

    match filter {
        FilterType::None => {},
        FilterType::Sub => {
            for i in bpp..cur.len() {
                cur[i] = cur[i].wrapping_add(cur[i-bpp]);
            }
        },
        FilterType::Up => {
            for i in 0..cur.len() {
                cur[i] = cur[i].wrapping_add(up(i));
            }
        },
        FilterType::Avg => {
            for i in 0..cur.len() {
                let a = if i >= bpp { cur[i-bpp] } else { 0 };
                let avg = (u16::from(a) + u16::from(up(i))) >> 1;
                cur[i] = cur[i].wrapping_add(avg as u8);
            }
        },
        FilterType::Paeth => {
            for i in 0..cur.len() {
                let (a, c) = if i >= bpp { (cur[i-bpp], up(i-bpp)) } else { (0, 0) };
                cur[i] = cur[i].wrapping_add(paeth(a, up(i), c));
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(buf: &mut [u8], height: usize, bpp: usize, bpl: usize) {
        let g = Geometry::new(height, bpp, bpl).unwrap();
        unfilter(buf, &g);
    }

    #[test]
    fn sub_wraps() {
        let mut buf = vec![1, 200, 100, 10, 250];
        run(&mut buf, 1, 2, 5);
        assert_eq!(buf, vec![1, 200, 100, 210, 94]);
    }

    #[test]
    fn up_adds_previous_row() {
        let mut buf = vec![
            0, 1, 2, 3,
            2, 255, 1, 1,
        ];
        run(&mut buf, 2, 1, 4);
        assert_eq!(buf, vec![0, 1, 2, 3, 2, 0, 3, 4]);
    }

    #[test]
    fn avg_floors_before_wrapping() {
        // (127 + 142) >> 1 = 134, computed without 8-bit overflow
        let mut buf = vec![
            0, 0, 142,
            3, 127, 0,
        ];
        run(&mut buf, 2, 1, 3);
        assert_eq!(buf, vec![0, 0, 142, 3, 127, 134]);
    }

    #[test]
    fn paeth_uses_diagonal() {
        let mut buf = vec![
            0, 10, 20,
            4, 0, 0,
        ];
        run(&mut buf, 2, 1, 3);
        // x0: paeth(0, 10, 0) = 10; x1: paeth(10, 20, 10) = 20
        assert_eq!(buf, vec![0, 10, 20, 4, 10, 20]);
    }
}
