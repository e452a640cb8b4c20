//! Paeth predictor.
//!
//! `a` is the byte to the left, `b` the byte above and `c` the byte above-left,
//! all in the same channel. The predictor picks whichever neighbour is closest to
//! `a + b - c`, preferring `a`, then `b`, then `c` on ties.

/// The predictor as PNG describes it.
#[inline]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (i32::from(a), i32::from(b), i32::from(c));
    let pa = (b - c).abs();
    let pb = (a - c).abs();
    let pc = (a + b - 2*c).abs();
    if pa <= pb && pa <= pc { return a as u8; }
    if pb <= pc { return b as u8; }
    c as u8
}

// x / 3 for x in 0..=255.
#[inline(always)]
fn div3(x: i32) -> i32 {
    (x * 0xAB) >> 9
}

/// Same result as [`paeth`] without data-dependent branches.
///
/// Paeth is symmetric in `a` and `b`, so only `lo = min(a, b)` and `hi = max(a, b)`
/// matter. Relative to `c`, the answer is `hi` while `c <= lo + (hi - lo) / 3`,
/// `lo` while `c >= hi - (hi - lo) / 3`, and `c` in between. Both conditions are
/// turned into all-ones/all-zeros masks by an arithmetic shift of the sign bit.
/// When `lo == hi == c` both masks open, but both offsets are then zero.
#[inline]
pub fn paeth_branchless(a: u8, b: u8, c: u8) -> u8 {
    let c = i32::from(c);
    let lo = i32::from(a.min(b)) - c;
    let hi = i32::from(a.max(b)) - c;
    let d = div3(hi - lo);

    (c + (hi & !((d + lo) >> 31)) + (lo & !((d - hi) >> 31))) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn div3_matches_division() {
        for x in 0..=255 {
            assert_eq!(div3(x), x / 3, "x={}", x);
        }
    }

    #[test]
    fn tie_breaks() {
        assert_eq!(paeth(0, 0, 0), 0);
        // pa == pc < pb: a wins over c
        assert_eq!(paeth(2, 5, 4), 2);
        // pb == pc < pa: b wins over c
        assert_eq!(paeth(5, 2, 4), 2);
        // pc strictly smallest
        assert_eq!(paeth(10, 20, 15), 15);
        // no previous row
        for a in 0..=255 {
            assert_eq!(paeth(a, 0, 0), a);
            assert_eq!(paeth_branchless(a, 0, 0), a);
        }
    }

    #[test]
    fn branchless_is_exhaustively_equal() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                for c in 0..=255u8 {
                    assert_eq!(paeth(a, b, c), paeth_branchless(a, b, c), "a={} b={} c={}", a, b, c);
                }
            }
        }
    }

    quickcheck! {
        fn symmetric_in_a_and_b(a: u8, b: u8, c: u8) -> bool {
            paeth_branchless(a, b, c) == paeth_branchless(b, a, c)
        }

        fn picks_a_neighbour(a: u8, b: u8, c: u8) -> bool {
            let p = paeth(a, b, c);
            p == a || p == b || p == c
        }
    }
}
