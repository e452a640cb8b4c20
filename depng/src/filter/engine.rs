use super::{BytesPerPixel, FilterType, Geometry};
use super::paeth::paeth_branchless;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowFilter {
    None,
    Sub,
    Up,
    Avg,
    Paeth,
    AvgFirst,
}

const ROW_FILTER: [RowFilter; 5] = [
    RowFilter::None,
    RowFilter::Sub,
    RowFilter::Up,
    RowFilter::Avg,
    RowFilter::Paeth,
];

// The row above row 0 is all zero: Up adds nothing, Avg halves the left
// neighbour only, and paeth(a, 0, 0) == a turns Paeth into Sub.
const FIRST_ROW_FILTER: [RowFilter; 5] = [
    RowFilter::None,
    RowFilter::Sub,
    RowFilter::None,
    RowFilter::AvgFirst,
    RowFilter::Sub,
];

// Width of one Sub scan step. 16 bytes is one SSE2/NEON register.
const BLOCK: usize = 16;

/// `rows` is exactly `geometry.len()` bytes with every tag already validated.
pub(super) fn unfilter(rows: &mut [u8], geometry: &Geometry) {
    match geometry.bpp {
        BytesPerPixel::One   => unfilter_rows::<1>(rows, geometry.bpl),
        BytesPerPixel::Two   => unfilter_rows::<2>(rows, geometry.bpl),
        BytesPerPixel::Three => unfilter_rows::<3>(rows, geometry.bpl),
        BytesPerPixel::Four  => unfilter_rows::<4>(rows, geometry.bpl),
        BytesPerPixel::Six   => unfilter_rows::<6>(rows, geometry.bpl),
        BytesPerPixel::Eight => unfilter_rows::<8>(rows, geometry.bpl),
    }
}

fn unfilter_rows<const BPP: usize>(rows: &mut [u8], bpl: usize) {
    let mut prior: &[u8] = &[];

    for (j, row) in rows.chunks_exact_mut(bpl).enumerate() {
        let (tag, cur) = match row.split_first_mut() {
            Some(split) => split,
            None => return,
        };
        let filter = match FilterType::from_u8(*tag) {
            Some(filter) => filter.tag() as usize,
            None => return,
        };
        // if first row, use special filter that doesn't sample previous row
        let filter = if j == 0 { FIRST_ROW_FILTER[filter] } else { ROW_FILTER[filter] };

        match filter {
            RowFilter::None     => {},
            RowFilter::Sub      => unfilter_sub::<BPP>(cur),
            RowFilter::Up       => unfilter_up(cur, prior),
            RowFilter::Avg      => unfilter_avg::<BPP>(cur, prior),
            RowFilter::Paeth    => unfilter_paeth::<BPP>(cur, prior),
            RowFilter::AvgFirst => unfilter_avg_first::<BPP>(cur),
        }

        prior = &*cur;
    }
}

/// Sub as a running sum per channel.
///
/// `x[i] = d[i] + x[i-BPP]` unrolls to `x[i] = d[i] + d[i-BPP] + d[i-2*BPP] + ...`,
/// so every block of whole pixels is an inclusive prefix sum in steps of `BPP`.
/// Adding a copy of the block shifted right by `BPP`, then `2*BPP`, `4*BPP`, ...
/// leaves each byte holding the sum of its `2^k` predecessors after `k` rounds;
/// wrapping addition is associative so the result is exact mod 256. The last
/// pixel of each block is carried into the first pixel of the next.
fn unfilter_sub<const BPP: usize>(cur: &mut [u8]) {
    let step = BLOCK / BPP * BPP;
    let mut last = [0u8; BPP];

    let mut chunks = cur.chunks_exact_mut(step);
    for chunk in &mut chunks {
        let mut v = [0u8; BLOCK];
        v[..step].copy_from_slice(chunk);
        for k in 0..BPP {
            v[k] = v[k].wrapping_add(last[k]);
        }

        let mut shift = BPP;
        while shift < step {
            let mut t = [0u8; BLOCK];
            t[shift..].copy_from_slice(&v[..BLOCK - shift]);
            for k in 0..BLOCK {
                v[k] = v[k].wrapping_add(t[k]);
            }
            shift *= 2;
        }

        chunk.copy_from_slice(&v[..step]);
        last.copy_from_slice(&chunk[step - BPP..]);
    }

    // fewer than a block of pixels left
    let tail = chunks.into_remainder();
    for k in 0..tail.len() {
        let a = if k >= BPP { tail[k-BPP] } else { last[k] };
        tail[k] = tail[k].wrapping_add(a);
    }
}

fn unfilter_up(cur: &mut [u8], prior: &[u8]) {
    for (x, b) in cur.iter_mut().zip(prior) {
        *x = x.wrapping_add(*b);
    }
}

// Avg and Paeth depend on the reconstructed pixel to the left, so pixels are
// walked in order and the BPP channels of one pixel are computed together.
// With BPP == 1 this is the plain scalar loop.

fn unfilter_avg<const BPP: usize>(cur: &mut [u8], prior: &[u8]) {
    let mut a = [0u8; BPP];
    for (x, b) in cur.chunks_exact_mut(BPP).zip(prior.chunks_exact(BPP)) {
        for k in 0..BPP {
            // PNG averages without 8-bit overflow: (127 + 142) >> 1 == 134
            let avg = (u16::from(a[k]) + u16::from(b[k])) >> 1;
            x[k] = x[k].wrapping_add(avg as u8);
        }
        a.copy_from_slice(x);
    }
}

fn unfilter_avg_first<const BPP: usize>(cur: &mut [u8]) {
    let mut a = [0u8; BPP];
    for x in cur.chunks_exact_mut(BPP) {
        for k in 0..BPP {
            x[k] = x[k].wrapping_add(a[k] >> 1);
        }
        a.copy_from_slice(x);
    }
}

fn unfilter_paeth<const BPP: usize>(cur: &mut [u8], prior: &[u8]) {
    // C B
    // A X
    let mut a = [0u8; BPP];
    let mut c = [0u8; BPP];
    for (x, b) in cur.chunks_exact_mut(BPP).zip(prior.chunks_exact(BPP)) {
        for k in 0..BPP {
            x[k] = x[k].wrapping_add(paeth_branchless(a[k], b[k], c[k]));
        }
        a.copy_from_slice(x);
        c.copy_from_slice(b);
    }
}
