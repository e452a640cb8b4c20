pub mod error;
pub mod kind;
pub mod paeth;
pub mod encode;
mod reference;
mod engine;

pub use error::{Error, ErrorKind};
pub use kind::{FilterType, FilterSet};
pub use paeth::{paeth, paeth_branchless};

use std::str::FromStr;
use log::{debug, trace};

pub type Result<T> = std::result::Result<T, Error>;

/// Byte stride between the same channel of neighbouring pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BytesPerPixel {
    One,
    Two,
    Three,
    Four,
    Six,
    Eight,
}

impl BytesPerPixel {
    pub const ALL: [BytesPerPixel; 6] = [
        BytesPerPixel::One,
        BytesPerPixel::Two,
        BytesPerPixel::Three,
        BytesPerPixel::Four,
        BytesPerPixel::Six,
        BytesPerPixel::Eight,
    ];

    pub fn from_usize(bpp: usize) -> Result<Self> {
        Ok(match bpp {
            1 => BytesPerPixel::One,
            2 => BytesPerPixel::Two,
            3 => BytesPerPixel::Three,
            4 => BytesPerPixel::Four,
            6 => BytesPerPixel::Six,
            8 => BytesPerPixel::Eight,
            _ => return Err(Error::bad_bpp(format!("{} bytes per pixel is not supported", bpp))),
        })
    }

    pub fn into_usize(self) -> usize {
        match self {
            BytesPerPixel::One   => 1,
            BytesPerPixel::Two   => 2,
            BytesPerPixel::Three => 3,
            BytesPerPixel::Four  => 4,
            BytesPerPixel::Six   => 6,
            BytesPerPixel::Eight => 8,
        }
    }
}

/// Shape of a filtered buffer: `height` rows of `bpl` bytes, each a tag byte
/// followed by `width * bpp` coded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub height: usize,
    pub bpp: BytesPerPixel,
    pub bpl: usize,
}

impl Geometry {
    pub fn new(height: usize, bpp: usize, bpl: usize) -> Result<Self> {
        let bpp = BytesPerPixel::from_usize(bpp)?;
        let n = bpp.into_usize();

        if height == 0 { return Err(Error::bad_geometry("height must be at least 1")); }
        if bpl <= n || (bpl - 1) % n != 0 {
            return Err(Error::bad_geometry(format!("bpl={} is not 1 + width * {} for any width >= 1", bpl, n)));
        }
        if !mul2sizes_valid(height, bpl) {
            return Err(Error::too_large(format!("too large: height={}, bpl={}", height, bpl)));
        }

        Ok(Self { height, bpp, bpl })
    }

    pub fn for_width(width: usize, height: usize, bpp: usize) -> Result<Self> {
        let n = BytesPerPixel::from_usize(bpp)?.into_usize();
        if !mad2sizes_valid(width, n, 1) {
            return Err(Error::too_large(format!("too large: width={}, bpp={}", width, n)));
        }
        Self::new(height, bpp, width * n + 1)
    }

    pub fn width(&self) -> usize {
        (self.bpl - 1) / self.bpp.into_usize()
    }

    /// Bytes covered by all rows, tags included.
    pub fn len(&self) -> usize {
        self.height * self.bpl
    }

    fn check_buffer(&self, buf: &[u8]) -> Result<()> {
        if buf.len() < self.len() {
            return Err(Error::bad_geometry(format!(
                "buffer holds {} bytes, {} rows of {} need {}", buf.len(), self.height, self.bpl, self.len()
            )));
        }
        Ok(())
    }
}

/// Collects the filters used by every row, rejecting the first unknown tag.
pub fn scan_filters(buf: &[u8], geometry: &Geometry) -> Result<FilterSet> {
    geometry.check_buffer(buf)?;

    let mut set = FilterSet::empty();
    for (y, row) in buf[..geometry.len()].chunks_exact(geometry.bpl).enumerate() {
        let tag = row[0];
        match FilterType::from_u8(tag) {
            Some(filter) => set |= FilterSet::from(filter),
            None => return Err(Error::invalid_filter(format!("row {}: invalid filter {}", y, tag))),
        }
    }
    Ok(set)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Byte-at-a-time recurrences, exactly as written.
    Reference,
    /// Stride-specialized rows with a prefix scan for Sub.
    Fast,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Fast
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(Strategy::Reference),
            "fast" => Ok(Strategy::Fast),
            other => Err(Error::config(format!("unknown strategy {:?}", other))),
        }
    }
}

/// Reverses PNG scanline filtering in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defilter {
    strategy: Strategy,
}

impl Defilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Reconstructs the raw bytes of `height` rows of `bpl` bytes at the start
    /// of `buf`. Tag bytes are left as they are, anything past the last row is
    /// not touched.
    ///
    /// Geometry and every tag are checked before the first write, so on error
    /// the buffer is unchanged.
    pub fn run(&self, buf: &mut [u8], height: usize, bpp: usize, bpl: usize) -> Result<FilterSet> {
        let geometry = Geometry::new(height, bpp, bpl)?;
        self.run_geometry(buf, &geometry)
    }

    pub fn run_geometry(&self, buf: &mut [u8], geometry: &Geometry) -> Result<FilterSet> {
        trace!(
            "defilter: height={}, width={}, bpp={}, bpl={}, strategy={:?}",
            geometry.height, geometry.width(), geometry.bpp.into_usize(), geometry.bpl, self.strategy
        );
        let filters = scan_filters(buf, geometry)?;
        debug!("filters in use: {:?}, reads prior rows: {}", filters, filters.reads_prior());

        let rows = &mut buf[..geometry.len()];
        match self.strategy {
            Strategy::Reference => reference::unfilter(rows, geometry),
            Strategy::Fast => engine::unfilter(rows, geometry),
        }
        Ok(filters)
    }
}

/// Defilters `buf` with the fast engine. See [`Defilter::run`].
pub fn defilter(buf: &mut [u8], height: usize, bpp: usize, bpl: usize) -> Result<FilterSet> {
    Defilter::new().run(buf, height, bpp, bpl)
}

/// Defilters `buf` one byte at a time. Slow, but obviously right.
pub fn defilter_reference(buf: &mut [u8], height: usize, bpp: usize, bpl: usize) -> Result<FilterSet> {
    Defilter::with_strategy(Strategy::Reference).run(buf, height, bpp, bpl)
}

fn mul2sizes_valid(a: usize, b: usize) -> bool {
    if b == 0 { return true; }
    a <= usize::MAX / b
}

fn addsizes_valid(a: usize, b: usize) -> bool {
    a <= usize::MAX - b
}

fn mad2sizes_valid(a: usize, b: usize, add: usize) -> bool {
    mul2sizes_valid(a, b) && addsizes_valid(a*b, add)
}
