//! Reverse PNG scanline filtering.
//!
//! A decoder inflates the IDAT stream into `height` scanlines, each a filter tag
//! followed by filter-coded pixel bytes. [`filter::defilter`] turns those bytes
//! back into raw pixels in place, ready for bit-depth and color unpacking.
pub mod filter;

pub use filter::{defilter, defilter_reference, Defilter, Error, ErrorKind, FilterSet, FilterType, Geometry, Strategy};
