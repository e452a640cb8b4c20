use std::fmt;
use bitflags::bitflags;

/// Per-scanline predictor, stored as the first byte of every row.
///
/// With `x` the byte being reconstructed, `a` the same channel of the pixel to
/// the left, `b` the byte above and `c` the byte above-left (all zero when off
/// the image), every filter adds a prediction to the coded byte modulo 256:
///
/// | tag | filter | prediction            |
/// |-----|--------|-----------------------|
/// | 0   | None   | `0`                   |
/// | 1   | Sub    | `a`                   |
/// | 2   | Up     | `b`                   |
/// | 3   | Avg    | `(a + b) >> 1`        |
/// | 4   | Paeth  | `paeth(a, b, c)`      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Avg = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Avg,
        FilterType::Paeth,
    ];

    /// Anything above 4 is corruption; there is no fallback filter.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Avg),
            4 => Some(FilterType::Paeth),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterType::None  => "None",
            FilterType::Sub   => "Sub",
            FilterType::Up    => "Up",
            FilterType::Avg   => "Avg",
            FilterType::Paeth => "Paeth",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Which filters occur in a buffer.
    pub struct FilterSet: u8 {
        const NONE  = 1 << 0;
        const SUB   = 1 << 1;
        const UP    = 1 << 2;
        const AVG   = 1 << 3;
        const PAETH = 1 << 4;
    }
}

impl From<FilterType> for FilterSet {
    fn from(filter: FilterType) -> Self {
        FilterSet::from_bits_truncate(1 << filter.tag())
    }
}

impl FilterSet {
    /// Filters whose reconstruction reads the previous row.
    pub fn reads_prior(self) -> bool {
        self.intersects(FilterSet::UP | FilterSet::AVG | FilterSet::PAETH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for f in FilterType::ALL.iter() {
            assert_eq!(FilterType::from_u8(f.tag()), Some(*f));
        }
        for tag in 5..=255u8 {
            assert_eq!(FilterType::from_u8(tag), None);
        }
    }

    #[test]
    fn set_bits_follow_tags() {
        assert_eq!(FilterSet::from(FilterType::None), FilterSet::NONE);
        assert_eq!(FilterSet::from(FilterType::Paeth), FilterSet::PAETH);

        let all = FilterType::ALL.iter().fold(FilterSet::empty(), |s, f| s | FilterSet::from(*f));
        assert_eq!(all, FilterSet::all());
        assert!(!(FilterSet::NONE | FilterSet::SUB).reads_prior());
        assert!((FilterSet::SUB | FilterSet::AVG).reads_prior());
    }
}
