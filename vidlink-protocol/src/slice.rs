//! ## vidlink-protocol::slice
//! Slice-fragment classification for data packets.

use std::fmt;

use crate::data::DataPacket;

/// Mask selecting the slice-position code within `slice_ident`.
pub const SLICE_TYPE_MASK: u8 = 0x03;

/// Where a data packet sits within an encoded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceType {
    /// A middle fragment of a picture.
    Inter,
    /// The final fragment of a picture.
    Last,
    /// The opening fragment of a picture.
    First,
    /// A picture sent in a single packet.
    None,
}

impl SliceType {
    /// Derives the slice type from the low two bits of `slice_ident`.
    #[inline]
    pub fn from_ident(slice_ident: u8) -> SliceType {
        match slice_ident & SLICE_TYPE_MASK {
            0 => SliceType::Inter,
            1 => SliceType::Last,
            2 => SliceType::First,
            _ => SliceType::None,
        }
    }

    /// The 2-bit wire code.
    pub fn code(self) -> u8 {
        match self {
            SliceType::Inter => 0,
            SliceType::Last => 1,
            SliceType::First => 2,
            SliceType::None => 3,
        }
    }

    /// Whether a packet of this type opens a new picture.
    pub fn starts_frame(self) -> bool {
        matches!(self, SliceType::First | SliceType::None)
    }

    /// Whether a packet of this type closes a picture.
    pub fn ends_frame(self) -> bool {
        matches!(self, SliceType::Last | SliceType::None)
    }
}

impl fmt::Display for SliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SliceType::Inter => "inter",
            SliceType::Last => "last",
            SliceType::First => "first",
            SliceType::None => "none",
        };
        f.pad(name)
    }
}

/// Classifies a data packet by its slice identifier.
pub fn classify(packet: &DataPacket) -> SliceType {
    SliceType::from_ident(packet.slice_ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_mapping() {
        assert_eq!(SliceType::from_ident(0x00), SliceType::Inter);
        assert_eq!(SliceType::from_ident(0x01), SliceType::Last);
        assert_eq!(SliceType::from_ident(0x02), SliceType::First);
        assert_eq!(SliceType::from_ident(0x03), SliceType::None);
        assert_eq!(SliceType::from_ident(0xFE), SliceType::First);
    }

    #[test]
    fn test_all_identifiers_use_low_bits_only() {
        for ident in 0..=u8::MAX {
            let slice = SliceType::from_ident(ident);
            assert_eq!(slice, SliceType::from_ident(ident & SLICE_TYPE_MASK));
            assert_eq!(slice.code(), ident & SLICE_TYPE_MASK);
        }
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(ident in any::<u8>(), high in 0u8..64) {
            let first = SliceType::from_ident(ident);
            prop_assert_eq!(first, SliceType::from_ident(ident));
            prop_assert_eq!(first, SliceType::from_ident((high << 2) | (ident & 0x03)));
        }
    }
}
