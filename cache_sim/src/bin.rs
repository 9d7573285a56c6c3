/// mask with the lowest `width` bits set. `width == 0` yields an empty mask.
#[inline]
pub const fn mask_lower(width: u32) -> u64 {
    if width == 0 {
        0
    } else if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// `width`-bit field of `bin` starting at bit `shift`.
#[inline]
pub const fn extract(bin: u64, width: u32, shift: u32) -> u64 {
    if width == 0 || shift >= u64::BITS {
        0
    } else {
        (bin >> shift) & mask_lower(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_lower() {
        assert_eq!(0, mask_lower(0));
        assert_eq!(0b1, mask_lower(1));
        assert_eq!(0b1111111, mask_lower(7));
        assert_eq!(u64::MAX >> 1, mask_lower(63));
        assert_eq!(u64::MAX, mask_lower(64));
    }
    #[test]
    fn test_extract() {
        // middle two bits of 0b0101
        assert_eq!(0b10, extract(0b0101, 2, 1));
        assert_eq!(0xbeef, extract(0xdead_beef, 16, 0));
        assert_eq!(0xdead, extract(0xdead_beef, 16, 16));
        assert_eq!(u64::MAX, extract(u64::MAX, 64, 0));
    }
    #[test]
    fn test_extract_zero_width() {
        assert_eq!(0, extract(u64::MAX, 0, 0));
        assert_eq!(0, extract(u64::MAX, 0, 17));
        assert_eq!(0, extract(u64::MAX, 0, 64));
    }
}
