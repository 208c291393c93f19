//! Compact 3x5 bitmap digits for fixation ordinal labels.

/// Glyph width in font units
pub const GLYPH_WIDTH: u32 = 3;

/// Glyph height in font units
pub const GLYPH_HEIGHT: u32 = 5;

/// Row bitmaps for a digit, three bits per row, most significant bit leftmost
#[must_use]
pub const fn digit_rows(digit: u8) -> [u8; 5] {
    match digit {
        0 => [0x7, 0x5, 0x5, 0x5, 0x7],
        1 => [0x2, 0x6, 0x2, 0x2, 0x7],
        2 => [0x7, 0x1, 0x7, 0x4, 0x7],
        3 => [0x7, 0x1, 0x7, 0x1, 0x7],
        4 => [0x5, 0x5, 0x7, 0x1, 0x1],
        5 => [0x7, 0x4, 0x7, 0x1, 0x7],
        6 => [0x7, 0x4, 0x7, 0x5, 0x7],
        7 => [0x7, 0x1, 0x2, 0x4, 0x4],
        8 => [0x7, 0x5, 0x7, 0x5, 0x7],
        9 => [0x7, 0x5, 0x7, 0x1, 0x7],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7],
    }
}

/// Whether the font unit at (`col`, `row`) of a digit is lit
#[must_use]
pub const fn is_lit(digit: u8, col: u32, row: u32) -> bool {
    if col >= GLYPH_WIDTH || row >= GLYPH_HEIGHT {
        return false;
    }
    let bits = digit_rows(digit)[row as usize];
    (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1
}

/// Width in pixels of a label at the given scale, one unit of spacing between digits
#[must_use]
pub fn label_width(label: &str, scale: u32) -> u32 {
    let digits = u32::try_from(label.len()).unwrap_or(u32::MAX);
    if digits == 0 {
        return 0;
    }
    digits.saturating_mul((GLYPH_WIDTH + 1) * scale).saturating_sub(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_one_shape() {
        // .#.
        // ##.
        assert!(!is_lit(1, 0, 0));
        assert!(is_lit(1, 1, 0));
        assert!(is_lit(1, 0, 1));
        assert!(is_lit(1, 1, 1));
        assert!(!is_lit(1, 2, 1));
    }

    #[test]
    fn test_out_of_glyph_is_unlit() {
        assert!(!is_lit(8, 3, 0));
        assert!(!is_lit(8, 0, 5));
    }

    #[test]
    fn test_label_width() {
        assert_eq!(label_width("", 2), 0);
        assert_eq!(label_width("7", 2), 6);
        assert_eq!(label_width("12", 2), 14);
    }
}
