//! UTF-8 sequence classification.
//!
//! The engine never decodes scalar values. It only needs to know how many
//! bytes form one codepoint sequence so the terminal path can group whole
//! sequences per write and the renderer can avoid splitting a sequence at a
//! wrap boundary. Column accounting deliberately stays per stored byte (see
//! `width`), so nothing here influences cursor math.

/// Number of bytes in the UTF-8 sequence introduced by `first`.
///
/// Continuation and invalid lead bytes classify as a one-byte sequence so
/// malformed input still walks byte-by-byte instead of desynchronizing.
pub fn sequence_len(first: u8) -> usize {
    if first & 0b1000_0000 == 0 {
        1
    } else if first & 0b1110_0000 == 0b1100_0000 {
        2
    } else if first & 0b1111_0000 == 0b1110_0000 {
        3
    } else if first & 0b1111_1000 == 0b1111_0000 {
        4
    } else {
        1
    }
}

/// True for bytes that continue a multi-byte sequence (`10xxxxxx`).
pub fn is_continuation(b: u8) -> bool {
    b & 0b1100_0000 == 0b1000_0000
}

/// Length of the sequence starting at `at`, clamped so a truncated trailing
/// sequence never runs past the slice.
pub fn sequence_at(bytes: &[u8], at: usize) -> usize {
    debug_assert!(at < bytes.len(), "sequence_at index in range");
    sequence_len(bytes[at]).min(bytes.len() - at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_one_byte() {
        assert_eq!(sequence_len(b'a'), 1);
        assert_eq!(sequence_len(b'\t'), 1);
        assert_eq!(sequence_len(0x7F), 1);
    }

    #[test]
    fn lead_bytes_classify_by_prefix() {
        assert_eq!(sequence_len(0xC3), 2); // é lead
        assert_eq!(sequence_len(0xE2), 3); // € lead
        assert_eq!(sequence_len(0xF0), 4); // emoji lead
    }

    #[test]
    fn continuation_and_invalid_bytes_fall_back_to_one() {
        assert_eq!(sequence_len(0x80), 1);
        assert_eq!(sequence_len(0xFF), 1);
        assert!(is_continuation(0x80));
        assert!(is_continuation(0xBF));
        assert!(!is_continuation(b'a'));
        assert!(!is_continuation(0xC3));
    }

    #[test]
    fn sequence_at_clamps_truncated_tail() {
        // 4-byte lead with only two bytes present
        let bytes = [0xF0, 0x9F];
        assert_eq!(sequence_at(&bytes, 0), 2);
        let full = "é".as_bytes();
        assert_eq!(sequence_at(full, 0), 2);
    }
}
