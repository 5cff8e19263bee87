/// Whether a raw response is the controller's "unknown variable" reply.
///
/// The controller has no structured error code. An unresolvable name comes
/// back as a frame with no printable ASCII byte anywhere in it, or with a
/// trailing `0x00`. The check covers the whole raw response, not just the
/// value slice.
///
/// A legitimately empty value whose frame happens to end in `0x00` is
/// indistinguishable from a miss and is reported as one.
pub fn is_error_indicator(raw: &[u8]) -> bool {
    let has_printable = raw.iter().any(|b| (32..=126).contains(b));
    !has_printable || raw.last() == Some(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_frame_is_error() {
        assert!(is_error_indicator(&[0u8; 7]));
    }

    #[test]
    fn empty_frame_is_error() {
        assert!(is_error_indicator(&[]));
    }

    #[test]
    fn non_printable_frame_is_error() {
        assert!(is_error_indicator(&[0x01, 0x1f, 0x7f, 0x80, 0xff]));
    }

    #[test]
    fn trailing_null_is_error_even_with_text() {
        assert!(is_error_indicator(b"\x00\x00\x00\x05\x00\x00\x01A\x00"));
    }

    #[test]
    fn printable_frame_without_trailing_null_is_ok() {
        assert!(!is_error_indicator(&[0, 0, 0, 4, 1, 0, 1, b'1']));
    }

    #[test]
    fn printable_bounds_are_inclusive() {
        assert!(!is_error_indicator(&[0x20]));
        assert!(!is_error_indicator(&[0x7e]));
        assert!(is_error_indicator(&[0x1f, 0x7f]));
    }
}
