use std::fmt;

/// Lowercase hex rendering of a byte slice for log fields.
///
/// ```
/// use openshowvar_frame::HexBytes;
/// assert_eq!(HexBytes(&[0x00, 0x0b, 0xff]).to_string(), "000bff");
/// ```
#[derive(Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
