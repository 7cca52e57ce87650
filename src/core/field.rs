// Field locations and the consumer-side unescape pass
//
// The tokenizer reports every field as an (offset, signed length) pair into
// the caller's buffer and never copies bytes. A negative length marks a
// field that contains escape bytes: the magnitude is the raw, still-escaped
// length, and the consumer runs `unescape` on those bytes before use.

use std::ops::Range;

/// Location of one field's raw bytes within the caller's buffer.
///
/// Offsets are `u32`: scan buffers are bounded well under 4 GiB, and the
/// narrower index halves what the location stream occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldLocation {
    /// Offset of the first byte of the field.
    pub start: u32,
    /// Byte length; negative iff the field contains escape bytes (the
    /// magnitude is the raw length before unescaping).
    pub len: i32,
}

impl FieldLocation {
    /// Padding value for missing trailing columns of a short row.
    pub const EMPTY: FieldLocation = FieldLocation { start: 0, len: 0 };

    #[inline]
    pub fn new(start: u32, len: i32) -> Self {
        FieldLocation { start, len }
    }

    /// True when the consumer must run `unescape` before using the bytes.
    #[inline]
    pub fn needs_unescape(&self) -> bool {
        self.len < 0
    }

    /// Length of the raw bytes, ignoring the escape marker sign.
    #[inline]
    pub fn raw_len(&self) -> usize {
        self.len.unsigned_abs() as usize
    }

    /// The raw byte range within the buffer this location points into.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        let start = self.start as usize;
        start..start + self.raw_len()
    }
}

/// Copy `raw` into `out` with acting escape bytes removed: each escape byte
/// is dropped and the byte it escapes is kept verbatim, so `\,` becomes `,`
/// and `\\` becomes `\`. A trailing unpaired escape is dropped. `out` is
/// cleared first.
pub fn unescape(raw: &[u8], escape: u8, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == escape {
            if i + 1 < raw.len() {
                out.push(raw[i + 1]);
            }
            i += 2;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescaped(raw: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        unescape(raw, b'\\', &mut out);
        out
    }

    #[test]
    fn location_sign_convention() {
        let clean = FieldLocation::new(4, 3);
        assert!(!clean.needs_unescape());
        assert_eq!(clean.raw_len(), 3);
        assert_eq!(clean.range(), 4..7);

        let escaped = FieldLocation::new(10, -5);
        assert!(escaped.needs_unescape());
        assert_eq!(escaped.raw_len(), 5);
        assert_eq!(escaped.range(), 10..15);
    }

    #[test]
    fn empty_location_is_zero_len() {
        assert_eq!(FieldLocation::EMPTY.raw_len(), 0);
        assert!(!FieldLocation::EMPTY.needs_unescape());
        assert_eq!(FieldLocation::EMPTY.range(), 0..0);
    }

    #[test]
    fn unescape_removes_acting_escapes() {
        assert_eq!(unescaped(b"b\\,c"), b"b,c");
        assert_eq!(unescaped(b"a\\\\b"), b"a\\b");
        assert_eq!(unescaped(b"\\,\\,"), b",,");
    }

    #[test]
    fn unescape_plain_bytes_copy_through() {
        assert_eq!(unescaped(b"plain"), b"plain");
        assert_eq!(unescaped(b""), b"");
    }

    #[test]
    fn unescape_drops_trailing_unpaired_escape() {
        assert_eq!(unescaped(b"abc\\"), b"abc");
        assert_eq!(unescaped(b"\\"), b"");
    }

    #[test]
    fn unescape_escaped_escape_then_delimiter() {
        // \\, unescapes to a literal backslash and a comma; the comma was
        // structural during tokenization only if a delimiter role said so,
        // the pass itself never re-interprets it.
        assert_eq!(unescaped(b"\\\\,"), b"\\,");
    }

    #[test]
    fn unescape_clears_previous_output() {
        let mut out = vec![1, 2, 3];
        unescape(b"xy", b'\\', &mut out);
        assert_eq!(out, b"xy");
    }
}
