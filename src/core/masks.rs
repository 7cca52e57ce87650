// 16-byte window classification for the vectorized scan path
//
// Each window of input becomes three bitmasks (tuple-class bytes,
// field-class bytes, escape bytes), bit i = byte i. The parser walks set
// bits instead of bytes. Mask generation has two interchangeable backends:
// SSE2 compare+movemask, and a portable per-byte loop used off x86_64 and
// by the conformance tests. Both must produce identical masks for every
// window.
//
// ## Escape handling
//
// A delimiter preceded by an acting escape is data. `escaped_positions`
// turns the raw escape mask into the mask of escaped bytes branchlessly
// (odd/even run-parity, carry-corrected across windows), so the delimiter
// masks can be cleaned with one AND. The raw escape mask also feeds the
// per-column "needs unescape" flag via the two 16-entry range tables:
// low_mask[i] selects bits i..=15, high_mask[i] selects 0..=i, so "any
// escape between column start s and delimiter n" is a three-way AND.

use super::delimiters::Delimiters;

/// Bytes per classification window (128-bit lanes).
pub const WINDOW: usize = 16;

const EVEN_BITS: u16 = 0x5555;

/// Per-window classification result. Bit i corresponds to byte i.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowMasks {
    /// Tuple-delimiter class: the tuple byte, plus `\r` when the tuple
    /// delimiter is `\n`.
    pub tuple: u16,
    /// Field-delimiter class: field and collection-item bytes.
    pub field: u16,
    /// Escape bytes, raw (acting and escaped occurrences alike).
    pub escape: u16,
}

/// Up to two member bytes; delimiter classes never hold more.
#[derive(Debug, Clone, Copy, Default)]
struct ByteClass {
    bytes: [u8; 2],
    len: u8,
}

impl ByteClass {
    const fn none() -> Self {
        ByteClass {
            bytes: [0; 2],
            len: 0,
        }
    }

    const fn one(a: u8) -> Self {
        ByteClass {
            bytes: [a, 0],
            len: 1,
        }
    }

    const fn two(a: u8, b: u8) -> Self {
        ByteClass {
            bytes: [a, b],
            len: 2,
        }
    }

    #[inline]
    fn contains(&self, b: u8) -> bool {
        (self.len >= 1 && b == self.bytes[0]) || (self.len == 2 && b == self.bytes[1])
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

/// Precomputed per-tokenizer match state: the three byte classes and the
/// range tables. Built once at construction.
#[derive(Debug, Clone)]
pub struct MatchTemplates {
    tuple: ByteClass,
    field: ByteClass,
    escape: Option<u8>,
    low_mask: [u16; WINDOW],
    high_mask: [u16; WINDOW],
}

impl MatchTemplates {
    pub fn new(delims: &Delimiters) -> Self {
        let tuple = match delims.tuple {
            Some(b'\n') => ByteClass::two(b'\n', b'\r'),
            Some(t) => ByteClass::one(t),
            None => ByteClass::none(),
        };
        let field = match (delims.field, delims.collection) {
            (Some(f), Some(c)) => ByteClass::two(f, c),
            (Some(f), None) => ByteClass::one(f),
            (None, Some(c)) => ByteClass::one(c),
            (None, None) => ByteClass::none(),
        };

        let mut low_mask = [0u16; WINDOW];
        let mut high_mask = [0u16; WINDOW];
        for i in 0..WINDOW {
            low_mask[i] = u16::MAX << i;
            high_mask[i] = u16::MAX >> (WINDOW - 1 - i);
        }

        MatchTemplates {
            tuple,
            field,
            escape: delims.escape,
            low_mask,
            high_mask,
        }
    }

    #[inline]
    pub fn is_tuple_byte(&self, b: u8) -> bool {
        self.tuple.contains(b)
    }

    #[inline]
    pub fn is_field_byte(&self, b: u8) -> bool {
        self.field.contains(b)
    }

    #[inline]
    pub fn escape(&self) -> Option<u8> {
        self.escape
    }

    /// Any escape byte at window positions `from..=to`? Constant-time via
    /// the range tables.
    #[inline]
    pub fn span_has_escape(&self, escape_mask: u16, from: usize, to: usize) -> bool {
        debug_assert!(from <= to && to < WINDOW);
        escape_mask & self.low_mask[from] & self.high_mask[to] != 0
    }
}

// ---------------------------------------------------------------------------
// Escaped-position computation
// ---------------------------------------------------------------------------

/// Mask of window positions preceded by an acting escape, given the raw
/// escape mask and the carry (`pending`: the previous byte, possibly in the
/// previous buffer, was an acting escape). Updates `pending` for the
/// window's last byte.
///
/// Run-parity in five ALU ops: within a run of escape bytes, the odd
/// members act and the even members are themselves escaped. Odd-position
/// run starts invert the even/odd pattern, which the overflowing add
/// ripples through each run; the add's carry-out is exactly "byte 15 acts".
#[inline]
pub fn escaped_positions(escape_mask: u16, pending: &mut bool) -> u16 {
    let first = *pending as u16;
    let escapes = escape_mask & !first;
    let follows_escape = (escapes << 1) | first;
    let odd_starts = escapes & !EVEN_BITS & !follows_escape;
    let (sequences, overflow) = odd_starts.overflowing_add(escapes);
    *pending = overflow;
    (EVEN_BITS ^ (sequences << 1)) & follows_escape
}

// ---------------------------------------------------------------------------
// Window classifiers
// ---------------------------------------------------------------------------

/// Per-byte classifier. The reference the SSE2 backend must match, and the
/// vector path's backend off x86_64.
pub fn classify_portable(window: &[u8; WINDOW], t: &MatchTemplates) -> WindowMasks {
    let mut masks = WindowMasks::default();
    for (i, &b) in window.iter().enumerate() {
        let bit = 1u16 << i;
        if t.tuple.contains(b) {
            masks.tuple |= bit;
        }
        if t.field.contains(b) {
            masks.field |= bit;
        }
        if t.escape == Some(b) {
            masks.escape |= bit;
        }
    }
    masks
}

#[cfg(target_arch = "x86_64")]
pub mod sse2 {
    use super::{MatchTemplates, WindowMasks, WINDOW};
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    };

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn eq_mask(data: __m128i, needle: u8) -> u16 {
        _mm_movemask_epi8(_mm_cmpeq_epi8(data, _mm_set1_epi8(needle as i8))) as u16
    }

    /// SSE2 classifier: one unaligned load, one compare+movemask per class
    /// byte.
    ///
    /// # Safety
    /// Caller must have verified SSE2 support at runtime.
    #[target_feature(enable = "sse2")]
    pub unsafe fn classify(window: &[u8; WINDOW], t: &MatchTemplates) -> WindowMasks {
        let data = _mm_loadu_si128(window.as_ptr() as *const __m128i);
        let mut masks = WindowMasks::default();
        for &b in t.tuple.bytes() {
            masks.tuple |= eq_mask(data, b);
        }
        for &b in t.field.bytes() {
            masks.field |= eq_mask(data, b);
        }
        if let Some(e) = t.escape() {
            masks.escape = eq_mask(data, e);
        }
        masks
    }
}

/// Classify one window. `use_sse2` was established by a runtime feature
/// check at construction; when false (or off x86_64) the portable loop
/// produces the same masks.
#[inline]
pub fn classify(window: &[u8; WINDOW], t: &MatchTemplates, use_sse2: bool) -> WindowMasks {
    #[cfg(target_arch = "x86_64")]
    {
        if use_sse2 {
            // Safety: use_sse2 is only set after is_x86_feature_detected.
            return unsafe { sse2::classify(window, t) };
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = use_sse2;
    classify_portable(window, t)
}

/// Runtime capability check, performed once per tokenizer.
pub fn sse2_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("sse2")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
