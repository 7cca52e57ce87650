// Delimited-text tokenizer
//
// Splits scan-range buffers into tuples and fields, reporting each
// materialized field as a FieldLocation into the caller's buffer. Input
// arrives in arbitrary-sized buffers; the tokenizer carries just enough
// state (column cursor, escape carries, CR carry) to resume at any split
// point with output identical to a one-shot parse.
//
// Two scan paths share all tuple/column bookkeeping:
// - vector: 16-byte windows classified into bitmasks (parser/simd.rs),
//   with a bytewise tail
// - scalar: the bytewise state machine for everything (parser/scalar.rs)
// The path is picked once at construction and the two must agree bit for
// bit on every input.

pub mod scalar;
pub mod simd;
pub mod sync;

use log::debug;

use crate::core::columns::ColumnProjection;
use crate::core::delimiters::{ConfigError, Delimiters};
use crate::core::field::FieldLocation;
use crate::core::masks::{self, MatchTemplates};

/// Which parse path a tokenizer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Windowed bitmask scan; uses SSE2 when the host has it, an
    /// equivalent portable classifier otherwise.
    Vector,
    /// Byte-at-a-time state machine.
    Scalar,
}

impl ScanMode {
    /// Capability-based choice, made once per tokenizer.
    pub fn detect() -> ScanMode {
        if masks::sse2_available() {
            ScanMode::Vector
        } else {
            ScanMode::Scalar
        }
    }
}

/// Per-call results of `parse_field_locations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parsed {
    /// Complete tuples found, never more than the call's budget.
    pub tuples: usize,
    /// Field locations appended, trailing partial tuple's included.
    pub fields: usize,
    /// Bytes consumed: the whole buffer, unless the tuple budget stopped
    /// the call just past its final tuple delimiter. The unconsumed rest
    /// must be re-fed ahead of new bytes.
    pub consumed: usize,
    /// Where the trailing (possibly empty) partial column begins. The
    /// driver carries `buf[next_column_start..consumed]` and prepends it to
    /// that column's bytes when a later call completes it.
    pub next_column_start: usize,
}

/// Per-call scan cursor shared by the windowed and bytewise paths.
pub(crate) struct Cursor {
    /// Next byte to classify.
    pos: usize,
    /// Start of the open column.
    col_start: usize,
    /// Tuples completed so far this call.
    tuples: usize,
    /// One past a `\r` that ended a tuple; a `\n` found exactly there is
    /// the second half of a CRLF and emits nothing.
    cr_end: Option<usize>,
}

/// Streaming delimiter- and escape-aware tokenizer.
///
/// One per scan range. Owns no buffers and performs no I/O; all output
/// goes into caller-supplied vectors as (offset, signed length) pairs.
pub struct Tokenizer {
    delims: Delimiters,
    templates: MatchTemplates,
    columns: ColumnProjection,
    mode: ScanMode,
    use_sse2: bool,

    // Cross-call state. Survives buffer boundaries so re-chunked input
    // parses identically to one-shot input.
    column_idx: usize,
    column_has_escape: bool,
    last_char_is_escape: bool,
    trailing_cr: bool,
}

impl Tokenizer {
    /// Validates the delimiter configuration and picks the scan path for
    /// this host.
    pub fn new(delims: Delimiters, columns: ColumnProjection) -> Result<Tokenizer, ConfigError> {
        Tokenizer::with_mode(delims, columns, ScanMode::detect())
    }

    /// Like `new` but with a forced scan path. Benchmarks and conformance
    /// tests use this to run both paths on the same host.
    pub fn with_mode(
        delims: Delimiters,
        columns: ColumnProjection,
        mode: ScanMode,
    ) -> Result<Tokenizer, ConfigError> {
        delims.validate()?;
        let templates = MatchTemplates::new(&delims);
        let use_sse2 = mode == ScanMode::Vector && masks::sse2_available();
        debug!("tokenizer scan path {mode:?}, sse2 classifier {use_sse2}");
        let column_idx = columns.first_scanned();
        Ok(Tokenizer {
            delims,
            templates,
            columns,
            mode,
            use_sse2,
            column_idx,
            column_has_escape: false,
            last_char_is_escape: false,
            trailing_cr: false,
        })
    }

    /// Rearm for a new scan range: column cursor back to the first
    /// non-partition column, no carried escape or CR state.
    pub fn reset(&mut self) {
        self.column_idx = self.columns.first_scanned();
        self.column_has_escape = false;
        self.last_char_is_escape = false;
        self.trailing_cr = false;
    }

    /// True between tuples. The driver checks this at scan-range end to
    /// decide whether a final ragged tuple needs `fill_columns`.
    pub fn at_tuple_start(&self) -> bool {
        self.column_idx == self.columns.first_scanned()
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// The configured escape byte, for consumers running `unescape`.
    pub fn escape_char(&self) -> Option<u8> {
        self.delims.escape
    }

    pub fn projection(&self) -> &ColumnProjection {
        &self.columns
    }

    /// Tokenize `buf`, appending a location per completed materialized
    /// column and a delimiter offset per completed tuple. Stops after
    /// `max_tuples` tuples, mid-buffer if need be; a `max_tuples` of zero
    /// consumes nothing.
    ///
    /// Completed columns of a trailing partial tuple are reported as soon
    /// as their delimiter is seen; the unterminated final column is not,
    /// and `next_column_start` tells the driver which bytes to carry for
    /// it. Buffers are capped at `i32::MAX` bytes by the location format.
    pub fn parse_field_locations(
        &mut self,
        buf: &[u8],
        max_tuples: usize,
        fields: &mut Vec<FieldLocation>,
        row_ends: &mut Vec<usize>,
    ) -> Parsed {
        debug_assert!(buf.len() <= i32::MAX as usize);
        if max_tuples == 0 {
            return Parsed::default();
        }
        let fields_before = fields.len();
        let mut cur = Cursor {
            pos: 0,
            col_start: 0,
            tuples: 0,
            cr_end: if self.trailing_cr { Some(0) } else { None },
        };
        if self.mode == ScanMode::Vector {
            self.parse_windowed(buf, max_tuples, &mut cur, fields, row_ends);
        }
        self.parse_bytewise(buf, max_tuples, &mut cur, fields, row_ends);

        // The CR carry holds exactly when the last consumed byte was a
        // tuple-ending \r. An empty call leaves it untouched.
        self.trailing_cr = cur.cr_end == Some(cur.pos);
        Parsed {
            tuples: cur.tuples,
            fields: fields.len() - fields_before,
            consumed: cur.pos,
            next_column_start: cur.col_start,
        }
    }

    /// Tokenize one record known to contain no tuple delimiters
    /// (record-framed formats frame rows outside the payload). Resets the
    /// column cursor and escape carries on entry, then applies the same
    /// field rules and finishes the row with `fill_columns`. Returns the
    /// number of locations appended.
    pub fn parse_single_tuple(&mut self, buf: &[u8], fields: &mut Vec<FieldLocation>) -> usize {
        debug_assert!(buf.len() <= i32::MAX as usize);
        let before = fields.len();
        self.column_idx = self.columns.first_scanned();
        self.column_has_escape = false;
        self.last_char_is_escape = false;

        let mut col_start = 0usize;
        self.single_tuple_fields(buf, &mut col_start, fields);

        let rem = buf.len() - col_start;
        let last = (rem > 0).then(|| (col_start as u32, rem as u32));
        self.fill_columns(last, fields);
        fields.len() - before
    }

    /// Complete the current tuple when the data ran out before its
    /// delimiter did. `last_column` is the unterminated trailing column
    /// (start offset and raw length), or `None` when the row ended exactly
    /// on a delimiter; remaining schema columns pad as empty. The scan
    /// driver calls this at scan-range end when `!at_tuple_start()`.
    /// Returns the number of locations appended.
    pub fn fill_columns(
        &mut self,
        last_column: Option<(u32, u32)>,
        fields: &mut Vec<FieldLocation>,
    ) -> usize {
        let before = fields.len();
        if let Some((start, len)) = last_column {
            let mut cursor = start as usize;
            self.add_column(len as usize, &mut cursor, fields);
        }
        self.pad_missing_columns(fields);
        fields.len() - before
    }

    // -----------------------------------------------------------------------
    // Column bookkeeping shared by every path
    // -----------------------------------------------------------------------

    /// Close the column whose bytes are `[*col_start, *col_start + len)`:
    /// emit it if materialized (length negated when it held escapes),
    /// clear the escape flag, step past the delimiter byte, advance the
    /// column cursor.
    #[inline]
    fn add_column(&mut self, len: usize, col_start: &mut usize, fields: &mut Vec<FieldLocation>) {
        if self.columns.is_materialized(self.column_idx) {
            let signed = if self.column_has_escape {
                -(len as i32)
            } else {
                len as i32
            };
            fields.push(FieldLocation::new(*col_start as u32, signed));
        }
        self.column_has_escape = false;
        *col_start += len + 1;
        self.column_idx += 1;
    }

    /// Empty-pad every materialized column the row never reached.
    #[inline]
    fn pad_missing_columns(&mut self, fields: &mut Vec<FieldLocation>) {
        while self.column_idx < self.columns.num_cols() {
            if self.columns.is_materialized(self.column_idx) {
                fields.push(FieldLocation::EMPTY);
            }
            self.column_idx += 1;
        }
    }

    /// Tuple delimiter at `abs`: close the open column, pad the short
    /// ones, record the row end, rewind the cursor for the next tuple.
    #[inline]
    fn end_tuple(
        &mut self,
        abs: usize,
        col_start: &mut usize,
        fields: &mut Vec<FieldLocation>,
        row_ends: &mut Vec<usize>,
    ) {
        self.add_column(abs - *col_start, col_start, fields);
        self.pad_missing_columns(fields);
        row_ends.push(abs);
        self.column_idx = self.columns.first_scanned();
    }
}
