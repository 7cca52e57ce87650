// Bytewise scan path
//
// One byte at a time with two carry bits (acting escape, open-column
// escape) and the CR cursor. The vector path hands its sub-window tail
// here; in Scalar mode this is the whole parse. Must agree bit for bit
// with parser/simd.rs on every input.

use super::{Cursor, Tokenizer};
use crate::core::field::FieldLocation;

impl Tokenizer {
    /// Consume `buf[cur.pos..]` until the buffer or the tuple budget runs
    /// out. When the budget ends the call, `cur.pos` rests exactly one
    /// past the final tuple's delimiter.
    pub(super) fn parse_bytewise(
        &mut self,
        buf: &[u8],
        max_tuples: usize,
        cur: &mut Cursor,
        fields: &mut Vec<FieldLocation>,
        row_ends: &mut Vec<usize>,
    ) {
        let escape = self.templates.escape();
        while cur.pos < buf.len() && cur.tuples < max_tuples {
            let abs = cur.pos;
            let b = buf[abs];
            cur.pos += 1;

            if self.last_char_is_escape {
                // Escaped byte: data, and it cannot start an escape itself.
                self.last_char_is_escape = false;
            } else if escape == Some(b) {
                self.column_has_escape = true;
                self.last_char_is_escape = true;
            } else if self.templates.is_tuple_byte(b) {
                if b == b'\n' && cur.cr_end == Some(abs) {
                    // Second half of a CRLF; the \r already ended the tuple.
                    cur.col_start = abs + 1;
                } else {
                    self.end_tuple(abs, &mut cur.col_start, fields, row_ends);
                    cur.tuples += 1;
                    if b == b'\r' {
                        cur.cr_end = Some(abs + 1);
                    }
                }
            } else if self.templates.is_field_byte(b) {
                self.add_column(abs - cur.col_start, &mut cur.col_start, fields);
            }
        }
    }

    /// Field scan for `parse_single_tuple`: no tuple class, no CR
    /// handling, otherwise the same rules.
    pub(super) fn single_tuple_fields(
        &mut self,
        buf: &[u8],
        col_start: &mut usize,
        fields: &mut Vec<FieldLocation>,
    ) {
        let escape = self.templates.escape();
        for pos in 0..buf.len() {
            let b = buf[pos];
            if self.last_char_is_escape {
                self.last_char_is_escape = false;
            } else if escape == Some(b) {
                self.column_has_escape = true;
                self.last_char_is_escape = true;
            } else if self.templates.is_field_byte(b) {
                self.add_column(pos - *col_start, col_start, fields);
            }
        }
    }
}
