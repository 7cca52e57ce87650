// Windowed scan path
//
// Classifies 16-byte windows into tuple/field/escape bitmasks and walks
// set bits in ascending order, so all per-byte work collapses to a few
// mask ops per window. Carry bits line up with the bytewise path: the
// escape carry advances per window via escaped_positions, the open
// column's escape flag comes from the raw escape mask through the range
// tables, and the CR cursor is shared as-is.
//
// On a mid-window budget stop the remaining window bytes are left
// unconsumed and the carries are rewritten for the stop position, so the
// next call re-classifies them with no memory of this window.

use super::{Cursor, Tokenizer};
use crate::core::field::FieldLocation;
use crate::core::masks::{classify, escaped_positions, WINDOW};

impl Tokenizer {
    /// Consume whole windows of `buf[cur.pos..]` while at least one window
    /// remains and the tuple budget is unmet. The sub-window tail is the
    /// bytewise path's job.
    pub(super) fn parse_windowed(
        &mut self,
        buf: &[u8],
        max_tuples: usize,
        cur: &mut Cursor,
        fields: &mut Vec<FieldLocation>,
        row_ends: &mut Vec<usize>,
    ) {
        let has_escape = self.templates.escape().is_some();
        while cur.tuples < max_tuples {
            let Some(chunk) = buf.get(cur.pos..cur.pos + WINDOW) else {
                break;
            };
            let Ok(window) = <&[u8; WINDOW]>::try_from(chunk) else {
                break;
            };

            let mut m = classify(window, &self.templates, self.use_sse2);
            let raw_escape = m.escape;
            if has_escape {
                let escaped = escaped_positions(raw_escape, &mut self.last_char_is_escape);
                m.tuple &= !escaped;
                m.field &= !escaped;
            }

            let mut delims = m.tuple | m.field;
            while delims != 0 {
                let n = delims.trailing_zeros() as usize;
                let abs = cur.pos + n;

                if raw_escape != 0 {
                    // Escapes between the column's start (window-relative,
                    // zero if it opened in an earlier window) and the
                    // delimiter mark the column for unescaping.
                    let from = cur.col_start.saturating_sub(cur.pos);
                    self.column_has_escape |=
                        self.templates.span_has_escape(raw_escape, from, n);
                }

                // Tuple class first: it wins when a byte lands in both
                // classes, same as the bytewise branch order.
                if m.tuple & (1 << n) != 0 {
                    let b = window[n];
                    if b == b'\n' && cur.cr_end == Some(abs) {
                        // Second half of a CRLF; no tuple here.
                        cur.col_start = abs + 1;
                    } else {
                        self.end_tuple(abs, &mut cur.col_start, fields, row_ends);
                        cur.tuples += 1;
                        if b == b'\r' {
                            cur.cr_end = Some(abs + 1);
                        }
                        if cur.tuples == max_tuples {
                            // Budget stop inside the window. The escape
                            // carries were computed for all 16 bytes;
                            // rewrite them for a stop on a delimiter.
                            cur.pos = abs + 1;
                            self.last_char_is_escape = false;
                            self.column_has_escape = false;
                            return;
                        }
                    }
                } else {
                    self.add_column(abs - cur.col_start, &mut cur.col_start, fields);
                }
                delims &= delims - 1;
            }

            if raw_escape != 0 {
                // The still-open column may hold escapes between its start
                // and the window end.
                let from = cur.col_start.saturating_sub(cur.pos);
                if from < WINDOW {
                    self.column_has_escape |=
                        self.templates.span_has_escape(raw_escape, from, WINDOW - 1);
                }
            }
            cur.pos += WINDOW;
        }
    }
}
