// Scan-path and re-chunking conformance tests
//
// Each scenario parses the same input many ways: vector and scalar paths,
// one-shot and with a tuple budget of one, whole and split at every byte
// position and in small fixed-size chunks. All runs must produce the same
// rows of field values. Failures pinpoint which run diverges.
//
// The harness is a reference scan driver: it carries boundary-column
// bytes across calls, re-feeds unconsumed bytes after budget stops,
// flushes the final ragged row, and unescapes flagged fields.

use textscan::{unescape, ColumnProjection, Delimiters, ScanMode, Tokenizer};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn csv() -> Delimiters {
    Delimiters::new(Some(b'\n'), Some(b','), None, Some(b'\\'))
}

fn field_value(raw: &[u8], escaped: bool, escape: Option<u8>) -> String {
    match escape {
        Some(escape) if escaped => {
            let mut out = Vec::new();
            unescape(raw, escape, &mut out);
            String::from_utf8_lossy(&out).into_owned()
        }
        _ => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Feed `chunks` through one tokenizer and materialize rows of values.
///
/// Boundary protocol: bytes of the open column are carried between calls
/// and prepended to the first field the next call completes; a completed
/// boundary column always runs the unescape pass, because its reported
/// sign only covers the in-buffer part. After the last chunk the ragged
/// final row, if any, is completed via `fill_columns`.
fn scan_rows(
    mode: ScanMode,
    delims: Delimiters,
    num_cols: usize,
    chunks: &[&[u8]],
    max_tuples: usize,
) -> Vec<Vec<String>> {
    let mut t = Tokenizer::with_mode(delims, ColumnProjection::all_materialized(num_cols), mode)
        .expect("valid delimiter configuration");
    let escape = t.escape_char();

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut carry: Vec<u8> = Vec::new();

    for &chunk in chunks {
        let mut start = 0;
        loop {
            let slice = &chunk[start..];
            let mut fields = Vec::new();
            let mut row_ends = Vec::new();
            let parsed = t.parse_field_locations(slice, max_tuples, &mut fields, &mut row_ends);

            let mut completes_carry = !carry.is_empty();
            for f in &fields {
                let in_buf = &slice[f.range()];
                let value = if completes_carry {
                    carry.extend_from_slice(in_buf);
                    let value = field_value(&carry, true, escape);
                    carry.clear();
                    value
                } else {
                    field_value(in_buf, f.needs_unescape(), escape)
                };
                completes_carry = false;
                row.push(value);
                if row.len() == num_cols {
                    rows.push(std::mem::take(&mut row));
                }
            }

            if !fields.is_empty() {
                carry.clear();
            }
            carry.extend_from_slice(&slice[parsed.next_column_start..parsed.consumed]);

            start += parsed.consumed;
            if start >= chunk.len() {
                break;
            }
        }
    }

    // Complete the final row when the data ended without its delimiter.
    if !carry.is_empty() || !t.at_tuple_start() {
        let last = (!carry.is_empty()).then(|| (0, carry.len() as u32));
        let mut fields = Vec::new();
        t.fill_columns(last, &mut fields);
        let mut completes_carry = !carry.is_empty();
        for f in &fields {
            let raw = &carry[f.range()];
            let value = field_value(raw, f.needs_unescape() || completes_carry, escape);
            completes_carry = false;
            row.push(value);
            if row.len() == num_cols {
                rows.push(std::mem::take(&mut row));
            }
        }
    }
    assert!(row.is_empty(), "incomplete final row: {row:?}");
    rows
}

// ---------------------------------------------------------------------------
// Conformance macro
// ---------------------------------------------------------------------------

/// Runs a scenario through both scan paths, one-shot and budgeted, whole
/// and re-chunked every way, and asserts every run yields `expected`.
macro_rules! conformance {
    ($name:ident, delims: $delims:expr, cols: $cols:expr, input: $input:expr, expected: $expected:expr) => {
        #[test]
        fn $name() {
            let input: &[u8] = $input;
            let delims: Delimiters = $delims;
            let num_cols: usize = $cols;
            let expected: Vec<Vec<String>> = $expected
                .iter()
                .map(|row: &Vec<&str>| row.iter().map(|s| s.to_string()).collect())
                .collect();

            for mode in [ScanMode::Vector, ScanMode::Scalar] {
                // One-shot
                let one_shot = scan_rows(mode, delims, num_cols, &[input], usize::MAX);
                assert_eq!(one_shot, expected, "FAILED: {mode:?} one-shot");

                // Tuple budget of one
                let budgeted = scan_rows(mode, delims, num_cols, &[input], 1);
                assert_eq!(budgeted, expected, "FAILED: {mode:?} budget-of-one");

                // Every two-way split
                for cut in 0..=input.len() {
                    let rows = scan_rows(
                        mode,
                        delims,
                        num_cols,
                        &[&input[..cut], &input[cut..]],
                        usize::MAX,
                    );
                    assert_eq!(rows, expected, "FAILED: {mode:?} split at {cut}");
                }

                // Small fixed-size chunks
                for size in [1, 3, 7, 16] {
                    let chunks: Vec<&[u8]> = input.chunks(size).collect();
                    let rows = scan_rows(mode, delims, num_cols, &chunks, usize::MAX);
                    assert_eq!(rows, expected, "FAILED: {mode:?} chunked by {size}");
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Scenario: plain rows
// ---------------------------------------------------------------------------

conformance!(
    simple_two_rows,
    delims: csv(),
    cols: 3,
    input: b"a,b,c\n1,2,3\n",
    expected: vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]
);

conformance!(
    no_trailing_delimiter,
    delims: csv(),
    cols: 2,
    input: b"a,b\nc,d",
    expected: vec![vec!["a", "b"], vec!["c", "d"]]
);

conformance!(
    trailing_partial_column_pads,
    delims: csv(),
    cols: 3,
    input: b"a,b",
    expected: vec![vec!["a", "b", ""]]
);

conformance!(
    empty_input,
    delims: csv(),
    cols: 3,
    input: b"",
    expected: Vec::<Vec<&str>>::new()
);

conformance!(
    empty_rows_pad_every_column,
    delims: csv(),
    cols: 2,
    input: b"\n\n",
    expected: vec![vec!["", ""], vec!["", ""]]
);

conformance!(
    ragged_rows_pad_missing_columns,
    delims: csv(),
    cols: 3,
    input: b"a\nb,c\n",
    expected: vec![vec!["a", "", ""], vec!["b", "c", ""]]
);

// ---------------------------------------------------------------------------
// Scenario: escapes
// ---------------------------------------------------------------------------

conformance!(
    escaped_field_delimiter_stays_data,
    delims: csv(),
    cols: 3,
    input: b"a,b\\,c\nd,e,f\n",
    expected: vec![vec!["a", "b,c", ""], vec!["d", "e", "f"]]
);

conformance!(
    escaped_tuple_delimiter_stays_data,
    delims: csv(),
    cols: 2,
    input: b"one\\\ntwo,x\nnext,y\n",
    expected: vec![vec!["one\ntwo", "x"], vec!["next", "y"]]
);

conformance!(
    doubled_escape_before_delimiter,
    delims: csv(),
    cols: 3,
    input: b"x,\\\\,y\n",
    expected: vec![vec!["x", "\\", "y"]]
);

conformance!(
    escaped_carriage_return_stays_data,
    delims: csv(),
    cols: 2,
    input: b"a\\\rb,x\n",
    expected: vec![vec!["a\rb", "x"]]
);

conformance!(
    escape_at_end_of_range_is_dropped,
    delims: csv(),
    cols: 1,
    input: b"a\\",
    expected: vec![vec!["a"]]
);

conformance!(
    no_escape_role_treats_backslash_as_data,
    delims: Delimiters::new(Some(b'\n'), Some(b','), None, None),
    cols: 2,
    input: b"a\\,b\n",
    expected: vec![vec!["a\\", "b"]]
);

// ---------------------------------------------------------------------------
// Scenario: CR/LF forms
// ---------------------------------------------------------------------------

conformance!(
    crlf_line_endings,
    delims: csv(),
    cols: 2,
    input: b"a,b\r\nc,d\r\n",
    expected: vec![vec!["a", "b"], vec!["c", "d"]]
);

conformance!(
    mixed_cr_crlf_lf_endings,
    delims: csv(),
    cols: 1,
    input: b"one\r\ntwo\rthree\n",
    expected: vec![vec!["one"], vec!["two"], vec!["three"]]
);

// ---------------------------------------------------------------------------
// Scenario: collection-item delimiter
// ---------------------------------------------------------------------------

conformance!(
    collection_items_end_columns,
    delims: Delimiters::new(Some(b'\n'), Some(b','), Some(b'|'), Some(b'\\')),
    cols: 3,
    input: b"a|b,c\nd|e,f\n",
    expected: vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]
);

conformance!(
    escaped_collection_delimiter_stays_data,
    delims: Delimiters::new(Some(b'\n'), Some(b','), Some(b'|'), Some(b'\\')),
    cols: 3,
    input: b"a\\|b|c,d\n",
    expected: vec![vec!["a|b", "c", "d"]]
);

// ---------------------------------------------------------------------------
// Scenario: window-spanning inputs
// ---------------------------------------------------------------------------

conformance!(
    escape_straddles_window_boundary,
    delims: csv(),
    cols: 3,
    input: b"aaaaaaaaaaaaaaa\\,bb,cc\nsecond,row,here\n",
    expected: vec![
        vec!["aaaaaaaaaaaaaaa,bb", "cc", ""],
        vec!["second", "row", "here"],
    ]
);

conformance!(
    long_column_spans_windows,
    delims: csv(),
    cols: 2,
    input: b"0123456789012345678901234567890123456789,x\n",
    expected: vec![vec!["0123456789012345678901234567890123456789", "x"]]
);
