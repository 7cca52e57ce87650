// Scan-range positioning
//
// Two ways a scanner lands on a tuple boundary mid-file: for plain
// delimited text, skip past the first unescaped tuple delimiter; for
// block-structured formats, hunt for the next sync block (a 4-byte
// all-ones indicator followed by the file's sync marker) in the byte
// stream.

use std::io::{self, Read, Seek, SeekFrom};

use memchr::{memchr, memchr2, memmem};

use super::Tokenizer;

/// Marker prefix that introduces a sync block.
const SYNC_INDICATOR: [u8; 4] = [0xFF; 4];

/// Read granularity for the sync search.
const SYNC_READ_CHUNK: usize = 64 * 1024;

impl Tokenizer {
    /// Offset of the first byte after the first non-escaped tuple
    /// delimiter, or `None` if the buffer holds none (or no tuple
    /// delimiter is configured). Scan ranges that begin mid-tuple start
    /// here; the skipped prefix belongs to the previous range.
    ///
    /// A delimiter preceded by an odd run of escape bytes is data and the
    /// search continues past it. With a `\n` tuple delimiter, `\r` counts
    /// too and a `\r\n` pair is skipped as one unit. The result may equal
    /// `buf.len()`.
    pub fn find_first_tuple_start(&self, buf: &[u8]) -> Option<usize> {
        let tuple = self.delims.tuple?;
        let mut from = 0;
        loop {
            let rel = if tuple == b'\n' {
                memchr2(b'\n', b'\r', &buf[from..])
            } else {
                memchr(tuple, &buf[from..])
            }?;
            let hit = from + rel;
            if self.escaped_at(buf, hit) {
                from = hit + 1;
                continue;
            }
            if tuple == b'\n' && buf[hit] == b'\r' && buf.get(hit + 1) == Some(&b'\n') {
                return Some(hit + 2);
            }
            return Some(hit + 1);
        }
    }

    /// Whether the byte at `pos` sits behind an odd run of escape bytes.
    fn escaped_at(&self, buf: &[u8], pos: usize) -> bool {
        let Some(escape) = self.delims.escape else {
            return false;
        };
        let mut run = 0;
        while run < pos && buf[pos - 1 - run] == escape {
            run += 1;
        }
        run % 2 == 1
    }
}

/// Scan `reader` forward for a sync block whose indicator starts before
/// `end_of_range`: four `0xFF` bytes immediately followed by `sync`.
///
/// On a hit, seeks the reader to the indicator's start and returns that
/// offset. On `Ok(None)` the reader is left at or beyond `end_of_range`
/// (or at end of stream), which tells the scanner this range has no more
/// blocks. Offsets are absolute stream positions.
pub fn find_sync_block<R: Read + Seek>(
    reader: &mut R,
    end_of_range: u64,
    sync: &[u8],
) -> io::Result<Option<u64>> {
    let mut needle = Vec::with_capacity(SYNC_INDICATOR.len() + sync.len());
    needle.extend_from_slice(&SYNC_INDICATOR);
    needle.extend_from_slice(sync);
    let finder = memmem::Finder::new(&needle);

    // Window of stream bytes starting at absolute offset `base`. Failed
    // rounds keep needle.len()-1 tail bytes so a straddling match is still
    // found.
    let mut base = reader.stream_position()?;
    let mut window: Vec<u8> = Vec::with_capacity(SYNC_READ_CHUNK + needle.len());
    let mut chunk = vec![0u8; SYNC_READ_CHUNK];

    while base < end_of_range {
        let n = reader.read(&mut chunk)?;
        window.extend_from_slice(&chunk[..n]);

        if let Some(rel) = finder.find(&window) {
            let abs = base + rel as u64;
            if abs >= end_of_range {
                // First match is already out of range, so every match is.
                return Ok(None);
            }
            reader.seek(SeekFrom::Start(abs))?;
            return Ok(Some(abs));
        }

        if n == 0 {
            // End of stream with no match.
            return Ok(None);
        }

        if window.len() >= needle.len() {
            let drop = window.len() - (needle.len() - 1);
            window.drain(..drop);
            base += drop as u64;
        }
    }
    Ok(None)
}
