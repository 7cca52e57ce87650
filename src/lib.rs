// textscan - streaming delimited-text tokenizer for columnar scans
//
// Splits scan-range byte buffers into tuple and field boundaries for a
// query engine's text scanner:
// - Dual scan paths: 16-byte windowed classification and a bytewise
//   state machine, chosen once at construction, identical output
// - Escape-aware: delimiters masked by the escape byte stay data, and a
//   field holding escapes reports a negated length so consumers know to
//   run the unescape pass
// - Cross-buffer carries (open column, pending escape, split CRLF) so a
//   scan range can arrive in arbitrary chunks
// - Mid-stream alignment: first-tuple search for delimited files, sync
//   block search for block-structured ones
// - Scan collaborators: file-system connection cache, progress counter,
//   diagnostics pages

pub mod cache;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod parser;
pub mod progress;

pub use crate::cache::{ConnectionCache, Connector};
pub use crate::config::Flags;
pub use crate::core::{unescape, ColumnProjection, ConfigError, Delimiters, FieldLocation, WINDOW};
pub use crate::diagnostics::DiagnosticsRegistry;
pub use crate::parser::sync::find_sync_block;
pub use crate::parser::{Parsed, ScanMode, Tokenizer};
pub use crate::progress::Progress;
