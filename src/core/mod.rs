// Core primitives for delimited-text tokenization

pub mod columns;
pub mod delimiters;
pub mod field;
pub mod masks;

pub use columns::ColumnProjection;
pub use delimiters::{ConfigError, Delimiters};
pub use field::{unescape, FieldLocation};
pub use masks::WINDOW;
