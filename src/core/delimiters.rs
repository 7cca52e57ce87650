// Delimiter role configuration
//
// Four single-byte roles drive tokenization: tuple terminator, field
// separator, collection-item separator (nested collection columns), and the
// escape byte. Any role can be disabled; a disabled role never matches.
// Role bytes come from table metadata, so collisions are a caller bug and
// are rejected at construction rather than silently misparsed.

use thiserror::Error;

/// Construction-time configuration errors. Parsing itself is total and
/// never fails; only an invalid configuration does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two active delimiter roles were given the same byte, which would make
    /// tuple and field boundaries ambiguous.
    #[error("delimiter byte {byte:#04x} is assigned to both {first} and {second}")]
    DelimiterCollision {
        byte: u8,
        first: &'static str,
        second: &'static str,
    },

    /// More leading partition columns than schema columns.
    #[error("{partitions} partition columns exceed the {columns}-column schema")]
    PartitionOverflow { partitions: usize, columns: usize },
}

/// The four delimiter roles. `None` disables a role.
///
/// With no tuple delimiter the input is record-framed (one record per
/// buffer, see `parse_single_tuple`). With no escape byte, escape processing
/// is skipped entirely and every delimiter byte is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub tuple: Option<u8>,
    pub field: Option<u8>,
    pub collection: Option<u8>,
    pub escape: Option<u8>,
}

impl Delimiters {
    pub fn new(
        tuple: Option<u8>,
        field: Option<u8>,
        collection: Option<u8>,
        escape: Option<u8>,
    ) -> Self {
        Delimiters {
            tuple,
            field,
            collection,
            escape,
        }
    }

    /// Checks that no two active roles share a byte. Strict across all four
    /// roles: even field/collection sharing is rejected, one rule covers
    /// every pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let roles: [(&'static str, Option<u8>); 4] = [
            ("the tuple delimiter", self.tuple),
            ("the field delimiter", self.field),
            ("the collection-item delimiter", self.collection),
            ("the escape character", self.escape),
        ];
        for i in 0..roles.len() {
            for j in i + 1..roles.len() {
                if let (Some(a), Some(b)) = (roles[i].1, roles[j].1) {
                    if a == b {
                        return Err(ConfigError::DelimiterCollision {
                            byte: a,
                            first: roles[i].0,
                            second: roles[j].0,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
