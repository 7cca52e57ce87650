// Column routing for the scan projection
//
// File columns map positionally onto the table schema. Leading partition
// columns never appear in file bytes (their values come from metadata), so
// the column cursor starts past them. Columns the query does not project
// are scanned but not reported; file columns beyond the schema are dropped.

use super::delimiters::ConfigError;

/// Which schema columns the scan materializes, and where scanning starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjection {
    /// One flag per schema column. Entries below `first_scanned` belong to
    /// partition columns and are never consulted.
    materialized: Vec<bool>,
    /// Index of the first non-partition column.
    first_scanned: usize,
}

impl ColumnProjection {
    /// `materialized` covers the full schema in column order;
    /// `partition_cols` of them, at the front, are partition columns.
    pub fn new(materialized: Vec<bool>, partition_cols: usize) -> Result<Self, ConfigError> {
        if partition_cols > materialized.len() {
            return Err(ConfigError::PartitionOverflow {
                partitions: partition_cols,
                columns: materialized.len(),
            });
        }
        Ok(ColumnProjection {
            materialized,
            first_scanned: partition_cols,
        })
    }

    /// Projection that materializes every one of `num_cols` columns, with no
    /// partition columns.
    pub fn all_materialized(num_cols: usize) -> Self {
        ColumnProjection {
            materialized: vec![true; num_cols],
            first_scanned: 0,
        }
    }

    /// Total schema column count, partition columns included.
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.materialized.len()
    }

    /// Where the column cursor rests at the start of every tuple.
    #[inline]
    pub fn first_scanned(&self) -> usize {
        self.first_scanned
    }

    /// Whether the column at `idx` is reported. False past the schema end,
    /// which is how extra file columns get dropped.
    #[inline]
    pub fn is_materialized(&self, idx: usize) -> bool {
        idx < self.materialized.len() && self.materialized[idx]
    }

    /// Materialized columns among the scanned (non-partition) ones. Callers
    /// size output capacity from this.
    pub fn num_materialized(&self) -> usize {
        self.materialized[self.first_scanned..]
            .iter()
            .filter(|&&m| m)
            .count()
    }
}
