//! Aggregations over the normalized disclosure table.
//!
//! Each query is pure: it reads the table, skips rows whose inputs are null,
//! and returns only the groups that cross its threshold.

pub mod changes;
pub mod owners;
pub mod ownership;

use anyhow::{anyhow, Result};
use arrow::{
    array::{Array, Float64Array, StringArray},
    record_batch::RecordBatch,
};

pub use changes::{analyze_ownership_changes, ownership_timeline, TimelinePoint};
pub use owners::analyze_multi_owners;
pub use ownership::analyze_ownership;

fn typed_column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("normalized table has no {name:?} column"))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("column {name:?} has unexpected type"))
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    typed_column(batch, name)
}

pub(crate) fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    typed_column(batch, name)
}

/// Hashable identity of an ownership value; `-0.0` and `0.0` are the same share.
pub(crate) fn share_key(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}
