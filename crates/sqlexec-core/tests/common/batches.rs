//! Arrow batches shaped like a small query result.

use std::sync::Arc;

use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

/// `rows` rows of `(trip_id bigint, city string, fare double)`.
pub fn trips(rows: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("trip_id", DataType::Int64, false),
        Field::new("city", DataType::Utf8, true),
        Field::new("fare", DataType::Float64, true),
    ]));
    let n = rows as i64;
    let ids = Int64Array::from_iter_values(0..n);
    let cities = StringArray::from_iter_values(
        (0..rows).map(|i| ["Lisbon", "Oslo", "Quito"][i % 3]),
    );
    let fares = Float64Array::from_iter_values((0..rows).map(|i| 7.5 + i as f64));
    RecordBatch::try_new(
        schema,
        vec![Arc::new(ids), Arc::new(cities), Arc::new(fares)],
    )
    .expect("valid batch")
}

/// Values of the `trip_id` column.
pub fn trip_ids(batch: &RecordBatch) -> Vec<i64> {
    batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .expect("trip_id is bigint")
        .values()
        .to_vec()
}
