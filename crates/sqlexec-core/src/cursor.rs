//! Forward-only cursor over one fetched Arrow batch.
//!
//! Slices share the batch's buffers, so handing out rows never copies column
//! data. The cursor is single-consumer: every method that moves it takes
//! `&mut self`.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

/// Window `[position, valid_row_count)` over a materialized batch.
///
/// Invariant: `position <= valid_row_count <= batch.num_rows()`, and
/// `position` never decreases.
#[derive(Debug, Clone)]
pub struct ResultCursor {
    batch: RecordBatch,
    valid_row_count: usize,
    position: usize,
}

impl ResultCursor {
    /// Cursor over `batch`, serving rows `[start_row_index, valid_row_count)`.
    ///
    /// `valid_row_count` is capped at the batch size and `start_row_index` at
    /// `valid_row_count`, so out-of-range inputs yield a shorter (or already
    /// exhausted) cursor instead of a panic later on.
    pub fn new(batch: RecordBatch, valid_row_count: usize, start_row_index: usize) -> Self {
        let valid_row_count = valid_row_count.min(batch.num_rows());
        let position = start_row_index.min(valid_row_count);
        if valid_row_count < batch.num_rows() {
            tracing::trace!(
                valid_row_count,
                batch_rows = batch.num_rows(),
                "cursor ignores trailing rows of batch"
            );
        }
        Self {
            batch,
            valid_row_count,
            position,
        }
    }

    /// Cursor over every row of `batch`.
    pub fn from_batch(batch: RecordBatch) -> Self {
        let rows = batch.num_rows();
        Self::new(batch, rows, 0)
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn valid_row_count(&self) -> usize {
        self.valid_row_count
    }

    /// Offset of the next row to be returned.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rows still available from this batch.
    pub fn remaining(&self) -> usize {
        self.valid_row_count - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position == self.valid_row_count
    }

    /// Up to the next `n` rows. Returns fewer (possibly zero) rows when the
    /// cursor runs out; never fails.
    pub fn next_rows(&mut self, n: usize) -> RecordBatch {
        let take = n.min(self.remaining());
        let slice = self.batch.slice(self.position, take);
        self.position += take;
        slice
    }

    /// All remaining rows; the cursor is exhausted afterwards.
    pub fn remaining_rows(&mut self) -> RecordBatch {
        self.next_rows(self.remaining())
    }

    /// Iterator draining the cursor in non-empty slices of at most `size` rows.
    pub fn batches(&mut self, size: usize) -> RowBatches<'_> {
        RowBatches { cursor: self, size }
    }
}

/// Iterator returned by [`ResultCursor::batches`].
#[derive(Debug)]
pub struct RowBatches<'a> {
    cursor: &'a mut ResultCursor,
    size: usize,
}

impl Iterator for RowBatches<'_> {
    type Item = RecordBatch;

    fn next(&mut self) -> Option<RecordBatch> {
        if self.size == 0 || self.cursor.is_exhausted() {
            return None;
        }
        Some(self.cursor.next_rows(self.size))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.size == 0 {
            return (0, Some(0));
        }
        let n = self.cursor.remaining().div_ceil(self.size);
        (n, Some(n))
    }
}
