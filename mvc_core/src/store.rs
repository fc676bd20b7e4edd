use tracing::trace;

use crate::error::{MeasureError, Result};
use crate::format::MeasureValue;

/// In-memory random-access store for one decoded measure chunk.
///
/// # Usage contract
/// Built with [`with_rows`](Self::with_rows), filled once with
/// [`put_data`](Self::put_data), then read any number of times through `&self`.
/// [`free_memory`](Self::free_memory) releases the backing array; it takes
/// `&mut self`, so it can never race with outstanding reads.
///
/// Reads are not bounds-checked beyond ordinary slice indexing: an index
/// outside `[0, row_count)`, or any read after `free_memory`, panics.
#[derive(Debug)]
pub struct MeasureStore<T> {
    data: Vec<T>,
    row_count: usize,
    freed: bool,
}

impl<T> Default for MeasureStore<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            row_count: 0,
            freed: false,
        }
    }
}

impl<T: MeasureValue> MeasureStore<T> {
    /// Create an empty store sized for `row_count` elements.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            data: Vec::new(),
            row_count,
            freed: false,
        }
    }

    /// Take ownership of the decoded elements.
    pub fn put_data(&mut self, data: Vec<T>) -> Result<()> {
        if data.len() != self.row_count {
            return Err(MeasureError::InvalidMetadata(format!(
                "store sized for {} rows was given {} values",
                self.row_count,
                data.len()
            )));
        }
        self.data = data;
        self.freed = false;
        Ok(())
    }

    /// Element at `index`.
    ///
    /// # Panics
    /// If `index >= row_count` or the store has been freed.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        self.data[index]
    }

    /// Release the backing array. Calling it again is a no-op.
    pub fn free_memory(&mut self) {
        if self.freed {
            return;
        }
        let released = std::mem::take(&mut self.data);
        trace!(rows = released.len(), "released measure store");
        self.freed = true;
    }

    /// Declared row count, unaffected by `free_memory`.
    #[inline]
    pub fn len(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn is_freed(&self) -> bool {
        self.freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut store = MeasureStore::<f64>::with_rows(3);
        store.put_data(vec![225.0, 75.0, 0.0]).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0), 225.0);
        assert_eq!(store.get(2), 0.0);
    }

    #[test]
    fn test_put_rejects_wrong_length() {
        let mut store = MeasureStore::<i64>::with_rows(2);
        let err = store.put_data(vec![1]).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut store = MeasureStore::<f64>::with_rows(1);
        store.put_data(vec![1.5]).unwrap();
        store.free_memory();
        store.free_memory();
        assert!(store.is_freed());
        assert_eq!(store.len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_read_after_free_panics() {
        let mut store = MeasureStore::<f64>::with_rows(1);
        store.put_data(vec![1.5]).unwrap();
        store.free_memory();
        let _ = store.get(0);
    }
}
