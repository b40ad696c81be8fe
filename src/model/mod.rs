//! Book records and the storage seam
//!
//! Each RPC backend owns exactly one store; nothing is shared across
//! processes. The trait separates "no such key" (`Ok(None)`) from genuine
//! storage failures (`Err`), and callers must preserve that distinction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::common::Result;

/// A single priced book. `book` is the sole identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub book: String,
    pub price: f64,
}

/// Storage backend for book records.
pub trait BookStore: Send + Sync {
    fn insert(&self, record: BookRecord) -> Result<()>;

    /// `Ok(None)` is the explicit lookup-miss signal; `Err` is always a
    /// real storage failure. The two never collapse into each other.
    fn find_one(&self, book: &str) -> Result<Option<BookRecord>>;
}

/// In-memory store (default). Duplicate inserts are last-write-wins.
pub struct MemBookStore {
    records: Mutex<HashMap<String, BookRecord>>,
}

impl MemBookStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemBookStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookStore for MemBookStore {
    fn insert(&self, record: BookRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.book.clone(), record);
        Ok(())
    }

    fn find_one(&self, book: &str) -> Result<Option<BookRecord>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(book).cloned())
    }
}
