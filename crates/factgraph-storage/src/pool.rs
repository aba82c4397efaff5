//! Connection pool: one writer plus N read-only readers, round-robin.
//!
//! The only place in this crate that holds `Mutex<Connection>`.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use factgraph_core::{FactGraphError, FactGraphResult};

use crate::{migrations, pragmas, to_store_err};

const DEFAULT_READ_POOL_SIZE: usize = 2;

pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

impl ConnectionPool {
    /// Open a file-backed pool. The writer runs pending migrations before any
    /// reader is opened.
    pub fn open(path: &Path, read_pool_size: usize) -> FactGraphResult<Self> {
        let pool_size = if read_pool_size == 0 {
            DEFAULT_READ_POOL_SIZE
        } else {
            read_pool_size
        };

        let writer = Connection::open(path).map_err(to_store_err)?;
        pragmas::configure_connection(&writer)?;
        migrations::run_migrations(&writer)?;

        let mut readers = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let reader = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(to_store_err)?;
            pragmas::configure_readonly_connection(&reader)?;
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Single in-memory connection; reads go through the writer.
    pub fn open_in_memory() -> FactGraphResult<Self> {
        let writer = Connection::open_in_memory().map_err(to_store_err)?;
        pragmas::configure_connection(&writer)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    pub fn with_writer<F, T>(&self, f: F) -> FactGraphResult<T>
    where
        F: FnOnce(&Connection) -> FactGraphResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| FactGraphError::ConcurrencyError(format!("writer lock poisoned: {e}")))?;
        f(&conn)
    }

    /// Falls back to the writer when there are no readers (in-memory mode).
    pub fn with_reader<F, T>(&self, f: F) -> FactGraphResult<T>
    where
        F: FnOnce(&Connection) -> FactGraphResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }

        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index]
            .lock()
            .map_err(|e| FactGraphError::ConcurrencyError(format!("reader lock poisoned: {e}")))?;
        f(&conn)
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    pub fn is_wal_mode(&self) -> bool {
        self.with_writer(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(to_store_err)?;
            Ok(mode.eq_ignore_ascii_case("wal"))
        })
        .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_pool_uses_wal_and_requested_readers() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("facts.db"), 3).unwrap();
        assert!(pool.is_wal_mode());
        assert_eq!(pool.reader_count(), 3);
    }

    #[test]
    fn zero_readers_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("facts.db"), 0).unwrap();
        assert_eq!(pool.reader_count(), DEFAULT_READ_POOL_SIZE);
    }

    #[test]
    fn readers_cannot_write() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("facts.db"), 1).unwrap();
        let result = pool.with_reader(|conn| {
            conn.execute("DELETE FROM schema_version", [])
                .map_err(to_store_err)
        });
        assert!(result.is_err());
    }
}
