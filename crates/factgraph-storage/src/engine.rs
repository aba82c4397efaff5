//! SqliteFactStore: `IFactStore` over the connection pool.

use std::path::Path;

use rusqlite::{Transaction, TransactionBehavior};
use tracing::{debug, info};

use factgraph_core::config::StorageConfig;
use factgraph_core::errors::StoreError;
use factgraph_core::models::{
    AtomicFact, FactId, FactKey, InvalidationEdge, LifecycleDelta, Transition,
};
use factgraph_core::traits::{FactScope, IFactStore, UpdateOutcome};
use factgraph_core::{FactGraphError, FactGraphResult, KeyLocks};

use crate::pool::ConnectionPool;
use crate::queries::{edge_ops, fact_ops};
use crate::to_store_err;

pub struct SqliteFactStore {
    pool: ConnectionPool,
    locks: KeyLocks,
}

impl SqliteFactStore {
    pub fn open(path: &Path, read_pool_size: usize) -> FactGraphResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        info!(path = %path.display(), readers = pool.reader_count(), "opened sqlite fact store");
        Ok(Self {
            pool,
            locks: KeyLocks::new(),
        })
    }

    pub fn open_in_memory() -> FactGraphResult<Self> {
        Ok(Self {
            pool: ConnectionPool::open_in_memory()?,
            locks: KeyLocks::new(),
        })
    }

    /// File-backed when `db_path` is set, in-memory otherwise.
    pub fn from_config(config: &StorageConfig) -> FactGraphResult<Self> {
        match &config.db_path {
            Some(path) => Self::open(Path::new(path), config.read_pool_size),
            None => Self::open_in_memory(),
        }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl IFactStore for SqliteFactStore {
    fn key_locks(&self) -> &KeyLocks {
        &self.locks
    }

    fn append(&self, fact: &AtomicFact) -> FactGraphResult<()> {
        fact.validate()?;
        self.pool.with_writer(|conn| fact_ops::insert_fact(conn, fact))?;
        debug!(fact_id = %fact.id(), key = %fact.key(), "fact appended");
        Ok(())
    }

    fn get(&self, id: FactId) -> FactGraphResult<Option<AtomicFact>> {
        self.pool.with_reader(|conn| fact_ops::get_fact(conn, id))
    }

    fn find_by_subject_predicate(
        &self,
        key: &FactKey,
        scope: FactScope,
    ) -> FactGraphResult<Vec<AtomicFact>> {
        self.pool
            .with_reader(|conn| fact_ops::facts_by_key(conn, key, scope))
    }

    fn update(&self, id: FactId, delta: &LifecycleDelta) -> FactGraphResult<UpdateOutcome> {
        self.pool.with_writer(|conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
                .map_err(to_store_err)?;

            let current = fact_ops::get_fact(&tx, id)?.ok_or_else(|| {
                FactGraphError::Store(StoreError::FactNotFound {
                    fact_id: id.to_string(),
                })
            })?;

            let next = match current.apply(delta)? {
                Transition::Applied(next) => next,
                Transition::AlreadyInvalidated(_) => {
                    return Ok(UpdateOutcome::AlreadyInvalidated { current });
                }
            };

            if fact_ops::write_lifecycle(&tx, &next)? == 0 {
                // Another process invalidated the row between read and write.
                let current = fact_ops::get_fact(&tx, id)?.ok_or_else(|| {
                    FactGraphError::Store(StoreError::FactNotFound {
                        fact_id: id.to_string(),
                    })
                })?;
                return Ok(UpdateOutcome::AlreadyInvalidated { current });
            }

            tx.commit().map_err(to_store_err)?;
            Ok(UpdateOutcome::Applied(next))
        })
    }

    fn append_edge(&self, edge: &InvalidationEdge) -> FactGraphResult<()> {
        self.pool.with_writer(|conn| edge_ops::insert_edge(conn, edge))
    }

    fn edges_from(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
        self.pool.with_reader(|conn| edge_ops::edges_from(conn, id))
    }

    fn edges_to(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
        self.pool.with_reader(|conn| edge_ops::edges_to(conn, id))
    }

    fn fact_count(&self) -> FactGraphResult<usize> {
        self.pool.with_reader(fact_ops::count_facts)
    }
}
