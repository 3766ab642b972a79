use crate::error::{CatalogError, Result};
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const PICK_UNVISITED: &str =
    "SELECT id FROM references_catalog WHERE visited = 0 ORDER BY RANDOM() LIMIT 1";

/// The four operations the pipeline needs from a catalog.
///
/// Implementations must serialize mutations: `pick_unvisited` is a single
/// logical operation even when it has to reset the flags and pick again.
pub trait CatalogStore: Send + Sync {
    /// Add an unvisited reference. Fails with `DuplicateKey` if it exists.
    fn insert(&self, id: &str) -> Result<()>;

    /// Insert every id, skipping duplicates instead of stopping on them.
    fn insert_batch(&self, ids: &[String]) -> Result<BatchInsert> {
        let mut report = BatchInsert::default();
        for id in ids {
            match self.insert(id) {
                Ok(()) => report.inserted += 1,
                Err(CatalogError::DuplicateKey(dup)) => report.duplicates.push(dup),
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// A random unvisited reference. When everything has been visited the
    /// flags are cleared and the pick is retried once. `None` only for an
    /// empty catalog.
    fn pick_unvisited(&self) -> Result<Option<String>>;

    /// Flag a reference as visited, returning the number of rows touched.
    fn mark_visited(&self, id: &str) -> Result<usize>;
}

/// Result of a batch insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInsert {
    pub inserted: usize,
    pub duplicates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub visited: bool,
}

/// SQLite-backed catalog of references and their visited flags.
pub struct Catalog {
    conn: Mutex<Connection>,
}

impl Catalog {
    pub fn drop(path: &Path) -> Result<()> {
        fs::remove_file(path)?;
        Ok(())
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS references_catalog (
                id TEXT PRIMARY KEY NOT NULL,
                visited INTEGER NOT NULL DEFAULT 0 CHECK (visited IN (0, 1))
            );
            CREATE INDEX IF NOT EXISTS idx_references_visited ON references_catalog(visited);
            ",
        )?;

        Ok(Catalog {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    /// Clear every visited flag.
    pub fn reset_visited(&self) -> Result<usize> {
        let conn = self.lock()?;
        clear_visited(&conn)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM references_catalog", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn unvisited_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM references_catalog WHERE visited = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_visited(&self, id: &str) -> Result<Option<bool>> {
        let conn = self.lock()?;
        let visited = conn
            .query_row(
                "SELECT visited FROM references_catalog WHERE id = ?1",
                params![id],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;
        Ok(visited)
    }

    /// Every reference, ordered by id.
    pub fn list(&self) -> Result<Vec<Reference>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, visited FROM references_catalog ORDER BY id")?;

        let references = stmt
            .query_map([], |row| {
                Ok(Reference {
                    id: row.get(0)?,
                    visited: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(references)
    }
}

impl CatalogStore for Catalog {
    fn insert(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        insert_reference(&conn, id)
    }

    fn insert_batch(&self, ids: &[String]) -> Result<BatchInsert> {
        info!("Adding {} references", ids.len());
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut report = BatchInsert::default();
        for id in ids {
            match insert_reference(&tx, id) {
                Ok(()) => report.inserted += 1,
                Err(CatalogError::DuplicateKey(dup)) => report.duplicates.push(dup),
                Err(e) => return Err(e),
            }
        }
        tx.commit()?;

        if !report.duplicates.is_empty() {
            warn!("{} duplicate references skipped", report.duplicates.len());
        }
        Ok(report)
    }

    fn pick_unvisited(&self) -> Result<Option<String>> {
        debug!("Picking random unvisited reference");
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut picked = pick(&tx)?;
        if picked.is_none() {
            // Everything has been visited (or nothing is there); recycle.
            clear_visited(&tx)?;
            picked = pick(&tx)?;
        }
        tx.commit()?;

        match &picked {
            Some(id) => debug!("Picked reference '{}'", id),
            None => info!("Catalog is empty"),
        }
        Ok(picked)
    }

    fn mark_visited(&self, id: &str) -> Result<usize> {
        debug!("Marking reference '{}' as visited", id);
        let conn = self.lock()?;
        let rows = conn.execute(
            "UPDATE references_catalog SET visited = 1 WHERE id = ?1",
            params![id],
        )?;
        if rows != 1 {
            warn!(
                "Marked {} rows as visited when marking reference '{}'",
                rows, id
            );
        }
        Ok(rows)
    }
}

fn insert_reference(conn: &Connection, id: &str) -> Result<()> {
    debug!("Adding reference '{}'", id);
    match conn.execute(
        "INSERT INTO references_catalog (id, visited) VALUES (?1, 0)",
        params![id],
    ) {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(CatalogError::DuplicateKey(id.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn pick(conn: &Connection) -> Result<Option<String>> {
    let id = conn
        .query_row(PICK_UNVISITED, [], |row| row.get(0))
        .optional()?;
    Ok(id)
}

fn clear_visited(conn: &Connection) -> Result<usize> {
    let rows = conn.execute("UPDATE references_catalog SET visited = 0", [])?;
    info!("{} visited flags cleared", rows);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_duplicate_leaves_row_intact() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.insert("abc").unwrap();
        catalog.mark_visited("abc").unwrap();

        let err = catalog.insert("abc").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKey(ref id) if id == "abc"));
        assert_eq!(catalog.is_visited("abc").unwrap(), Some(true));
        assert_eq!(catalog.len().unwrap(), 1);
    }

    #[test]
    fn test_default_batch_insert_matches_override() {
        struct Wrapped(Catalog);
        impl CatalogStore for Wrapped {
            fn insert(&self, id: &str) -> Result<()> {
                self.0.insert(id)
            }
            fn pick_unvisited(&self) -> Result<Option<String>> {
                self.0.pick_unvisited()
            }
            fn mark_visited(&self, id: &str) -> Result<usize> {
                self.0.mark_visited(id)
            }
        }

        let ids: Vec<String> = ["a", "b", "a", "c"].iter().map(|s| s.to_string()).collect();

        let wrapped = Wrapped(Catalog::open_in_memory().unwrap());
        let direct = Catalog::open_in_memory().unwrap();

        assert_eq!(
            wrapped.insert_batch(&ids).unwrap(),
            direct.insert_batch(&ids).unwrap()
        );
    }

    #[test]
    fn test_pick_on_empty_catalog() {
        let catalog = Catalog::open_in_memory().unwrap();
        assert_eq!(catalog.pick_unvisited().unwrap(), None);
    }
}
