//! Persistence of the voter roll.
//!
//! The roll is written once (`seed_if_empty`) and only read afterwards.

use crate::viewer::*;

use rusqlite::{params, Connection};
use std::collections::HashSet;

pub trait RecordStore {
    fn ensure_schema(&mut self) -> ViewerResult<()>;

    fn is_populated(&self) -> ViewerResult<bool>;

    /// Writes the records if the store is empty, keeping the first record of
    /// each id. Returns the number of records written: 0 if the store was
    /// already populated.
    fn seed_if_empty(&mut self, records: &[VoterRecord]) -> ViewerResult<usize>;

    /// All the records, in increasing id order.
    fn fetch_all(&self) -> ViewerResult<Vec<VoterRecord>>;

    fn fetch_filtered(
        &self,
        predicate: &dyn Fn(&VoterRecord) -> bool,
    ) -> ViewerResult<Vec<VoterRecord>> {
        Ok(self
            .fetch_all()?
            .into_iter()
            .filter(|r| predicate(r))
            .collect())
    }
}

/// Keeps the roll for the duration of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<VoterRecord>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl RecordStore for MemoryStore {
    fn ensure_schema(&mut self) -> ViewerResult<()> {
        Ok(())
    }

    fn is_populated(&self) -> ViewerResult<bool> {
        Ok(!self.records.is_empty())
    }

    fn seed_if_empty(&mut self, records: &[VoterRecord]) -> ViewerResult<usize> {
        if !self.records.is_empty() {
            return Ok(0);
        }
        let mut seen: HashSet<VoterId> = HashSet::new();
        self.records = records
            .iter()
            .filter(|r| seen.insert(r.id))
            .cloned()
            .collect();
        self.records.sort_by_key(|r| r.id);
        Ok(self.records.len())
    }

    fn fetch_all(&self) -> ViewerResult<Vec<VoterRecord>> {
        Ok(self.records.clone())
    }
}

const CREATE_VOTERS: &str = "CREATE TABLE IF NOT EXISTS voters (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    secret TEXT NOT NULL,
    age INTEGER NOT NULL,
    area TEXT NOT NULL,
    eligible INTEGER NOT NULL,
    senior INTEGER NOT NULL,
    voted_for INTEGER
);";

/// Keeps the roll in a single `voters` table of an SQLite database.
///
/// Rows read back are checked against the age thresholds of `rules`: a roll
/// stored under other thresholds is reported as corrupt.
pub struct SqliteStore {
    conn: Connection,
    path: String,
    rules: RollRules,
}

// A row as stored, before checking that it describes a valid voter.
struct StoredRow {
    id: i64,
    name: String,
    secret: String,
    age: i64,
    area: String,
    eligible: bool,
    senior: bool,
    voted_for: Option<i64>,
}

impl StoredRow {
    fn into_record(self, rules: &RollRules) -> ViewerResult<VoterRecord> {
        let id = self.id;
        let invalid = |reason: &str| CorruptRecordSnafu { id, reason }.fail();
        let voter_id = match VoterId::try_from(id) {
            Ok(x) => x,
            _ => return invalid("the id is not a positive integer"),
        };
        let age = match u32::try_from(self.age) {
            Ok(x) => x,
            Err(_) => return invalid("the age is negative or too large"),
        };
        let voted_for = match self.voted_for.map(u32::try_from) {
            None => None,
            Some(Ok(cid)) => Some(CandidateId(cid)),
            Some(Err(_)) => return invalid("the candidate id is out of range"),
        };
        let record = VoterRecord {
            id: voter_id,
            name: self.name,
            secret: self.secret,
            age,
            area: self.area,
            eligible: self.eligible,
            senior: self.senior,
            voted_for,
        };
        match rules.record_violation(&record) {
            Some(reason) => invalid(reason),
            None => Ok(record),
        }
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`. `:memory:` opens a private
    /// in-memory database.
    pub fn open(path: &str, rules: &RollRules) -> ViewerResult<SqliteStore> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .context(DatabaseSnafu { path })?;
        debug!("SqliteStore: opened {}", path);
        Ok(SqliteStore {
            conn,
            path: path.to_string(),
            rules: rules.clone(),
        })
    }

    pub fn count(&self) -> ViewerResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM voters", [], |row| row.get(0))
            .context(DatabaseSnafu { path: &self.path })
    }
}

impl RecordStore for SqliteStore {
    fn ensure_schema(&mut self) -> ViewerResult<()> {
        self.conn
            .execute_batch(CREATE_VOTERS)
            .context(DatabaseSnafu { path: &self.path })
    }

    fn is_populated(&self) -> ViewerResult<bool> {
        Ok(self.count()? > 0)
    }

    fn seed_if_empty(&mut self, records: &[VoterRecord]) -> ViewerResult<usize> {
        let existing = self.count()?;
        if existing > 0 {
            debug!(
                "SqliteStore: {} voters already stored, skipping the seed",
                existing
            );
            return Ok(0);
        }
        // One transaction: either the whole roll is written, or nothing.
        let tx = self
            .conn
            .transaction()
            .context(DatabaseSnafu { path: &self.path })?;
        let mut inserted: usize = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO voters (id, name, secret, age, area, eligible, senior, voted_for)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .context(DatabaseSnafu { path: &self.path })?;
            for r in records {
                inserted += stmt
                    .execute(params![
                        r.id,
                        r.name,
                        r.secret,
                        r.age,
                        r.area,
                        r.eligible,
                        r.senior,
                        r.voted_for.map(|cid| cid.0),
                    ])
                    .context(DatabaseSnafu { path: &self.path })?;
            }
        }
        tx.commit().context(DatabaseSnafu { path: &self.path })?;
        Ok(inserted)
    }

    fn fetch_all(&self) -> ViewerResult<Vec<VoterRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, secret, age, area, eligible, senior, voted_for
                 FROM voters ORDER BY id",
            )
            .context(DatabaseSnafu { path: &self.path })?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    secret: row.get(2)?,
                    age: row.get(3)?,
                    area: row.get(4)?,
                    eligible: row.get(5)?,
                    senior: row.get(6)?,
                    voted_for: row.get(7)?,
                })
            })
            .context(DatabaseSnafu { path: &self.path })?;
        let mut records: Vec<VoterRecord> = Vec::new();
        for row in rows {
            let row = row.context(DatabaseSnafu { path: &self.path })?;
            records.push(row.into_record(&self.rules)?);
        }
        Ok(records)
    }
}
