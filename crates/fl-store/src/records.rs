use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use fl_simulation::Retirement;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::pool::ConnectionPool;

/// Largest leaderboard page served at once.
pub const MAX_PAGE: usize = 100;

/// A retired player on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player name.
    pub name: String,
    /// Final score.
    pub score: u64,
    /// Time in the game, in milliseconds.
    pub play_time_ms: u64,
}

impl PlayerRecord {
    /// Time in the game.
    pub fn play_time(&self) -> Duration {
        Duration::from_millis(self.play_time_ms)
    }
}

impl From<&Retirement> for PlayerRecord {
    fn from(r: &Retirement) -> Self {
        Self {
            name: r.name.clone(),
            score: r.score,
            play_time_ms: u64::try_from(r.play_time.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Where retired players go.
///
/// Pages are ordered by score (highest first), then play time (shortest
/// first), then name.
pub trait LeaderboardSink: Send {
    /// Store a batch of records, all or nothing.
    fn record(&self, records: &[PlayerRecord]) -> StoreResult<()>;

    /// One page of the leaderboard. `limit` may not exceed [`MAX_PAGE`].
    fn top(&self, offset: usize, limit: usize) -> StoreResult<Vec<PlayerRecord>>;
}

fn check_limit(limit: usize) -> StoreResult<()> {
    if limit > MAX_PAGE {
        return Err(StoreError::LimitTooLarge {
            requested: limit,
            max: MAX_PAGE,
        });
    }
    Ok(())
}

fn to_sql(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// The leaderboard kept in an SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteLeaderboard {
    pool: ConnectionPool<Connection>,
}

impl SqliteLeaderboard {
    /// Open (or create) the database at `path` with `pool_size` connections.
    pub fn open(path: impl AsRef<Path>, pool_size: usize) -> StoreResult<Self> {
        let path = path.as_ref();
        let pool = ConnectionPool::new(pool_size, || {
            let conn = Connection::open(path)?;
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            Ok(conn)
        })?;
        let board = Self { pool };
        board.migrate()?;
        tracing::info!(path = %path.display(), pool_size, "leaderboard opened");
        Ok(board)
    }

    /// A private in-memory database on a single connection.
    pub fn in_memory() -> StoreResult<Self> {
        let pool = ConnectionPool::new(1, || Ok(Connection::open_in_memory()?))?;
        let board = Self { pool };
        board.migrate()?;
        Ok(board)
    }

    fn migrate(&self) -> StoreResult<()> {
        let conn = self.pool.get();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS hall_of_fame (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                play_time_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS hall_of_fame_rank
                ON hall_of_fame (score DESC, play_time_ms ASC, name ASC);
            ",
        )?;
        Ok(())
    }
}

impl LeaderboardSink for SqliteLeaderboard {
    fn record(&self, records: &[PlayerRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO hall_of_fame (name, score, play_time_ms) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.name,
                    to_sql(record.score),
                    to_sql(record.play_time_ms)
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = records.len(), "player records stored");
        Ok(())
    }

    fn top(&self, offset: usize, limit: usize) -> StoreResult<Vec<PlayerRecord>> {
        check_limit(limit)?;
        let conn = self.pool.get();
        let mut stmt = conn.prepare(
            "SELECT name, score, play_time_ms
             FROM hall_of_fame
             ORDER BY score DESC, play_time_ms ASC, name ASC
             LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(
            params![to_sql(limit as u64), to_sql(offset as u64)],
            |row| {
                Ok(PlayerRecord {
                    name: row.get(0)?,
                    score: u64::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
                    play_time_ms: u64::try_from(row.get::<_, i64>(2)?).unwrap_or(0),
                })
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

/// A leaderboard that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    records: Mutex<Vec<PlayerRecord>>,
}

impl MemoryLeaderboard {
    /// An empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardSink for MemoryLeaderboard {
    fn record(&self, records: &[PlayerRecord]) -> StoreResult<()> {
        let mut all = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        all.extend_from_slice(records);
        all.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.play_time_ms.cmp(&b.play_time_ms))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(())
    }

    fn top(&self, offset: usize, limit: usize) -> StoreResult<Vec<PlayerRecord>> {
        check_limit(limit)?;
        let all = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(all.iter().skip(offset).take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, score: u64, play_time_ms: u64) -> PlayerRecord {
        PlayerRecord {
            name: name.into(),
            score,
            play_time_ms,
        }
    }

    fn sample() -> Vec<PlayerRecord> {
        vec![
            rec("carol", 10, 5_000),
            rec("alice", 30, 9_000),
            rec("bob", 10, 5_000),
            rec("dave", 10, 2_000),
            rec("erin", 0, 1_000),
        ]
    }

    fn names(records: &[PlayerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn check_ordering(board: &dyn LeaderboardSink) {
        board.record(&sample()).unwrap();
        let top = board.top(0, MAX_PAGE).unwrap();
        assert_eq!(names(&top), ["alice", "dave", "bob", "carol", "erin"]);

        let page = board.top(1, 2).unwrap();
        assert_eq!(names(&page), ["dave", "bob"]);
        assert!(board.top(10, 5).unwrap().is_empty());
    }

    #[test]
    fn sqlite_orders_by_score_then_time_then_name() {
        check_ordering(&SqliteLeaderboard::in_memory().unwrap());
    }

    #[test]
    fn memory_orders_by_score_then_time_then_name() {
        check_ordering(&MemoryLeaderboard::new());
    }

    #[test]
    fn page_size_is_limited() {
        let board = SqliteLeaderboard::in_memory().unwrap();
        assert!(board.top(0, MAX_PAGE).is_ok());
        assert!(matches!(
            board.top(0, MAX_PAGE + 1),
            Err(StoreError::LimitTooLarge { requested: 101, max: 100 })
        ));
        assert!(MemoryLeaderboard::new().top(0, 1000).is_err());
    }

    #[test]
    fn records_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        {
            let board = SqliteLeaderboard::open(&path, 2).unwrap();
            board.record(&[rec("rex", 42, 61_000)]).unwrap();
        }
        let board = SqliteLeaderboard::open(&path, 1).unwrap();
        let top = board.top(0, 10).unwrap();
        assert_eq!(top, vec![rec("rex", 42, 61_000)]);
        assert_eq!(top[0].play_time(), Duration::from_millis(61_000));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let board = SqliteLeaderboard::in_memory().unwrap();
        board.record(&[]).unwrap();
        assert!(board.top(0, 10).unwrap().is_empty());
    }

    #[test]
    fn record_from_retirement() {
        let retirement = Retirement {
            dog: fl_simulation::DogId(1),
            name: "Rex".into(),
            score: 12,
            play_time: Duration::from_millis(3_456),
        };
        assert_eq!(PlayerRecord::from(&retirement), rec("Rex", 12, 3_456));
    }
}
