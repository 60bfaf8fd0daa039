use anyhow::Context;
use goalboard_protocol::{Goal, User};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

const DEMO_GOALS: &[(&str, i64, bool)] = &[
    ("Read one chapter a day", 30, false),
    ("Practice typing", 14, true),
    ("Finish the stage 1 quiz", 5, false),
];

#[derive(Debug, Clone)]
pub struct Engine {
    db_path: PathBuf,
}

impl Engine {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn open(&self) -> anyhow::Result<Connection> {
        let path = self.db_path.clone();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create db dir: {}", dir.display()))?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("open sqlite db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        migrate(&conn)?;
        Ok(conn)
    }

    pub fn list_goals(&self) -> anyhow::Result<Vec<Goal>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare("SELECT goal, days, completed FROM goals ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Goal {
                goal: row.get(0)?,
                days: row.get(1)?,
                completed: row.get(2)?,
            })
        })?;
        let goals = rows.collect::<Result<Vec<_>, _>>().context("read goals")?;
        Ok(goals)
    }

    pub fn create_goal(&self, goal: &str, days: i64, completed: bool) -> anyhow::Result<Goal> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO goals (goal, days, completed, created_at_ms) VALUES (?1, ?2, ?3, ?4)",
            (goal, days, completed, now_ms()),
        )
        .context("insert goal")?;
        Ok(Goal::new(goal, days, completed))
    }

    pub fn set_goal_completed(&self, id: i64, completed: bool) -> anyhow::Result<bool> {
        let conn = self.open()?;
        let n = conn.execute(
            "UPDATE goals SET completed = ?2 WHERE id = ?1",
            (id, completed),
        )?;
        Ok(n > 0)
    }

    pub fn create_user(&self, username: &str, email: Option<&str>) -> anyhow::Result<i64> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO users (username, email, created_at_ms) VALUES (?1, ?2, ?3)",
            (username, email, now_ms()),
        )
        .context("insert user")?;
        Ok(conn.last_insert_rowid())
    }

    /// Looks a user up by primary key. Every column of the row is returned
    /// under its own name.
    pub fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let user = stmt
            .query_row([id], |row| {
                let mut user = User::new();
                for (i, name) in names.iter().enumerate() {
                    user.insert(name.clone(), column_json(row.get_ref(i)?));
                }
                Ok(user)
            })
            .optional()
            .with_context(|| format!("query user {id}"))?;
        Ok(user)
    }

    /// Inserts the demo goal list when the table is empty.
    pub fn seed_demo(&self) -> anyhow::Result<usize> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM goals", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }
        let ts = now_ms();
        for (goal, days, completed) in DEMO_GOALS {
            tx.execute(
                "INSERT INTO goals (goal, days, completed, created_at_ms) VALUES (?1, ?2, ?3, ?4)",
                (goal, days, completed, ts),
            )?;
        }
        tx.commit()?;
        tracing::info!(count = DEMO_GOALS.len(), "seeded demo goals");
        Ok(DEMO_GOALS.len())
    }
}

fn column_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => i.into(),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned().into(),
        ValueRef::Blob(b) => b.iter().map(|&byte| serde_json::Value::from(byte)).collect(),
    }
}

fn migrate(conn: &Connection) -> anyhow::Result<()> {
    let v: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if v < 1 {
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY,
  username TEXT NOT NULL,
  email TEXT,
  created_at_ms INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS goals (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  goal TEXT NOT NULL,
  days INTEGER NOT NULL,
  completed INTEGER NOT NULL DEFAULT 0,
  created_at_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_goals_completed ON goals(completed);
"#,
        )
        .context("migrate v1")?;

        conn.pragma_update(None, "user_version", 1_i64)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_engine() -> Engine {
        let p = std::env::temp_dir().join(format!(
            "goalboard-engine-test-{}.db",
            time::OffsetDateTime::now_utc().unix_timestamp_nanos()
        ));
        let engine = Engine::new(p);
        let _ = engine.open().expect("open db");
        engine
    }

    #[test]
    fn goals_come_back_in_insert_order() {
        let engine = temp_engine();
        engine.create_goal("Learn X", 5, false).unwrap();
        engine.create_goal("Learn Y", 2, true).unwrap();

        let goals = engine.list_goals().unwrap();
        assert_eq!(
            goals,
            vec![Goal::new("Learn X", 5, false), Goal::new("Learn Y", 2, true)]
        );
    }

    #[test]
    fn set_goal_completed_reports_missing_rows() {
        let engine = temp_engine();
        engine.create_goal("Learn X", 5, false).unwrap();

        assert!(engine.set_goal_completed(1, true).unwrap());
        assert!(!engine.set_goal_completed(99, true).unwrap());
        assert!(engine.list_goals().unwrap()[0].completed);
    }

    #[test]
    fn get_user_returns_every_column() {
        let engine = temp_engine();
        let id = engine.create_user("ada", Some("ada@example.com")).unwrap();

        let user = engine.get_user(id).unwrap().expect("user");
        assert_eq!(user["id"], id);
        assert_eq!(user["username"], "ada");
        assert_eq!(user["email"], "ada@example.com");
        assert!(user.contains_key("created_at_ms"));
    }

    #[test]
    fn get_user_missing_is_none() {
        let engine = temp_engine();
        assert!(engine.get_user(42).unwrap().is_none());
    }

    #[test]
    fn seed_demo_only_fills_empty_table() {
        let engine = temp_engine();
        let n = engine.seed_demo().unwrap();
        assert_eq!(n, DEMO_GOALS.len());
        assert_eq!(engine.seed_demo().unwrap(), 0);
        assert_eq!(engine.list_goals().unwrap().len(), DEMO_GOALS.len());
    }

    #[test]
    fn open_creates_missing_parent_dir() {
        let dir = std::env::temp_dir().join(format!(
            "goalboard-engine-nested-{}",
            time::OffsetDateTime::now_utc().unix_timestamp_nanos()
        ));
        let engine = Engine::new(dir.join("data").join("goalboard.db"));
        assert_eq!(engine.db_path(), dir.join("data").join("goalboard.db"));

        engine.open().unwrap();
        assert!(engine.db_path().exists());
    }

    #[test]
    fn reopen_keeps_schema_version() {
        let engine = temp_engine();
        let conn = engine.open().unwrap();
        let v: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(v, 1);
    }
}
