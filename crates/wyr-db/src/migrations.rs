use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                user_id         INTEGER PRIMARY KEY,
                coins           INTEGER NOT NULL DEFAULT 0,
                streak          INTEGER NOT NULL DEFAULT 0 CHECK (streak >= 0),
                last_vote_date  TEXT,
                total_votes     INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE questions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                question    TEXT NOT NULL,
                option_a    TEXT NOT NULL,
                option_b    TEXT NOT NULL,
                category    TEXT NOT NULL DEFAULT 'General',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE votes (
                user_id     INTEGER NOT NULL REFERENCES users(user_id),
                question_id INTEGER NOT NULL REFERENCES questions(id),
                choice      TEXT NOT NULL CHECK (choice IN ('a', 'b')),
                voted_at    TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, question_id)
            );

            CREATE INDEX idx_votes_question ON votes(question_id);

            CREATE TABLE submissions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                submitter_id  INTEGER NOT NULL,
                question      TEXT NOT NULL,
                option_a      TEXT NOT NULL,
                option_b      TEXT NOT NULL,
                category      TEXT NOT NULL DEFAULT 'General',
                status        TEXT NOT NULL DEFAULT 'pending'
                              CHECK (status IN ('pending', 'approved', 'rejected')),
                submitted_at  TEXT NOT NULL DEFAULT (datetime('now')),
                reviewed_by   INTEGER,
                reviewed_at   TEXT,
                question_id   INTEGER REFERENCES questions(id)
            );

            CREATE INDEX idx_submissions_status ON submissions(status, submitted_at);
            CREATE INDEX idx_submissions_submitter ON submissions(submitter_id);

            CREATE TABLE daily_settings (
                guild_id    INTEGER PRIMARY KEY,
                channel_id  INTEGER NOT NULL,
                enabled     INTEGER NOT NULL DEFAULT 1,
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
