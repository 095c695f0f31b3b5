use cxindex_core::CxindexError;
use rusqlite::Connection;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Records, children and linkages",
        sql: include_str!("migrations/001_records.sql"),
    },
    Migration {
        version: 2,
        description: "Ordered name index",
        sql: include_str!("migrations/002_name_index.sql"),
    },
    Migration {
        version: 3,
        description: "Translation unit content hashes",
        sql: include_str!("migrations/003_unit_hashes.sql"),
    },
];

/// Newest schema version this build knows how to open.
pub(crate) fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Schema version recorded in the store, 0 for a fresh database.
pub(crate) fn schema_version(conn: &Connection) -> Result<u32, CxindexError> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| CxindexError::Storage(e.to_string()))
}

/// Bring the store up to [`latest_version`].
///
/// Each migration commits together with its `schema_version` row. A store
/// written by a newer build is refused rather than opened with a schema whose
/// node layout this build cannot interpret.
pub(crate) fn run_migrations(conn: &Connection) -> Result<(), CxindexError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| CxindexError::Storage(e.to_string()))?;

    let current = schema_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(CxindexError::Storage(format!(
            "Store schema version {current} is newer than supported version {latest}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), CxindexError> {
    tracing::info!(
        "Applying migration {}: {}",
        migration.version,
        migration.description
    );
    let failed = |e: rusqlite::Error| {
        CxindexError::Storage(format!(
            "Migration {} ({}) failed: {}",
            migration.version, migration.description, e
        ))
    };

    let tx = conn.unchecked_transaction().map_err(failed)?;
    tx.execute_batch(migration.sql).map_err(failed)?;
    tx.execute(
        "INSERT INTO schema_version (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().timestamp()
        ],
    )
    .map_err(failed)?;
    tx.commit().map_err(failed)
}
