use rusqlite::{Connection, Result};
use super::schema::SCHEMA;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        log::info!("Migrating storage schema from v{version} to v{SCHEMA_VERSION}");
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}
