use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Schema steps in order; entry `i` upgrades `user_version` from `i` to `i + 1`.
const MIGRATIONS: &[(&str, &str)] = &[(
    "schema_v1.sql",
    include_str!("schemas/schema_v1.sql"),
)];

pub fn current_schema_version() -> i32 {
    MIGRATIONS.len() as i32
}

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let target = current_schema_version();
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > target {
        bail!("database version ({version}) is newer than supported schema ({target})");
    }
    if version == target {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    for (name, sql) in &MIGRATIONS[version as usize..] {
        tx.execute_batch(sql)
            .with_context(|| format!("failed to execute {name}"))?;
    }

    tx.pragma_update(None, "user_version", target)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}
