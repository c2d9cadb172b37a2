//! Embedded schema migrations.
//!
//! SQL files live in the crate's `migrations/` directory and are compiled
//! into the binary. Applied versions are tracked in `_sqlx_migrations`.

use std::borrow::Cow;

use sqlx_core::migrate::{Migration, MigrationType, Migrator};
use sqlx_postgres::PgPool;
use tracing::{info, instrument};

use crate::error::{PostgresError, Result};

/// (version, description, sql) in apply order.
macro_rules! embedded_migrations {
    () => {
        &[(
            20250601000001i64,
            "initial_schema",
            include_str!("../../migrations/20250601000001_initial_schema.sql"),
        )]
    };
}

fn build_migrations() -> Vec<Migration> {
    embedded_migrations!()
        .iter()
        .map(|(version, description, sql)| Migration {
            version: *version,
            description: Cow::Borrowed(description),
            migration_type: MigrationType::Simple,
            sql: Cow::Borrowed(sql),
            checksum: Cow::Borrowed(&[]),
            no_tx: false,
        })
        .collect()
}

/// Applies pending migrations. Already-applied versions are skipped.
///
/// # Errors
///
/// Returns [`PostgresError::Migration`] if a migration fails to execute.
#[instrument(skip(pool))]
pub async fn run(pool: &PgPool) -> Result<()> {
    let migrator = Migrator {
        migrations: Cow::Owned(build_migrations()),
        ignore_missing: false,
        locking: true,
        no_tx: false,
    };
    info!(count = migrator.migrations.len(), "Running database migrations");

    migrator
        .run(pool)
        .await
        .map_err(|e| PostgresError::Migration(e.to_string()))?;

    info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let migrations = build_migrations();
        assert!(!migrations.is_empty());
        assert!(
            migrations
                .windows(2)
                .all(|pair| pair[0].version < pair[1].version)
        );
        assert!(migrations[0].sql.contains("CREATE TABLE IF NOT EXISTS component"));
    }
}
