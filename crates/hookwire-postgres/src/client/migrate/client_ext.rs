//! Extension trait adding migration support to [`PgClient`].

use super::run_migration::{get_migration_status, run_pending_migrations};
use super::{MigrationResult, MigrationStatus};
use crate::{PgClient, PgResult};

/// Migration functionality for [`PgClient`].
pub trait PgClientMigrationExt {
    /// Runs all pending database migrations.
    ///
    /// Safe to call repeatedly; an up-to-date database is left untouched.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>>;

    /// Gets the current migration status of the database.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>>;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        get_migration_status(&mut conn).await
    }
}
