//! Schema state before and after a migration run.

use std::fmt;
use std::time::Duration;

/// Embedded migrations split by whether the database has recorded them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Recorded versions, oldest first.
    pub applied: Vec<String>,
    /// Embedded versions the database has not recorded.
    pub pending: Vec<String>,
}

impl MigrationStatus {
    /// Creates a new migration status.
    pub fn new(applied: Vec<String>, pending: Vec<String>) -> Self {
        Self { applied, pending }
    }

    /// Newest recorded version, `None` on a fresh database.
    pub fn schema_version(&self) -> Option<&str> {
        self.applied.last().map(String::as_str)
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// What one call to `run_pending_migrations` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Versions applied by this run, oldest first.
    pub applied: Vec<String>,
    /// Newest recorded version once the run finished.
    pub schema_version: Option<String>,
    /// Wall time of the run.
    pub duration: Duration,
}

impl MigrationResult {
    /// Result of a run that found nothing pending.
    pub fn up_to_date(status: &MigrationStatus, duration: Duration) -> Self {
        Self {
            applied: Vec::new(),
            schema_version: status.schema_version().map(str::to_owned),
            duration,
        }
    }

    /// Result of a run that applied `applied` on top of `status`.
    pub fn applied(status: &MigrationStatus, applied: Vec<String>, duration: Duration) -> Self {
        let schema_version = applied
            .last()
            .cloned()
            .or_else(|| status.schema_version().map(str::to_owned));

        Self {
            applied,
            schema_version,
            duration,
        }
    }

    /// Returns whether the run applied nothing.
    pub fn is_no_op(&self) -> bool {
        self.applied.is_empty()
    }
}

impl fmt::Display for MigrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.schema_version.as_deref().unwrap_or("none");
        write!(
            f,
            "schema={version} applied={} duration_ms={}",
            self.applied.len(),
            self.duration.as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(applied: &[&str], pending: &[&str]) -> MigrationStatus {
        MigrationStatus::new(
            applied.iter().map(|v| (*v).to_owned()).collect(),
            pending.iter().map(|v| (*v).to_owned()).collect(),
        )
    }

    #[test]
    fn fresh_database_has_no_schema_version() {
        let fresh = status(&[], &["20250101000000"]);
        assert_eq!(fresh.schema_version(), None);
        assert!(!fresh.is_up_to_date());
    }

    #[test]
    fn applied_run_moves_schema_version() {
        let before = status(&[], &["20250101000000"]);
        let result = MigrationResult::applied(
            &before,
            vec!["20250101000000".to_owned()],
            Duration::from_millis(12),
        );

        assert!(!result.is_no_op());
        assert_eq!(result.schema_version.as_deref(), Some("20250101000000"));
        assert_eq!(
            result.to_string(),
            "schema=20250101000000 applied=1 duration_ms=12"
        );
    }

    #[test]
    fn up_to_date_run_keeps_schema_version() {
        let current = status(&["20250101000000"], &[]);
        let result = MigrationResult::up_to_date(&current, Duration::ZERO);

        assert!(result.is_no_op());
        assert_eq!(result.schema_version.as_deref(), Some("20250101000000"));
    }
}
