//! Mirrors the in-process registry into the persisted handler catalog.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::registry::HandlerRegistry;
use crate::store::HandlerCatalog;
use crate::types::{HandlerDescriptor, SyncReport};
use crate::{Result, TRACING_TARGET_SYNC};

/// Reconciliation steps for one catalog synchronization.
///
/// Catalog backends compute the plan from the names they currently hold,
/// inside the same transaction that applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan<'a> {
    /// Persisted names that are no longer registered.
    pub to_delete: BTreeSet<String>,
    /// Registered handlers that already have a row; descriptions are rewritten.
    pub to_update: Vec<&'a HandlerDescriptor>,
    /// Registered handlers without a row.
    pub to_create: Vec<&'a HandlerDescriptor>,
}

impl<'a> SyncPlan<'a> {
    /// Computes the plan from the persisted names and the registry descriptors.
    pub fn new<I, S>(existing: I, descriptors: &'a [HandlerDescriptor]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let existing: BTreeSet<String> = existing.into_iter().map(Into::into).collect();
        let registered: BTreeSet<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();

        let to_delete = existing
            .iter()
            .filter(|name| !registered.contains(name.as_str()))
            .cloned()
            .collect();

        let (to_update, to_create): (Vec<_>, Vec<_>) = descriptors
            .iter()
            .partition(|descriptor| existing.contains(&descriptor.name));

        Self {
            to_delete,
            to_update,
            to_create,
        }
    }

    /// Counts this plan reports once applied.
    pub fn report(&self) -> SyncReport {
        SyncReport {
            deleted: self.to_delete.len(),
            deleted_names: self.to_delete.iter().cloned().collect(),
            created: self.to_create.len(),
            updated: self.to_update.len(),
        }
    }
}

/// Keeps the persisted handler catalog in lock-step with the registry.
#[derive(Clone)]
pub struct Synchronizer {
    registry: Arc<HandlerRegistry>,
    catalog: Arc<dyn HandlerCatalog>,
}

impl Synchronizer {
    /// Creates a new synchronizer.
    pub fn new(registry: Arc<HandlerRegistry>, catalog: Arc<dyn HandlerCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Reconciles the catalog with the registry.
    ///
    /// Deletes rows for unregistered names, rewrites the description of every
    /// registered handler and creates the missing rows, all in one transaction.
    /// Running it twice without registry changes creates and deletes nothing.
    pub async fn synchronize(&self) -> Result<SyncReport> {
        let descriptors = self.registry.descriptors();

        tracing::debug!(
            target: TRACING_TARGET_SYNC,
            registered = descriptors.len(),
            "synchronizing handler catalog"
        );

        let report = self.catalog.sync_catalog(&descriptors).await?;

        if !report.deleted_names.is_empty() {
            tracing::info!(
                target: TRACING_TARGET_SYNC,
                handlers = ?report.deleted_names,
                "deleted unregistered webhook handlers"
            );
        }

        tracing::info!(
            target: TRACING_TARGET_SYNC,
            deleted = report.deleted,
            created = report.created,
            updated = report.updated,
            "handler catalog synchronized"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryStore, StaticHandler};

    fn registry(names: &[&str]) -> anyhow::Result<Arc<HandlerRegistry>> {
        let mut registry = HandlerRegistry::new();
        for name in names {
            registry.register(*name, format!("{name} handler"), StaticHandler::handled())?;
        }
        Ok(Arc::new(registry))
    }

    #[test]
    fn test_plan() {
        let descriptors = vec![
            HandlerDescriptor::new("kept", "kept"),
            HandlerDescriptor::new("new", "new"),
        ];
        let plan = SyncPlan::new(["kept", "stale"], &descriptors);

        assert_eq!(plan.to_delete, BTreeSet::from(["stale".to_owned()]));
        assert_eq!(plan.to_update, vec![&descriptors[0]]);
        assert_eq!(plan.to_create, vec![&descriptors[1]]);
        assert_eq!(
            plan.report(),
            SyncReport {
                deleted: 1,
                deleted_names: vec!["stale".to_owned()],
                created: 1,
                updated: 1
            }
        );
    }

    #[tokio::test]
    async fn test_synchronize_is_idempotent() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let synchronizer = Synchronizer::new(registry(&["a", "b", "c"])?, store.clone());

        let first = synchronizer.synchronize().await?;
        assert_eq!(
            first,
            SyncReport {
                deleted: 0,
                deleted_names: vec![],
                created: 3,
                updated: 0
            }
        );

        let second = synchronizer.synchronize().await?;
        assert_eq!(
            second,
            SyncReport {
                deleted: 0,
                deleted_names: vec![],
                created: 0,
                updated: 3
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_synchronize_removes_unregistered() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        Synchronizer::new(registry(&["a", "b"])?, store.clone())
            .synchronize()
            .await?;

        let report = Synchronizer::new(registry(&["b", "d"])?, store.clone())
            .synchronize()
            .await?;
        assert_eq!(
            report,
            SyncReport {
                deleted: 1,
                deleted_names: vec!["a".to_owned()],
                created: 1,
                updated: 1
            }
        );
        assert_eq!(report.to_string(), "deleted=1 created=1 updated=1");

        let names: Vec<_> = store
            .list_handlers()
            .await?
            .into_iter()
            .map(|handler| handler.name)
            .collect();
        assert_eq!(names, vec!["b".to_owned(), "d".to_owned()]);
        Ok(())
    }
}
