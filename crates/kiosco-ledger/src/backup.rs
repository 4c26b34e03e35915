//! # File-Level Backup
//!
//! The store keeps all state in one SQLite file, so a consistent copy
//! of that file is the entire backup contract. `VACUUM INTO` produces
//! the copy at a single point in time, compacted and self-contained,
//! and is safe to run while the pool is serving reads and writes.
//!
//! Restoring is not an API call: point the application (or
//! `KIOSCO_DB_PATH`) at the copied file.

use std::path::Path;

use tracing::info;

use crate::error::LedgerResult;
use kiosco_db::Database;

/// Copies the entire store to a new single file at `target`.
///
/// Parent directories are created as needed. The target file itself
/// must not already exist; SQLite refuses to vacuum into an existing
/// file rather than overwrite a previous backup.
pub async fn backup_to(db: &Database, target: &Path) -> LedgerResult<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    db.backup_to(target).await?;

    info!(target = %target.display(), "Ledger backed up");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{LedgerService, NewCustomer, NewSale};
    use kiosco_core::{Money, PaymentMethod};
    use kiosco_db::DbConfig;

    #[tokio::test]
    async fn test_backup_copy_carries_the_whole_ledger() {
        let dir = std::env::temp_dir().join(format!("kiosco-bak-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let db = Database::new(DbConfig::new(dir.join("live.db"))).await.unwrap();
        let service = LedgerService::new(db.clone());
        let juan = service
            .create_customer(NewCustomer {
                name: "Juan".to_string(),
                phone: None,
                email: None,
                notes: None,
            })
            .await
            .unwrap();
        service
            .register_sale(NewSale {
                amount_cents: 1000,
                method: PaymentMethod::Credit,
                customer_id: Some(juan.id.clone()),
                note: None,
                at: None,
            })
            .await
            .unwrap();

        // Nested target path exercises parent creation
        let target = dir.join("backups").join("2026-03-14.db");
        backup_to(&db, &target).await.unwrap();
        db.close().await;

        let copy = Database::new(DbConfig::new(&target).run_migrations(false))
            .await
            .unwrap();
        let restored = LedgerService::new(copy.clone());
        assert_eq!(
            restored.customer_balance(&juan.id).await.unwrap(),
            Money::from_cents(1000)
        );
        copy.close().await;

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_backup_refuses_existing_target() {
        let dir = std::env::temp_dir().join(format!("kiosco-bak-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let target = dir.join("already-there.db");
        std::fs::write(&target, b"previous backup").unwrap();

        assert!(backup_to(&db, &target).await.is_err());
        // The previous backup was not clobbered
        assert_eq!(std::fs::read(&target).unwrap(), b"previous backup");

        std::fs::remove_dir_all(&dir).ok();
    }
}
