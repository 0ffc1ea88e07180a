//! # Audit Trail Repository (Bitácora)
//!
//! Append-only log of lifecycle actions per document.
//!
//! This repository exposes `append` and reads - nothing else. There is no
//! update or delete path anywhere in the codebase; once written, an audit
//! entry is permanent.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::DbResult;
use fuel_core::{Actor, AuditAction, AuditEntry, DocumentKind};

const AUDIT_COLUMNS: &str = "id, document_kind, document_id, action, actor_id, ip, created_at";

/// Repository for the audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one lifecycle entry inside the caller's transaction.
    ///
    /// Called exactly once per lifecycle transition, in the same transaction
    /// as the transition itself - a committed document change and its audit
    /// entry are inseparable.
    pub async fn append(
        conn: &mut SqliteConnection,
        document_kind: DocumentKind,
        document_id: &str,
        action: AuditAction,
        actor: &Actor,
    ) -> DbResult<AuditEntry> {
        let entry = AuditEntry {
            id: Uuid::new_v4().to_string(),
            document_kind,
            document_id: document_id.to_string(),
            action,
            actor_id: actor.user_id.clone(),
            ip: actor.ip.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO audit_log (
                id, document_kind, document_id, action, actor_id, ip, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.document_kind)
        .bind(&entry.document_id)
        .bind(entry.action)
        .bind(&entry.actor_id)
        .bind(&entry.ip)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(entry)
    }

    /// All entries for one document, oldest first.
    pub async fn list_for_document(
        &self,
        document_kind: DocumentKind,
        document_id: &str,
    ) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_log \
             WHERE document_kind = ?1 AND document_id = ?2 \
             ORDER BY created_at, id"
        ))
        .bind(document_kind)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
