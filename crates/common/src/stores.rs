//! Persistence trait interfaces.
//!
//! Storage is owned by an external collaborator; this core only depends
//! on these traits. The in-memory implementations in [`crate::memory`]
//! back tests and single-process deployments.

use anyhow::Result;
use async_trait::async_trait;

use crate::audit::{RecognitionLogEntry, StatusCounts};
use crate::settings::RecognitionSettings;

/// Keyed load/save of per-tenant recognition settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self, tenant_id: &str) -> Result<Option<RecognitionSettings>>;
    async fn save(&self, settings: &RecognitionSettings) -> Result<()>;
}

/// Append-only store for recognition attempt audit entries.
#[async_trait]
pub trait RecognitionLogStore: Send + Sync {
    async fn append(&self, entry: &RecognitionLogEntry) -> Result<()>;

    /// Entries for one session, newest first.
    async fn list_for_session(&self, session_ref: &str) -> Result<Vec<RecognitionLogEntry>>;

    /// Entries for one identity, newest first.
    async fn list_for_identity(&self, identity_ref: &str) -> Result<Vec<RecognitionLogEntry>>;

    async fn count_by_status(&self, tenant_id: &str) -> Result<StatusCounts>;

    /// Failed entries for a tenant recorded at or after `since` (epoch
    /// seconds), newest first.
    async fn recent_failures(
        &self,
        tenant_id: &str,
        since: u64,
    ) -> Result<Vec<RecognitionLogEntry>>;
}
