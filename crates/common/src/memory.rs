//! In-memory store implementations for tests and single-process use.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::audit::{RecognitionLogEntry, RecognitionStatus, StatusCounts};
use crate::settings::RecognitionSettings;
use crate::stores::{RecognitionLogStore, SettingsStore};

/// Tenant-keyed settings map behind a read/write lock.
#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<HashMap<String, RecognitionSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self, tenant_id: &str) -> Result<Option<RecognitionSettings>> {
        Ok(self.settings.read().await.get(tenant_id).cloned())
    }

    async fn save(&self, settings: &RecognitionSettings) -> Result<()> {
        self.settings
            .write()
            .await
            .insert(settings.tenant_id.clone(), settings.clone());
        Ok(())
    }
}

/// Append-only entry list; queries scan and return newest first.
#[derive(Default)]
pub struct InMemoryRecognitionLogStore {
    entries: RwLock<Vec<RecognitionLogEntry>>,
}

impl InMemoryRecognitionLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn newest_first(mut entries: Vec<RecognitionLogEntry>) -> Vec<RecognitionLogEntry> {
    entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    entries
}

#[async_trait]
impl RecognitionLogStore for InMemoryRecognitionLogStore {
    async fn append(&self, entry: &RecognitionLogEntry) -> Result<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_for_session(&self, session_ref: &str) -> Result<Vec<RecognitionLogEntry>> {
        let entries = self.entries.read().await;
        Ok(newest_first(
            entries
                .iter()
                .filter(|entry| entry.session_ref.as_deref() == Some(session_ref))
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_identity(&self, identity_ref: &str) -> Result<Vec<RecognitionLogEntry>> {
        let entries = self.entries.read().await;
        Ok(newest_first(
            entries
                .iter()
                .filter(|entry| entry.identity_ref.as_deref() == Some(identity_ref))
                .cloned()
                .collect(),
        ))
    }

    async fn count_by_status(&self, tenant_id: &str) -> Result<StatusCounts> {
        let entries = self.entries.read().await;
        let mut counts = StatusCounts::default();
        for entry in entries.iter().filter(|entry| entry.tenant_id == tenant_id) {
            counts.record(entry.status);
        }
        Ok(counts)
    }

    async fn recent_failures(
        &self,
        tenant_id: &str,
        since: u64,
    ) -> Result<Vec<RecognitionLogEntry>> {
        let entries = self.entries.read().await;
        Ok(newest_first(
            entries
                .iter()
                .filter(|entry| {
                    entry.tenant_id == tenant_id
                        && entry.status == RecognitionStatus::Failed
                        && entry.recorded_at >= since
                })
                .cloned()
                .collect(),
        ))
    }
}
