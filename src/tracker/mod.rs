pub mod github;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::issue::{Issue, IssueState};

/// The issue-tracker operations the checker needs.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn fetch_issue(&self, number: u64) -> Result<Issue>;
    /// Fails if the repository has no label with this name.
    async fn ensure_label(&self, name: &str) -> Result<()>;
    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()>;
    async fn remove_all_labels(&self, number: u64) -> Result<()>;
    async fn set_state(&self, number: u64, state: IssueState) -> Result<()>;
    async fn add_comment(&self, number: u64, body: &str) -> Result<()>;
}
