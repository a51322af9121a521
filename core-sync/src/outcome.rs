//! Per-entity sync outcomes and the end-of-run report.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

/// A step of the remote workflow; the unit of failure attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStep {
    FetchRecord,
    CreateDraft,
    CreateVersion,
    UpdateDraftMetadata,
    AttachFiles,
    ReplaceFiles,
    SubmitToCommunity,
    RequestCuration,
    SubmitReview,
}

impl SyncStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStep::FetchRecord => "FETCH_RECORD",
            SyncStep::CreateDraft => "CREATE_DRAFT",
            SyncStep::CreateVersion => "CREATE_VERSION",
            SyncStep::UpdateDraftMetadata => "UPDATE_DRAFT_METADATA",
            SyncStep::AttachFiles => "ATTACH_FILES",
            SyncStep::ReplaceFiles => "REPLACE_FILES",
            SyncStep::SubmitToCommunity => "SUBMIT_TO_COMMUNITY",
            SyncStep::RequestCuration => "REQUEST_CURATION",
            SyncStep::SubmitReview => "SUBMIT_REVIEW",
        }
    }
}

impl FromStr for SyncStep {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FETCH_RECORD" => Ok(SyncStep::FetchRecord),
            "CREATE_DRAFT" => Ok(SyncStep::CreateDraft),
            "CREATE_VERSION" => Ok(SyncStep::CreateVersion),
            "UPDATE_DRAFT_METADATA" => Ok(SyncStep::UpdateDraftMetadata),
            "ATTACH_FILES" => Ok(SyncStep::AttachFiles),
            "REPLACE_FILES" => Ok(SyncStep::ReplaceFiles),
            "SUBMIT_TO_COMMUNITY" => Ok(SyncStep::SubmitToCommunity),
            "REQUEST_CURATION" => Ok(SyncStep::RequestCuration),
            "SUBMIT_REVIEW" => Ok(SyncStep::SubmitReview),
            _ => Err(SyncError::InvalidStep(s.to_string())),
        }
    }
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to one logical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Skipped,
    Failed,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Created => "created",
            SyncAction::Updated => "updated",
            SyncAction::Skipped => "skipped",
            SyncAction::Failed => "failed",
        }
    }
}

impl FromStr for SyncAction {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SyncAction::Created),
            "updated" => Ok(SyncAction::Updated),
            "skipped" => Ok(SyncAction::Skipped),
            "failed" => Ok(SyncAction::Failed),
            _ => Err(SyncError::InvalidAction(s.to_string())),
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of processing one logical entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub logical_id: String,
    pub action: SyncAction,
    /// Remote record id the entity ended up mapped to, when one exists
    pub record_id: Option<String>,
    /// The step the entity failed at, for failed outcomes
    pub failed_step: Option<SyncStep>,
    pub error: Option<String>,
}

impl SyncOutcome {
    pub fn created(logical_id: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            action: SyncAction::Created,
            record_id: Some(record_id.into()),
            failed_step: None,
            error: None,
        }
    }

    pub fn updated(logical_id: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            action: SyncAction::Updated,
            record_id: Some(record_id.into()),
            failed_step: None,
            error: None,
        }
    }

    pub fn skipped(logical_id: impl Into<String>, record_id: Option<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            action: SyncAction::Skipped,
            record_id,
            failed_step: None,
            error: None,
        }
    }

    pub fn failed(logical_id: impl Into<String>, step: SyncStep, error: &SyncError) -> Self {
        Self {
            logical_id: logical_id.into(),
            action: SyncAction::Failed,
            record_id: None,
            failed_step: Some(step),
            error: Some(error.to_string()),
        }
    }

    /// Failure outside the remote step sequence (e.g. the mapping store),
    /// so no step is attributed.
    pub fn failed_internal(logical_id: impl Into<String>, error: &SyncError) -> Self {
        Self {
            logical_id: logical_id.into(),
            action: SyncAction::Failed,
            record_id: None,
            failed_step: None,
            error: Some(error.to_string()),
        }
    }
}

/// Batch-level result: one outcome per processed entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn push(&mut self, outcome: SyncOutcome) {
        self.outcomes.push(outcome);
    }

    fn count(&self, action: SyncAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn created(&self) -> usize {
        self.count(SyncAction::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(SyncAction::Updated)
    }

    pub fn skipped(&self) -> usize {
        self.count(SyncAction::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(SyncAction::Failed)
    }

    /// Emit the end-of-run summary: counts, and the failing step per failed
    /// entity. Failed entities may have left partial drafts on the remote
    /// side; listing them here is what makes that visible.
    pub fn log_summary(&self) {
        info!(
            total = self.outcomes.len(),
            created = self.created(),
            updated = self.updated(),
            skipped = self.skipped(),
            failed = self.failed(),
            "Sync run finished"
        );
        for outcome in &self.outcomes {
            if outcome.action == SyncAction::Failed {
                warn!(
                    logical_id = %outcome.logical_id,
                    step = outcome.failed_step.map(|s| s.as_str()).unwrap_or("?"),
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Entity failed"
                );
            }
        }
    }
}
