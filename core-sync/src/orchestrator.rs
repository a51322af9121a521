//! # Sync Orchestrator
//!
//! Drives each logical entity through the remote record lifecycle.
//!
//! ## Overview
//!
//! Per entity, the orchestrator decides between three outcomes and walks the
//! corresponding step sequence against the [`RepositoryClient`]:
//!
//! - **Create path** (no mapping):
//!   `CREATE_DRAFT → ATTACH_FILES → [SUBMIT_TO_COMMUNITY] →
//!   [REQUEST_CURATION] → SUBMIT_REVIEW → DONE`
//! - **Update path** (mapping, metadata changed):
//!   `CREATE_VERSION → UPDATE_DRAFT_METADATA → REPLACE_FILES →
//!   [SUBMIT_TO_COMMUNITY] → SUBMIT_REVIEW → DONE`
//! - **Skip** (mapping, metadata equivalent): terminal, zero write calls.
//!
//! Every transition is one remote call. A non-success response fails the
//! entity at that step and abandons its remaining steps — prior steps are
//! never rolled back, so the remote side may hold a partial draft; the
//! failure report is what surfaces that. Failure of one entity never stops
//! the batch.
//!
//! The mapping store is written only when an entity reaches DONE:
//! `created_at` is preserved from the prior entry on update and set to now on
//! create. A failed entity keeps its prior mapping, so the next run retries
//! from the state recorded before the failed attempt (at-least-once, not
//! exactly-once).

use crate::client::RepositoryClient;
use crate::error::SyncError;
use crate::mapping::{MappingEntry, MappingStore};
use crate::outcome::{SyncOutcome, SyncReport, SyncStep};
use chrono::Utc;
use core_metadata::changed_fields;
use core_metadata::snapshot::{DepositProfile, MetadataSnapshot};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Which state-machine paths and optional steps are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Create, update and skip as the mapping and diff dictate
    #[default]
    Full,
    /// Only create records for unmapped entities; mapped ones are skipped
    CreateOnly,
    /// Only update mapped entities; unmapped ones are skipped
    UpdateOnly,
    /// Stop after file attach/replace: no community submission, no curation
    /// request, no review submission
    DraftOnly,
}

/// Sync orchestrator configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub mode: SyncMode,

    /// Community to submit drafts to; `None` skips community submission
    pub community_id: Option<String>,

    /// Whether to open a curation request on the create path
    pub request_curation: bool,

    /// Process at most this many entities (single-entity test runs)
    pub limit: Option<usize>,

    /// Top-level metadata fields the update decision compares
    pub compare_fields: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::Full,
            community_id: None,
            request_curation: false,
            limit: None,
            compare_fields: default_compare_fields(),
        }
    }
}

/// The fixed field set the update decision looks at. Auto-stamped fields
/// (`publication_date`) are deliberately absent: they change on every run.
pub fn default_compare_fields() -> Vec<String> {
    [
        "title",
        "creators",
        "contributors",
        "description",
        "dates",
        "publisher",
        "references",
        "related_identifiers",
        "resource_type",
        "rights",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// One logical entity as handed to the orchestrator: its identity, its
/// freshly aggregated snapshot, and the physical files to ship.
#[derive(Debug, Clone)]
pub struct SyncEntity {
    pub logical_id: String,
    pub snapshot: MetadataSnapshot,
    pub files: Vec<PathBuf>,
}

/// A step-level failure: which transition failed and why.
struct StepFailure {
    step: SyncStep,
    error: SyncError,
}

type StepResult<T> = std::result::Result<T, StepFailure>;

fn fail_at(step: SyncStep) -> impl FnOnce(SyncError) -> StepFailure {
    move |error| StepFailure { step, error }
}

/// Drives logical entities through the remote record lifecycle.
pub struct SyncOrchestrator {
    client: Arc<dyn RepositoryClient>,
    store: Arc<dyn MappingStore>,
    profile: DepositProfile,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        client: Arc<dyn RepositoryClient>,
        store: Arc<dyn MappingStore>,
        profile: DepositProfile,
        config: SyncConfig,
    ) -> Self {
        Self {
            client,
            store,
            profile,
            config,
        }
    }

    /// Process a batch of logical entities sequentially.
    ///
    /// Entities are independent: one entity's failure is recorded in its
    /// outcome and the batch moves on. Returns one outcome per processed
    /// entity and logs the end-of-run summary.
    #[instrument(skip_all, fields(entities = entities.len()))]
    pub async fn sync_batch(&self, entities: &[SyncEntity]) -> SyncReport {
        let mut report = SyncReport::default();
        let limit = self.config.limit.unwrap_or(entities.len());

        for entity in entities.iter().take(limit) {
            let outcome = self.sync_entity(entity).await;
            report.push(outcome);
        }

        report.log_summary();
        report
    }

    /// Process one logical entity to a terminal outcome.
    #[instrument(skip_all, fields(logical_id = %entity.logical_id))]
    pub async fn sync_entity(&self, entity: &SyncEntity) -> SyncOutcome {
        let mapping = match self.store.find(&entity.logical_id).await {
            Ok(mapping) => mapping,
            Err(error) => return SyncOutcome::failed_internal(&entity.logical_id, &error),
        };

        match self.config.mode {
            SyncMode::CreateOnly if mapping.is_some() => {
                debug!("Mapped entity skipped in create-only mode");
                return SyncOutcome::skipped(&entity.logical_id, mapping.map(|m| m.record_id));
            }
            SyncMode::UpdateOnly if mapping.is_none() => {
                debug!("Unmapped entity skipped in update-only mode");
                return SyncOutcome::skipped(&entity.logical_id, None);
            }
            _ => {}
        }

        match mapping {
            None => match self.run_create(entity).await {
                Ok(record_id) => {
                    let now = Utc::now().timestamp();
                    let entry = MappingEntry {
                        logical_id: entity.logical_id.clone(),
                        record_id: record_id.clone(),
                        file_count: entity.files.len() as u32,
                        created_at: now,
                        updated_at: now,
                    };
                    if let Err(error) = self.store.upsert(&entry).await {
                        warn!(%error, "Record created remotely but mapping write failed");
                        return SyncOutcome::failed_internal(&entity.logical_id, &error);
                    }
                    info!(record_id = %record_id, "Created record");
                    SyncOutcome::created(&entity.logical_id, record_id)
                }
                Err(failure) => self.report_failure(entity, failure),
            },
            Some(prior) => match self.run_update(entity, &prior).await {
                Ok(None) => {
                    debug!("No metadata changes, skipping");
                    SyncOutcome::skipped(&entity.logical_id, Some(prior.record_id))
                }
                Ok(Some(record_id)) => {
                    let entry = MappingEntry {
                        logical_id: entity.logical_id.clone(),
                        record_id: record_id.clone(),
                        file_count: entity.files.len() as u32,
                        created_at: prior.created_at,
                        updated_at: Utc::now().timestamp(),
                    };
                    if let Err(error) = self.store.upsert(&entry).await {
                        warn!(%error, "Record updated remotely but mapping write failed");
                        return SyncOutcome::failed_internal(&entity.logical_id, &error);
                    }
                    info!(record_id = %record_id, "Updated record");
                    SyncOutcome::updated(&entity.logical_id, record_id)
                }
                Err(failure) => self.report_failure(entity, failure),
            },
        }
    }

    fn report_failure(&self, entity: &SyncEntity, failure: StepFailure) -> SyncOutcome {
        warn!(
            step = failure.step.as_str(),
            error = %failure.error,
            "Entity failed; prior mapping left unchanged"
        );
        SyncOutcome::failed(&entity.logical_id, failure.step, &failure.error)
    }

    /// Create path: new draft, files, optional community/curation, review.
    async fn run_create(&self, entity: &SyncEntity) -> StepResult<String> {
        let document = self.render_document(&entity.snapshot);

        let draft = self
            .client
            .create_draft(&document)
            .await
            .map_err(fail_at(SyncStep::CreateDraft))?;

        self.ship_files(&draft.record_id, &entity.files, SyncStep::AttachFiles)
            .await?;

        self.release(&draft.record_id, self.config.request_curation)
            .await?;

        Ok(draft.record_id)
    }

    /// Update path: diff first; on change, new version with fresh metadata
    /// and replaced files. Returns `None` when nothing changed.
    async fn run_update(
        &self,
        entity: &SyncEntity,
        prior: &MappingEntry,
    ) -> StepResult<Option<String>> {
        let document = self.render_document(&entity.snapshot);
        let new_metadata = &document["metadata"];

        let current_metadata = self
            .client
            .fetch_record_metadata(&prior.record_id)
            .await
            .map_err(fail_at(SyncStep::FetchRecord))?;

        let changed = changed_fields(&current_metadata, new_metadata, &self.config.compare_fields);
        if changed.is_empty() {
            return Ok(None);
        }
        info!(
            record_id = %prior.record_id,
            fields = %changed.iter().cloned().collect::<Vec<_>>().join(", "),
            "Metadata changes detected"
        );

        let draft = self
            .client
            .create_version(&prior.record_id)
            .await
            .map_err(fail_at(SyncStep::CreateVersion))?;

        self.client
            .update_draft_metadata(&draft.record_id, &document)
            .await
            .map_err(fail_at(SyncStep::UpdateDraftMetadata))?;

        self.client
            .delete_draft_files(&draft.record_id)
            .await
            .map_err(fail_at(SyncStep::ReplaceFiles))?;
        self.ship_files(&draft.record_id, &entity.files, SyncStep::ReplaceFiles)
            .await?;

        // Curation requests only accompany first-time submissions.
        self.release(&draft.record_id, false).await?;

        Ok(Some(draft.record_id))
    }

    /// Initiate, stream and commit each file, in order. The whole sequence
    /// is attributed to one step (`ATTACH_FILES` or `REPLACE_FILES`).
    async fn ship_files(&self, record_id: &str, files: &[PathBuf], step: SyncStep) -> StepResult<()> {
        if files.is_empty() {
            return Ok(());
        }

        let filenames: Vec<String> = files.iter().map(|path| file_key(path)).collect();
        let slots = self
            .client
            .initiate_files(record_id, &filenames)
            .await
            .map_err(fail_at(step))?;

        for path in files {
            let key = file_key(path);
            let slot = slots.iter().find(|slot| slot.key == key).ok_or_else(|| StepFailure {
                step,
                error: SyncError::Extraction(format!("no upload slot issued for {key}")),
            })?;

            self.client
                .upload_file_content(slot, path)
                .await
                .map_err(fail_at(step))?;
            self.client.commit_file(slot).await.map_err(fail_at(step))?;
        }

        Ok(())
    }

    /// Optional community submission and curation request, then review —
    /// unless draft-only mode keeps the record as a draft.
    async fn release(&self, record_id: &str, with_curation: bool) -> StepResult<()> {
        if self.config.mode == SyncMode::DraftOnly {
            debug!("Draft-only mode, leaving record as draft");
            return Ok(());
        }

        if let Some(community_id) = &self.config.community_id {
            self.client
                .submit_to_community(record_id, community_id)
                .await
                .map_err(fail_at(SyncStep::SubmitToCommunity))?;
        }

        if with_curation {
            self.client
                .request_curation(record_id)
                .await
                .map_err(fail_at(SyncStep::RequestCuration))?;
        }

        self.client
            .submit_review(record_id)
            .await
            .map_err(fail_at(SyncStep::SubmitReview))?;

        Ok(())
    }

    fn render_document(&self, snapshot: &MetadataSnapshot) -> Value {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        snapshot.to_document(&self.profile, &today)
    }
}

/// File key under which a physical file is registered on the draft.
fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{DraftHandle, FileSlot};
    use crate::mapping::SqliteMappingStore;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted repository client: records every call, optionally failing a
    /// named method.
    #[derive(Default)]
    struct ScriptedClient {
        calls: Mutex<Vec<String>>,
        fail_method: Option<&'static str>,
        remote_metadata: Option<Value>,
    }

    impl ScriptedClient {
        fn record(&self, call: &str) -> crate::Result<()> {
            self.calls.lock().unwrap().push(call.to_string());
            let method = call.split(' ').next().unwrap_or(call);
            if self.fail_method == Some(method) {
                return Err(SyncError::UnexpectedStatus {
                    status: 500,
                    expected: 200,
                    context: method.to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn methods(&self) -> Vec<String> {
            self.calls()
                .iter()
                .map(|c| c.split(' ').next().unwrap().to_string())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl RepositoryClient for ScriptedClient {
        async fn create_draft(&self, _metadata: &Value) -> crate::Result<DraftHandle> {
            self.record("create_draft")?;
            Ok(DraftHandle {
                record_id: "rec-created".to_string(),
            })
        }

        async fn create_version(&self, record_id: &str) -> crate::Result<DraftHandle> {
            self.record(&format!("create_version {record_id}"))?;
            Ok(DraftHandle {
                record_id: format!("{record_id}-v2"),
            })
        }

        async fn update_draft_metadata(
            &self,
            record_id: &str,
            _metadata: &Value,
        ) -> crate::Result<()> {
            self.record(&format!("update_draft_metadata {record_id}"))
        }

        async fn initiate_files(
            &self,
            record_id: &str,
            filenames: &[String],
        ) -> crate::Result<Vec<FileSlot>> {
            self.record(&format!("initiate_files {record_id}"))?;
            Ok(filenames
                .iter()
                .map(|name| FileSlot {
                    key: name.clone(),
                    content_url: format!("https://api.test/files/{name}/content"),
                    commit_url: format!("https://api.test/files/{name}/commit"),
                })
                .collect())
        }

        async fn upload_file_content(&self, slot: &FileSlot, _path: &Path) -> crate::Result<()> {
            self.record(&format!("upload_file_content {}", slot.key))
        }

        async fn commit_file(&self, slot: &FileSlot) -> crate::Result<()> {
            self.record(&format!("commit_file {}", slot.key))
        }

        async fn delete_draft_files(&self, record_id: &str) -> crate::Result<()> {
            self.record(&format!("delete_draft_files {record_id}"))
        }

        async fn submit_to_community(
            &self,
            record_id: &str,
            _community_id: &str,
        ) -> crate::Result<()> {
            self.record(&format!("submit_to_community {record_id}"))
        }

        async fn request_curation(&self, record_id: &str) -> crate::Result<()> {
            self.record(&format!("request_curation {record_id}"))
        }

        async fn submit_review(&self, record_id: &str) -> crate::Result<()> {
            self.record(&format!("submit_review {record_id}"))
        }

        async fn fetch_record_metadata(&self, record_id: &str) -> crate::Result<Value> {
            self.record(&format!("fetch_record_metadata {record_id}"))?;
            self.remote_metadata
                .clone()
                .ok_or_else(|| SyncError::UnexpectedStatus {
                    status: 404,
                    expected: 200,
                    context: "fetch_record_metadata".to_string(),
                })
        }
    }

    // One connection: every pooled connection would otherwise open its own
    // private in-memory database.
    async fn test_store() -> Arc<SqliteMappingStore> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        SqliteMappingStore::migrate(&pool).await.unwrap();
        Arc::new(SqliteMappingStore::new(pool))
    }

    fn test_profile() -> DepositProfile {
        let mut profile = DepositProfile::new("E-LAUTE");
        profile.references = vec!["https://e-laute.info/".to_string()];
        profile
    }

    fn test_entity(logical_id: &str) -> SyncEntity {
        let snapshot = MetadataSnapshot {
            title: Some("Ein gut Tanz".to_string()),
            description: Some("<p>Transcriptions</p>".to_string()),
            publication_date: Some("2023-05-01".to_string()),
            ..MetadataSnapshot::default()
        };
        SyncEntity {
            logical_id: logical_id.to_string(),
            snapshot,
            files: vec![PathBuf::from("files/w1_a.mei"), PathBuf::from("files/w1_b.mei")],
        }
    }

    fn orchestrator(
        client: Arc<ScriptedClient>,
        store: Arc<SqliteMappingStore>,
        config: SyncConfig,
    ) -> SyncOrchestrator {
        SyncOrchestrator::new(client, store, test_profile(), config)
    }

    /// The metadata member the orchestrator would render for this entity,
    /// used to script an "unchanged" remote side.
    fn rendered_metadata(entity: &SyncEntity) -> Value {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        entity.snapshot.to_document(&test_profile(), &today)["metadata"].clone()
    }

    async fn seed_mapping(store: &SqliteMappingStore, logical_id: &str, record_id: &str) {
        store
            .upsert(&MappingEntry {
                logical_id: logical_id.to_string(),
                record_id: record_id.to_string(),
                file_count: 2,
                created_at: 1_600_000_000,
                updated_at: 1_600_000_000,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_path_for_unmapped_entity() {
        let client = Arc::new(ScriptedClient::default());
        let store = test_store().await;
        let config = SyncConfig {
            community_id: Some("community-1".to_string()),
            request_curation: true,
            ..SyncConfig::default()
        };
        let orchestrator = orchestrator(client.clone(), store.clone(), config);

        let entity = test_entity("w1");
        let outcome = orchestrator.sync_entity(&entity).await;

        assert_eq!(outcome.action, crate::SyncAction::Created);
        assert_eq!(outcome.record_id.as_deref(), Some("rec-created"));
        assert_eq!(
            client.methods(),
            vec![
                "create_draft",
                "initiate_files",
                "upload_file_content",
                "commit_file",
                "upload_file_content",
                "commit_file",
                "submit_to_community",
                "request_curation",
                "submit_review",
            ]
        );

        let entry = store.find("w1").await.unwrap().unwrap();
        assert_eq!(entry.record_id, "rec-created");
        assert_eq!(entry.file_count, 2);
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[tokio::test]
    async fn test_equivalent_remote_skips_with_zero_writes() {
        let entity = test_entity("w1");
        let client = Arc::new(ScriptedClient {
            remote_metadata: Some(rendered_metadata(&entity)),
            ..ScriptedClient::default()
        });
        let store = test_store().await;
        seed_mapping(&store, "w1", "rec-old").await;
        let orchestrator = orchestrator(client.clone(), store.clone(), SyncConfig::default());

        let outcome = orchestrator.sync_entity(&entity).await;

        assert_eq!(outcome.action, crate::SyncAction::Skipped);
        assert_eq!(outcome.record_id.as_deref(), Some("rec-old"));
        assert_eq!(client.methods(), vec!["fetch_record_metadata"]);

        // Mapping untouched
        let entry = store.find("w1").await.unwrap().unwrap();
        assert_eq!(entry.record_id, "rec-old");
        assert_eq!(entry.updated_at, 1_600_000_000);
    }

    #[tokio::test]
    async fn test_description_change_walks_update_path() {
        let entity = test_entity("w1");
        let mut remote = rendered_metadata(&entity);
        remote["description"] = json!("<p>stale text</p>");

        let client = Arc::new(ScriptedClient {
            remote_metadata: Some(remote),
            ..ScriptedClient::default()
        });
        let store = test_store().await;
        seed_mapping(&store, "w1", "rec-old").await;
        let config = SyncConfig {
            community_id: Some("community-1".to_string()),
            request_curation: true,
            ..SyncConfig::default()
        };
        let orchestrator = orchestrator(client.clone(), store.clone(), config);

        let outcome = orchestrator.sync_entity(&entity).await;

        assert_eq!(outcome.action, crate::SyncAction::Updated);
        assert_eq!(outcome.record_id.as_deref(), Some("rec-old-v2"));
        assert_eq!(
            client.methods(),
            vec![
                "fetch_record_metadata",
                "create_version",
                "update_draft_metadata",
                "delete_draft_files",
                "initiate_files",
                "upload_file_content",
                "commit_file",
                "upload_file_content",
                "commit_file",
                "submit_to_community",
                // no request_curation on the update path
                "submit_review",
            ]
        );

        let entry = store.find("w1").await.unwrap().unwrap();
        assert_eq!(entry.record_id, "rec-old-v2");
        assert_eq!(entry.created_at, 1_600_000_000);
        assert!(entry.updated_at > 1_600_000_000);
    }

    #[tokio::test]
    async fn test_step_failure_reports_step_and_keeps_mapping() {
        let entity = test_entity("w1");
        let mut remote = rendered_metadata(&entity);
        remote["description"] = json!("<p>stale text</p>");

        let client = Arc::new(ScriptedClient {
            remote_metadata: Some(remote),
            fail_method: Some("update_draft_metadata"),
            ..ScriptedClient::default()
        });
        let store = test_store().await;
        seed_mapping(&store, "w1", "rec-old").await;
        let orchestrator = orchestrator(client.clone(), store.clone(), SyncConfig::default());

        let outcome = orchestrator.sync_entity(&entity).await;

        assert_eq!(outcome.action, crate::SyncAction::Failed);
        assert_eq!(outcome.failed_step, Some(SyncStep::UpdateDraftMetadata));

        // No further steps after the failing one
        let methods = client.methods();
        assert_eq!(methods.last().map(String::as_str), Some("update_draft_metadata"));
        assert!(!methods.contains(&"delete_draft_files".to_string()));

        // Prior mapping unchanged
        let entry = store.find("w1").await.unwrap().unwrap();
        assert_eq!(entry.record_id, "rec-old");
        assert_eq!(entry.updated_at, 1_600_000_000);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let client = Arc::new(ScriptedClient {
            fail_method: Some("update_draft_metadata"),
            remote_metadata: Some(json!({"title": "something else"})),
            ..ScriptedClient::default()
        });
        let store = test_store().await;
        seed_mapping(&store, "w-fails", "rec-old").await;
        let orchestrator = orchestrator(client.clone(), store.clone(), SyncConfig::default());

        let entities = vec![test_entity("w-fails"), test_entity("w-succeeds")];
        let report = orchestrator.sync_batch(&entities).await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.created(), 1);

        // The successful entity's mapping landed despite the earlier failure
        assert!(store.find("w-succeeds").await.unwrap().is_some());
        let failed = store.find("w-fails").await.unwrap().unwrap();
        assert_eq!(failed.record_id, "rec-old");
    }

    #[tokio::test]
    async fn test_draft_only_mode_stops_after_files() {
        let client = Arc::new(ScriptedClient::default());
        let store = test_store().await;
        let config = SyncConfig {
            mode: SyncMode::DraftOnly,
            community_id: Some("community-1".to_string()),
            request_curation: true,
            ..SyncConfig::default()
        };
        let orchestrator = orchestrator(client.clone(), store.clone(), config);

        let outcome = orchestrator.sync_entity(&test_entity("w1")).await;

        assert_eq!(outcome.action, crate::SyncAction::Created);
        let methods = client.methods();
        assert!(!methods.contains(&"submit_to_community".to_string()));
        assert!(!methods.contains(&"request_curation".to_string()));
        assert!(!methods.contains(&"submit_review".to_string()));
        assert_eq!(methods.last().map(String::as_str), Some("commit_file"));
    }

    #[tokio::test]
    async fn test_create_only_mode_skips_mapped_entities() {
        let client = Arc::new(ScriptedClient::default());
        let store = test_store().await;
        seed_mapping(&store, "w1", "rec-old").await;
        let config = SyncConfig {
            mode: SyncMode::CreateOnly,
            ..SyncConfig::default()
        };
        let orchestrator = orchestrator(client.clone(), store.clone(), config);

        let outcome = orchestrator.sync_entity(&test_entity("w1")).await;

        assert_eq!(outcome.action, crate::SyncAction::Skipped);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_limit_bounds_the_batch() {
        let client = Arc::new(ScriptedClient::default());
        let store = test_store().await;
        let config = SyncConfig {
            limit: Some(1),
            ..SyncConfig::default()
        };
        let orchestrator = orchestrator(client.clone(), store.clone(), config);

        let entities = vec![test_entity("w1"), test_entity("w2")];
        let report = orchestrator.sync_batch(&entities).await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].logical_id, "w1");
    }

    #[tokio::test]
    async fn test_entity_without_files_creates_metadata_only_record() {
        let client = Arc::new(ScriptedClient::default());
        let store = test_store().await;
        let orchestrator = orchestrator(client.clone(), store.clone(), SyncConfig::default());

        let mut entity = test_entity("w1");
        entity.files.clear();
        let outcome = orchestrator.sync_entity(&entity).await;

        assert_eq!(outcome.action, crate::SyncAction::Created);
        assert!(!client.methods().contains(&"initiate_files".to_string()));
    }
}
