//! # Record Lifecycle Sync Module
//!
//! Reconciles locally aggregated metadata snapshots against records already
//! published in a remote repository.
//!
//! ## Overview
//!
//! This module decides, per logical entity, whether to create a new record,
//! create a new version of an existing one, or skip it because nothing
//! changed, then drives the multi-step remote workflow to completion:
//! - Looking up the entity in the durable mapping store
//! - Diffing current remote metadata against the fresh snapshot
//! - Walking the create or update step sequence against `RepositoryClient`
//! - Recording per-entity outcomes with the failing step on partial failure
//! - Writing the mapping back only for entities that reach DONE
//!
//! The remote workflow has no cross-step atomicity: a failed step leaves the
//! remote side holding a partial draft. That is reported, never rolled back.
//!
//! ## Components
//!
//! - **Repository Client Contract** (`client`): the remote operations the
//!   orchestrator depends on, implemented by provider crates
//! - **Mapping Store** (`mapping`): durable `logical_id → record_id` table
//! - **Outcomes** (`outcome`): per-entity results and the batch report
//! - **Orchestrator** (`orchestrator`): the per-entity state machine

pub mod client;
pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod outcome;

pub use client::{DraftHandle, FileSlot, RepositoryClient};
pub use error::{Result, SyncError};
pub use mapping::{MappingEntry, MappingStore, SqliteMappingStore};
pub use orchestrator::{SyncConfig, SyncEntity, SyncMode, SyncOrchestrator};
pub use outcome::{SyncAction, SyncOutcome, SyncReport, SyncStep};
