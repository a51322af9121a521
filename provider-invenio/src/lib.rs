//! # InvenioRDM Provider
//!
//! Implements `RepositoryClient` against an InvenioRDM-style records API.
//!
//! ## Overview
//!
//! This module provides:
//! - Draft and version creation (`POST /records`, `POST /records/{id}/versions`)
//! - Draft metadata replacement (`PUT /records/{id}/draft`)
//! - File registration, streaming content upload and commit
//! - Community submission, curation requests and review submission
//! - Published-metadata retrieval for the diff path
//!
//! Authentication is a bearer token applied to every request. No retries
//! happen here: a transport failure or unexpected status surfaces to the
//! orchestrator, which fails the entity at the calling step.

pub mod client;
pub mod error;
pub mod types;

pub use client::{InvenioClient, InvenioConfig, RecordUrls};
pub use error::{InvenioError, Result};
