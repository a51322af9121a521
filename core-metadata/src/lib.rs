//! # Metadata Model & Aggregation Module
//!
//! Turns per-file metadata fragments into canonical, comparable snapshots.
//!
//! ## Overview
//!
//! This module owns the metadata side of the sync engine:
//! - Normalizing loosely-typed metadata trees into a canonical comparable form
//! - Structural diffing of remote vs freshly computed metadata documents
//! - Merging multi-file fragments into one deduplicated snapshot per entity
//! - Rendering a snapshot into the deposit document the repository API accepts
//!
//! ## Components
//!
//! - **Fragment Model** (`fragment`): per-source-file extraction results
//! - **Normalizer** (`normalize`): order-independent, empty-stripped canonical form
//! - **Differ** (`diff`): field-level equivalence over normalized values
//! - **Aggregator** (`aggregate`): fragment merging and role classification
//! - **Snapshot** (`snapshot`): the aggregated view and its deposit rendering

pub mod aggregate;
pub mod diff;
pub mod error;
pub mod fragment;
pub mod normalize;
pub mod snapshot;

pub use aggregate::{parse_publication_date, Aggregator, RoleClass, RolePolicy};
pub use diff::{changed_fields, equivalent};
pub use error::{MetadataError, Result};
pub use fragment::{CorporateEntity, MetadataFragment, Person, RelatedIdentifier};
pub use normalize::{canonical_key, normalize};
pub use snapshot::{Attribution, DepositProfile, MetadataSnapshot};
