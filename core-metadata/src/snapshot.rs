//! Aggregated metadata snapshot and its deposit-document rendering.
//!
//! A [`MetadataSnapshot`] is the deduplicated view of one logical entity,
//! recomputed from scratch on every run — it is never incrementally mutated,
//! so the same fragments always yield the same snapshot.

use crate::fragment::{CorporateEntity, Person, RelatedIdentifier};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A person attributed on the record, with the repository role they were
/// classified into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub person: Person,
    /// Repository role vocabulary id (e.g. "editor", "contactperson", "other")
    pub role_id: String,
    /// Human-readable role label (e.g. "Editor", "Intabulator")
    pub role_label: String,
}

/// Per-deployment constants of the deposit document.
///
/// Everything here is repository policy rather than extracted metadata:
/// publisher name, standing reference links, and the resource-type and
/// rights objects of the target vocabulary. Injected so the engine stays
/// deployment-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositProfile {
    pub publisher: String,
    /// Standing reference URLs attached to every record
    pub references: Vec<String>,
    /// Resource-type object in the repository's vocabulary
    pub resource_type: Value,
    /// Rights/license objects in the repository's vocabulary
    pub rights: Vec<Value>,
}

impl DepositProfile {
    pub fn new(publisher: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            references: Vec::new(),
            resource_type: json!({"id": "dataset"}),
            rights: Vec::new(),
        }
    }
}

/// The aggregated, deduplicated metadata for one logical entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    pub title: Option<String>,
    /// Representative creation date, `YYYY-MM-DD`; the chronologically
    /// latest valid date across the fragments
    pub publication_date: Option<String>,
    pub license: Option<String>,
    pub shelfmark: Option<String>,
    pub description: Option<String>,
    pub extra: BTreeMap<String, String>,
    pub creators: Vec<Attribution>,
    pub contributors: Vec<Attribution>,
    pub organizations: Vec<CorporateEntity>,
    pub related_identifiers: Vec<RelatedIdentifier>,
    /// Number of non-empty fragments that contributed
    pub source_count: usize,
}

impl MetadataSnapshot {
    /// Render the snapshot into the deposit document (`{"metadata": {...}}`)
    /// the repository API accepts.
    ///
    /// `today` is the submission date stamped as `publication_date`
    /// (`YYYY-MM-DD`); the extracted creation date goes into `dates`. Passed
    /// in rather than read from the clock so rendering stays deterministic.
    pub fn to_document(&self, profile: &DepositProfile, today: &str) -> Value {
        let creators: Vec<Value> = self.creators.iter().map(attribution_entry).collect();
        let contributors: Vec<Value> = self.contributors.iter().map(attribution_entry).collect();

        let references: Vec<Value> = profile
            .references
            .iter()
            .map(|url| json!({"reference": url}))
            .collect();

        let related_identifiers: Vec<Value> = self
            .related_identifiers
            .iter()
            .map(|link| {
                json!({
                    "identifier": &link.identifier,
                    "relation_type": {"id": &link.relation_type},
                    "scheme": &link.scheme,
                })
            })
            .collect();

        let created = self.publication_date.as_deref().unwrap_or(today);

        json!({
            "metadata": {
                "title": self.title.clone().unwrap_or_default(),
                "creators": creators,
                "contributors": contributors,
                "description": self.description.clone().unwrap_or_default(),
                "publication_date": today,
                "dates": [
                    {
                        "date": created,
                        "description": "Creation date",
                        "type": {"id": "created", "title": {"en": "Created"}},
                    }
                ],
                "publisher": &profile.publisher,
                "references": references,
                "related_identifiers": related_identifiers,
                "resource_type": &profile.resource_type,
                "rights": &profile.rights,
            }
        })
    }
}

fn attribution_entry(attribution: &Attribution) -> Value {
    json!({
        "person_or_org": {
            "family_name": &attribution.person.family_name,
            "given_name": &attribution.person.given_name,
            "name": attribution.person.display_name(),
            "type": "personal",
        },
        "role": {
            "id": &attribution.role_id,
            "title": {"en": &attribution.role_label},
        },
    })
}
