//! Fragment aggregation.
//!
//! Merges the [`MetadataFragment`]s describing one logical entity into a
//! single [`MetadataSnapshot`]:
//!
//! 1. The first fragment's scalar fields form the base; later fragments only
//!    fill fields the base left absent or empty.
//! 2. The representative publication date is the chronologically latest date
//!    among all fragments that parses as `YYYY-MM-DD`; unparseable dates are
//!    skipped, never fatal.
//! 3. People are unioned in fragment order and deduplicated case-insensitively
//!    by `(full_name, role)`, first occurrence wins; a caller-supplied
//!    [`RolePolicy`] then splits them into creators and contributors.
//! 4. Organizations are deduplicated by `(name, role)`, related identifiers
//!    by identifier string.
//!
//! Entirely-empty fragments are counted and skipped. Only a batch with no
//! usable fragment at all is an error.

use crate::error::{MetadataError, Result};
use crate::fragment::{CorporateEntity, MetadataFragment, Person, RelatedIdentifier};
use crate::snapshot::{Attribution, MetadataSnapshot};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Calendar format accepted for publication dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a publication date string under the accepted calendar format.
pub fn parse_publication_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| MetadataError::InvalidDate(raw.to_string()))
}

/// How a source role maps onto the record's attribution lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleClass {
    /// Always a creator
    Creator { role_label: String },
    /// Creator only when no creator with the same name exists yet,
    /// otherwise dropped (the duplicate would restate an existing creator)
    SupplementalCreator { role_label: String },
    /// Contributor under the given repository role
    Contributor { role_id: String, role_label: String },
}

/// Injectable role→classification table.
///
/// The table differs between entity kinds (a multi-file work attributes its
/// author and intabulator as creators; a single-file source attributes its
/// editors), so it is supplied by the caller rather than hard-coded.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    rules: HashMap<String, RoleClass>,
}

impl RolePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, role: impl Into<String>, class: RoleClass) -> Self {
        self.rules.insert(role.into(), class);
        self
    }

    /// Classify a source role. Roles with no table entry become "other"
    /// contributors.
    pub fn classify(&self, role: &str) -> RoleClass {
        self.rules.get(role).cloned().unwrap_or(RoleClass::Contributor {
            role_id: "other".to_string(),
            role_label: "Other".to_string(),
        })
    }

    /// Stock policy for multi-file works: authors create, intabulators
    /// create unless the author already holds the slot, editor-like roles
    /// contribute.
    pub fn work() -> Self {
        Self::new()
            .rule(
                "author",
                RoleClass::Creator {
                    role_label: "Author".to_string(),
                },
            )
            .rule(
                "intabulator",
                RoleClass::SupplementalCreator {
                    role_label: "Intabulator".to_string(),
                },
            )
            .rule(
                "meiEditor",
                RoleClass::Contributor {
                    role_id: "editor".to_string(),
                    role_label: "Editor".to_string(),
                },
            )
            .rule(
                "fronimoEditor",
                RoleClass::Contributor {
                    role_id: "editor".to_string(),
                    role_label: "Editor".to_string(),
                },
            )
            .rule(
                "metadataContact",
                RoleClass::Contributor {
                    role_id: "contactperson".to_string(),
                    role_label: "Contact person".to_string(),
                },
            )
            .rule(
                "publisher",
                RoleClass::Contributor {
                    role_id: "other".to_string(),
                    role_label: "Publisher".to_string(),
                },
            )
    }

    /// Stock policy for single-file sources: editors create, the metadata
    /// contact contributes.
    pub fn source() -> Self {
        Self::new()
            .rule(
                "editor",
                RoleClass::Creator {
                    role_label: "Editor".to_string(),
                },
            )
            .rule(
                "editor metadataContact",
                RoleClass::Creator {
                    role_label: "Editor".to_string(),
                },
            )
            .rule(
                "metadataContact",
                RoleClass::Contributor {
                    role_id: "contactperson".to_string(),
                    role_label: "Contact person".to_string(),
                },
            )
    }
}

/// Merges fragments into snapshots under a given role policy.
#[derive(Debug, Clone)]
pub struct Aggregator {
    policy: RolePolicy,
}

impl Aggregator {
    pub fn new(policy: RolePolicy) -> Self {
        Self { policy }
    }

    /// Aggregate the fragments of one logical entity.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::NoUsableFragments`] when every fragment in
    /// the batch is empty (or the batch itself is).
    pub fn aggregate(&self, fragments: &[MetadataFragment]) -> Result<MetadataSnapshot> {
        let total = fragments.len();
        let usable: Vec<&MetadataFragment> = fragments.iter().filter(|f| !f.is_empty()).collect();
        let empty = total - usable.len();
        if empty > 0 {
            warn!(empty, total, "Skipping empty fragments");
        }
        if usable.is_empty() {
            return Err(MetadataError::NoUsableFragments { total, empty });
        }

        let mut snapshot = MetadataSnapshot {
            source_count: usable.len(),
            ..MetadataSnapshot::default()
        };

        for fragment in &usable {
            fill_scalar(&mut snapshot.title, &fragment.title);
            fill_scalar(&mut snapshot.license, &fragment.license);
            fill_scalar(&mut snapshot.shelfmark, &fragment.shelfmark);
            fill_scalar(&mut snapshot.description, &fragment.description);
            fill_extra(&mut snapshot.extra, &fragment.extra);
        }

        snapshot.publication_date = latest_valid_date(&usable);

        let people = dedup_people(&usable);
        let (creators, contributors) = self.classify_people(people);
        snapshot.creators = creators;
        snapshot.contributors = contributors;

        snapshot.organizations = dedup_organizations(&usable);
        snapshot.related_identifiers = dedup_related(&usable);

        debug!(
            creators = snapshot.creators.len(),
            contributors = snapshot.contributors.len(),
            organizations = snapshot.organizations.len(),
            sources = snapshot.source_count,
            "Aggregated fragments into snapshot"
        );

        Ok(snapshot)
    }

    /// Split deduplicated people into creators and contributors.
    ///
    /// Three passes, preserving precedence: plain creators first, then
    /// supplemental creators (skipped when a creator of the same name
    /// already exists), then contributors.
    fn classify_people(&self, people: Vec<Person>) -> (Vec<Attribution>, Vec<Attribution>) {
        let mut creators = Vec::new();
        let mut contributors = Vec::new();
        let mut creator_names: HashSet<String> = HashSet::new();

        for person in &people {
            if let RoleClass::Creator { role_label } = self.policy.classify(&person.role) {
                creator_names.insert(person.display_name().to_lowercase());
                creators.push(Attribution {
                    person: person.clone(),
                    role_id: "other".to_string(),
                    role_label,
                });
            }
        }

        for person in &people {
            if let RoleClass::SupplementalCreator { role_label } =
                self.policy.classify(&person.role)
            {
                let name = person.display_name().to_lowercase();
                if creator_names.contains(&name) {
                    continue;
                }
                creator_names.insert(name);
                creators.push(Attribution {
                    person: person.clone(),
                    role_id: "other".to_string(),
                    role_label,
                });
            }
        }

        for person in people {
            if let RoleClass::Contributor { role_id, role_label } =
                self.policy.classify(&person.role)
            {
                contributors.push(Attribution {
                    person,
                    role_id,
                    role_label,
                });
            }
        }

        (creators, contributors)
    }
}

fn fill_scalar(base: &mut Option<String>, candidate: &Option<String>) {
    let base_empty = base.as_deref().map_or(true, |s| s.trim().is_empty());
    if !base_empty {
        return;
    }
    if let Some(value) = candidate {
        if !value.trim().is_empty() {
            *base = Some(value.clone());
        }
    }
}

fn fill_extra(base: &mut BTreeMap<String, String>, candidate: &BTreeMap<String, String>) {
    for (key, value) in candidate {
        if value.trim().is_empty() {
            continue;
        }
        let missing = base.get(key).map_or(true, |v| v.trim().is_empty());
        if missing {
            base.insert(key.clone(), value.clone());
        }
    }
}

/// Latest date among all fragments whose date string parses under
/// [`DATE_FORMAT`]. Unparseable dates are logged and ignored.
fn latest_valid_date(fragments: &[&MetadataFragment]) -> Option<String> {
    let mut latest: Option<(NaiveDate, String)> = None;
    for fragment in fragments {
        let Some(raw) = fragment.publication_date.as_deref() else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match parse_publication_date(raw) {
            Ok(parsed) => {
                if latest.as_ref().map_or(true, |(best, _)| parsed > *best) {
                    latest = Some((parsed, raw.to_string()));
                }
            }
            Err(_) => {
                warn!(date = raw, file = %fragment.source_file.display(), "Skipping invalid date");
            }
        }
    }
    latest.map(|(_, raw)| raw)
}

fn dedup_people(fragments: &[&MetadataFragment]) -> Vec<Person> {
    let mut seen = HashSet::new();
    let mut people = Vec::new();
    for fragment in fragments {
        for person in &fragment.people {
            if seen.insert(person.dedup_key()) {
                people.push(person.clone());
            }
        }
    }
    people
}

fn dedup_organizations(fragments: &[&MetadataFragment]) -> Vec<CorporateEntity> {
    let mut seen = HashSet::new();
    let mut organizations = Vec::new();
    for fragment in fragments {
        for org in &fragment.organizations {
            if seen.insert(org.dedup_key()) {
                organizations.push(org.clone());
            }
        }
    }
    organizations
}

fn dedup_related(fragments: &[&MetadataFragment]) -> Vec<RelatedIdentifier> {
    let mut seen = HashSet::new();
    let mut related = Vec::new();
    for fragment in fragments {
        for link in &fragment.related_identifiers {
            if seen.insert(link.identifier.clone()) {
                related.push(link.clone());
            }
        }
    }
    related
}
