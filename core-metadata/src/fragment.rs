//! Per-file metadata fragment model.
//!
//! A [`MetadataFragment`] carries everything the external extractor pulled out
//! of one physical source file. Fragments are immutable inputs; aggregation
//! (see [`crate::aggregate`]) merges the fragments of one logical entity into
//! a single snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A person mentioned in a source file, together with the role the source
/// assigns to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Role string as found in the source (e.g. "author", "intabulator")
    pub role: String,
    pub given_name: String,
    pub family_name: String,
    /// Display name; empty when the source only provides name parts
    pub full_name: String,
    /// Authority reference (URI or derived identifier), when present
    pub external_ref: Option<String>,
}

impl Person {
    /// Display name, synthesized from the name parts when the source did not
    /// provide one.
    pub fn display_name(&self) -> String {
        if !self.full_name.trim().is_empty() {
            return self.full_name.trim().to_string();
        }
        let mut parts = Vec::new();
        if !self.given_name.trim().is_empty() {
            parts.push(self.given_name.trim());
        }
        if !self.family_name.trim().is_empty() {
            parts.push(self.family_name.trim());
        }
        parts.join(" ")
    }

    /// Deduplication identity: lowercased `name-role`.
    ///
    /// Two entries with the same identity describe the same person acting in
    /// the same role, regardless of capitalization differences between
    /// source files.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}-{}",
            self.display_name().to_lowercase(),
            self.role.trim().to_lowercase()
        )
    }
}

/// An organization (funder, provider, publisher, ...) mentioned in a source
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateEntity {
    pub role: String,
    pub name: String,
    pub external_ref: Option<String>,
}

impl CorporateEntity {
    /// Deduplication identity: `name-role`, as found in the source.
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.name.trim(), self.role.trim())
    }
}

/// A link from the deposited record to related external material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedIdentifier {
    pub identifier: String,
    /// Relation type id (repository vocabulary), e.g. "ispartof"
    pub relation_type: String,
    /// Identifier scheme, e.g. "url"
    pub scheme: String,
}

impl RelatedIdentifier {
    /// A plain URL link with the default `ispartof` relation.
    pub fn part_of_url(url: impl Into<String>) -> Self {
        Self {
            identifier: url.into(),
            relation_type: "ispartof".to_string(),
            scheme: "url".to_string(),
        }
    }
}

/// Metadata extracted from a single physical source file.
///
/// Produced by the domain-specific extractor (outside this crate), consumed
/// by [`crate::aggregate::Aggregator`]. Scalar fields are `None` when the
/// source did not provide them; `extra` holds free-form key/value pairs that
/// participate in fill-missing merging but not in the rendered document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFragment {
    /// The file this fragment was extracted from
    pub source_file: PathBuf,
    pub title: Option<String>,
    /// Creation/publication date string, expected as `YYYY-MM-DD`
    pub publication_date: Option<String>,
    pub license: Option<String>,
    pub shelfmark: Option<String>,
    pub description: Option<String>,
    /// Free-form extracted key/value pairs
    pub extra: BTreeMap<String, String>,
    pub people: Vec<Person>,
    pub organizations: Vec<CorporateEntity>,
    pub related_identifiers: Vec<RelatedIdentifier>,
}

impl MetadataFragment {
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            ..Self::default()
        }
    }

    /// True when the fragment carries no usable data at all.
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }

        blank(&self.title)
            && blank(&self.publication_date)
            && blank(&self.license)
            && blank(&self.shelfmark)
            && blank(&self.description)
            && self.extra.values().all(|v| v.trim().is_empty())
            && self.people.is_empty()
            && self.organizations.is_empty()
            && self.related_identifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_full_name() {
        let person = Person {
            role: "author".to_string(),
            given_name: "Hans".to_string(),
            family_name: "Judenkünig".to_string(),
            full_name: "Hans Judenkünig".to_string(),
            external_ref: None,
        };
        assert_eq!(person.display_name(), "Hans Judenkünig");
    }

    #[test]
    fn test_display_name_from_parts() {
        let person = Person {
            role: "editor".to_string(),
            given_name: "Jane".to_string(),
            family_name: "Doe".to_string(),
            full_name: String::new(),
            external_ref: None,
        };
        assert_eq!(person.display_name(), "Jane Doe");
    }

    #[test]
    fn test_person_dedup_key_is_case_insensitive() {
        let a = Person {
            role: "Editor".to_string(),
            given_name: String::new(),
            family_name: String::new(),
            full_name: "Jane Doe".to_string(),
            external_ref: None,
        };
        let b = Person {
            role: "editor".to_string(),
            given_name: String::new(),
            family_name: String::new(),
            full_name: "jane doe".to_string(),
            external_ref: Some("https://example.org/staff/1".to_string()),
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_fragment_is_empty() {
        let mut fragment = MetadataFragment::new("work_n1_a.xml");
        assert!(fragment.is_empty());

        fragment.title = Some("   ".to_string());
        assert!(fragment.is_empty());

        fragment.title = Some("Ein gut Tanz".to_string());
        assert!(!fragment.is_empty());
    }
}
