//! Search profiles: per-collection index location, access-control fields and
//! relevance settings.

use std::collections::HashMap;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::traits::{Result, SearchError};

/// Value of the visibility field for documents anyone may see.
pub const PUBLISHED: &str = "published";

/// Name of the byte-size sum aggregate in compiled queries.
pub const TOTAL_BYTES_AGGREGATION: &str = "total_bytes";

/// Collections that can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SearchKind {
    Dataset,
    Events,
    Package,
}

/// A field eligible for free-text matching and its relevance weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextField {
    pub path: &'static str,
    pub boost: f64,
}

impl TextField {
    pub const fn new(path: &'static str, boost: f64) -> Self {
        Self { path, boost }
    }
}

/// A first-party owner whose published documents rank above others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrivilegedOwner {
    pub field: &'static str,
    pub identity: &'static str,
    pub boost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchProfile {
    pub kind: SearchKind,
    pub index: &'static str,
    pub doc_type: &'static str,
    pub owner_field: &'static str,
    pub visibility_field: &'static str,
    pub timestamp_field: Option<&'static str>,
    pub text_fields: Vec<TextField>,
    pub result_fields: Option<Vec<&'static str>>,
    pub default_size: u64,
    pub max_size: u64,
    pub privileged_owner: Option<PrivilegedOwner>,
    pub bytes_field: &'static str,
}

impl SearchProfile {
    pub fn dataset() -> Self {
        Self {
            kind: SearchKind::Dataset,
            index: "datahub",
            doc_type: "dataset",
            owner_field: "datahub.ownerid",
            visibility_field: "datahub.findability",
            timestamp_field: None,
            text_fields: vec![
                TextField::new("title", 5.0),
                TextField::new("datahub.owner", 1.0),
                TextField::new("datahub.ownerid", 1.0),
                TextField::new("datapackage.readme", 2.0),
            ],
            result_fields: None,
            default_size: 50,
            max_size: 100,
            privileged_owner: Some(PrivilegedOwner {
                field: "datahub.ownerid",
                identity: "core",
                boost: 4.5,
            }),
            bytes_field: "datahub.stats.bytes",
        }
    }

    pub fn events() -> Self {
        Self {
            kind: SearchKind::Events,
            index: "events",
            doc_type: "event",
            owner_field: "ownerid",
            visibility_field: "findability",
            timestamp_field: Some("timestamp"),
            text_fields: Vec::new(),
            result_fields: None,
            default_size: 50,
            max_size: 50,
            privileged_owner: None,
            bytes_field: "datahub.stats.bytes",
        }
    }

    pub fn package() -> Self {
        Self {
            kind: SearchKind::Package,
            index: "packages",
            doc_type: "package",
            owner_field: "ownerid",
            visibility_field: "findability",
            timestamp_field: None,
            text_fields: vec![
                TextField::new("title", 5.0),
                TextField::new("name", 3.0),
                TextField::new("description", 1.0),
            ],
            result_fields: None,
            default_size: 50,
            max_size: 50,
            privileged_owner: Some(PrivilegedOwner {
                field: "ownerid",
                identity: "core",
                boost: 4.5,
            }),
            bytes_field: "datahub.stats.bytes",
        }
    }

    fn validate(&self) -> std::result::Result<(), RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidProfile {
            kind: self.kind,
            reason: reason.to_string(),
        };

        if self.index.is_empty() || self.doc_type.is_empty() {
            return Err(invalid("index and document type must be set"));
        }
        if self.owner_field.is_empty() || self.visibility_field.is_empty() {
            return Err(invalid("owner and visibility fields must be set"));
        }
        if self.max_size == 0 || self.default_size > self.max_size {
            return Err(invalid("default size must not exceed a non-zero max size"));
        }
        if self.text_fields.iter().any(|f| f.boost <= 0.0) {
            return Err(invalid("text field boosts must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no search profile registered for kind '{0}'")]
    MissingProfile(SearchKind),
    #[error("search profile registered twice for kind '{0}'")]
    DuplicateProfile(SearchKind),
    #[error("invalid search profile '{kind}': {reason}")]
    InvalidProfile { kind: SearchKind, reason: String },
}

/// Read-only lookup from kind to profile, checked to be complete on creation.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<SearchKind, SearchProfile>,
}

impl ProfileRegistry {
    pub fn new(profiles: Vec<SearchProfile>) -> std::result::Result<Self, RegistryError> {
        let mut by_kind = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            profile.validate()?;
            let kind = profile.kind;
            if by_kind.insert(kind, profile).is_some() {
                return Err(RegistryError::DuplicateProfile(kind));
            }
        }

        if let Some(missing) = SearchKind::iter().find(|kind| !by_kind.contains_key(kind)) {
            return Err(RegistryError::MissingProfile(missing));
        }

        Ok(Self { profiles: by_kind })
    }

    /// The profiles this service ships with.
    pub fn builtin() -> std::result::Result<Self, RegistryError> {
        Self::new(vec![
            SearchProfile::dataset(),
            SearchProfile::events(),
            SearchProfile::package(),
        ])
    }

    pub fn profile(&self, kind: SearchKind) -> &SearchProfile {
        // Completeness is checked in `new`.
        &self.profiles[&kind]
    }

    /// Look up the profile for a kind name taken from a request.
    pub fn lookup(&self, kind: &str) -> Result<&SearchProfile> {
        SearchKind::from_str(kind)
            .map(|kind| self.profile(kind))
            .map_err(|_| SearchError::UnknownProfile(kind.to_string()))
    }

    /// Replace a profile, e.g. to search a differently named index.
    pub fn with_profile(
        mut self,
        profile: SearchProfile,
    ) -> std::result::Result<Self, RegistryError> {
        profile.validate()?;
        self.profiles.insert(profile.kind, profile);
        Ok(self)
    }
}
