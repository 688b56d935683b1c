//! Storage collaborator
//!
//! The engine only needs, per site, the flat unit records and the
//! periodization table. [`UnitSource`] is that contract; [`InMemoryStore`]
//! and [`FileStore`] are the two implementations shipped here.
//!
//! Fixture document shape (JSON or YAML):
//!
//! ```yaml
//! sites:
//!   - site: Pompeii
//!     units:
//!       - { unit: "1", relationships: "Covers 2" }
//!       - { unit: "2" }
//!     periodization:
//!       - { period: "1", phase: "1", label: "Roman" }
//! ```

use crate::error::StoreError;
use crate::period::{PeriodEntry, PeriodLookup};
use crate::unit::UnitRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of unit records and periodizations
pub trait UnitSource {
    /// Unit records of one site, in storage order
    fn site_units(&self, site: &str) -> Result<Vec<UnitRecord>, StoreError>;

    /// Periodization of one site
    fn periodization(&self, site: &str) -> Result<PeriodLookup, StoreError>;

    /// Every site in the store
    fn sites(&self) -> Result<Vec<String>, StoreError>;
}

/// One site of a fixture document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFixture {
    /// Site identifier
    pub site: String,
    /// Unit records
    #[serde(default)]
    pub units: Vec<UnitRecord>,
    /// Periodization rows
    #[serde(default)]
    pub periodization: Vec<PeriodEntry>,
}

/// Fixture document: a list of sites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureDocument {
    /// Sites, in document order
    #[serde(default)]
    pub sites: Vec<SiteFixture>,
}

#[derive(Debug, Clone, Default)]
struct SiteData {
    units: Vec<UnitRecord>,
    periodization: PeriodLookup,
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    sites: IndexMap<String, SiteData>,
}

impl InMemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) a site with records
    #[must_use]
    pub fn with_units<I>(mut self, site: &str, units: I) -> Self
    where
        I: IntoIterator<Item = UnitRecord>,
    {
        self.insert_units(site, units);
        self
    }

    /// Set a site's periodization
    #[must_use]
    pub fn with_periodization(mut self, site: &str, lookup: PeriodLookup) -> Self {
        self.sites.entry(site.to_string()).or_default().periodization = lookup;
        self
    }

    /// Append records to a site. Records with a blank site take `site`.
    pub fn insert_units<I>(&mut self, site: &str, units: I)
    where
        I: IntoIterator<Item = UnitRecord>,
    {
        let data = self.sites.entry(site.to_string()).or_default();
        data.units.extend(units.into_iter().map(|mut record| {
            if record.site.trim().is_empty() {
                record.site = site.to_string();
            }
            record
        }));
    }

    /// Build from a decoded fixture document
    #[must_use]
    pub fn from_document(document: FixtureDocument) -> Self {
        let mut store = Self::new();
        for fixture in document.sites {
            store.insert_units(&fixture.site, fixture.units);
            store
                .sites
                .entry(fixture.site)
                .or_default()
                .periodization
                .extend(fixture.periodization);
        }
        store
    }

    fn site(&self, site: &str) -> Result<&SiteData, StoreError> {
        self.sites
            .get(site)
            .ok_or_else(|| StoreError::UnknownSite(site.to_string()))
    }
}

impl UnitSource for InMemoryStore {
    fn site_units(&self, site: &str) -> Result<Vec<UnitRecord>, StoreError> {
        Ok(self.site(site)?.units.clone())
    }

    fn periodization(&self, site: &str) -> Result<PeriodLookup, StoreError> {
        Ok(self.site(site)?.periodization.clone())
    }

    fn sites(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.sites.keys().cloned().collect())
    }
}

/// Fixture file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl FixtureFormat {
    /// Detect from a file extension
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Decode a document
    pub fn decode(self, path: &Path, text: &str) -> Result<FixtureDocument, StoreError> {
        match self {
            Self::Json => serde_json::from_str(text)
                .map_err(|e| StoreError::decode_error(path, e.to_string())),
            Self::Yaml => serde_yaml::from_str(text)
                .map_err(|e| StoreError::decode_error(path, e.to_string())),
        }
    }
}

/// Store backed by a fixture file, read once at open
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl FileStore {
    /// Read and decode a fixture file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let format = FixtureFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::io_error(path, e))?;
        let document = format.decode(path, &text)?;
        tracing::debug!(path = %path.display(), sites = document.sites.len(), "opened fixture");
        Ok(Self {
            path: path.to_path_buf(),
            inner: InMemoryStore::from_document(document),
        })
    }

    /// Path of the backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UnitSource for FileStore {
    fn site_units(&self, site: &str) -> Result<Vec<UnitRecord>, StoreError> {
        self.inner.site_units(site)
    }

    fn periodization(&self, site: &str) -> Result<PeriodLookup, StoreError> {
        self.inner.periodization(site)
    }

    fn sites(&self) -> Result<Vec<String>, StoreError> {
        self.inner.sites()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn in_memory_store_fills_blank_site() {
        let store = InMemoryStore::new().with_units("S", [UnitRecord::new("", "1")]);
        let units = store.site_units("S").unwrap();
        assert_eq!(units[0].site, "S");
        assert_eq!(store.sites().unwrap(), ["S"]);
    }

    #[test]
    fn unknown_site_is_an_error() {
        let err = InMemoryStore::new().site_units("nowhere").unwrap_err();
        assert!(matches!(err, StoreError::UnknownSite(s) if s == "nowhere"));
    }

    #[test]
    fn yaml_fixture_round_trips_through_file_store() {
        const FIXTURE: &str = r#"
sites:
  - site: S
    units:
      - { us: 1, rapporti: "Copre 2" }
      - { us: 2 }
    periodization:
      - { period: 1, phase: 1, label: Roman }
"#;
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let store = FileStore::open(file.path()).unwrap();
        let units = store.site_units("S").unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].relationships, "Copre 2");
        assert_eq!(store.periodization("S").unwrap().get("1", "1"), Some("Roman"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = FileStore::open("fixture.csv").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn corrupt_json_is_a_decode_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"sites\": [").unwrap();
        let err = FileStore::open(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
