use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::CatalogError;
use crate::listing::{Listing, ListingRecord};
use crate::snapshot::ListingSnapshot;

/// Supplier of the ordered listing collection.
pub trait ListingSource {
    fn load(&self) -> Result<ListingSnapshot, CatalogError>;
}

/// Either `{"projects": [...]}` or a bare array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingDocument {
    Wrapped { projects: Vec<ListingRecord> },
    Bare(Vec<ListingRecord>),
}

pub fn parse_listings_json(raw: &str) -> Result<ListingSnapshot, CatalogError> {
    let doc: ListingDocument =
        serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
    let records = match doc {
        ListingDocument::Wrapped { projects } => projects,
        ListingDocument::Bare(records) => records,
    };
    let listings = records
        .into_iter()
        .map(Listing::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    ListingSnapshot::new(listings)
}

#[derive(Debug, Clone)]
pub struct JsonFileListingSource {
    path: PathBuf,
}

impl JsonFileListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ListingSource for JsonFileListingSource {
    fn load(&self) -> Result<ListingSnapshot, CatalogError> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| CatalogError::Io(format!("read {:?}: {e}", self.path)))?;
        let snapshot = parse_listings_json(&raw)?;
        debug!(
            "loaded {} listings from {:?} (snapshot {})",
            snapshot.len(),
            self.path,
            snapshot.id()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::ids::ListingId;

    const BARE: &str = r#"[
        {"id": 1, "name": "Oak Villas", "latitude": 12.9, "longitude": 77.5,
         "minPrice": 1, "maxPrice": 2},
        {"id": 2, "name": "Maple Heights", "latitude": 12.95, "longitude": 77.6,
         "minPrice": 3, "maxPrice": 4}
    ]"#;

    #[test]
    fn parses_bare_array() {
        let snap = parse_listings_json(BARE).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.listings()[1].name, "Maple Heights");
    }

    #[test]
    fn parses_projects_wrapper() {
        let raw = format!(r#"{{"projects": {BARE}, "total": 2}}"#);
        let snap = parse_listings_json(&raw).unwrap();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn reports_malformed_json() {
        let err = parse_listings_json("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn reports_missing_coordinate_as_parse_error() {
        let err = parse_listings_json(r#"[{"id": 1, "name": "A", "minPrice": 1, "maxPrice": 2}]"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn duplicate_ids_fail_the_load() {
        let raw = BARE.replace("\"id\": 2", "\"id\": 1");
        let err = parse_listings_json(&raw).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(ListingId(1)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let src = JsonFileListingSource::new("/definitely/not/here.json");
        assert!(matches!(src.load(), Err(CatalogError::Io(_))));
    }
}
