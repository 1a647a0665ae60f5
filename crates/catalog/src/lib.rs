pub mod listing;
pub mod page;
pub mod snapshot;
pub mod source;

pub use listing::*;
pub use page::*;
pub use snapshot::*;
pub use source::*;

use foundation::ids::ListingId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Io(String),
    Parse(String),
    DuplicateId(ListingId),
    InvalidRange {
        id: ListingId,
        field: &'static str,
    },
    InvalidCoordinate(ListingId),
    InvalidPageSize,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(msg) => write!(f, "listing source error: {msg}"),
            CatalogError::Parse(msg) => write!(f, "listing data malformed: {msg}"),
            CatalogError::DuplicateId(id) => write!(f, "duplicate listing id {id}"),
            CatalogError::InvalidRange { id, field } => {
                write!(f, "listing {id}: {field} range has min > max")
            }
            CatalogError::InvalidCoordinate(id) => {
                write!(f, "listing {id}: coordinate missing or out of range")
            }
            CatalogError::InvalidPageSize => write!(f, "page size must be at least 1"),
        }
    }
}

impl std::error::Error for CatalogError {}
