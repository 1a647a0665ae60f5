use catalog::listing::Listing;
use foundation::geo::LatLon;
use foundation::ids::ListingId;
use serde::{Deserialize, Serialize};

/// The point the user picked, and which listing it came from.
///
/// Matching contract (see [`crate::resolve_selected`]):
/// - with `listing_id`, only the listing with that id matches;
/// - without it, the first listing with an equal `name` matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub position: LatLon,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<ListingId>,
}

impl SelectedLocation {
    pub fn new(position: LatLon, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            listing_id: None,
        }
    }

    pub fn with_listing_id(mut self, id: ListingId) -> Self {
        self.listing_id = Some(id);
        self
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self.listing_id {
            Some(id) => listing.id == id,
            None => listing.name == self.name,
        }
    }
}

impl From<&Listing> for SelectedLocation {
    fn from(listing: &Listing) -> Self {
        SelectedLocation::new(listing.position, listing.name.clone()).with_listing_id(listing.id)
    }
}
