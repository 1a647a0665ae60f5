use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use foundation::ids::ListingId;

use crate::CatalogError;
use crate::listing::Listing;

/// Content identity of a snapshot: blake3 over every field of every listing,
/// in order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId(blake3::Hash);

impl SnapshotId {
    fn of(listings: &[Listing]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(listings.len() as u64).to_le_bytes());
        for l in listings {
            hasher.update(&l.id.get().to_le_bytes());
            hash_str(&mut hasher, &l.name);
            hash_str(&mut hasher, &l.slug);
            hash_str(&mut hasher, &l.city);
            hash_str(&mut hasher, &l.micromarket);
            for v in [
                l.position.lat,
                l.position.lon,
                l.price.min,
                l.price.max,
                l.area.min,
                l.area.max,
                l.rating,
            ] {
                hasher.update(&v.to_bits().to_le_bytes());
            }
            hasher.update(&(l.typologies.len() as u64).to_le_bytes());
            for t in &l.typologies {
                hash_str(&mut hasher, t);
            }
            hash_str(&mut hasher, &l.possession_date);
            hash_str(&mut hasher, &l.image);
            hash_str(&mut hasher, &l.image_alt);
            hash_str(&mut hasher, &l.property_type);
        }
        SnapshotId(hasher.finalize())
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

// Length-prefixed so adjacent fields cannot run together.
fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is enough for logs.
        write!(f, "{}", &self.to_hex()[..12])
    }
}

/// Immutable, cheaply clonable collection of listings for one page.
///
/// Invariant: listing ids are unique within a snapshot.
#[derive(Debug, Clone)]
pub struct ListingSnapshot {
    listings: Arc<[Listing]>,
    id: SnapshotId,
}

impl ListingSnapshot {
    pub fn new(listings: Vec<Listing>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(listings.len());
        for l in &listings {
            if !seen.insert(l.id) {
                return Err(CatalogError::DuplicateId(l.id));
            }
        }
        let id = SnapshotId::of(&listings);
        Ok(Self {
            listings: listings.into(),
            id,
        })
    }

    pub fn empty() -> Self {
        Self {
            listings: Arc::from(Vec::new()),
            id: SnapshotId::of(&[]),
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// First listing whose display name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.name == name)
    }

    /// Same backing allocation or same content.
    pub fn same_collection(&self, other: &ListingSnapshot) -> bool {
        Arc::ptr_eq(&self.listings, &other.listings) || self.id == other.id
    }

    /// Sub-snapshot over `range`, clamped to the collection bounds.
    pub fn slice(&self, range: Range<usize>) -> ListingSnapshot {
        let start = range.start.min(self.listings.len());
        let end = range.end.clamp(start, self.listings.len());
        let part = &self.listings[start..end];
        // Ids are unique in the parent, so they are unique in any slice of it.
        ListingSnapshot {
            listings: part.to_vec().into(),
            id: SnapshotId::of(part),
        }
    }
}

impl Default for ListingSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a ListingSnapshot {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::geo::LatLon;

    fn listing(id: u64, name: &str) -> Listing {
        Listing::new(ListingId(id), name, LatLon::new(12.0 + id as f64 * 0.01, 77.5))
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ListingSnapshot::new(vec![listing(1, "A"), listing(1, "B")]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(ListingId(1)));
    }

    #[test]
    fn finds_first_listing_by_name() {
        let snap =
            ListingSnapshot::new(vec![listing(1, "A"), listing(2, "B"), listing(3, "B")]).unwrap();
        assert_eq!(snap.find_by_name("B").map(|l| l.id), Some(ListingId(2)));
        assert!(snap.find_by_name("C").is_none());
        assert_eq!(snap.get(ListingId(3)).map(|l| l.name.as_str()), Some("B"));
    }

    #[test]
    fn identity_tracks_content() {
        let a = ListingSnapshot::new(vec![listing(1, "A"), listing(2, "B")]).unwrap();
        let b = ListingSnapshot::new(vec![listing(1, "A"), listing(2, "B")]).unwrap();
        let c = ListingSnapshot::new(vec![listing(2, "B"), listing(1, "A")]).unwrap();

        assert!(a.same_collection(&a.clone()));
        assert!(a.same_collection(&b));
        assert!(!a.same_collection(&c));
    }

    #[test]
    fn identity_covers_listing_details() {
        let a = ListingSnapshot::new(vec![listing(1, "A")]).unwrap();
        let repriced =
            ListingSnapshot::new(vec![listing(1, "A").with_price(5e6, 9e6)]).unwrap();
        let redated =
            ListingSnapshot::new(vec![listing(1, "A").with_possession_date("2027-03")]).unwrap();

        assert!(!a.same_collection(&repriced));
        assert!(!a.same_collection(&redated));
        assert!(!repriced.same_collection(&redated));
    }

    #[test]
    fn slice_is_clamped() {
        let snap =
            ListingSnapshot::new(vec![listing(1, "A"), listing(2, "B"), listing(3, "C")]).unwrap();
        let ids: Vec<_> = snap.slice(1..10).iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(snap.slice(5..8).is_empty());
    }
}
