use std::collections::{HashMap, HashSet};

use foundation::arena::Arena;
use foundation::handles::Handle;
use foundation::ids::ListingId;

use crate::descriptor::MarkerDescriptor;

/// One surface-side operation needed to bring the map in line with a render.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerChange {
    Added {
        handle: Handle,
        descriptor: MarkerDescriptor,
    },
    Updated {
        handle: Handle,
        descriptor: MarkerDescriptor,
    },
    Removed {
        handle: Handle,
        listing_id: ListingId,
    },
}

/// Addressable marker handles, one per listing on the current page.
///
/// Descriptors live in a generational arena; `by_listing` indexes them by
/// listing id so a specific marker (e.g. the one whose popup must open) can be
/// targeted without walking the page.
///
/// The registry mirrors what the surface is believed to show. When a surface
/// call fails the caller rolls the mirror back (`forget`, `retry_removal`,
/// `invalidate`) and the next `sync` re-issues the missing work.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    arena: Arena<MarkerDescriptor>,
    by_listing: HashMap<ListingId, Handle>,
    /// Markers whose removal failed; still on the surface.
    pending_removals: Vec<(Handle, ListingId)>,
    /// Listings whose surface copy may differ from the registry.
    dirty: HashSet<ListingId>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn handle(&self, listing_id: ListingId) -> Option<Handle> {
        self.by_listing.get(&listing_id).copied()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.arena.contains(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&MarkerDescriptor> {
        self.arena.get(handle)
    }

    pub fn descriptor(&self, listing_id: ListingId) -> Option<&MarkerDescriptor> {
        self.handle(listing_id).and_then(|h| self.arena.get(h))
    }

    /// The marker currently shown with an open popup, if any.
    pub fn open_marker(&self) -> Option<(Handle, &MarkerDescriptor)> {
        self.arena.iter().find(|(_, d)| d.is_open)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &MarkerDescriptor)> + '_ {
        self.arena.iter()
    }

    /// Marks the popup of `listing_id` closed without a re-render.
    ///
    /// Returns `true` if it was open.
    pub fn mark_closed(&mut self, listing_id: ListingId) -> bool {
        let Some(handle) = self.handle(listing_id) else {
            return false;
        };
        match self.arena.get_mut(handle) {
            Some(d) if d.is_open => {
                d.is_open = false;
                true
            }
            _ => false,
        }
    }

    /// Drops the entry behind `handle`; the next `sync` places it again.
    pub fn forget(&mut self, handle: Handle) -> Option<MarkerDescriptor> {
        let descriptor = self.arena.remove(handle)?;
        if self.by_listing.get(&descriptor.listing_id) == Some(&handle) {
            self.by_listing.remove(&descriptor.listing_id);
        }
        self.dirty.remove(&descriptor.listing_id);
        Some(descriptor)
    }

    /// Queues a removal the surface did not carry out.
    pub fn retry_removal(&mut self, handle: Handle, listing_id: ListingId) {
        if !self.pending_removals.contains(&(handle, listing_id)) {
            self.pending_removals.push((handle, listing_id));
        }
    }

    /// Forces the next `sync` to resend the marker of `listing_id`.
    pub fn invalidate(&mut self, listing_id: ListingId) {
        if self.by_listing.contains_key(&listing_id) {
            self.dirty.insert(listing_id);
        }
    }

    /// Reconciles the registry with a full render pass.
    ///
    /// Ordering contract:
    /// - Retried removals come first, then removals in handle slot order.
    /// - Then additions/updates, in `descriptors` order.
    /// - Unchanged markers produce no change.
    pub fn sync(&mut self, descriptors: Vec<MarkerDescriptor>) -> Vec<MarkerChange> {
        let keep: HashSet<ListingId> = descriptors.iter().map(|d| d.listing_id).collect();

        let stale: Vec<(Handle, ListingId)> = self
            .arena
            .iter()
            .filter(|(_, d)| !keep.contains(&d.listing_id))
            .map(|(h, d)| (h, d.listing_id))
            .collect();

        let mut changes: Vec<MarkerChange> = self
            .pending_removals
            .drain(..)
            .map(|(handle, listing_id)| MarkerChange::Removed { handle, listing_id })
            .collect();
        for (handle, listing_id) in stale {
            self.arena.remove(handle);
            self.by_listing.remove(&listing_id);
            self.dirty.remove(&listing_id);
            changes.push(MarkerChange::Removed { handle, listing_id });
        }

        for descriptor in descriptors {
            match self.handle(descriptor.listing_id) {
                Some(handle) => {
                    let Some(current) = self.arena.get_mut(handle) else {
                        continue;
                    };
                    let resend = self.dirty.remove(&descriptor.listing_id);
                    if resend || *current != descriptor {
                        *current = descriptor.clone();
                        changes.push(MarkerChange::Updated { handle, descriptor });
                    }
                }
                None => {
                    let handle = self.arena.alloc(descriptor.clone());
                    self.by_listing.insert(descriptor.listing_id, handle);
                    changes.push(MarkerChange::Added { handle, descriptor });
                }
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::render_markers;
    use catalog::listing::Listing;
    use foundation::geo::LatLon;

    fn listing(id: u64, name: &str) -> Listing {
        Listing::new(ListingId(id), name, LatLon::new(12.9, 77.5 + id as f64 * 0.01))
    }

    fn kinds(changes: &[MarkerChange]) -> Vec<(&'static str, u64)> {
        changes
            .iter()
            .map(|c| match c {
                MarkerChange::Added { descriptor, .. } => ("add", descriptor.listing_id.get()),
                MarkerChange::Updated { descriptor, .. } => ("update", descriptor.listing_id.get()),
                MarkerChange::Removed { listing_id, .. } => ("remove", listing_id.get()),
            })
            .collect()
    }

    #[test]
    fn first_sync_adds_every_marker() {
        let ls = vec![listing(1, "A"), listing(2, "B")];
        let mut reg = MarkerRegistry::new();
        let changes = reg.sync(render_markers(&ls, None, 12.0));
        assert_eq!(kinds(&changes), vec![("add", 1), ("add", 2)]);
        assert_eq!(reg.len(), 2);
        assert!(reg.handle(ListingId(2)).is_some());
    }

    #[test]
    fn unchanged_render_is_quiet() {
        let ls = vec![listing(1, "A"), listing(2, "B")];
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&ls, None, 12.0));
        assert!(reg.sync(render_markers(&ls, None, 12.5)).is_empty());
    }

    #[test]
    fn selection_updates_only_the_affected_marker() {
        let ls = vec![listing(1, "A"), listing(2, "B")];
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&ls, None, 12.0));
        let changes = reg.sync(render_markers(&ls, Some(&ls[1]), 12.0));
        assert_eq!(kinds(&changes), vec![("update", 2)]);
        let (handle, open) = reg.open_marker().unwrap();
        assert_eq!(open.listing_id, ListingId(2));
        assert_eq!(Some(handle), reg.handle(ListingId(2)));
    }

    #[test]
    fn page_change_removes_then_adds() {
        let page1 = vec![listing(1, "A"), listing(2, "B")];
        let page2 = vec![listing(3, "C")];
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&page1, None, 12.0));
        let old = reg.handle(ListingId(1)).unwrap();

        let changes = reg.sync(render_markers(&page2, None, 12.0));
        assert_eq!(kinds(&changes), vec![("remove", 1), ("remove", 2), ("add", 3)]);
        assert_eq!(reg.len(), 1);
        assert!(reg.handle(ListingId(1)).is_none());
        assert!(reg.get(old).is_none());
    }

    #[test]
    fn failed_removal_is_retried_first() {
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&[listing(1, "A")], None, 12.0));
        let old = reg.handle(ListingId(1)).unwrap();
        reg.sync(render_markers(&[listing(2, "B")], None, 12.0));

        reg.retry_removal(old, ListingId(1));
        reg.retry_removal(old, ListingId(1));
        let changes = reg.sync(render_markers(&[listing(2, "B")], None, 12.0));
        assert_eq!(kinds(&changes), vec![("remove", 1)]);
        assert!(reg.sync(render_markers(&[listing(2, "B")], None, 12.0)).is_empty());
    }

    #[test]
    fn forgotten_marker_is_added_again() {
        let ls = vec![listing(1, "A"), listing(2, "B")];
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&ls, None, 12.0));
        let h = reg.handle(ListingId(2)).unwrap();

        assert!(reg.forget(h).is_some());
        assert!(reg.forget(h).is_none());
        assert_eq!(reg.len(), 1);
        let changes = reg.sync(render_markers(&ls, None, 12.0));
        assert_eq!(kinds(&changes), vec![("add", 2)]);
    }

    #[test]
    fn invalidated_marker_is_resent_once() {
        let ls = vec![listing(1, "A"), listing(2, "B")];
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&ls, None, 12.0));

        reg.invalidate(ListingId(1));
        reg.invalidate(ListingId(7));
        let changes = reg.sync(render_markers(&ls, None, 12.0));
        assert_eq!(kinds(&changes), vec![("update", 1)]);
        assert!(reg.sync(render_markers(&ls, None, 12.0)).is_empty());
    }

    #[test]
    fn mark_closed_only_affects_open_marker() {
        let ls = vec![listing(1, "A"), listing(2, "B")];
        let mut reg = MarkerRegistry::new();
        reg.sync(render_markers(&ls, Some(&ls[0]), 12.0));
        assert!(!reg.mark_closed(ListingId(2)));
        assert!(reg.mark_closed(ListingId(1)));
        assert!(reg.open_marker().is_none());
    }
}
