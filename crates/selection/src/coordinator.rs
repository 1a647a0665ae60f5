use catalog::listing::Listing;
use catalog::snapshot::ListingSnapshot;
use foundation::geo::LatLon;
use foundation::ids::ListingId;
use tracing::debug;

use crate::location::SelectedLocation;
use crate::state::SelectionState;

/// Resolves the selected listing for `location` within `listings`.
///
/// Pure: the result depends only on the two inputs, so callers re-run it after
/// every change to either instead of caching the answer.
pub fn resolve_selected<'a>(
    location: Option<&SelectedLocation>,
    listings: &'a ListingSnapshot,
) -> Option<&'a Listing> {
    let location = location?;
    match location.listing_id {
        Some(id) => listings.get(id),
        None => listings.find_by_name(&location.name),
    }
}

/// What a single coordinator call did, for the layers below to act on.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChange {
    pub before: SelectionState,
    pub after: SelectionState,
    pub previous: Option<ListingId>,
    pub selected: Option<ListingId>,
    /// Set whenever a location was (re-)selected, even if it did not move.
    pub pan_to: Option<LatLon>,
}

impl SelectionChange {
    /// Nothing observable changed and no pan is wanted.
    pub fn is_noop(&self) -> bool {
        self.before == self.after && self.previous == self.selected && self.pan_to.is_none()
    }

    pub fn selected_listing_changed(&self) -> bool {
        self.previous != self.selected
    }
}

/// Upward seam used by the marker layer: it may propose a selection or a
/// clear, never write selection state itself.
pub trait SelectionSink {
    fn select_by_listing(&mut self, listing: &Listing) -> SelectionChange;
    fn clear_selection(&mut self) -> SelectionChange;
}

/// Owns the selected location; the selected listing is always derived.
#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    location: Option<SelectedLocation>,
    listings: ListingSnapshot,
}

impl SelectionCoordinator {
    pub fn new(listings: ListingSnapshot) -> Self {
        Self {
            location: None,
            listings,
        }
    }

    pub fn listings(&self) -> &ListingSnapshot {
        &self.listings
    }

    pub fn selected_location(&self) -> Option<&SelectedLocation> {
        self.location.as_ref()
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        resolve_selected(self.location.as_ref(), &self.listings)
    }

    pub fn state(&self) -> SelectionState {
        match (&self.location, self.selected_listing()) {
            (None, _) => SelectionState::NoSelection,
            (Some(_), Some(_)) => SelectionState::SelectedWithMatch,
            (Some(_), None) => SelectionState::SelectedNoMatch,
        }
    }

    /// Selects `listing`'s point, carrying its id so the match is exact.
    pub fn select_by_listing(&mut self, listing: &Listing) -> SelectionChange {
        self.select_location(SelectedLocation::from(listing))
    }

    /// Selects an arbitrary location; without a listing id it matches by name.
    pub fn select_location(&mut self, location: SelectedLocation) -> SelectionChange {
        let pan_to = location.position;
        let change = self.mutate(|c| c.location = Some(location));
        debug!(
            "select {:?} -> {} (listing {:?})",
            self.location.as_ref().map(|l| l.name.as_str()),
            change.after,
            change.selected
        );
        SelectionChange {
            pan_to: Some(pan_to),
            ..change
        }
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        let change = self.mutate(|c| c.location = None);
        if !change.is_noop() {
            debug!("selection cleared (was {})", change.before);
        }
        change
    }

    /// Replaces the collection (e.g. a new page). The selected listing is
    /// re-derived against it; the location itself is kept.
    pub fn set_listings(&mut self, listings: ListingSnapshot) -> SelectionChange {
        let change = self.mutate(|c| c.listings = listings);
        if change.before == SelectionState::SelectedWithMatch
            && change.after == SelectionState::SelectedNoMatch
        {
            debug!(
                "selected location {:?} has no match in snapshot {}",
                self.location.as_ref().map(|l| l.name.as_str()),
                self.listings.id()
            );
        }
        change
    }

    fn mutate(&mut self, f: impl FnOnce(&mut Self)) -> SelectionChange {
        let before = self.state();
        let previous = self.selected_listing().map(|l| l.id);
        f(self);
        SelectionChange {
            before,
            after: self.state(),
            previous,
            selected: self.selected_listing().map(|l| l.id),
            pan_to: None,
        }
    }
}

impl SelectionSink for SelectionCoordinator {
    fn select_by_listing(&mut self, listing: &Listing) -> SelectionChange {
        SelectionCoordinator::select_by_listing(self, listing)
    }

    fn clear_selection(&mut self) -> SelectionChange {
        SelectionCoordinator::clear_selection(self)
    }
}
