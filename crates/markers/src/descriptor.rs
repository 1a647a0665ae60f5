use catalog::listing::Listing;
use foundation::geo::LatLon;
use foundation::ids::ListingId;
use serde::Serialize;

use crate::style::{MarkerIcon, VisualStyle};

/// How one listing is drawn at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub listing_id: ListingId,
    pub position: LatLon,
    pub visual_style: VisualStyle,
    pub icon: MarkerIcon,
    /// Drawn enlarged/lifted because it is the selected listing.
    pub is_active: bool,
    pub is_open: bool,
}

/// Describes every listing for the given zoom and selection.
///
/// Ordering contract:
/// - One descriptor per listing, in collection order.
/// - At most one descriptor has `is_open`, the first whose id equals the
///   selected listing's id.
pub fn render_markers(
    listings: &[Listing],
    selected: Option<&Listing>,
    zoom: f64,
) -> Vec<MarkerDescriptor> {
    let selected_id = selected.map(|l| l.id);
    let visual_style = VisualStyle::for_zoom(zoom);
    let mut opened = false;

    listings
        .iter()
        .map(|listing| {
            let is_active = selected_id == Some(listing.id);
            let is_open = is_active && !opened;
            opened |= is_open;
            MarkerDescriptor {
                listing_id: listing.id,
                position: listing.position,
                visual_style,
                icon: MarkerIcon::for_listing(zoom, &listing.name, is_active),
                is_active,
                is_open,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Vec<Listing> {
        vec![
            Listing::new(ListingId(1), "Oak Villas", LatLon::new(12.9, 77.5)),
            Listing::new(ListingId(2), "Maple Heights", LatLon::new(12.95, 77.6)),
            Listing::new(ListingId(3), "Cedar Court", LatLon::new(12.93, 77.61)),
        ]
    }

    #[test]
    fn zoom_13_is_all_compact_and_14_all_labeled() {
        let ls = listings();
        let selected = Some(&ls[1]);
        assert!(
            render_markers(&ls, selected, 13.0)
                .iter()
                .all(|m| m.visual_style == VisualStyle::Compact)
        );
        assert!(
            render_markers(&ls, selected, 14.0)
                .iter()
                .all(|m| m.visual_style == VisualStyle::Labeled)
        );
    }

    #[test]
    fn only_the_selected_marker_is_open() {
        let ls = listings();
        for zoom in [10.0, 14.0, 17.0] {
            for selected in [None, Some(&ls[0]), Some(&ls[2])] {
                let markers = render_markers(&ls, selected, zoom);
                let open: Vec<_> = markers.iter().filter(|m| m.is_open).collect();
                assert!(open.len() <= 1);
                assert_eq!(
                    open.first().map(|m| m.listing_id),
                    selected.map(|l| l.id)
                );
            }
        }
    }

    #[test]
    fn selection_outside_collection_opens_nothing() {
        let ls = listings();
        let stranger = Listing::new(ListingId(42), "Elsewhere", LatLon::new(0.0, 0.0));
        let markers = render_markers(&ls, Some(&stranger), 12.0);
        assert!(markers.iter().all(|m| !m.is_open && !m.is_active));
    }

    #[test]
    fn descriptors_follow_collection_order() {
        let ls = listings();
        let ids: Vec<_> = render_markers(&ls, None, 12.0)
            .into_iter()
            .map(|m| m.listing_id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
