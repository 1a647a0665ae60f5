use catalog::snapshot::ListingSnapshot;
use foundation::geo::LatLon;
use foundation::ids::ListingId;
use selection::location::SelectedLocation;

/// Discrete inputs from the host page and the map surface.
#[derive(Debug, Clone)]
pub enum MapEvent {
    MarkerClicked(ListingId),
    /// Selection made outside the map, e.g. from a listing card.
    LocationSelected(SelectedLocation),
    BackgroundClicked,
    /// End of a zoom gesture, with the zoom it settled on.
    ZoomEnd(f64),
    /// End of a camera move (pan animation or drag).
    MoveEnd(LatLon),
    /// The user closed a popup with its close button.
    PopupClosed(ListingId),
    /// A new page of listings replaced the current one.
    ListingsChanged(ListingSnapshot),
    BaseLayerSelected(String),
}

impl MapEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MapEvent::MarkerClicked(_) => "marker_click",
            MapEvent::LocationSelected(_) => "location_selected",
            MapEvent::BackgroundClicked => "background_click",
            MapEvent::ZoomEnd(_) => "zoom_end",
            MapEvent::MoveEnd(_) => "move_end",
            MapEvent::PopupClosed(_) => "popup_closed",
            MapEvent::ListingsChanged(_) => "listings_changed",
            MapEvent::BaseLayerSelected(_) => "base_layer",
        }
    }
}
