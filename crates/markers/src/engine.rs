use catalog::listing::Listing;
use catalog::snapshot::ListingSnapshot;
use foundation::geo::LatLon;
use foundation::handles::Handle;
use foundation::ids::ListingId;
use selection::coordinator::{SelectionChange, SelectionSink};
use tracing::{debug, warn};

use crate::descriptor::render_markers;
use crate::popup::{PopupContent, PopupOptions};
use crate::registry::{MarkerChange, MarkerRegistry};
use crate::surface::{MapSurface, SurfaceError};
use crate::viewport::{PanCommand, PanDecision, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub enum PopupAction {
    Open {
        handle: Handle,
        content: PopupContent,
    },
    Close {
        handle: Handle,
    },
}

/// Surface work produced by one render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPass {
    pub markers: Vec<MarkerChange>,
    pub popups: Vec<PopupAction>,
}

impl RenderPass {
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.popups.is_empty()
    }
}

/// Decides how every listing is drawn and keeps the surface in step.
///
/// The engine reads selection; it only changes it by forwarding clicks to a
/// [`SelectionSink`].
#[derive(Debug)]
pub struct MarkerPresentationEngine {
    viewport: Viewport,
    registry: MarkerRegistry,
    popup_options: PopupOptions,
    /// Listing whose popup the user closed; stays closed until the next
    /// selection.
    dismissed: Option<ListingId>,
    /// Popup last handed to the surface, with the content it shows.
    shown_popup: Option<(Handle, PopupContent)>,
    /// Popup the surface failed to close.
    stale_popup: Option<Handle>,
}

impl MarkerPresentationEngine {
    pub fn new(viewport: Viewport, popup_options: PopupOptions) -> Self {
        Self {
            viewport,
            registry: MarkerRegistry::new(),
            popup_options,
            dismissed: None,
            shown_popup: None,
            stale_popup: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn popup_options(&self) -> &PopupOptions {
        &self.popup_options
    }

    /// Picks up the surface's zoom before the first zoom-end arrives.
    pub fn attach<S: MapSurface + ?Sized>(&mut self, surface: &S) -> bool {
        self.viewport.on_zoom_end(surface.current_zoom())
    }

    pub fn render(&mut self, listings: &ListingSnapshot, selected: Option<&Listing>) -> RenderPass {
        let mut descriptors = render_markers(listings.listings(), selected, self.viewport.zoom());
        if let Some(dismissed) = self.dismissed {
            for d in descriptors.iter_mut().filter(|d| d.listing_id == dismissed) {
                d.is_open = false;
            }
        }

        let markers = self.registry.sync(descriptors);
        let wanted = self.open_marker().and_then(|(handle, listing_id)| {
            listings
                .get(listing_id)
                .map(|l| (handle, PopupContent::for_listing(l)))
        });
        let wanted_handle = wanted.as_ref().map(|(h, _)| *h);

        let mut popups = Vec::new();
        if let Some(handle) = self.stale_popup.take() {
            if self.registry.contains(handle) && wanted_handle != Some(handle) {
                popups.push(PopupAction::Close { handle });
            }
        }
        // Reopened on content change too, so a refreshed page shows new details.
        if wanted != self.shown_popup {
            if let Some((handle, _)) = &self.shown_popup {
                // A removed marker takes its popup with it.
                if self.registry.contains(*handle) && wanted_handle != Some(*handle) {
                    popups.push(PopupAction::Close { handle: *handle });
                }
            }
            if let Some((handle, content)) = &wanted {
                popups.push(PopupAction::Open {
                    handle: *handle,
                    content: content.clone(),
                });
            }
            self.shown_popup = wanted;
        }

        RenderPass { markers, popups }
    }

    /// Applies `pass` to `surface` in order.
    ///
    /// A failing call is logged and skipped so one bad marker does not stall
    /// the rest; the first error is returned. The registry is rolled back for
    /// every failed call so the next render retries it.
    pub fn present<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        pass: &RenderPass,
    ) -> Result<(), SurfaceError> {
        let mut first_err = None;

        for change in &pass.markers {
            let (res, what) = match change {
                MarkerChange::Added { handle, descriptor } => {
                    (surface.place_marker(*handle, descriptor), "place_marker")
                }
                MarkerChange::Updated { handle, descriptor } => {
                    (surface.update_marker(*handle, descriptor), "update_marker")
                }
                MarkerChange::Removed { handle, .. } => {
                    (surface.remove_marker(*handle), "remove_marker")
                }
            };
            let Err(err) = res else { continue };
            warn!("surface {what} failed: {err}");
            self.roll_back_marker(change, &err);
            first_err.get_or_insert(err);
        }

        for popup in &pass.popups {
            let (res, what) = match popup {
                PopupAction::Open { handle, content } => (
                    surface.open_popup(*handle, content, &self.popup_options),
                    "open_popup",
                ),
                PopupAction::Close { handle } => (surface.close_popup(*handle), "close_popup"),
            };
            let Err(err) = res else { continue };
            warn!("surface {what} failed: {err}");
            self.roll_back_popup(popup, &err);
            first_err.get_or_insert(err);
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn roll_back_marker(&mut self, change: &MarkerChange, err: &SurfaceError) {
        let missing = matches!(err, SurfaceError::UnknownMarker(_));
        match change {
            MarkerChange::Added { handle, .. } => {
                self.forget(*handle);
            }
            MarkerChange::Updated { handle, descriptor } => {
                if missing {
                    self.forget(*handle);
                } else {
                    self.registry.invalidate(descriptor.listing_id);
                }
            }
            // A marker the surface never had needs no removal.
            MarkerChange::Removed { handle, listing_id } => {
                if !missing {
                    self.registry.retry_removal(*handle, *listing_id);
                }
            }
        }
    }

    fn roll_back_popup(&mut self, popup: &PopupAction, err: &SurfaceError) {
        let missing = matches!(err, SurfaceError::UnknownMarker(_));
        match popup {
            PopupAction::Open { handle, .. } => {
                if self.shown_popup.as_ref().map(|(h, _)| *h) == Some(*handle) {
                    self.shown_popup = None;
                }
                if missing {
                    self.forget(*handle);
                }
            }
            PopupAction::Close { handle } => {
                if !missing {
                    self.stale_popup = Some(*handle);
                }
            }
        }
    }

    fn forget(&mut self, handle: Handle) {
        self.registry.forget(handle);
        if self.shown_popup.as_ref().map(|(h, _)| *h) == Some(handle) {
            self.shown_popup = None;
        }
    }

    /// Returns `true` when the zoom changed and markers need restyling.
    pub fn on_zoom_end(&mut self, zoom: f64) -> bool {
        self.viewport.on_zoom_end(zoom)
    }

    pub fn on_move_end(&mut self, center: LatLon) {
        self.viewport.on_move_end(center);
    }

    pub fn on_marker_clicked<S: SelectionSink + ?Sized>(
        &mut self,
        sink: &mut S,
        listing: &Listing,
    ) -> SelectionChange {
        sink.select_by_listing(listing)
    }

    pub fn on_map_background_clicked<S: SelectionSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> SelectionChange {
        sink.clear_selection()
    }

    /// The user closed the popup of `listing_id` on the surface.
    ///
    /// Selection is untouched; the popup stays closed until a listing is
    /// selected again.
    pub fn on_popup_closed(&mut self, listing_id: ListingId) -> bool {
        let was_open = self.registry.mark_closed(listing_id);
        if was_open {
            self.dismissed = Some(listing_id);
            self.shown_popup = None;
        }
        was_open
    }

    /// Takes in a selection change coming back down from the coordinator and
    /// returns the camera request it implies, if the surface needs one.
    pub fn apply_selection(&mut self, change: &SelectionChange) -> Option<PanCommand> {
        if change.pan_to.is_some() || change.selected_listing_changed() {
            self.dismissed = None;
        }
        let target = change.pan_to?;
        match self.viewport.request_pan(target) {
            PanDecision::Issue(cmd) => Some(cmd),
            decision => {
                debug!("pan to {target} skipped: {decision:?}");
                None
            }
        }
    }

    fn open_marker(&self) -> Option<(Handle, ListingId)> {
        self.registry
            .open_marker()
            .map(|(handle, d)| (handle, d.listing_id))
    }
}
