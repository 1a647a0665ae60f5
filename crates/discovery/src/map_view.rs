use catalog::listing::Listing;
use catalog::snapshot::ListingSnapshot;
use markers::descriptor::MarkerDescriptor;
use markers::engine::MarkerPresentationEngine;
use markers::surface::MapSurface;
use markers::viewport::Viewport;
use runtime::event_bus::EventBus;
use runtime::queue::EventQueue;
use runtime::tick::Tick;
use selection::coordinator::{SelectionChange, SelectionCoordinator};
use selection::location::SelectedLocation;
use selection::state::SelectionState;
use tracing::{debug, warn};

use crate::config::MapConfig;
use crate::error::MapError;
use crate::events::MapEvent;

/// One map view over one page of listings.
///
/// Owns the selection, the marker engine and the surface; the host feeds it
/// [`MapEvent`]s and calls [`DiscoveryMap::process`].
pub struct DiscoveryMap<S: MapSurface> {
    config: MapConfig,
    coordinator: SelectionCoordinator,
    engine: MarkerPresentationEngine,
    surface: S,
    queue: EventQueue<MapEvent>,
    trace: EventBus,
}

impl<S: MapSurface> DiscoveryMap<S> {
    pub fn new(config: MapConfig, surface: S, listings: ListingSnapshot) -> Result<Self, MapError> {
        let viewport = Viewport::new(config.initial_center, config.initial_zoom, config.pan);
        let engine = MarkerPresentationEngine::new(viewport, config.popup);
        let queue = match config.max_pending_events {
            Some(max_len) => EventQueue::with_max_len(max_len),
            None => EventQueue::new(),
        };

        let mut map = Self {
            coordinator: SelectionCoordinator::new(listings),
            engine,
            surface,
            queue,
            trace: EventBus::new(),
            config,
        };

        let tick = map.queue.next_tick();
        if map.engine.attach(&map.surface) {
            map.trace
                .emit(tick, "zoom", format!("surface zoom {}", map.engine.zoom()));
        }
        let layer = map
            .config
            .base_layer()
            .cloned()
            .ok_or_else(|| MapError::UnknownBaseLayer(map.config.default_base_layer.clone()))?;
        map.surface.set_base_layer(&layer)?;
        map.rerender(tick)?;
        Ok(map)
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn listings(&self) -> &ListingSnapshot {
        self.coordinator.listings()
    }

    pub fn selected_location(&self) -> Option<&SelectedLocation> {
        self.coordinator.selected_location()
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        self.coordinator.selected_listing()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.coordinator.state()
    }

    pub fn viewport(&self) -> &Viewport {
        self.engine.viewport()
    }

    pub fn zoom(&self) -> f64 {
        self.engine.zoom()
    }

    /// Current marker descriptors, in collection order.
    pub fn marker_descriptors(&self) -> Vec<&MarkerDescriptor> {
        self.coordinator
            .listings()
            .iter()
            .filter_map(|l| self.engine.registry().descriptor(l.id))
            .collect()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn trace(&self) -> &EventBus {
        &self.trace
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queues `event`; nothing happens until [`DiscoveryMap::process`].
    pub fn dispatch(&mut self, event: MapEvent) -> Result<Tick, MapError> {
        Ok(self.queue.push(event)?)
    }

    /// Handles every queued event in arrival order and returns how many ran.
    ///
    /// A failing event is logged and traced as `error`; later events still run.
    pub fn process(&mut self) -> usize {
        let mut handled = 0;
        while let Some((tick, event)) = self.queue.pop() {
            let kind = event.kind();
            if let Err(err) = self.handle(tick, event) {
                warn!("{kind} at {tick} failed: {err}");
                self.trace.emit(tick, "error", format!("{kind}: {err}"));
            }
            handled += 1;
        }
        handled
    }

    fn handle(&mut self, tick: Tick, event: MapEvent) -> Result<(), MapError> {
        debug!("handle {} at {tick}", event.kind());
        match event {
            MapEvent::MarkerClicked(id) => {
                let listing = self
                    .coordinator
                    .listings()
                    .get(id)
                    .cloned()
                    .ok_or(MapError::UnknownListing(id))?;
                let change = self.engine.on_marker_clicked(&mut self.coordinator, &listing);
                self.after_selection(tick, change)
            }
            MapEvent::LocationSelected(location) => {
                let change = self.coordinator.select_location(location);
                self.after_selection(tick, change)
            }
            MapEvent::BackgroundClicked => {
                let change = self.engine.on_map_background_clicked(&mut self.coordinator);
                if change.is_noop() {
                    return Ok(());
                }
                self.after_selection(tick, change)
            }
            MapEvent::ZoomEnd(zoom) => {
                if !self.engine.on_zoom_end(zoom) {
                    return Ok(());
                }
                self.trace.emit(tick, "zoom", format!("{zoom}"));
                self.rerender(tick)
            }
            MapEvent::MoveEnd(center) => {
                self.engine.on_move_end(center);
                self.trace.emit(tick, "move_end", center.to_string());
                Ok(())
            }
            MapEvent::PopupClosed(id) => {
                if self.engine.on_popup_closed(id) {
                    self.trace.emit(tick, "popup_closed", id.to_string());
                }
                Ok(())
            }
            MapEvent::ListingsChanged(listings) => {
                if self.coordinator.listings().same_collection(&listings) {
                    return Ok(());
                }
                self.trace.emit(
                    tick,
                    "listings",
                    format!("snapshot {} ({} listings)", listings.id(), listings.len()),
                );
                let change = self.coordinator.set_listings(listings);
                self.after_selection(tick, change)
            }
            MapEvent::BaseLayerSelected(name) => {
                let layer = self
                    .config
                    .find_base_layer(&name)
                    .cloned()
                    .ok_or(MapError::UnknownBaseLayer(name))?;
                self.surface.set_base_layer(&layer)?;
                self.trace.emit(tick, "base_layer", layer.name);
                Ok(())
            }
        }
    }

    /// Pushes a selection change down: trace, restyle markers, then pan.
    ///
    /// The pan is still attempted when presenting the markers failed.
    fn after_selection(&mut self, tick: Tick, change: SelectionChange) -> Result<(), MapError> {
        self.trace.emit(
            tick,
            "selection",
            format!(
                "{} -> {} (listing {})",
                change.before,
                change.after,
                change
                    .selected
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "none".to_string())
            ),
        );

        let pan = self.engine.apply_selection(&change);
        let rendered = self.rerender(tick);

        match (pan, change.pan_to) {
            (Some(cmd), _) => {
                self.surface.pan_to(&cmd)?;
                self.trace.emit(tick, "pan", cmd.target.to_string());
            }
            (None, Some(target)) => {
                self.trace.emit(tick, "pan_skipped", target.to_string());
            }
            (None, None) => {}
        }
        rendered
    }

    fn rerender(&mut self, tick: Tick) -> Result<(), MapError> {
        let pass = self
            .engine
            .render(self.coordinator.listings(), self.coordinator.selected_listing());
        if pass.is_empty() {
            return Ok(());
        }
        self.trace.emit(
            tick,
            "render",
            format!("{} marker(s), {} popup(s)", pass.markers.len(), pass.popups.len()),
        );
        self.engine.present(&mut self.surface, &pass)?;
        Ok(())
    }
}
