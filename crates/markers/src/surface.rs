use std::collections::BTreeMap;

use foundation::handles::Handle;
use serde::{Deserialize, Serialize};

use crate::descriptor::MarkerDescriptor;
use crate::popup::{PopupContent, PopupOptions};
use crate::viewport::PanCommand;

/// A selectable basemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    /// XYZ tile URL template (`{s}`, `{z}`, `{x}`, `{y}`).
    pub url_template: String,
}

impl BaseLayer {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    pub fn street() -> Self {
        Self::new("Street", "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
    }

    pub fn satellite() -> Self {
        Self::new(
            "Satellite",
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    NotReady,
    UnknownMarker(Handle),
    Backend(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::NotReady => write!(f, "map surface is not ready"),
            SurfaceError::UnknownMarker(h) => write!(f, "no marker with handle {h}"),
            SurfaceError::Backend(msg) => write!(f, "map surface error: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Capabilities the core needs from whatever actually draws the map.
///
/// Events flowing the other way (zoom-end, move-end, clicks, popup dismissal)
/// are delivered by the host as queued map events, not through this trait.
pub trait MapSurface {
    fn current_zoom(&self) -> f64;
    fn place_marker(
        &mut self,
        handle: Handle,
        marker: &MarkerDescriptor,
    ) -> Result<(), SurfaceError>;
    fn update_marker(
        &mut self,
        handle: Handle,
        marker: &MarkerDescriptor,
    ) -> Result<(), SurfaceError>;
    /// Removing a marker also removes its popup.
    fn remove_marker(&mut self, handle: Handle) -> Result<(), SurfaceError>;
    fn open_popup(
        &mut self,
        handle: Handle,
        content: &PopupContent,
        options: &PopupOptions,
    ) -> Result<(), SurfaceError>;
    fn close_popup(&mut self, handle: Handle) -> Result<(), SurfaceError>;
    fn pan_to(&mut self, pan: &PanCommand) -> Result<(), SurfaceError>;
    fn set_base_layer(&mut self, layer: &BaseLayer) -> Result<(), SurfaceError>;
}

/// Everything a [`RecordingSurface`] was asked to do, in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceCommand {
    PlaceMarker {
        handle: Handle,
        marker: MarkerDescriptor,
    },
    UpdateMarker {
        handle: Handle,
        marker: MarkerDescriptor,
    },
    RemoveMarker {
        handle: Handle,
    },
    OpenPopup {
        handle: Handle,
        content: PopupContent,
    },
    ClosePopup {
        handle: Handle,
    },
    PanTo {
        pan: PanCommand,
    },
    SetBaseLayer {
        name: String,
    },
}

/// Headless surface: keeps the marker set and open popup in memory and logs
/// every call. Used by the CLI replay and by tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    zoom: f64,
    markers: BTreeMap<Handle, MarkerDescriptor>,
    open_popup: Option<Handle>,
    base_layer: Option<String>,
    commands: Vec<SurfaceCommand>,
    /// Calls left to succeed before `err` is returned once.
    fail_at: Option<(usize, SurfaceError)>,
}

impl RecordingSurface {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            ..Self::default()
        }
    }

    /// Makes the next surface call fail with `err`.
    pub fn fail_next(&mut self, err: SurfaceError) {
        self.fail_after(0, err);
    }

    /// Lets `succeed` calls through, then fails the one after with `err`.
    pub fn fail_after(&mut self, succeed: usize, err: SurfaceError) {
        self.fail_at = Some((succeed, err));
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&Handle, &MarkerDescriptor)> + '_ {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn open_popup_handle(&self) -> Option<Handle> {
        self.open_popup
    }

    pub fn base_layer(&self) -> Option<&str> {
        self.base_layer.as_deref()
    }

    pub fn pans(&self) -> impl Iterator<Item = &PanCommand> + '_ {
        self.commands.iter().filter_map(|c| match c {
            SurfaceCommand::PanTo { pan } => Some(pan),
            _ => None,
        })
    }

    fn check(&mut self) -> Result<(), SurfaceError> {
        match self.fail_at.take() {
            Some((0, err)) => Err(err),
            Some((n, err)) => {
                self.fail_at = Some((n - 1, err));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn require(&self, handle: Handle) -> Result<(), SurfaceError> {
        if self.markers.contains_key(&handle) {
            Ok(())
        } else {
            Err(SurfaceError::UnknownMarker(handle))
        }
    }
}

impl MapSurface for RecordingSurface {
    fn current_zoom(&self) -> f64 {
        self.zoom
    }

    fn place_marker(
        &mut self,
        handle: Handle,
        marker: &MarkerDescriptor,
    ) -> Result<(), SurfaceError> {
        self.check()?;
        self.markers.insert(handle, marker.clone());
        self.commands.push(SurfaceCommand::PlaceMarker {
            handle,
            marker: marker.clone(),
        });
        Ok(())
    }

    fn update_marker(
        &mut self,
        handle: Handle,
        marker: &MarkerDescriptor,
    ) -> Result<(), SurfaceError> {
        self.check()?;
        self.require(handle)?;
        self.markers.insert(handle, marker.clone());
        self.commands.push(SurfaceCommand::UpdateMarker {
            handle,
            marker: marker.clone(),
        });
        Ok(())
    }

    fn remove_marker(&mut self, handle: Handle) -> Result<(), SurfaceError> {
        self.check()?;
        self.require(handle)?;
        self.markers.remove(&handle);
        if self.open_popup == Some(handle) {
            self.open_popup = None;
        }
        self.commands.push(SurfaceCommand::RemoveMarker { handle });
        Ok(())
    }

    fn open_popup(
        &mut self,
        handle: Handle,
        content: &PopupContent,
        options: &PopupOptions,
    ) -> Result<(), SurfaceError> {
        self.check()?;
        self.require(handle)?;
        if options.auto_close {
            if let Some(prev) = self.open_popup.take() {
                self.commands.push(SurfaceCommand::ClosePopup { handle: prev });
            }
        }
        self.open_popup = Some(handle);
        self.commands.push(SurfaceCommand::OpenPopup {
            handle,
            content: content.clone(),
        });
        Ok(())
    }

    fn close_popup(&mut self, handle: Handle) -> Result<(), SurfaceError> {
        self.check()?;
        self.require(handle)?;
        if self.open_popup == Some(handle) {
            self.open_popup = None;
        }
        self.commands.push(SurfaceCommand::ClosePopup { handle });
        Ok(())
    }

    fn pan_to(&mut self, pan: &PanCommand) -> Result<(), SurfaceError> {
        self.check()?;
        self.commands.push(SurfaceCommand::PanTo { pan: *pan });
        Ok(())
    }

    fn set_base_layer(&mut self, layer: &BaseLayer) -> Result<(), SurfaceError> {
        self.check()?;
        self.base_layer = Some(layer.name.clone());
        self.commands.push(SurfaceCommand::SetBaseLayer {
            name: layer.name.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::render_markers;
    use catalog::listing::Listing;
    use foundation::geo::LatLon;
    use foundation::ids::ListingId;

    fn marker() -> MarkerDescriptor {
        let ls = vec![Listing::new(ListingId(1), "Oak Villas", LatLon::new(12.9, 77.5))];
        render_markers(&ls, None, 12.0).remove(0)
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut s = RecordingSurface::new(12.0);
        let h = Handle::new(3, 0);
        assert_eq!(s.remove_marker(h), Err(SurfaceError::UnknownMarker(h)));
        assert_eq!(s.close_popup(h), Err(SurfaceError::UnknownMarker(h)));
        assert!(s.commands().is_empty());
    }

    #[test]
    fn removing_a_marker_drops_its_popup() {
        let mut s = RecordingSurface::new(12.0);
        let h = Handle::new(0, 0);
        let m = marker();
        s.place_marker(h, &m).unwrap();
        let listing = Listing::new(ListingId(1), "Oak Villas", LatLon::new(12.9, 77.5));
        s.open_popup(h, &PopupContent::for_listing(&listing), &PopupOptions::default())
            .unwrap();
        assert_eq!(s.open_popup_handle(), Some(h));

        s.remove_marker(h).unwrap();
        assert_eq!(s.open_popup_handle(), None);
        assert_eq!(s.marker_count(), 0);
    }

    #[test]
    fn injected_failure_hits_one_call() {
        let mut s = RecordingSurface::new(12.0);
        s.fail_next(SurfaceError::NotReady);
        assert_eq!(
            s.set_base_layer(&BaseLayer::street()),
            Err(SurfaceError::NotReady)
        );
        assert!(s.set_base_layer(&BaseLayer::street()).is_ok());
        assert_eq!(s.base_layer(), Some("Street"));
    }

    #[test]
    fn delayed_failure_skips_earlier_calls() {
        let mut s = RecordingSurface::new(12.0);
        s.fail_after(1, SurfaceError::NotReady);
        let m = marker();
        assert!(s.place_marker(Handle::new(0, 0), &m).is_ok());
        assert_eq!(
            s.place_marker(Handle::new(1, 0), &m),
            Err(SurfaceError::NotReady)
        );
        assert!(s.place_marker(Handle::new(2, 0), &m).is_ok());
        let placed: Vec<_> = s.markers().map(|(h, _)| *h).collect();
        assert_eq!(placed, vec![Handle::new(0, 0), Handle::new(2, 0)]);
    }
}
