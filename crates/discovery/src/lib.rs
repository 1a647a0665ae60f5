//! Property-discovery map view: keeps a page of listings, the map viewport and
//! the selected listing consistent.
//!
//! Event flow:
//! - The host queues [`MapEvent`]s (clicks, zoom-end, move-end, page changes).
//! - [`DiscoveryMap::process`] handles them strictly in arrival order.
//! - Selection lives in `selection::SelectionCoordinator`; marker styling,
//!   popups and camera requests come from `markers::MarkerPresentationEngine`.

pub mod config;
pub mod error;
pub mod events;
pub mod map_view;

pub use config::*;
pub use error::*;
pub use events::*;
pub use map_view::*;
