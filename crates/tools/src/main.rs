use std::path::{Path, PathBuf};

use catalog::listing::ListingRecord;
use catalog::page::Pagination;
use catalog::snapshot::ListingSnapshot;
use catalog::source::{JsonFileListingSource, ListingSource};
use clap::{Parser, Subcommand};
use discovery::{DiscoveryMap, MapConfig, MapEvent};
use foundation::geo::LatLon;
use foundation::ids::ListingId;
use markers::descriptor::MarkerDescriptor;
use markers::popup::PopupContent;
use markers::surface::{RecordingSurface, SurfaceCommand};
use selection::location::SelectedLocation;
use selection::state::SelectionState;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless property-discovery map")]
struct Args {
    /// Map config (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listings file: `{"projects": [...]}` or a bare array
    #[arg(long)]
    listings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of listings
    Page {
        /// 1-based page number; anything unparsable means page 1
        #[arg(long)]
        page: Option<String>,
    },

    /// Print the markers a page renders to
    Render {
        #[arg(long)]
        page: Option<String>,

        /// Zoom reported by the surface
        #[arg(long)]
        zoom: Option<f64>,

        /// Listing id to select before rendering
        #[arg(long)]
        select: Option<u64>,
    },

    /// Run a JSON event script against a recording surface
    Replay {
        #[arg(long)]
        script: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let all = JsonFileListingSource::new(&args.listings)
        .load()
        .map_err(|e| e.to_string())?;
    info!("{} listings (snapshot {})", all.len(), all.id());

    match args.command {
        Command::Page { page } => {
            let number = Pagination::parse_page(page.as_deref());
            print_json(&page_report(&config, &all, number)?)
        }
        Command::Render { page, zoom, select } => {
            let number = Pagination::parse_page(page.as_deref());
            print_json(&render_report(&config, &all, number, zoom, select)?)
        }
        Command::Replay { script } => {
            let raw = std::fs::read_to_string(&script)
                .map_err(|e| format!("read {script:?}: {e}"))?;
            let events: Vec<ScriptEvent> =
                serde_json::from_str(&raw).map_err(|e| format!("script {script:?}: {e}"))?;
            print_json(&replay(&config, &all, events)?)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MapConfig, String> {
    let config = match path {
        Some(p) => MapConfig::from_path(p).map_err(|e| e.to_string())?,
        None => MapConfig::default(),
    };
    config.with_env_overrides().map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn page_of(config: &MapConfig, all: &ListingSnapshot, number: usize) -> Result<ListingSnapshot, String> {
    let pagination = config.pagination().map_err(|e| e.to_string())?;
    Ok(pagination.page(all, number).listings)
}

#[derive(Debug, Serialize)]
struct PageReport {
    page: usize,
    total_pages: usize,
    total_items: usize,
    prev: Option<usize>,
    next: Option<usize>,
    listings: Vec<ListingRecord>,
}

fn page_report(config: &MapConfig, all: &ListingSnapshot, number: usize) -> Result<PageReport, String> {
    let pagination = config.pagination().map_err(|e| e.to_string())?;
    let page = pagination.page(all, number);
    Ok(PageReport {
        page: page.number,
        total_pages: page.total_pages,
        total_items: page.total_items,
        prev: page.prev_number(),
        next: page.next_number(),
        listings: page.listings.iter().map(ListingRecord::from).collect(),
    })
}

#[derive(Debug, Serialize)]
struct RenderReport {
    zoom: f64,
    selection_state: SelectionState,
    selected: Option<ListingId>,
    markers: Vec<MarkerDescriptor>,
    popup: Option<PopupContent>,
}

fn render_report(
    config: &MapConfig,
    all: &ListingSnapshot,
    number: usize,
    zoom: Option<f64>,
    select: Option<u64>,
) -> Result<RenderReport, String> {
    let listings = page_of(config, all, number)?;
    let surface = RecordingSurface::new(zoom.unwrap_or(config.initial_zoom));
    let mut map =
        DiscoveryMap::new(config.clone(), surface, listings).map_err(|e| e.to_string())?;
    if let Some(id) = select {
        map.dispatch(MapEvent::MarkerClicked(ListingId(id)))
            .map_err(|e| e.to_string())?;
        map.process();
        if let Some(err) = map.trace().events_of("error").next() {
            return Err(err.message.clone());
        }
    }

    Ok(RenderReport {
        zoom: map.zoom(),
        selection_state: map.selection_state(),
        selected: map.selected_listing().map(|l| l.id),
        markers: map.marker_descriptors().into_iter().cloned().collect(),
        popup: map.selected_listing().map(PopupContent::for_listing),
    })
}

/// One step of a replay script, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScriptEvent {
    MarkerClicked {
        id: u64,
    },
    LocationSelected {
        lat: f64,
        lon: f64,
        name: String,
        #[serde(default)]
        id: Option<u64>,
    },
    BackgroundClicked,
    ZoomEnd {
        zoom: f64,
    },
    MoveEnd {
        lat: f64,
        lon: f64,
    },
    PopupClosed {
        id: u64,
    },
    Page {
        number: usize,
    },
    BaseLayer {
        name: String,
    },
}

impl ScriptEvent {
    fn into_map_event(self, config: &MapConfig, all: &ListingSnapshot) -> Result<MapEvent, String> {
        Ok(match self {
            ScriptEvent::MarkerClicked { id } => MapEvent::MarkerClicked(ListingId(id)),
            ScriptEvent::LocationSelected { lat, lon, name, id } => {
                let mut location = SelectedLocation::new(LatLon::new(lat, lon), name);
                if let Some(id) = id {
                    location = location.with_listing_id(ListingId(id));
                }
                MapEvent::LocationSelected(location)
            }
            ScriptEvent::BackgroundClicked => MapEvent::BackgroundClicked,
            ScriptEvent::ZoomEnd { zoom } => MapEvent::ZoomEnd(zoom),
            ScriptEvent::MoveEnd { lat, lon } => MapEvent::MoveEnd(LatLon::new(lat, lon)),
            ScriptEvent::PopupClosed { id } => MapEvent::PopupClosed(ListingId(id)),
            ScriptEvent::Page { number } => {
                MapEvent::ListingsChanged(page_of(config, all, number.max(1))?)
            }
            ScriptEvent::BaseLayer { name } => MapEvent::BaseLayerSelected(name),
        })
    }
}

#[derive(Debug, Serialize)]
struct TraceLine {
    tick: u64,
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    selection_state: SelectionState,
    selected: Option<ListingId>,
    zoom: f64,
    commands: Vec<SurfaceCommand>,
    trace: Vec<TraceLine>,
}

/// Starts on page 1 and runs `events` in order.
fn replay(
    config: &MapConfig,
    all: &ListingSnapshot,
    events: Vec<ScriptEvent>,
) -> Result<ReplayReport, String> {
    let surface = RecordingSurface::new(config.initial_zoom);
    let mut map = DiscoveryMap::new(config.clone(), surface, page_of(config, all, 1)?)
        .map_err(|e| e.to_string())?;

    for event in events {
        let event = event.into_map_event(config, all)?;
        if config
            .max_pending_events
            .is_some_and(|max| map.pending() >= max)
        {
            map.process();
        }
        map.dispatch(event).map_err(|e| e.to_string())?;
    }
    map.process();

    Ok(ReplayReport {
        selection_state: map.selection_state(),
        selected: map.selected_listing().map(|l| l.id),
        zoom: map.zoom(),
        commands: map.surface().commands().to_vec(),
        trace: map
            .trace()
            .events()
            .iter()
            .map(|e| TraceLine {
                tick: e.tick,
                kind: e.kind,
                message: e.message.clone(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::source::parse_listings_json;
    use pretty_assertions::assert_eq;

    const LISTINGS: &str = r#"{"projects": [
        {"id": 1, "name": "Oak Villas", "city": "Bengaluru", "latitude": 12.9, "longitude": 77.5,
         "minPrice": 9500000, "maxPrice": 14000000},
        {"id": 2, "name": "Maple Heights", "city": "Bengaluru", "latitude": 12.95, "longitude": 77.6,
         "minPrice": 12000000, "maxPrice": 21000000},
        {"id": 3, "name": "Cedar Court", "city": "Bengaluru", "latitude": 12.93, "longitude": 77.61,
         "minPrice": 6000000, "maxPrice": 8000000}
    ]}"#;

    fn all() -> ListingSnapshot {
        parse_listings_json(LISTINGS).unwrap()
    }

    fn config(page_size: usize) -> MapConfig {
        MapConfig {
            page_size,
            ..MapConfig::default()
        }
    }

    #[test]
    fn page_report_links_neighbours() {
        let report = page_report(&config(2), &all(), 2).unwrap();
        assert_eq!(report.page, 2);
        assert_eq!(report.total_pages, 2);
        assert_eq!(report.prev, Some(1));
        assert_eq!(report.next, None);
        assert_eq!(report.listings.len(), 1);
        assert_eq!(report.listings[0].name, "Cedar Court");
    }

    #[test]
    fn render_with_selection_has_one_active_marker() {
        let report = render_report(&config(8), &all(), 1, Some(14.0), Some(2)).unwrap();
        assert_eq!(report.selected, Some(ListingId(2)));
        assert_eq!(report.markers.len(), 3);
        let active: Vec<_> = report
            .markers
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.listing_id)
            .collect();
        assert_eq!(active, vec![ListingId(2)]);
        assert_eq!(
            report.popup.map(|p| p.href),
            Some("/property-for-sale-in/bengaluru/maple-heights/2".to_string())
        );
    }

    #[test]
    fn render_rejects_listing_off_page() {
        assert!(render_report(&config(2), &all(), 1, None, Some(3)).is_err());
    }

    #[test]
    fn script_events_parse() {
        let events: Vec<ScriptEvent> = serde_json::from_str(
            r#"[
                {"event": "marker_clicked", "id": 2},
                {"event": "zoom_end", "zoom": 14},
                {"event": "background_clicked"},
                {"event": "page", "number": 2}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                ScriptEvent::MarkerClicked { id: 2 },
                ScriptEvent::ZoomEnd { zoom: 14.0 },
                ScriptEvent::BackgroundClicked,
                ScriptEvent::Page { number: 2 },
            ]
        );
    }

    #[test]
    fn replay_pages_away_from_selection() {
        let report = replay(
            &config(2),
            &all(),
            vec![
                ScriptEvent::MarkerClicked { id: 1 },
                ScriptEvent::Page { number: 2 },
            ],
        )
        .unwrap();
        assert_eq!(report.selection_state, SelectionState::SelectedNoMatch);
        assert_eq!(report.selected, None);
        let pans = report
            .commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::PanTo { .. }))
            .count();
        assert_eq!(pans, 1);
        assert!(report.trace.iter().any(|t| t.kind == "listings"));
    }
}
