use serde::{Deserialize, Serialize};

/// Zoom at which markers switch from dots to name badges (inclusive).
pub const LABEL_ZOOM_THRESHOLD: f64 = 14.0;

pub const DOT_DIAMETER_PX: u32 = 10;
pub const DOT_ACTIVE_DIAMETER_PX: u32 = 14;

/// Badge anchor as a CSS translate percentage of its own box.
pub const BADGE_ANCHOR_PCT: [i32; 2] = [-50, -100];
pub const BADGE_ACTIVE_ANCHOR_PCT: [i32; 2] = [-50, -120];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualStyle {
    /// Small dot.
    Compact,
    /// Badge showing the listing name.
    Labeled,
}

impl VisualStyle {
    pub fn for_zoom(zoom: f64) -> Self {
        if zoom >= LABEL_ZOOM_THRESHOLD {
            VisualStyle::Labeled
        } else {
            VisualStyle::Compact
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotIcon {
    pub diameter_px: u32,
    pub fill: String,
    pub border_px: u32,
    pub border_color: String,
}

impl DotIcon {
    pub fn new(active: bool) -> Self {
        Self {
            diameter_px: if active {
                DOT_ACTIVE_DIAMETER_PX
            } else {
                DOT_DIAMETER_PX
            },
            fill: "#111".to_string(),
            border_px: 2,
            border_color: "white".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeIcon {
    pub text: String,
    pub aria_label: String,
    pub anchor_pct: [i32; 2],
}

impl BadgeIcon {
    pub fn new(name: &str, active: bool) -> Self {
        Self {
            text: name.to_string(),
            aria_label: name.to_string(),
            anchor_pct: if active {
                BADGE_ACTIVE_ANCHOR_PCT
            } else {
                BADGE_ANCHOR_PCT
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerIcon {
    Dot(DotIcon),
    Badge(BadgeIcon),
}

impl MarkerIcon {
    /// Icon for a listing named `name`; `active` enlarges the dot or lifts the
    /// badge.
    pub fn for_listing(zoom: f64, name: &str, active: bool) -> Self {
        match VisualStyle::for_zoom(zoom) {
            VisualStyle::Compact => MarkerIcon::Dot(DotIcon::new(active)),
            VisualStyle::Labeled => MarkerIcon::Badge(BadgeIcon::new(name, active)),
        }
    }

    pub fn visual_style(&self) -> VisualStyle {
        match self {
            MarkerIcon::Dot(_) => VisualStyle::Compact,
            MarkerIcon::Badge(_) => VisualStyle::Labeled,
        }
    }
}
