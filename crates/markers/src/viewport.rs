use foundation::geo::LatLon;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do with a pan request that arrives while another is animating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanPolicy {
    /// Retarget toward the newest point.
    #[default]
    Restart,
    /// Keep the current animation; drop new targets until it settles.
    IgnoreUntilSettled,
}

impl std::str::FromStr for PanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "restart" => Ok(PanPolicy::Restart),
            "ignore-until-settled" => Ok(PanPolicy::IgnoreUntilSettled),
            other => Err(format!(
                "unknown pan policy {other:?} (expected restart | ignore-until-settled)"
            )),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanOptions {
    pub animate: bool,
    pub duration_s: f64,
    pub policy: PanPolicy,
}

impl Default for PanOptions {
    fn default() -> Self {
        Self {
            animate: true,
            duration_s: 1.2,
            policy: PanPolicy::Restart,
        }
    }
}

/// Camera request handed to the map surface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PanCommand {
    pub target: LatLon,
    pub animate: bool,
    pub duration_s: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PanDecision {
    Issue(PanCommand),
    /// Already resting on the target.
    AlreadyCentered,
    /// An animation toward the same target is under way.
    AlreadyInFlight,
    /// Another animation is under way and the policy keeps it.
    Ignored,
}

impl PanDecision {
    pub fn command(self) -> Option<PanCommand> {
        match self {
            PanDecision::Issue(cmd) => Some(cmd),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum PanState {
    Settled,
    Animating { target: LatLon },
}

/// Camera state as far as the marker layer cares: zoom for styling, center
/// and in-flight pan for request de-duplication.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: LatLon,
    zoom: f64,
    pan: PanState,
    options: PanOptions,
}

impl Viewport {
    pub fn new(center: LatLon, zoom: f64, options: PanOptions) -> Self {
        Self {
            center,
            zoom,
            pan: PanState::Settled,
            options,
        }
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn options(&self) -> PanOptions {
        self.options
    }

    pub fn pan_target(&self) -> Option<LatLon> {
        match self.pan {
            PanState::Settled => None,
            PanState::Animating { target } => Some(target),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.pan_target().is_some()
    }

    /// Records the zoom reached at the end of a gesture.
    ///
    /// Returns `false` (nothing to re-render) for a repeat of the current zoom
    /// or a non-finite value.
    pub fn on_zoom_end(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() || zoom == self.zoom {
            return false;
        }
        debug!("zoom {} -> {}", self.zoom, zoom);
        self.zoom = zoom;
        true
    }

    /// Records where the camera came to rest. Ends any in-flight pan.
    pub fn on_move_end(&mut self, center: LatLon) {
        self.center = center;
        self.pan = PanState::Settled;
    }

    pub fn request_pan(&mut self, target: LatLon) -> PanDecision {
        match self.pan {
            PanState::Animating { target: current } if current.same_point(&target) => {
                return PanDecision::AlreadyInFlight;
            }
            PanState::Animating { .. } if self.options.policy == PanPolicy::IgnoreUntilSettled => {
                return PanDecision::Ignored;
            }
            PanState::Settled if self.center.same_point(&target) => {
                return PanDecision::AlreadyCentered;
            }
            _ => {}
        }

        if self.options.animate {
            self.pan = PanState::Animating { target };
        } else {
            self.center = target;
            self.pan = PanState::Settled;
        }
        PanDecision::Issue(PanCommand {
            target,
            animate: self.options.animate,
            duration_s: self.options.duration_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: LatLon = LatLon::new(12.97, 77.59);
    const OAK: LatLon = LatLon::new(12.9, 77.5);
    const MAPLE: LatLon = LatLon::new(12.95, 77.6);

    fn viewport(policy: PanPolicy) -> Viewport {
        Viewport::new(
            HOME,
            12.0,
            PanOptions {
                policy,
                ..PanOptions::default()
            },
        )
    }

    #[test]
    fn zoom_end_dedupes_repeats() {
        let mut v = viewport(PanPolicy::Restart);
        assert!(!v.on_zoom_end(12.0));
        assert!(v.on_zoom_end(14.0));
        assert!(!v.on_zoom_end(14.0));
        assert!(!v.on_zoom_end(f64::NAN));
        assert_eq!(v.zoom(), 14.0);
    }

    #[test]
    fn zoom_does_not_pan() {
        let mut v = viewport(PanPolicy::Restart);
        v.on_zoom_end(15.0);
        assert!(!v.is_animating());
        assert_eq!(v.center(), HOME);
    }

    #[test]
    fn issues_pan_with_configured_animation() {
        let mut v = viewport(PanPolicy::Restart);
        let cmd = v.request_pan(OAK).command().unwrap();
        assert_eq!(cmd.target, OAK);
        assert!(cmd.animate);
        assert_eq!(cmd.duration_s, 1.2);
        assert_eq!(v.pan_target(), Some(OAK));
    }

    #[test]
    fn same_target_is_not_restarted() {
        let mut v = viewport(PanPolicy::Restart);
        v.request_pan(OAK);
        assert_eq!(v.request_pan(OAK), PanDecision::AlreadyInFlight);

        v.on_move_end(OAK);
        assert_eq!(v.request_pan(OAK), PanDecision::AlreadyCentered);
    }

    #[test]
    fn restart_policy_retargets() {
        let mut v = viewport(PanPolicy::Restart);
        v.request_pan(OAK);
        let cmd = v.request_pan(MAPLE).command().unwrap();
        assert_eq!(cmd.target, MAPLE);
        assert_eq!(v.pan_target(), Some(MAPLE));
    }

    #[test]
    fn ignore_policy_keeps_current_animation() {
        let mut v = viewport(PanPolicy::IgnoreUntilSettled);
        v.request_pan(OAK);
        assert_eq!(v.request_pan(MAPLE), PanDecision::Ignored);
        assert_eq!(v.pan_target(), Some(OAK));

        v.on_move_end(OAK);
        assert!(v.request_pan(MAPLE).command().is_some());
    }

    #[test]
    fn unanimated_pan_settles_immediately() {
        let mut v = Viewport::new(
            HOME,
            12.0,
            PanOptions {
                animate: false,
                ..PanOptions::default()
            },
        );
        assert!(v.request_pan(OAK).command().is_some());
        assert!(!v.is_animating());
        assert_eq!(v.center(), OAK);
        assert_eq!(v.request_pan(OAK), PanDecision::AlreadyCentered);
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("restart".parse::<PanPolicy>(), Ok(PanPolicy::Restart));
        assert_eq!(
            "ignore-until-settled".parse::<PanPolicy>(),
            Ok(PanPolicy::IgnoreUntilSettled)
        );
        assert!("sometimes".parse::<PanPolicy>().is_err());
    }
}
