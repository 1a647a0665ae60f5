use foundation::ids::ListingId;
use markers::surface::SurfaceError;
use runtime::queue::QueueFull;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    Surface(SurfaceError),
    /// A click referenced a listing that is not on the current page.
    UnknownListing(ListingId),
    UnknownBaseLayer(String),
    QueueFull(QueueFull),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Surface(err) => write!(f, "{err}"),
            MapError::UnknownListing(id) => write!(f, "listing {id} is not on the current page"),
            MapError::UnknownBaseLayer(name) => write!(f, "unknown base layer {name:?}"),
            MapError::QueueFull(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Surface(err) => Some(err),
            MapError::QueueFull(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SurfaceError> for MapError {
    fn from(err: SurfaceError) -> Self {
        MapError::Surface(err)
    }
}

impl From<QueueFull> for MapError {
    fn from(err: QueueFull) -> Self {
        MapError::QueueFull(err)
    }
}
