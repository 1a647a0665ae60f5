pub mod descriptor;
pub mod engine;
pub mod popup;
pub mod registry;
pub mod style;
pub mod surface;
pub mod viewport;

pub use descriptor::*;
pub use engine::*;
pub use popup::*;
pub use registry::*;
pub use style::*;
pub use surface::*;
pub use viewport::*;
