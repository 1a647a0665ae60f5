pub mod event_bus;
pub mod queue;
pub mod tick;

pub use event_bus::*;
pub use queue::*;
pub use tick::*;
