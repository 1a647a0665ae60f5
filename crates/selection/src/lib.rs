pub mod coordinator;
pub mod location;
pub mod state;

pub use coordinator::*;
pub use location::*;
pub use state::*;
