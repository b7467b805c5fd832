pub mod event_bus;
pub mod events;

pub use event_bus::*;
pub use events::*;
