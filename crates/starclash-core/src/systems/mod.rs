//! Systems - logic that operates on components

mod boost;
mod combat;
mod events;
mod opponent;
mod production;
mod transit;

pub use boost::*;
pub use combat::*;
pub use events::*;
pub use opponent::*;
pub use production::*;
pub use transit::*;
