//! Generation - procedural creation of the starting map

mod placement;

pub use placement::*;
